use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Default per-language deny-lists, keyed by lower-case language tag.
///
/// Matching is raw substring containment over the submitted source: no
/// tokenization, no regexes. False positives are accepted; the point is a
/// hard floor against trivial sandbox-escape attempts before the submission
/// ever reaches a backend. This screening is defense in depth, not a security
/// boundary: concatenated strings or eval-in-disguise walk straight past it,
/// and the backend sandbox remains the real enforcement line.
static DEFAULT_DENY_LISTS: Lazy<HashMap<String, Vec<String>>> = Lazy::new(|| {
    let mut lists = HashMap::new();

    lists.insert(
        "python".to_string(),
        to_owned(&[
            "import os",
            "import subprocess",
            "__import__",
            "import sys",
            "import shutil",
            "exec(",
            "os.system",
            "subprocess",
            "importlib",
            "open(",
        ]),
    );

    lists.insert(
        "java".to_string(),
        to_owned(&[
            // process control
            "Runtime.getRuntime().exec(",
            "new ProcessBuilder(",
            "ProcessBuilder",
            "Runtime.exec(",
            // filesystem
            "java.io.File",
            "new File(",
            ".delete()",
            ".mkdir()",
            ".renameTo(",
            "java.io.FileOutputStream",
            "java.io.FileInputStream",
            "java.io.RandomAccessFile",
            "java.nio.file.Files",
            "java.nio.file.Paths",
            "Files.write(",
            "Files.readAllBytes(",
            "Files.delete(",
            "Files.copy(",
            "Files.move(",
            // network
            "java.net.Socket",
            "new Socket(",
            "java.net.ServerSocket",
            "new ServerSocket(",
            "java.net.URL",
            ".openConnection(",
            ".openStream(",
            "java.net.DatagramSocket",
            "java.nio.channels.SocketChannel",
            "java.nio.channels.ServerSocketChannel",
            // reflection
            "java.lang.reflect",
            "Class.forName(",
            ".setAccessible(true)",
            "Method.invoke(",
            "Field.set(",
            // system and classloading
            "System.exit(",
            "System.load(",
            "System.loadLibrary(",
            "System.getenv(",
            "System.getProperty(",
            "System.setProperty(",
            "System.getSecurityManager(",
            "System.setSecurityManager(",
            "java.lang.ClassLoader",
            "URLClassLoader",
            "new Thread(",
        ]),
    );

    lists.insert(
        "cpp".to_string(),
        to_owned(&[
            // process control
            "system(",
            "popen(",
            "exec(",
            "execl(",
            "execle(",
            "execlp(",
            "execv(",
            "execve(",
            "execvp(",
            "fork(",
            "vfork(",
            "spawn(",
            // C file API
            "fopen(",
            "freopen(",
            "fdopen(",
            "fclose(",
            "remove(",
            "rename(",
            "tmpfile(",
            "tmpnam(",
            "unlink(",
            "mkdir(",
            "rmdir(",
            // C++ file API
            "std::fstream",
            "std::ifstream",
            "std::ofstream",
            "std::filebuf",
            "std::filesystem::create_directory(",
            "std::filesystem::remove(",
            "std::filesystem::remove_all(",
            "std::filesystem::rename(",
            "std::filesystem::copy(",
            "std::filesystem::copy_file(",
            "std::filesystem::resize_file(",
            // environment and termination
            "std::getenv(",
            "std::setenv(",
            "std::putenv(",
            "std::system(",
            "std::abort(",
            "std::exit(",
            "std::quick_exit(",
            "std::terminate(",
            // sockets
            "socket(",
            "bind(",
            "listen(",
            "accept(",
            "connect(",
            "send(",
            "sendto(",
            "recv(",
            "recvfrom(",
            "gethostbyname(",
            "gethostbyaddr(",
            "getaddrinfo(",
            "std::net::socket",
            // raw memory
            "malloc(",
            "calloc(",
            "realloc(",
            "free(",
            "std::allocator",
            "std::memcpy(",
            "std::memmove(",
            "std::memset(",
            "std::raw_storage_iterator",
            // dynamic loading
            "dlopen(",
            "dlsym(",
            "dlclose(",
            "dlerror(",
            // threading
            "std::thread",
            "std::async(",
            "std::mutex",
            "std::lock_guard",
            "std::unique_lock",
            "pthread_create(",
            "pthread_join(",
            "pthread_detach(",
            // asm and signals
            "asm",
            "__asm__",
            "inline asm",
            "volatile",
            "std::signal(",
            "std::raise(",
            "std::setjmp(",
            "std::longjmp(",
            // dangerous headers
            "#include <cstdlib>",
            "#include <cstdio>",
            "#include <fstream>",
            "#include <filesystem>",
            "#include <sys/socket.h>",
            "#include <netinet/in.h>",
            "#include <arpa/inet.h>",
            "#include <netdb.h>",
            "#include <dlfcn.h>",
            "#include <pthread.h>",
            "#include <signal.h>",
            "#include <unistd.h>",
            "#include <sys/stat.h>",
            "#include <sys/types.h>",
            // allocation operators and smart pointers
            "operator new",
            "operator delete",
            "std::unique_ptr",
            "std::shared_ptr",
            "std::weak_ptr",
            "std::dynamic_pointer_cast(",
            "std::static_pointer_cast(",
            "std::const_pointer_cast(",
        ]),
    );

    lists.insert(
        "javascript".to_string(),
        to_owned(&[
            "require(",
            "import(",
            "child_process",
            "fs",
            "eval(",
            "Function(",
            "process",
            "globalThis",
            "__proto__",
            "Reflect",
            "Proxy",
            "Buffer",
            "setInterval(",
            "setTimeout(",
            "while(true)",
            "for(;;)",
            "`",
            "window",
            "document",
        ]),
    );

    lists
});

fn to_owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

/// Static substring screen applied to every code submission before it is
/// forwarded to a backend.
pub struct SafetyScreener {
    deny_lists: HashMap<String, Vec<String>>,
}

impl SafetyScreener {
    /// Screener with the built-in deny-lists.
    pub fn new() -> Self {
        Self::with_deny_lists(DEFAULT_DENY_LISTS.clone())
    }

    /// Screener with caller-supplied lists, keyed by lower-case language tag.
    pub fn with_deny_lists(deny_lists: HashMap<String, Vec<String>>) -> Self {
        Self { deny_lists }
    }

    /// Returns the first forbidden substring found in `code`, or `None` when
    /// the submission is admissible. Languages without a deny-list admit
    /// everything; the executor registry is the gate for unknown languages.
    pub fn find_forbidden(&self, language: &str, code: &str) -> Option<&str> {
        let keywords = self.deny_lists.get(&language.to_lowercase())?;
        keywords
            .iter()
            .find(|keyword| code.contains(keyword.as_str()))
            .map(|keyword| keyword.as_str())
    }
}

impl Default for SafetyScreener {
    fn default() -> Self {
        Self::new()
    }
}
