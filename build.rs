/// Build script for generating the gRPC client and server code for the
/// compiler executor protocol.
///
/// This script uses `tonic_build` to compile the Protocol Buffers definition
/// located at `src/proto/executor.proto`. The gateway itself only needs the
/// generated client, but the server side is generated too so that the
/// integration tests can stand up an in-process mock executor service.
///
/// The script also instructs Cargo to rerun the build script if the proto file
/// changes, ensuring that code generation stays up to date.
///
/// # Errors
/// Returns an error if code generation fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure().compile(&["src/proto/executor.proto"], &["src/proto"])?;

    println!("cargo:rerun-if-changed=src/proto/executor.proto");

    Ok(())
}
