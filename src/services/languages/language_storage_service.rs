use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::error_models::GatewayError;

/// JSON-array-on-disk persistence for the language catalog. All access goes
/// through one mutex, so concurrent CRUD requests cannot interleave their
/// read-modify-write cycles.
pub struct LangStorage {
    file_path: PathBuf,
    lock: Mutex<()>,
}

impl LangStorage {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates the storage file (and its parent directory) with an empty
    /// array when it does not exist yet.
    pub async fn ensure_exists(&self) -> Result<(), GatewayError> {
        let _guard = self.lock.lock().await;
        if fs::try_exists(&self.file_path).await? {
            return Ok(());
        }
        info!(path = %self.file_path.display(), "creating language storage file");
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.file_path, b"[]").await?;
        Ok(())
    }

    pub async fn languages(&self) -> Result<Vec<String>, GatewayError> {
        let _guard = self.lock.lock().await;
        read_languages(&self.file_path).await
    }

    pub async fn add_language(&self, language: &str) -> Result<(), GatewayError> {
        let _guard = self.lock.lock().await;
        let mut languages = read_languages(&self.file_path).await?;
        languages.push(language.to_string());
        let data = serde_json::to_vec_pretty(&languages)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}

async fn read_languages(path: &Path) -> Result<Vec<String>, GatewayError> {
    let data = fs::read(path).await?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&data)?)
}
