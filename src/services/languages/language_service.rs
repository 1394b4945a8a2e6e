use tracing::{error, info};

use crate::models::error_models::GatewayError;
use crate::services::languages::language_storage_service::LangStorage;

/// Catalog CRUD over [`LangStorage`]. This catalog is presentation data for
/// clients; the executor registry alone decides which languages can actually
/// run.
pub struct LangService {
    storage: LangStorage,
}

impl LangService {
    pub fn new(storage: LangStorage) -> Self {
        Self { storage }
    }

    pub async fn get_all_languages(&self) -> Result<Vec<String>, GatewayError> {
        let languages = self.storage.languages().await;
        if let Err(err) = &languages {
            error!(error = %err, "failed to fetch all languages");
        }
        languages
    }

    pub async fn create_language(&self, name: &str) -> Result<(), GatewayError> {
        if name.is_empty() {
            return Err(GatewayError::EmptyLanguageName);
        }
        let languages = self.storage.languages().await?;
        if languages.iter().any(|existing| existing == name) {
            return Err(GatewayError::LanguageExists(name.to_string()));
        }
        self.storage.add_language(name).await?;
        info!(language = %name, "added new language");
        Ok(())
    }
}
