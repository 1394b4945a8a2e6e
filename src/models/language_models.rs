use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/v1/create`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLanguageRequest {
    pub name: String,
}

/// Body returned when a language was created.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedLanguageResponse {
    pub name: String,
}

/// Generic error body for the catalog endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
