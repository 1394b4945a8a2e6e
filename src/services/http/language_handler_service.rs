use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use crate::models::error_models::GatewayError;
use crate::models::language_models::{CreateLanguageRequest, CreatedLanguageResponse, ErrorResponse};
use crate::state::AppState;

/// Retrieve all programming languages in the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/languages",
    tag = "languages",
    responses(
        (status = 200, description = "List of languages", body = [String]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn get_all_languages(State(state): State<AppState>) -> Response {
    match state.lang_service.get_all_languages().await {
        Ok(languages) => {
            info!(count = languages.len(), "retrieved all languages");
            (StatusCode::OK, Json(languages)).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
    }
}

/// Add a new programming language to the catalog.
#[utoipa::path(
    post,
    path = "/api/v1/create",
    tag = "languages",
    request_body = CreateLanguageRequest,
    responses(
        (status = 201, description = "Language created", body = CreatedLanguageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 409, description = "Language already exists", body = ErrorResponse),
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    payload: Result<Json<CreateLanguageRequest>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid request body")),
        )
            .into_response();
    };

    match state.lang_service.create_language(&request.name).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(CreatedLanguageResponse { name: request.name }),
        )
            .into_response(),
        Err(err @ GatewayError::EmptyLanguageName) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
        Err(err @ GatewayError::LanguageExists(_)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, language = %request.name, "failed to add language");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response()
        }
    }
}
