use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models::language_models;
use crate::services::http::language_handler_service::{self, create_language, get_all_languages};
use crate::services::http::ws_handler_service::handle_websocket;
use crate::services::middleware::rate_limit_service::rate_limit;
use crate::state::AppState;

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Online Compiler API",
        description = "API for managing programming languages and compiling code"
    ),
    paths(
        language_handler_service::get_all_languages,
        language_handler_service::create_language,
    ),
    components(schemas(
        language_models::CreateLanguageRequest,
        language_models::CreatedLanguageResponse,
        language_models::ErrorResponse,
    ))
)]
struct ApiDoc;

/// Builds the full application router: rate-limited `/api/v1` group, Swagger
/// UI, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/execute", get(handle_websocket))
        .route("/languages", get(get_all_languages))
        .route("/create", post(create_language))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the router until SIGINT/SIGTERM, then drains connections for up to
/// [`SHUTDOWN_GRACE`] before returning.
pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "starting API gateway");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_token.cancel();
    });

    let drain_token = shutdown.clone();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .into_future();

    tokio::select! {
        result = server => result.context("server error")?,
        _ = async {
            drain_token.cancelled().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => {
            warn!("shutdown grace period elapsed, dropping remaining connections");
        }
    }

    info!("API gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
