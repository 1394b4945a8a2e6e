use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use compiler_gateway::config::Config;
use compiler_gateway::services::gateway::executor_registry_service::ExecutorRegistry;
use compiler_gateway::services::gateway::screening_service::SafetyScreener;
use compiler_gateway::services::gateway::session_bridge_service::SessionBridge;
use compiler_gateway::services::http::router_service::{build_router, serve};
use compiler_gateway::services::languages::language_service::LangService;
use compiler_gateway::services::languages::language_storage_service::LangStorage;
use compiler_gateway::services::middleware::rate_limit_service::TokenBucketLimiter;
use compiler_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(&config.logs_file_path).context("failed to initialize logging")?;
    info!(port = config.gateway_port, "loaded configuration");

    let storage = LangStorage::new(&config.lang_storage_file_path);
    storage
        .ensure_exists()
        .await
        .context("failed to open language storage")?;
    let lang_service = Arc::new(LangService::new(storage));

    let registry = Arc::new(
        ExecutorRegistry::from_config(&config).context("failed to build executor registry")?,
    );
    let screener = Arc::new(SafetyScreener::new());
    let bridge = Arc::new(SessionBridge::new(registry, screener));

    let redis_client =
        redis::Client::open(config.redis.url()).context("invalid redis configuration")?;
    let limiter = Arc::new(TokenBucketLimiter::new(
        redis_client,
        &config.rate_limiter,
    ));

    let state = AppState {
        bridge,
        lang_service,
        limiter: Some(limiter),
    };

    serve(build_router(state), config.gateway_port).await
}

/// Structured logging to stdout and the configured log file.
fn init_tracing(logs_file_path: &str) -> anyhow::Result<()> {
    let path = Path::new(logs_file_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(Arc::new(file)))
        .init();
    Ok(())
}
