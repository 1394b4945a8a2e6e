use thiserror::Error;

/// Error taxonomy for the gateway.
///
/// Transport errors terminate the scope that produced them (stream or
/// session); protocol and policy errors are reported to the client and the
/// session continues; an unsafe-code rejection terminates the whole session.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] axum::Error),

    #[error("websocket write timed out")]
    WriteTimeout,

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gRPC stream error: {0}")]
    Upstream(#[from] tonic::Status),

    #[error("execution stream is gone")]
    StreamGone,

    #[error("dangerous script detected")]
    UnsafeCode,

    #[error("language name cannot be empty")]
    EmptyLanguageName,

    #[error("{0} already exists")]
    LanguageExists(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("rate limiter error: {0}")]
    RateLimiter(#[from] redis::RedisError),
}
