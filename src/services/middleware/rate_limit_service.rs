use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};

use crate::config::RateLimiterConfig;
use crate::models::error_models::GatewayError;
use crate::models::language_models::ErrorResponse;
use crate::state::AppState;
use crate::utils::helper_utils::client_ip;

/// Token bucket per client IP, persisted in Redis so every gateway replica
/// sees the same budget. Bucket state is a small hash with a TTL; an idle
/// client's bucket expires and refills implicitly.
pub struct TokenBucketLimiter {
    client: redis::Client,
    max_tokens: f64,
    refill_rate: f64,
    window_secs: i64,
}

impl TokenBucketLimiter {
    pub fn new(client: redis::Client, config: &RateLimiterConfig) -> Self {
        Self {
            client,
            max_tokens: f64::from(config.max_tokens),
            refill_rate: config.refill_rate,
            window_secs: config.window.as_secs() as i64,
        }
    }

    /// Takes one token from `client_ip`'s bucket. Returns whether the
    /// request may proceed.
    pub async fn allow_request(&self, client_ip: &str) -> Result<bool, GatewayError> {
        let mut conn = self.client.get_async_connection().await?;
        let key = format!("ratelimit:{client_ip}");
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();

        let (tokens, updated_at): (Option<f64>, Option<f64>) = redis::cmd("HMGET")
            .arg(&key)
            .arg("tokens")
            .arg("updated_at")
            .query_async(&mut conn)
            .await?;

        let tokens = refill(
            tokens.unwrap_or(self.max_tokens),
            now - updated_at.unwrap_or(now),
            self.refill_rate,
            self.max_tokens,
        );

        let (allowed, tokens) = if tokens >= 1.0 {
            (true, tokens - 1.0)
        } else {
            (false, tokens)
        };

        redis::cmd("HSET")
            .arg(&key)
            .arg("tokens")
            .arg(tokens)
            .arg("updated_at")
            .arg(now)
            .query_async::<_, ()>(&mut conn)
            .await?;
        redis::cmd("EXPIRE")
            .arg(&key)
            .arg(self.window_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(allowed)
    }
}

/// Tokens available after `elapsed` seconds of refill, clamped to the bucket
/// capacity.
fn refill(tokens: f64, elapsed: f64, refill_rate: f64, max_tokens: f64) -> f64 {
    (tokens + elapsed.max(0.0) * refill_rate).min(max_tokens)
}

/// Rate-limit middleware for the `/api/v1` route group. Applies to the HTTP
/// request that carries the WebSocket upgrade, but not to frames exchanged
/// after the upgrade.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = &state.limiter else {
        return next.run(request).await;
    };

    let ip = client_ip(request.headers(), peer);
    if ip.is_empty() {
        warn!(path = %request.uri().path(), "unable to determine client IP");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Access forbidden")),
        )
            .into_response();
    }

    match limiter.allow_request(&ip).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            info!(%ip, path = %request.uri().path(), "request rejected by rate limiter");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::new("Rate limit exceeded")),
            )
                .into_response()
        }
        Err(err) => {
            error!(%ip, error = %err, "rate limiter error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Rate limiter error")),
            )
                .into_response()
        }
    }
}
