use std::sync::Arc;

use crate::services::gateway::session_bridge_service::SessionBridge;
use crate::services::languages::language_service::LangService;
use crate::services::middleware::rate_limit_service::TokenBucketLimiter;

/// Shared application state handed to every request handler.
///
/// `limiter` is optional so the router can be exercised without a Redis
/// instance; production startup always provides one.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<SessionBridge>,
    pub lang_service: Arc<LangService>,
    pub limiter: Option<Arc<TokenBucketLimiter>>,
}
