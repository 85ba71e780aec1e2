mod health;
mod links;
mod proxy;

pub use health::health_handler;
pub use links::{links_handler, LinksParams};
pub use proxy::proxy_handler;

use crate::error::AppError;
use crate::state::AppState;
use linkstash_guard::{IntrusionAttempt, RateLimiter};
use tracing::warn;

/// Checks the shared secret; a mismatch is recorded to the intrusion log
/// before the request is rejected.
pub(crate) async fn authorize(
    state: &AppState,
    provided: Option<&str>,
    attempt: IntrusionAttempt,
) -> Result<(), AppError> {
    if provided == Some(state.secret.as_ref()) {
        return Ok(());
    }
    state.intrusion_log.record(attempt).await;
    Err(AppError::Unauthorized)
}

/// Consults the limiter for `key`. A broken guard directory fails open: the
/// request proceeds and the failure is logged loudly.
pub(crate) async fn check_rate_limit(
    limiter: &RateLimiter,
    key: &str,
    retry_after_secs: u32,
) -> Result<(), AppError> {
    match limiter.allow(key).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::RateLimited { retry_after_secs }),
        Err(e) => {
            warn!(error = %e, "rate limiter unavailable, failing open");
            Ok(())
        }
    }
}
