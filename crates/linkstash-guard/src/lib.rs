//! Abuse controls for the linkstash gateway: the per-client rate limiter
//! and the intrusion log.

pub mod error;
pub mod intrusion;
pub mod limiter;

pub use error::{GuardError, Result};
pub use intrusion::{IntrusionAttempt, IntrusionLog, IntrusionRecord};
pub use limiter::{RateLimitConfig, RateLimitCounter, RateLimiter};
