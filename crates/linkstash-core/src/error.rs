use thiserror::Error;

/// Result type for favorites-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("url host is blacklisted: {0}")]
    Blacklisted(String),
    #[error("url is already saved: {0}")]
    Duplicate(String),
    #[error("store lock unavailable: {0}")]
    LockUnavailable(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("notification failed: {0}")]
    Notification(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache io failed: {0}")]
    Io(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}
