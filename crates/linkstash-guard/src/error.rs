use thiserror::Error;

/// Result type for guard-state operations.
pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Debug, Clone, Error)]
pub enum GuardError {
    #[error("guard state persistence failed: {0}")]
    Persistence(String),
}
