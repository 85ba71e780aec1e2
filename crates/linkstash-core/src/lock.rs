use crate::error::StoreError;
use async_trait::async_trait;
use std::any::Any;

/// RAII guard for a held exclusive lock. Dropping it releases the lock.
pub struct LockGuard {
    _state: Box<dyn Any + Send>,
}

impl LockGuard {
    /// Wraps implementation-specific state whose `Drop` releases the lock.
    pub fn new(state: impl Any + Send) -> Self {
        Self {
            _state: Box::new(state),
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// Mutual exclusion over a store's read-modify-write cycle.
///
/// Implementations must bound the wait and surface
/// [`StoreError::LockUnavailable`] on timeout rather than hang.
#[async_trait]
pub trait ExclusiveLock: Send + Sync + 'static {
    /// Acquires the lock, waiting up to the implementation's timeout.
    async fn acquire(&self) -> Result<LockGuard, StoreError>;
}
