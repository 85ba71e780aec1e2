use async_trait::async_trait;
use linkstash_core::{BackupReason, Favorite, Notifier, NotifyError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Notifier double that records every invocation.
#[derive(Clone, Default)]
pub struct CapturingNotifier {
    calls: Arc<Mutex<Vec<(Vec<Favorite>, BackupReason)>>>,
}

impl CapturingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Vec<Favorite>, BackupReason)> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(
        &self,
        snapshot: &[Favorite],
        reason: BackupReason,
    ) -> Result<(), NotifyError> {
        self.calls.lock().push((snapshot.to_vec(), reason));
        Ok(())
    }
}

/// Notifier double that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(
        &self,
        _snapshot: &[Favorite],
        _reason: BackupReason,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("transport is down".to_string()))
    }
}
