use crate::favorite::Favorite;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Why a backup notification is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupReason {
    /// A sweep just marked at least one favorite for deletion; the snapshot
    /// is the backup window before the purge.
    ExpiryMarked,
    /// The user requested an export.
    Manual,
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Delivery capability for store backups.
///
/// The store never knows the transport; it hands over the persisted snapshot
/// and the reason.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(
        &self,
        snapshot: &[Favorite],
        reason: BackupReason,
    ) -> Result<(), NotifyError>;
}

/// Notifier that records the request in the log and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        snapshot: &[Favorite],
        reason: BackupReason,
    ) -> Result<(), NotifyError> {
        info!(entries = snapshot.len(), ?reason, "backup notification requested");
        Ok(())
    }
}
