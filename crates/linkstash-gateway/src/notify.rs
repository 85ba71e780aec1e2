use async_trait::async_trait;
use jiff::Timestamp;
use linkstash_core::{BackupReason, Favorite, Notifier, NotifyError};
use std::path::PathBuf;
use tracing::info;

/// Writes each backup as a timestamped JSON export under the backups
/// directory.
///
/// Stands in for an outbound transport: the export carries the same
/// snapshot an email attachment would, named after the moment and the
/// reason it was taken.
pub struct FileExportNotifier {
    dir: PathBuf,
}

impl FileExportNotifier {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, NotifyError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            NotifyError::Transport(format!("create backup dir {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl Notifier for FileExportNotifier {
    async fn notify(
        &self,
        snapshot: &[Favorite],
        reason: BackupReason,
    ) -> Result<(), NotifyError> {
        let stamp = Timestamp::now().strftime("%Y%m%d%H%M%S").to_string();
        let tag = match reason {
            BackupReason::ExpiryMarked => "expiry",
            BackupReason::Manual => "manual",
        };
        let path = self.dir.join(format!("backup_{}_{}.json", stamp, tag));
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| NotifyError::Transport(format!("encode backup: {}", e)))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| NotifyError::Transport(format!("write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), entries = snapshot.len(), "backup exported");
        Ok(())
    }
}
