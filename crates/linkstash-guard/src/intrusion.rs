use crate::error::{GuardError, Result};
use jiff::Timestamp;
use linkstash_core::clock::truncate_to_second;
use linkstash_core::Clock;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// One rejected authentication attempt, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrusionRecord {
    pub timestamp: Timestamp,
    pub session_id: String,
    pub ip_address: String,
    pub used_secret: String,
    pub submitted_title: String,
    pub submitted_url: String,
}

/// The fields of an attempt as seen at the boundary; the log stamps the
/// time.
#[derive(Debug, Clone, Default)]
pub struct IntrusionAttempt {
    pub session_id: String,
    pub ip_address: String,
    pub used_secret: String,
    pub submitted_title: String,
    pub submitted_url: String,
}

/// Append-only record of rejected authentication attempts.
///
/// Appends are best-effort: persistence failures are logged and never fail
/// the request that triggered them. The log is never pruned here.
pub struct IntrusionLog {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl IntrusionLog {
    /// Opens the log, creating an empty file (mode 0600 on Unix) if none
    /// exists yet.
    pub async fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    GuardError::Persistence(format!(
                        "create log dir {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        create_if_missing(&path, b"[]").await?;
        Ok(Self { path, clock })
    }

    /// Appends one entry. Never fails the caller; a persistence problem is
    /// reported through the log instead.
    pub async fn record(&self, attempt: IntrusionAttempt) {
        if let Err(e) = self.try_record(attempt).await {
            warn!(error = %e, "intrusion log append failed");
        }
    }

    /// Current contents; a missing file reads as empty.
    pub async fn entries(&self) -> Result<Vec<IntrusionRecord>> {
        self.read_all().await
    }

    async fn try_record(&self, attempt: IntrusionAttempt) -> Result<()> {
        // A malformed log aborts the append rather than clobbering the
        // existing evidence.
        let mut records = self.read_all().await?;
        records.push(IntrusionRecord {
            timestamp: truncate_to_second(self.clock.now()),
            session_id: attempt.session_id,
            ip_address: attempt.ip_address,
            used_secret: attempt.used_secret,
            submitted_title: attempt.submitted_title,
            submitted_url: attempt.submitted_url,
        });
        let bytes = serde_json::to_vec_pretty(&records)
            .map_err(|e| GuardError::Persistence(format!("encode intrusion log: {}", e)))?;
        write_atomic(&self.path, &bytes).await
    }

    async fn read_all(&self) -> Result<Vec<IntrusionRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(GuardError::Persistence(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            GuardError::Persistence(format!("decode {}: {}", self.path.display(), e))
        })
    }
}

async fn create_if_missing(path: &Path, default_content: &[u8]) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    match options.open(path).await {
        Ok(mut file) => {
            use tokio::io::AsyncWriteExt;
            file.write_all(default_content).await.map_err(|e| {
                GuardError::Persistence(format!("initialize {}: {}", path.display(), e))
            })?;
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(GuardError::Persistence(format!(
            "create {}: {}",
            path.display(),
            e
        ))),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| GuardError::Persistence(format!("write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| GuardError::Persistence(format!("rename into {}: {}", path.display(), e)))?;
    Ok(())
}
