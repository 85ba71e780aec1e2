use async_trait::async_trait;
use linkstash_core::{ExclusiveLock, LockGuard, StoreError};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::Mutex;
use tracing::warn;

/// Exclusive lock backed by a lock file next to the store's backing file.
///
/// Acquisition creates the file with `create_new`; whoever wins the create
/// holds the lock until its guard drops and removes the file again. Lock
/// files whose mtime is older than `stale_after` are treated as leftovers
/// from a crashed writer and broken.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
    stale_after: Duration,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            poll_interval: Duration::from_millis(25),
            stale_after: Duration::from_secs(60),
        }
    }

    /// Overrides the age at which an abandoned lock file is broken. Must be
    /// far above any legitimate lock hold time.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    async fn try_create(&self) -> Result<bool, StoreError> {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StoreError::Persistence(format!(
                "create lock file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn break_if_stale(&self) {
        let Ok(meta) = tokio::fs::metadata(&self.path).await else {
            return;
        };
        let Ok(mtime) = meta.modified() else {
            return;
        };
        let Ok(age) = SystemTime::now().duration_since(mtime) else {
            return;
        };
        if age > self.stale_after {
            warn!(path = %self.path.display(), ?age, "breaking stale lock file");
            let _ = tokio::fs::remove_file(&self.path).await;
        }
    }
}

struct FileLockState {
    path: PathBuf,
}

impl Drop for FileLockState {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[async_trait]
impl ExclusiveLock for FileLock {
    async fn acquire(&self) -> Result<LockGuard, StoreError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.try_create().await? {
                return Ok(LockGuard::new(FileLockState {
                    path: self.path.clone(),
                }));
            }
            self.break_if_stale().await;
            if Instant::now() >= deadline {
                return Err(StoreError::LockUnavailable(format!(
                    "timed out after {:?} waiting for {}",
                    self.timeout,
                    self.path.display()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Exclusive lock for single-process deployments, backed by a tokio mutex.
#[derive(Debug, Clone)]
pub struct LocalLock {
    inner: Arc<Mutex<()>>,
    timeout: Duration,
}

impl LocalLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(())),
            timeout,
        }
    }
}

#[async_trait]
impl ExclusiveLock for LocalLock {
    async fn acquire(&self) -> Result<LockGuard, StoreError> {
        match tokio::time::timeout(self.timeout, Arc::clone(&self.inner).lock_owned()).await {
            Ok(guard) => Ok(LockGuard::new(guard)),
            Err(_) => Err(StoreError::LockUnavailable(format!(
                "timed out after {:?} waiting for in-process lock",
                self.timeout
            ))),
        }
    }
}
