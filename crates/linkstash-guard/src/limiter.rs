use crate::error::{GuardError, Result};
use jiff::Timestamp;
use linkstash_core::{Clock, StableKey};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Persisted per-client counter for one rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    pub window_start: Timestamp,
    pub requests: u32,
}

/// Configuration for a [`RateLimiter`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RateLimitConfig {
    /// Directory holding one counter file per client key.
    pub dir: PathBuf,
    /// Requests allowed per window.
    #[builder(default = 50)]
    pub max_requests: u32,
    /// Rolling window length in seconds.
    #[builder(default = 60)]
    pub window_secs: i64,
    /// Hygiene lifetime for idle counter files.
    #[builder(default = Duration::from_secs(3600))]
    pub idle_lifetime: Duration,
}

/// Per-client sliding-window request counter, persisted per key.
///
/// The window rolls relative to its own start: once `now - window_start`
/// reaches the window length the counter resets to one, otherwise it
/// increments — past the threshold too, so sustained abuse keeps counting.
/// State lives in one JSON file per key and survives across processes.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates the limiter, making sure the state directory exists.
    pub async fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        tokio::fs::create_dir_all(&config.dir).await.map_err(|e| {
            GuardError::Persistence(format!(
                "create guard dir {}: {}",
                config.dir.display(),
                e
            ))
        })?;
        Ok(Self { config, clock })
    }

    /// True when the request should proceed.
    pub async fn allow(&self, key: &str) -> Result<bool> {
        let path = self.counter_path(key);
        let now = self.clock.now();
        let mut counter = match self.read_counter(&path).await {
            Some(counter) => counter,
            None => RateLimitCounter {
                window_start: now,
                requests: 0,
            },
        };

        let allowed = if now.as_second() - counter.window_start.as_second()
            >= self.config.window_secs
        {
            counter = RateLimitCounter {
                window_start: now,
                requests: 1,
            };
            true
        } else {
            counter.requests = counter.requests.saturating_add(1);
            counter.requests <= self.config.max_requests
        };

        self.write_counter(&path, &counter).await?;
        if !allowed {
            debug!(key, requests = counter.requests, "rate limit exceeded");
        }
        Ok(allowed)
    }

    /// Drops counter files idle beyond the hygiene lifetime. Returns the
    /// count.
    pub async fn evict_idle(&self) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.config.dir).await.map_err(|e| {
            GuardError::Persistence(format!(
                "read guard dir {}: {}",
                self.config.dir.display(),
                e
            ))
        })?;

        let mut evicted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GuardError::Persistence(format!("scan guard dir: {}", e)))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with("rate_limit_") {
                continue;
            }
            let path = entry.path();
            let Some(age) = age_of(&path).await else {
                continue;
            };
            if age > self.config.idle_lifetime {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => evicted += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to evict idle counter");
                    }
                }
            }
        }
        Ok(evicted)
    }

    fn counter_path(&self, key: &str) -> PathBuf {
        self.config
            .dir
            .join(format!("rate_limit_{}.json", StableKey::of_text(key)))
    }

    async fn read_counter(&self, path: &Path) -> Option<RateLimitCounter> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read rate-limit counter");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(counter) => Some(counter),
            // A broken counter costs one fresh window, nothing more.
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed rate-limit counter");
                None
            }
        }
    }

    async fn write_counter(&self, path: &Path, counter: &RateLimitCounter) -> Result<()> {
        let bytes = serde_json::to_vec(counter)
            .map_err(|e| GuardError::Persistence(format!("encode counter: {}", e)))?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| GuardError::Persistence(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| {
                GuardError::Persistence(format!("rename into {}: {}", path.display(), e))
            })?;
        Ok(())
    }
}

async fn age_of(path: &Path) -> Option<Duration> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    let mtime = meta.modified().ok()?;
    SystemTime::now().duration_since(mtime).ok()
}
