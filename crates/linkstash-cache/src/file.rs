use crate::snapshot::SnapshotCache;
use crate::Result;
use async_trait::async_trait;
use linkstash_core::{CacheError, Favorite, StableKey};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Configuration for a [`FileSnapshotCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct FileCacheConfig {
    /// Directory holding one snapshot file per store key.
    pub dir: PathBuf,
    /// Freshness window: entries older than this are treated as absent.
    #[builder(default = Duration::from_secs(300))]
    pub ttl: Duration,
    /// Hygiene lifetime: idle files older than this are deleted by
    /// [`SnapshotCache::evict_idle`].
    #[builder(default = Duration::from_secs(3600))]
    pub idle_lifetime: Duration,
}

/// File-backed snapshot cache, safe for concurrent multi-process use.
///
/// One JSON document per key. The file's modification time is the freshness
/// signal, and every write is a write-temp-then-rename replace, so readers
/// never observe a half-written entry.
#[derive(Debug, Clone)]
pub struct FileSnapshotCache {
    config: FileCacheConfig,
}

impl FileSnapshotCache {
    /// Creates the cache, making sure the directory exists.
    pub async fn new(config: FileCacheConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.dir).await.map_err(|e| {
            CacheError::Io(format!(
                "create cache dir {}: {}",
                config.dir.display(),
                e
            ))
        })?;
        Ok(Self { config })
    }

    fn entry_path(&self, key: StableKey) -> PathBuf {
        self.config.dir.join(format!("snapshot_{}.json", key))
    }

    async fn age_of(path: &Path) -> Option<Duration> {
        let meta = tokio::fs::metadata(path).await.ok()?;
        let mtime = meta.modified().ok()?;
        SystemTime::now().duration_since(mtime).ok()
    }
}

#[async_trait]
impl SnapshotCache for FileSnapshotCache {
    async fn get(&self, key: StableKey) -> Result<Option<Vec<Favorite>>> {
        let path = self.entry_path(key);
        let Some(age) = Self::age_of(&path).await else {
            return Ok(None);
        };
        if age > self.config.ttl {
            debug!(%key, ?age, "snapshot entry is stale");
            return Ok(None);
        }
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io(format!("read {}: {}", path.display(), e)));
            }
        };
        let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            CacheError::Serialization(format!("decode {}: {}", path.display(), e))
        })?;
        Ok(Some(snapshot))
    }

    async fn put(&self, key: StableKey, snapshot: &[Favorite]) -> Result<()> {
        let path = self.entry_path(key);
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| CacheError::Serialization(format!("encode snapshot: {}", e)))?;

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| CacheError::Io(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CacheError::Io(format!("rename into {}: {}", path.display(), e)))?;
        Ok(())
    }

    async fn invalidate(&self, key: StableKey) -> Result<()> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn evict_idle(&self) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.config.dir).await.map_err(|e| {
            CacheError::Io(format!(
                "read cache dir {}: {}",
                self.config.dir.display(),
                e
            ))
        })?;

        let mut evicted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::Io(format!("scan cache dir: {}", e)))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // Leftover .tmp files from interrupted writes age out here too.
            if !name.starts_with("snapshot_") {
                continue;
            }
            let path = entry.path();
            let Some(age) = Self::age_of(&path).await else {
                continue;
            };
            if age > self.config.idle_lifetime {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => evicted += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to evict idle snapshot");
                    }
                }
            }
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use tempfile::tempdir;

    fn snapshot(count: usize) -> Vec<Favorite> {
        (0..count)
            .map(|i| {
                Favorite::new(
                    Timestamp::from_second(i as i64).unwrap(),
                    format!("Title {}", i),
                    format!("https://example{}.com", i),
                )
            })
            .collect()
    }

    async fn cache_with_ttl(dir: &Path, ttl: Duration) -> FileSnapshotCache {
        let config = FileCacheConfig::builder().dir(dir.to_path_buf()).ttl(ttl).build();
        FileSnapshotCache::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn put_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_secs(60)).await;
        let key = StableKey::of_text("store");
        let entries = snapshot(3);

        cache.put(key, &entries).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), Some(entries));
    }

    #[tokio::test]
    async fn missing_entry_is_none() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_secs(60)).await;
        assert_eq!(cache.get(StableKey::of_text("nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_entry_is_none() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_millis(50)).await;
        let key = StableKey::of_text("store");

        cache.put(key, &snapshot(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_do_not_collide() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_secs(60)).await;

        cache.put(StableKey::of_text("a"), &snapshot(1)).await.unwrap();
        cache.put(StableKey::of_text("b"), &snapshot(2)).await.unwrap();

        assert_eq!(cache.get(StableKey::of_text("a")).await.unwrap().unwrap().len(), 1);
        assert_eq!(cache.get(StableKey::of_text("b")).await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_secs(60)).await;
        let key = StableKey::of_text("store");

        cache.put(key, &snapshot(1)).await.unwrap();
        cache.invalidate(key).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);

        // Absent key is not an error.
        cache.invalidate(key).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_entry_surfaces_a_serialization_error() {
        let dir = tempdir().unwrap();
        let cache = cache_with_ttl(dir.path(), Duration::from_secs(60)).await;
        let key = StableKey::of_text("store");

        tokio::fs::write(cache.entry_path(key), b"not json")
            .await
            .unwrap();

        let err = cache.get(key).await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[tokio::test]
    async fn evict_idle_removes_old_entries_only() {
        let dir = tempdir().unwrap();
        let config = FileCacheConfig::builder()
            .dir(dir.path().to_path_buf())
            .ttl(Duration::from_secs(60))
            .idle_lifetime(Duration::from_millis(50))
            .build();
        let cache = FileSnapshotCache::new(config).await.unwrap();

        cache.put(StableKey::of_text("old"), &snapshot(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        cache.put(StableKey::of_text("fresh"), &snapshot(1)).await.unwrap();

        let evicted = cache.evict_idle().await.unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.get(StableKey::of_text("fresh")).await.unwrap().is_some());
    }
}
