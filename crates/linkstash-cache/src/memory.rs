use crate::snapshot::SnapshotCache;
use crate::Result;
use async_trait::async_trait;
use linkstash_core::{Favorite, StableKey};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// In-memory snapshot cache for single-process deployments.
///
/// Backed by Moka with a time-to-live matching the file variant's freshness
/// window. Moka handles its own eviction, so `evict_idle` has nothing to do.
#[derive(Debug, Clone)]
pub struct MokaSnapshotCache {
    cache: Cache<StableKey, Arc<Vec<Favorite>>>,
}

impl MokaSnapshotCache {
    /// Creates a cache with the given freshness window.
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(64, ttl)
    }

    /// Creates a cache bounded to `max_capacity` stores.
    pub fn with_capacity(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl SnapshotCache for MokaSnapshotCache {
    async fn get(&self, key: StableKey) -> Result<Option<Vec<Favorite>>> {
        Ok(self.cache.get(&key).await.map(|s| s.as_ref().clone()))
    }

    async fn put(&self, key: StableKey, snapshot: &[Favorite]) -> Result<()> {
        self.cache.insert(key, Arc::new(snapshot.to_vec())).await;
        Ok(())
    }

    async fn invalidate(&self, key: StableKey) -> Result<()> {
        self.cache.invalidate(&key).await;
        Ok(())
    }

    async fn evict_idle(&self) -> Result<usize> {
        Ok(0)
    }
}
