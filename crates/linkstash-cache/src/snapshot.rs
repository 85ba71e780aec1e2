use crate::Result;
use async_trait::async_trait;
use linkstash_core::{Favorite, StableKey};
use std::future::Future;

/// A time-bounded snapshot cache of a store's decoded contents.
///
/// Entries are keyed by the store's [`StableKey`] so multiple stores can
/// share one cache. Freshness is bounded by the implementation's TTL;
/// `evict_idle` is the separate hygiene sweep for entries nothing has
/// touched in a long while.
#[async_trait]
pub trait SnapshotCache: Send + Sync + 'static {
    /// Returns a fresh snapshot, or `None` when absent or stale.
    async fn get(&self, key: StableKey) -> Result<Option<Vec<Favorite>>>;

    /// Stores a snapshot, replacing any previous entry atomically.
    async fn put(&self, key: StableKey, snapshot: &[Favorite]) -> Result<()>;

    /// Removes the entry for `key`. Not an error if the key is absent.
    async fn invalidate(&self, key: StableKey) -> Result<()>;

    /// Drops entries idle beyond the hygiene lifetime. Returns the count.
    async fn evict_idle(&self) -> Result<usize>;

    /// Returns a fresh snapshot, loading and backfilling on a miss.
    async fn get_or_load<F, Fut>(&self, key: StableKey, load: F) -> Result<Vec<Favorite>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Vec<Favorite>>> + Send,
    {
        match self.get(key).await? {
            Some(snapshot) => Ok(snapshot),
            None => {
                let snapshot = load().await?;
                self.put(key, &snapshot).await?;
                Ok(snapshot)
            }
        }
    }
}
