use linkstash_cache::FileSnapshotCache;
use linkstash_core::{Blacklist, Notifier};
use linkstash_guard::{IntrusionLog, RateLimiter};
use linkstash_store::FavoritesStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared context handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FavoritesStore<FileSnapshotCache>>,
    /// The same cache instance the store writes through; held here for the
    /// inline hygiene sweep.
    pub cache: Arc<FileSnapshotCache>,
    pub limiter: Arc<RateLimiter>,
    pub proxy_limiter: Arc<RateLimiter>,
    pub intrusion_log: Arc<IntrusionLog>,
    pub blacklist: Arc<Blacklist>,
    pub notifier: Arc<dyn Notifier>,
    pub secret: Arc<str>,
    pub page_size: usize,
    /// Directory the proxy endpoint serves allowlisted files from.
    pub data_dir: PathBuf,
}
