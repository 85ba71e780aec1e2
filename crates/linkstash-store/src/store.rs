use jiff::SignedDuration;
use linkstash_cache::SnapshotCache;
use linkstash_core::clock::truncate_to_second;
use linkstash_core::{
    filter_by_search, paginate, sanitize_title, validate_url, BackupReason, Blacklist, Clock,
    ExclusiveLock, Favorite, ListQuery, Notifier, Page, Result, SortOrder, StableKey, StoreError,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

const SECONDS_PER_DAY: i64 = 86_400;

/// Configuration for a [`FavoritesStore`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreConfig {
    /// Path of the JSON backing file.
    pub path: PathBuf,
    /// Maximum title length after sanitization.
    #[builder(default = 200)]
    pub max_title_length: usize,
    /// Age in days after which a favorite is marked for deletion.
    #[builder(default = 365)]
    pub retention_days: i64,
    /// Grace window in days between marking and purging.
    #[builder(default = 7)]
    pub grace_days: i64,
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    /// Entries newly marked for deletion this sweep.
    pub marked: usize,
    /// Entries purged because their grace window elapsed.
    pub purged: usize,
    /// Whether the backup notification went out.
    pub notified: bool,
}

/// The JSON-file-backed favorites store.
///
/// The store is the sole writer of its backing file. Every mutation runs a
/// full read-modify-write under the injected exclusive lock and persists via
/// an atomic write-temp-then-rename; reads go through the snapshot cache and
/// never block on the lock.
pub struct FavoritesStore<C> {
    config: StoreConfig,
    key: StableKey,
    lock: Arc<dyn ExclusiveLock>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C: SnapshotCache> FavoritesStore<C> {
    /// Opens the store, creating an empty backing file (mode 0600 on Unix)
    /// if none exists yet.
    pub async fn new(
        config: StoreConfig,
        lock: Arc<dyn ExclusiveLock>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::Persistence(format!(
                        "create store dir {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        create_if_missing(&config.path, b"[]").await?;
        let key = StableKey::of_path(&config.path);
        Ok(Self {
            config,
            key,
            lock,
            cache,
            clock,
        })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The cache key derived from the backing file identity.
    pub fn key(&self) -> StableKey {
        self.key
    }

    /// Returns all current favorites in the requested order.
    pub async fn list(&self, order: SortOrder) -> Result<Vec<Favorite>> {
        let mut favorites = self.load().await?;
        if order == SortOrder::Desc {
            favorites.reverse();
        }
        Ok(favorites)
    }

    /// Validates and appends a new favorite.
    ///
    /// Rejects blacklisted hosts and exact (case-sensitive) url duplicates.
    /// The duplicate check runs against a fresh read of the backing file
    /// under the lock, not the cache.
    pub async fn add(&self, url: &str, title: &str, blacklist: &Blacklist) -> Result<Favorite> {
        let parsed = validate_url(url)?;
        let title = sanitize_title(title, self.config.max_title_length)?;
        if blacklist.is_blacklisted(&parsed) {
            return Err(StoreError::Blacklisted(
                parsed.host_str().unwrap_or_default().to_string(),
            ));
        }

        let _guard = self.lock.acquire().await?;
        let mut favorites = self.read_backing().await?;
        if favorites.iter().any(|f| f.url == url) {
            return Err(StoreError::Duplicate(url.to_string()));
        }
        let favorite = Favorite::new(self.clock.now(), title, url);
        favorites.push(favorite.clone());
        self.persist(&favorites).await?;
        info!(url, "favorite added");
        Ok(favorite)
    }

    /// Removes every favorite whose url matches exactly. Idempotent; returns
    /// the removed count.
    pub async fn delete(&self, url: &str) -> Result<usize> {
        let _guard = self.lock.acquire().await?;
        let favorites = self.read_backing().await?;
        let before = favorites.len();
        let retained: Vec<Favorite> = favorites.into_iter().filter(|f| f.url != url).collect();
        let removed = before - retained.len();
        self.persist(&retained).await?;
        if removed > 0 {
            info!(url, removed, "favorite deleted");
        }
        Ok(removed)
    }

    /// Runs the retention pass: marks favorites older than the retention
    /// window for deletion (once), purges favorites whose grace window has
    /// elapsed, and persists the result unconditionally.
    ///
    /// When at least one entry was newly marked, `notifier` fires exactly
    /// once with the persisted snapshot; a notification failure is logged
    /// and does not fail the sweep.
    pub async fn sweep(&self, notifier: &dyn Notifier) -> Result<SweepOutcome> {
        let retention_secs = self.config.retention_days * SECONDS_PER_DAY;
        let grace = SignedDuration::from_secs(self.config.grace_days * SECONDS_PER_DAY);

        let _guard = self.lock.acquire().await?;
        let favorites = self.read_backing().await?;
        let now = self.clock.now();

        let mut outcome = SweepOutcome::default();
        let mut retained = Vec::with_capacity(favorites.len());
        for mut favorite in favorites {
            match favorite.delete_at {
                Some(due) if now >= due => {
                    outcome.purged += 1;
                    continue;
                }
                Some(_) => {}
                None => {
                    let age_secs = now.as_second() - favorite.timestamp.as_second();
                    if age_secs > retention_secs {
                        favorite.delete_at = Some(truncate_to_second(now) + grace);
                        outcome.marked += 1;
                    }
                }
            }
            retained.push(favorite);
        }

        // Unconditional persist: the sweep doubles as a compaction point.
        self.persist(&retained).await?;

        if outcome.marked > 0 {
            match notifier.notify(&retained, BackupReason::ExpiryMarked).await {
                Ok(()) => outcome.notified = true,
                Err(e) => warn!(error = %e, "expiry backup notification failed"),
            }
            info!(
                marked = outcome.marked,
                purged = outcome.purged,
                "retention sweep marked entries"
            );
        } else if outcome.purged > 0 {
            info!(purged = outcome.purged, "retention sweep purged entries");
        }
        Ok(outcome)
    }

    /// Manual export: notifies with the current snapshot. A failed delivery
    /// surfaces to the caller.
    pub async fn backup(&self, notifier: &dyn Notifier) -> Result<()> {
        let snapshot = self.load().await?;
        notifier
            .notify(&snapshot, BackupReason::Manual)
            .await
            .map_err(|e| StoreError::Notification(e.to_string()))
    }

    /// List, search, and paginate composed into one call.
    pub async fn query(&self, query: &ListQuery) -> Result<Page> {
        let favorites = self.list(query.sort).await?;
        let favorites = match &query.search {
            Some(needle) => filter_by_search(favorites, needle),
            None => favorites,
        };
        Ok(paginate(favorites, query.page, query.page_size))
    }

    /// Reads through the snapshot cache, falling back to the backing file.
    async fn load(&self) -> Result<Vec<Favorite>> {
        match self.cache.get(self.key).await {
            Ok(Some(snapshot)) => return Ok(snapshot),
            Ok(None) => {}
            // A broken cache entry degrades to a reload of the backing file.
            Err(e) => warn!(error = %e, "snapshot cache read failed"),
        }
        let snapshot = self.read_backing().await?;
        if let Err(e) = self.cache.put(self.key, &snapshot).await {
            warn!(error = %e, "snapshot cache refresh failed");
        }
        Ok(snapshot)
    }

    async fn read_backing(&self) -> Result<Vec<Favorite>> {
        let bytes = match tokio::fs::read(&self.config.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Persistence(format!(
                    "read {}: {}",
                    self.config.path.display(),
                    e
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        // A malformed backing file is a loud error; treating it as empty
        // would discard the whole collection on the next write.
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Persistence(format!(
                "decode {}: {}",
                self.config.path.display(),
                e
            ))
        })
    }

    async fn persist(&self, favorites: &[Favorite]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(favorites)
            .map_err(|e| StoreError::Persistence(format!("encode favorites: {}", e)))?;
        write_atomic(&self.config.path, &bytes).await?;
        // Write-through: the next read within the TTL window sees this state.
        if let Err(e) = self.cache.put(self.key, favorites).await {
            warn!(error = %e, "snapshot cache write-through failed");
        }
        Ok(())
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
                StoreError::Persistence(format!("initialize {}: {}", path.display(), e))
            })?;
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(StoreError::Persistence(format!(
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
        .map_err(|e| StoreError::Persistence(format!("write {}: {}", tmp.display(), e)))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp, perms).await.map_err(|e| {
            StoreError::Persistence(format!("restrict {}: {}", tmp.display(), e))
        })?;
    }
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::Persistence(format!("rename into {}: {}", path.display(), e)))?;
    Ok(())
}
