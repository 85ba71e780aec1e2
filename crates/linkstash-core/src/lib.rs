//! Core types and trait seams for the linkstash bookmark tracker.
//!
//! This crate provides the domain records, the error taxonomy, and the
//! capability traits (clock, exclusive lock, notifier) shared by the store,
//! cache, guard, and gateway crates.

pub mod blacklist;
pub mod clock;
pub mod error;
pub mod favorite;
pub mod key;
pub mod lock;
pub mod notify;
pub mod query;
pub mod validate;

pub use blacklist::Blacklist;
pub use clock::{Clock, SystemClock};
pub use error::{CacheError, Result, StoreError};
pub use favorite::Favorite;
pub use key::StableKey;
pub use lock::{ExclusiveLock, LockGuard};
pub use notify::{BackupReason, LogNotifier, Notifier, NotifyError};
pub use query::{filter_by_search, paginate, ListQuery, Page, SortOrder};
pub use validate::{sanitize_title, validate_url, MAX_URL_LENGTH};
