//! The JSON-file-backed favorites store.
//!
//! This crate provides the store itself plus the two [`ExclusiveLock`]
//! implementations it is usually paired with: a lock file for multi-process
//! deployments and an in-process mutex for single-process ones.
//!
//! [`ExclusiveLock`]: linkstash_core::ExclusiveLock

pub mod lock;
pub mod store;

pub use lock::{FileLock, LocalLock};
pub use store::{FavoritesStore, StoreConfig, SweepOutcome};
