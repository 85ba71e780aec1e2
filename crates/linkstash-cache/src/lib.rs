//! Snapshot caching for the linkstash favorites store.
//!
//! A snapshot is a point-in-time copy of a store's decoded contents, keyed
//! by the store's backing-file identity. The file-backed implementation is
//! safe for concurrent multi-process use; the Moka implementation serves
//! single-process deployments.

pub mod file;
pub mod memory;
pub mod snapshot;

pub use file::{FileCacheConfig, FileSnapshotCache};
pub use memory::MokaSnapshotCache;
pub use snapshot::SnapshotCache;

use linkstash_core::CacheError;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
