use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Stable 64-bit identity for a backing file or client key.
///
/// Used to name cache snapshot and rate-limit counter files, so that
/// multiple stores (or clients) do not collide in a shared state directory.
/// The hash is deterministic for a given binary; keys only name disposable
/// state files, so stability across binary upgrades is not required — a
/// changed key is just a cold cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StableKey(u64);

impl StableKey {
    /// Key for a store identified by its backing file path.
    pub fn of_path(path: &Path) -> Self {
        Self::of_text(&path.to_string_lossy())
    }

    /// Key for an arbitrary text identity (e.g. a client address).
    pub fn of_text(text: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for StableKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
