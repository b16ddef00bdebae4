//! Per-face version bookkeeping.
//!
//! A face without an entry is at baseline and served under the shared
//! release token. Once a face is invalidated it keeps an entry for the
//! rest of the service's lifetime, so every later read stays on a
//! cache-defeating URL.

use super::clock::UnixMillis;
use super::keys::FaceKey;
use std::collections::HashMap;

/// Lazily populated map from face key to its last invalidation time.
#[derive(Debug, Default)]
pub struct VersionStore {
    versions: HashMap<FaceKey, UnixMillis>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of a face, or `None` at baseline.
    pub fn get(&self, key: &str) -> Option<UnixMillis> {
        self.versions.get(key).copied()
    }

    /// Record an invalidation at `now`.
    ///
    /// The stored value never goes backwards: a clock step back (or two
    /// invalidations within one millisecond) keeps the previous value.
    /// Returns the stored version.
    pub fn bump(&mut self, key: &FaceKey, now: UnixMillis) -> UnixMillis {
        let entry = self.versions.entry(key.clone()).or_insert(now);
        if now > *entry {
            *entry = now;
        }
        *entry
    }

    /// Keys with an entry that start with `prefix`.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a FaceKey> {
        self.versions.keys().filter(move |key| key.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
