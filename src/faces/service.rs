//! The face image cache coherence service.
//!
//! Readers ask for a display URL; editors report that a face changed.
//! Nothing is evicted anywhere: a changed face simply starts resolving to a
//! URL no cache layer has seen, and same-session listeners are told to
//! re-request it.
//!
//! ## Invalidation Asymmetry
//!
//! - `invalidate(key)` always notifies prefix listeners matching the key's
//!   string, even if the key was never read or subscribed.
//! - `invalidate_by_prefix(prefix)` only touches keys the service already
//!   knows (version entry or exact listener). If none match, nobody is
//!   notified, not even listeners of that very prefix.
//!
//! ## Caller Obligations
//!
//! Editors must invalidate with the same key-derivation rule readers use,
//! right after replacing, renaming or deleting a photo. A mismatched key
//! or prefix granularity is not detected; it shows up as a stale image or
//! a missed notification. Renaming a face yields a new key; subscribers and
//! version state of the old key are not carried over, so a rename should
//! invalidate both keys.
//!
//! The service is single-threaded (`Rc`/`RefCell`). Listeners may
//! subscribe, unsubscribe or invalidate from inside a notification. A
//! listener unsubscribed by an earlier one in the same fan-out is skipped;
//! one subscribed during it first fires on the next invalidation. A
//! panicking listener aborts the rest of that fan-out.

use super::clock::{Clock, SystemClock, UnixMillis};
use super::keys::{FaceKey, ImageSource};
use super::preload::preload_image;
use super::stats::CoherenceStats;
use super::subscriptions::{ListenerId, Registered, SubscriptionRegistry, Tier};
use super::url_builder::{ImageUrlBuilder, UrlBuilder, UrlBuilderError};
use super::versions::VersionStore;
use crate::state::ImageCacheSettings;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Process-wide face image cache. Construct once per client and share it
/// (typically as `Rc<FaceImageCache>`).
pub struct FaceImageCache {
    url_builder: Box<dyn UrlBuilder>,
    clock: Box<dyn Clock>,
    versions: RefCell<VersionStore>,
    registry: Rc<RefCell<SubscriptionRegistry>>,
    stats: RefCell<CoherenceStats>,
}

impl FaceImageCache {
    /// Creates a cache using the system clock.
    pub fn new(url_builder: impl UrlBuilder + 'static) -> Self {
        Self::with_clock(url_builder, SystemClock)
    }

    /// Creates a cache with an explicit clock.
    pub fn with_clock(url_builder: impl UrlBuilder + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            url_builder: Box::new(url_builder),
            clock: Box::new(clock),
            versions: RefCell::new(VersionStore::new()),
            registry: Rc::new(RefCell::new(SubscriptionRegistry::new())),
            stats: RefCell::new(CoherenceStats::new()),
        }
    }

    /// Creates a cache with the default URL builder configured from settings.
    pub fn from_settings(settings: &ImageCacheSettings) -> Result<Self, UrlBuilderError> {
        let builder = ImageUrlBuilder::from_settings(settings)?;
        log::info!(
            "Face image cache using {} (release {})",
            builder.base_url(),
            builder.release()
        );
        Ok(Self::new(builder))
    }

    /// Derive the canonical key for a source.
    pub fn face_key(&self, source: &ImageSource<'_>) -> FaceKey {
        source.face_key()
    }

    /// URL to display for a source right now.
    ///
    /// Identical between two invalidations of the source's key; different
    /// across one.
    pub fn image_url(&self, source: &ImageSource<'_>) -> String {
        let key = source.face_key();
        let version = self.versions.borrow().get(key.as_str());
        self.url_builder.build_url(source, version)
    }

    /// Current version of a key, or `None` if it is still at baseline.
    pub fn version(&self, key: &str) -> Option<UnixMillis> {
        self.versions.borrow().get(key)
    }

    /// Mark one face as changed and notify its listeners.
    ///
    /// Exact listeners of `key` run first, then every prefix listener whose
    /// prefix `key` starts with. Returns the number of listeners invoked.
    pub fn invalidate(&self, key: impl Into<FaceKey>) -> usize {
        let key = key.into();
        let now = self.clock.now();
        let version = self.versions.borrow_mut().bump(&key, now);
        self.stats.borrow_mut().record_invalidated(1);
        log::debug!("Invalidated face {} (version {})", key, version);
        self.notify(&key)
    }

    /// Mark every known face under `prefix` as changed.
    ///
    /// Only keys with a version entry or an exact listener are considered.
    /// All matched keys share one timestamp. Returns the number of keys
    /// invalidated.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let keys: BTreeSet<FaceKey> = {
            let versions = self.versions.borrow();
            let registry = self.registry.borrow();
            let known: BTreeSet<FaceKey> = versions
                .keys_with_prefix(prefix)
                .chain(registry.exact_keys_with_prefix(prefix))
                .cloned()
                .collect();
            known
        };

        if keys.is_empty() {
            log::debug!("No known faces under prefix {:?}, nothing to invalidate", prefix);
            self.stats.borrow_mut().record_empty_prefix();
            return 0;
        }

        let now = self.clock.now();
        {
            let mut versions = self.versions.borrow_mut();
            for key in &keys {
                versions.bump(key, now);
            }
        }
        self.stats.borrow_mut().record_invalidated(keys.len());
        log::debug!(
            "Invalidated {} face(s) under prefix {:?} at {}",
            keys.len(),
            prefix,
            now
        );

        for key in &keys {
            self.notify(key);
        }
        keys.len()
    }

    /// Listen for invalidations of exactly `key`.
    pub fn subscribe<F>(&self, key: impl Into<FaceKey>, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let key = key.into();
        let name = key.as_str().to_string();
        let id = self
            .registry
            .borrow_mut()
            .add_exact(key, Rc::new(listener));
        log::trace!("Subscribed to face {}", name);
        self.subscription(Tier::Exact, name, id)
    }

    /// Listen for invalidations of any key starting with `prefix`.
    pub fn subscribe_by_prefix<F>(&self, prefix: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let prefix = prefix.into();
        let id = self
            .registry
            .borrow_mut()
            .add_prefix(prefix.clone(), Rc::new(listener));
        log::trace!("Subscribed to prefix {:?}", prefix);
        self.subscription(Tier::Prefix, prefix, id)
    }

    fn subscription(&self, tier: Tier, key: String, id: ListenerId) -> Subscription {
        Subscription {
            registry: Rc::downgrade(&self.registry),
            tier,
            key,
            id,
        }
    }

    /// Start fetching each URL in the background. Never fails.
    pub fn prefetch<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let issued = urls
            .into_iter()
            .filter(|url| preload_image(url.as_ref()))
            .count();
        if issued > 0 {
            log::debug!("Prefetching {} face image(s)", issued);
        }
        self.stats.borrow_mut().record_prefetch(issued);
    }

    /// Live registrations as `(exact, prefix)`.
    pub fn subscriber_counts(&self) -> (usize, usize) {
        let registry = self.registry.borrow();
        (registry.exact_count(), registry.prefix_count())
    }

    /// Number of keys and prefixes that currently hold listeners.
    pub fn subscribed_entries(&self) -> usize {
        self.registry.borrow().entry_count()
    }

    /// Number of keys that have left baseline.
    pub fn versioned_keys(&self) -> usize {
        self.versions.borrow().len()
    }

    pub fn stats(&self) -> CoherenceStats {
        self.stats.borrow().clone()
    }

    /// Run the listeners of `key`, skipping any removed mid-fan-out.
    /// Returns the number actually invoked.
    fn notify(&self, key: &FaceKey) -> usize {
        let started = web_time::Instant::now();
        let snapshot: Vec<Registered> = {
            let registry = self.registry.borrow();
            let mut snapshot = registry.exact_listeners(key.as_str());
            snapshot.extend(registry.prefix_listeners_for(key.as_str()));
            snapshot
        };

        let mut invoked = 0;
        for entry in &snapshot {
            let live = self
                .registry
                .borrow()
                .contains(entry.tier, &entry.key, entry.id);
            if !live {
                log::trace!("Skipping listener on {:?} removed during fan-out", entry.key);
                continue;
            }
            (entry.listener)();
            invoked += 1;
        }

        log::debug!("Notified {} listener(s) of {}", invoked, key);
        self.stats
            .borrow_mut()
            .record_fanout(invoked, started.elapsed());
        invoked
    }
}

/// Handle for one registration.
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    registry: Weak<RefCell<SubscriptionRegistry>>,
    tier: Tier,
    key: String,
    id: ListenerId,
}

impl Subscription {
    /// The key or prefix this registration listens on.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Remove this registration only. Sibling listeners under the same key
    /// and other registrations of the same closure are unaffected.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if registry.borrow_mut().remove(self.tier, &self.key, self.id) {
            log::trace!("Unsubscribed from {:?}", self.key);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("tier", &self.tier)
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
