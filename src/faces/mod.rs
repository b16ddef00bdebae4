//! Face image cache coherence.
//!
//! Keeps every cache layer between the image host and the screen coherent
//! using nothing but URL identity:
//! - `keys`: face keys and image sources
//! - `url_builder`: stable vs. cache-busting image URLs
//! - `versions`: per-face invalidation times
//! - `subscriptions`: exact and prefix change listeners
//! - `service`: `FaceImageCache`, tying the above together
//! - `preload`: fire-and-forget image fetches
//!
//! ```text
//! reader ──image_url()──▶ FaceImageCache ──build_url(source, version)──▶ URL
//! editor ──invalidate()──▶ FaceImageCache ──bump version, fan out──▶ listeners
//! ```

mod clock;
mod keys;
mod preload;
mod service;
mod stats;
mod subscriptions;
mod url_builder;
mod versions;

pub use clock::{Clock, SystemClock, UnixMillis};
pub use keys::{FaceKey, ImageSource, ImageTarget};
pub use preload::preload_image;
pub use service::{FaceImageCache, Subscription};
pub use stats::CoherenceStats;
pub use subscriptions::{Listener, ListenerId, SubscriptionRegistry, Tier};
pub use url_builder::{ImageUrlBuilder, UrlBuilder, UrlBuilderError, RELEASE_PARAM, VERSION_PARAM};
pub use versions::VersionStore;
