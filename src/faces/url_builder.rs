//! Image URL composition.
//!
//! URL identity is the only coherence mechanism between the in-memory
//! image cache, the CDN edge and the browser's HTTP cache. A face that has
//! never been invalidated is served under a shared release token so every
//! session and user reuses the same cached bytes; an invalidated face gets
//! its invalidation time instead, which no earlier URL could have carried.
//!
//! ```text
//! {base}/{crag}/{area}/{face}.{ext}?v={release}   baseline
//! {base}/{crag}/{area}/{face}.{ext}?t={millis}    after invalidation
//! {base}/{crag}/{route}.{ext}?...                 legacy per-route photo
//! ```

use super::clock::UnixMillis;
use super::keys::{ImageSource, ImageTarget};
use crate::state::ImageCacheSettings;

/// Query parameter carrying the shared release token.
pub const RELEASE_PARAM: &str = "v";

/// Query parameter carrying an invalidation timestamp.
pub const VERSION_PARAM: &str = "t";

/// Turns an image source into a fully-qualified URL.
///
/// Implementations must be pure: the same `(source, version)` always
/// yields the same string, and a `Some` version must never produce a URL
/// that a `None` version (or a different version) could.
pub trait UrlBuilder {
    fn build_url(&self, source: &ImageSource<'_>, version: Option<UnixMillis>) -> String;
}

/// Errors from an invalid builder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlBuilderError {
    /// No base URL was configured.
    EmptyBaseUrl,
    /// Base URL is neither http(s) nor a same-origin absolute path.
    UnsupportedBaseUrl(String),
    /// The release token is empty, which would make baseline URLs collide
    /// across releases.
    EmptyRelease,
}

impl std::fmt::Display for UrlBuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlBuilderError::EmptyBaseUrl => write!(f, "Image base URL is empty"),
            UrlBuilderError::UnsupportedBaseUrl(url) => {
                write!(f, "Unsupported image base URL: {}", url)
            }
            UrlBuilderError::EmptyRelease => write!(f, "Release token is empty"),
        }
    }
}

impl std::error::Error for UrlBuilderError {}

/// Default builder for the face image host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    base_url: String,
    release: String,
    extension: String,
}

impl ImageUrlBuilder {
    /// Creates a builder rooted at `base_url` using `release` as the
    /// baseline token. The default extension is `jpg`.
    pub fn new(
        base_url: impl Into<String>,
        release: impl Into<String>,
    ) -> Result<Self, UrlBuilderError> {
        let base_url = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(UrlBuilderError::EmptyBaseUrl);
        }
        let supported = base_url.starts_with("https://")
            || base_url.starts_with("http://")
            || (base_url.starts_with('/') && !base_url.starts_with("//"));
        if !supported {
            return Err(UrlBuilderError::UnsupportedBaseUrl(base_url.to_string()));
        }

        let release = release.into();
        if release.trim().is_empty() {
            return Err(UrlBuilderError::EmptyRelease);
        }

        Ok(Self {
            base_url: base_url.to_string(),
            release: release.trim().to_string(),
            extension: "jpg".to_string(),
        })
    }

    /// Creates a builder from persisted settings.
    pub fn from_settings(settings: &ImageCacheSettings) -> Result<Self, UrlBuilderError> {
        Ok(Self::new(&settings.image_base_url, &settings.release)?
            .with_extension(&settings.extension))
    }

    /// Sets the file extension appended to the last path segment.
    /// An empty extension leaves the segment bare.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    fn path(&self, target: &ImageTarget<'_>) -> String {
        let mut path = self.base_url.clone();
        for segment in target.segments() {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        if !self.extension.is_empty() {
            path.push('.');
            path.push_str(&self.extension);
        }
        path
    }

    /// URL for a resolved target at the given version.
    pub fn target_url(&self, target: &ImageTarget<'_>, version: Option<UnixMillis>) -> String {
        format!("{}?{}", self.path(target), self.query(version))
    }

    fn query(&self, version: Option<UnixMillis>) -> String {
        match version {
            Some(version) => format!("{}={}", VERSION_PARAM, version.as_millis()),
            None => format!(
                "{}={}",
                RELEASE_PARAM,
                urlencoding::encode(&self.release)
            ),
        }
    }
}

impl UrlBuilder for ImageUrlBuilder {
    fn build_url(&self, source: &ImageSource<'_>, version: Option<UnixMillis>) -> String {
        self.target_url(&source.target(), version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("https://img.example.com/faces/", "1.4.0").unwrap()
    }

    #[test]
    fn test_baseline_url_uses_release_token() {
        let url = builder().build_url(&ImageSource::face("c1", "a1", "f1"), None);
        assert_eq!(url, "https://img.example.com/faces/c1/a1/f1.jpg?v=1.4.0");
    }

    #[test]
    fn test_versioned_url_uses_timestamp() {
        let url = builder().build_url(
            &ImageSource::face("c1", "a1", "f1"),
            Some(UnixMillis(1_700_000_000_000)),
        );
        assert_eq!(url, "https://img.example.com/faces/c1/a1/f1.jpg?t=1700000000000");
    }

    #[test]
    fn test_legacy_route_url() {
        let url = builder().build_url(&ImageSource::route("c1", None, None, "Crimp City"), None);
        assert_eq!(url, "https://img.example.com/faces/c1/Crimp%20City.jpg?v=1.4.0");
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let url = builder().build_url(&ImageSource::face("yuan-tong-si", "左侧", "face-1"), None);
        assert_eq!(
            url,
            "https://img.example.com/faces/yuan-tong-si/%E5%B7%A6%E4%BE%A7/face-1.jpg?v=1.4.0"
        );

        let slash = builder().build_url(&ImageSource::route("c1", None, None, "A/B"), None);
        assert!(slash.contains("/c1/A%2FB.jpg"));
    }

    #[test]
    fn test_versions_never_collide_with_baseline() {
        let b = builder();
        let source = ImageSource::face("c1", "a1", "f1");
        let baseline = b.build_url(&source, None);
        let first = b.build_url(&source, Some(UnixMillis(1)));
        let second = b.build_url(&source, Some(UnixMillis(2)));
        assert_ne!(baseline, first);
        assert_ne!(first, second);
    }

    #[test]
    fn test_extension_is_configurable() {
        let b = builder().with_extension(".webp");
        let url = b.build_url(&ImageSource::face("c1", "a1", "f1"), None);
        assert!(url.ends_with("/c1/a1/f1.webp?v=1.4.0"));

        let bare = builder().with_extension("");
        let url = bare.build_url(&ImageSource::face("c1", "a1", "f1"), None);
        assert!(url.ends_with("/c1/a1/f1?v=1.4.0"));
    }

    #[test]
    fn test_relative_base_url_is_accepted() {
        let b = ImageUrlBuilder::new("/static/faces", "r7").unwrap();
        let url = b.build_url(&ImageSource::face("c1", "a1", "f1"), None);
        assert_eq!(url, "/static/faces/c1/a1/f1.jpg?v=r7");
    }

    #[test]
    fn test_invalid_configuration() {
        assert_eq!(
            ImageUrlBuilder::new("  ", "1").unwrap_err(),
            UrlBuilderError::EmptyBaseUrl
        );
        assert_eq!(
            ImageUrlBuilder::new("ftp://host", "1").unwrap_err(),
            UrlBuilderError::UnsupportedBaseUrl("ftp://host".to_string())
        );
        assert_eq!(
            ImageUrlBuilder::new("//cdn.example.com", "1").unwrap_err(),
            UrlBuilderError::UnsupportedBaseUrl("//cdn.example.com".to_string())
        );
        assert_eq!(
            ImageUrlBuilder::new("https://host", " ").unwrap_err(),
            UrlBuilderError::EmptyRelease
        );
    }
}
