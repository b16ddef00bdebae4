//! Face identity types.
//!
//! - `FaceKey`: canonical string identity of one photographable surface
//! - `ImageSource`: what a caller hands the service to ask for a photo
//! - `ImageTarget`: the resolved form shared by key derivation and URL building
//!
//! ## Key Forms
//!
//! ```text
//! {cragId}/{area}/{faceId}   primary, one photo per shared rock face
//! {cragId}/{routeName}       legacy, one photo per route
//! ```
//!
//! Keys are also used as path-like strings for prefix matching, so
//! `"crag-1/"` matches every key of that crag and `"crag-1/area-1/"` just
//! that area. Keys are not escaped; URL encoding happens in the builder.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical identity of a cacheable face photograph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceKey(String);

impl FaceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Prefix matching every key of a crag: `"{crag}/"`.
    pub fn crag_prefix(crag_id: &str) -> String {
        format!("{}/", crag_id)
    }

    /// Prefix matching every face key of one area: `"{crag}/{area}/"`.
    pub fn area_prefix(crag_id: &str, area: &str) -> String {
        format!("{}/{}/", crag_id, area)
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FaceKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FaceKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&FaceKey> for FaceKey {
    fn from(key: &FaceKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for FaceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FaceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A request for a face photograph.
///
/// Either a route-like record (which may or may not know its face) or an
/// explicit face triple. The service only ever reads a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Route {
        crag_id: &'a str,
        area: Option<&'a str>,
        face_id: Option<&'a str>,
        name: &'a str,
    },
    Face {
        crag_id: &'a str,
        area: &'a str,
        face_id: &'a str,
    },
}

impl<'a> ImageSource<'a> {
    pub fn route(
        crag_id: &'a str,
        area: Option<&'a str>,
        face_id: Option<&'a str>,
        name: &'a str,
    ) -> Self {
        ImageSource::Route {
            crag_id,
            area,
            face_id,
            name,
        }
    }

    pub fn face(crag_id: &'a str, area: &'a str, face_id: &'a str) -> Self {
        ImageSource::Face {
            crag_id,
            area,
            face_id,
        }
    }

    pub fn crag_id(&self) -> &'a str {
        match *self {
            ImageSource::Route { crag_id, .. } | ImageSource::Face { crag_id, .. } => crag_id,
        }
    }

    /// Resolve which photograph this source points at.
    ///
    /// A route uses its face only when both `area` and `face_id` are
    /// present and non-empty; otherwise it falls back to its own name.
    /// The explicit form always resolves to a face.
    pub fn target(&self) -> ImageTarget<'a> {
        match *self {
            ImageSource::Route {
                crag_id,
                area: Some(area),
                face_id: Some(face_id),
                ..
            } if !area.is_empty() && !face_id.is_empty() => ImageTarget::Face {
                crag_id,
                area,
                face_id,
            },
            ImageSource::Route { crag_id, name, .. } => ImageTarget::LegacyRoute { crag_id, name },
            ImageSource::Face {
                crag_id,
                area,
                face_id,
            } => ImageTarget::Face {
                crag_id,
                area,
                face_id,
            },
        }
    }

    /// Derive the canonical key for this source.
    pub fn face_key(&self) -> FaceKey {
        self.target().face_key()
    }
}

/// Resolved photograph location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget<'a> {
    /// Shared rock-face photo.
    Face {
        crag_id: &'a str,
        area: &'a str,
        face_id: &'a str,
    },
    /// Per-route photo for routes without an assigned face.
    LegacyRoute { crag_id: &'a str, name: &'a str },
}

impl<'a> ImageTarget<'a> {
    /// Path segments in key order.
    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            ImageTarget::Face {
                crag_id,
                area,
                face_id,
            } => vec![crag_id, area, face_id],
            ImageTarget::LegacyRoute { crag_id, name } => vec![crag_id, name],
        }
    }

    pub fn face_key(&self) -> FaceKey {
        FaceKey(self.segments().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_face_key_keeps_unicode_area() {
        let source = ImageSource::face("yuan-tong-si", "左侧", "face-1");
        assert_eq!(source.face_key().as_str(), "yuan-tong-si/左侧/face-1");
    }

    #[test]
    fn test_route_with_face_uses_face_key() {
        let source = ImageSource::route("c1", Some("a1"), Some("f1"), "r1");
        assert_eq!(source.face_key().as_str(), "c1/a1/f1");
    }

    #[test]
    fn test_route_without_area_falls_back_to_name() {
        let source = ImageSource::route("c1", None, Some("f1"), "r1");
        assert_eq!(source.face_key().as_str(), "c1/r1");
    }

    #[test]
    fn test_route_with_empty_fields_falls_back_to_name() {
        let empty_face = ImageSource::route("c1", Some("a1"), Some(""), "r1");
        assert_eq!(empty_face.face_key().as_str(), "c1/r1");

        let empty_area = ImageSource::route("c1", Some(""), Some("f1"), "r1");
        assert_eq!(empty_area.face_key().as_str(), "c1/r1");

        let no_face = ImageSource::route("c1", Some("a1"), None, "r1");
        assert_eq!(no_face.face_key().as_str(), "c1/r1");
    }

    #[test]
    fn test_explicit_face_key_is_unconditional() {
        let source = ImageSource::face("c1", "", "f1");
        assert_eq!(source.face_key().as_str(), "c1//f1");
    }

    #[test]
    fn test_face_key_is_deterministic() {
        let source = ImageSource::route("c1", Some("a1"), Some("f1"), "r1");
        assert_eq!(source.face_key(), source.face_key());
    }

    #[test]
    fn test_route_and_face_sharing_a_face_share_a_key() {
        let route = ImageSource::route("c1", Some("a1"), Some("f1"), "Crimp City");
        let face = ImageSource::face("c1", "a1", "f1");
        assert_eq!(route.face_key(), face.face_key());
    }

    #[test]
    fn test_prefix_helpers_match_keys() {
        let key = ImageSource::face("c1", "a1", "f1").face_key();
        assert!(key.starts_with(&FaceKey::crag_prefix("c1")));
        assert!(key.starts_with(&FaceKey::area_prefix("c1", "a1")));
        assert!(!key.starts_with(&FaceKey::area_prefix("c1", "a2")));
        assert!(!key.starts_with(&FaceKey::crag_prefix("c2")));
    }
}
