//! Crag, face and route catalog.
//!
//! Faces are photographed once and shared by every route drawn on them.
//! Older routes may not have a face yet; they keep a per-route photo.

use crate::faces::{FaceKey, ImageSource};

/// A photographed section of rock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub crag_id: String,
    pub area: String,
    pub id: String,
    /// Display label (e.g., "Main Wall").
    pub label: String,
}

impl Face {
    pub fn image_source(&self) -> ImageSource<'_> {
        ImageSource::face(&self.crag_id, &self.area, &self.id)
    }

    pub fn key(&self) -> FaceKey {
        self.image_source().face_key()
    }
}

/// A climbing route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub crag_id: String,
    pub name: String,
    pub grade: String,
    pub area: Option<String>,
    pub face_id: Option<String>,
    /// Number of community beta videos.
    pub beta_videos: u32,
}

impl Route {
    pub fn image_source(&self) -> ImageSource<'_> {
        ImageSource::route(
            &self.crag_id,
            self.area.as_deref(),
            self.face_id.as_deref(),
            &self.name,
        )
    }

    pub fn key(&self) -> FaceKey {
        self.image_source().face_key()
    }

    /// Whether this route still uses a per-route photo.
    pub fn is_legacy_image(&self) -> bool {
        matches!(
            self.image_source().target(),
            crate::faces::ImageTarget::LegacyRoute { .. }
        )
    }
}

/// A climbing area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crag {
    pub id: String,
    pub name: String,
    pub faces: Vec<Face>,
    pub routes: Vec<Route>,
}

impl Crag {
    /// Distinct area names in first-seen order.
    pub fn areas(&self) -> Vec<&str> {
        let mut areas: Vec<&str> = Vec::new();
        for face in &self.faces {
            if !areas.contains(&face.area.as_str()) {
                areas.push(&face.area);
            }
        }
        areas
    }

    /// Routes drawn on the given face.
    pub fn routes_on<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = &'a Route> {
        let key = face.key();
        self.routes.iter().filter(move |route| route.key() == key)
    }

    /// Every distinct image source of this crag (faces first, then legacy
    /// route photos).
    pub fn image_sources(&self) -> Vec<ImageSource<'_>> {
        let mut sources: Vec<ImageSource<'_>> =
            self.faces.iter().map(Face::image_source).collect();
        sources.extend(
            self.routes
                .iter()
                .filter(|route| route.is_legacy_image())
                .map(Route::image_source),
        );
        sources
    }
}

/// All crags known to the client.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub crags: Vec<Crag>,
}

impl Catalog {
    pub fn crag(&self, id: &str) -> Option<&Crag> {
        self.crags.iter().find(|c| c.id == id)
    }

    /// Sample catalog used until the API is wired in.
    pub fn sample() -> Self {
        fn face(crag: &str, area: &str, id: &str, label: &str) -> Face {
            Face {
                crag_id: crag.to_string(),
                area: area.to_string(),
                id: id.to_string(),
                label: label.to_string(),
            }
        }

        fn route(
            crag: &str,
            name: &str,
            grade: &str,
            face: Option<(&str, &str)>,
            beta_videos: u32,
        ) -> Route {
            Route {
                crag_id: crag.to_string(),
                name: name.to_string(),
                grade: grade.to_string(),
                area: face.map(|(area, _)| area.to_string()),
                face_id: face.map(|(_, id)| id.to_string()),
                beta_videos,
            }
        }

        let yuan_tong_si = Crag {
            id: "yuan-tong-si".to_string(),
            name: "Yuan Tong Si".to_string(),
            faces: vec![
                face("yuan-tong-si", "左侧", "face-1", "Left Slab"),
                face("yuan-tong-si", "左侧", "face-2", "Left Roof"),
                face("yuan-tong-si", "右侧", "face-1", "Right Arete"),
            ],
            routes: vec![
                route("yuan-tong-si", "Morning Bell", "5.10a", Some(("左侧", "face-1")), 3),
                route("yuan-tong-si", "Incense Crack", "5.11b", Some(("左侧", "face-1")), 1),
                route("yuan-tong-si", "Temple Roof", "5.12c", Some(("左侧", "face-2")), 5),
                route("yuan-tong-si", "Arete Direct", "5.10d", Some(("右侧", "face-1")), 0),
                route("yuan-tong-si", "Old Pilgrim", "5.9", None, 2),
            ],
        };

        let bai_he = Crag {
            id: "bai-he".to_string(),
            name: "Bai He".to_string(),
            faces: vec![
                face("bai-he", "main", "wall-a", "Wall A"),
                face("bai-he", "main", "wall-b", "Wall B"),
            ],
            routes: vec![
                route("bai-he", "Crane Wing", "5.11a", Some(("main", "wall-a")), 4),
                route("bai-he", "River Mist", "5.10c", Some(("main", "wall-b")), 0),
                route("bai-he", "Lost Topo", "5.8", None, 0),
            ],
        };

        Self {
            crags: vec![yuan_tong_si, bai_he],
        }
    }
}
