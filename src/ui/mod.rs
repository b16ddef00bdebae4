//! UI modules for the Crag Workbench application.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, editor toggle, status and cache statistics
//! - Left panel: Crag list and edit history
//! - Central panel: Faces and route photos of the selected crag

mod face_panel;
mod left_panel;
mod top_bar;

pub use face_panel::render_face_panel;
pub use left_panel::render_left_panel;
pub use top_bar::render_top_bar;

use crag_workbench::faces::FaceKey;

/// Editor request raised by a panel, applied after the frame's UI pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// A face or route photo was replaced.
    ReplacePhoto(FaceKey),
    /// Every known photo of one area changed.
    RefreshArea { crag_id: String, area: String },
    /// Every known photo of one crag changed.
    RefreshCrag(String),
}
