//! Crag Workbench core.
//!
//! - `faces`: face image cache coherence (keys, versioned URLs, listeners)
//! - `state`: crag catalog and persisted settings

pub mod faces;
pub mod state;
