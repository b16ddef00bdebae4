//! Application state management.
//!
//! - `catalog`: crags, faces and routes
//! - `settings`: image host and versioning settings

pub mod catalog;
mod settings;

pub use catalog::{Catalog, Crag, Face, Route};
pub use settings::{ImageCacheSettings, SettingsError};

use crate::faces::{FaceKey, ImageUrlBuilder, UrlBuilderError};

/// Maximum number of entries kept in the edit log.
const EDIT_LOG_CAPACITY: usize = 20;

/// Root application state.
#[derive(Default)]
pub struct AppState {
    /// Crag catalog
    pub catalog: Catalog,

    /// Id of the crag being browsed
    pub selected_crag: Option<String>,

    /// Image host settings the running cache was built from
    pub settings: ImageCacheSettings,

    /// Settings being edited in the settings panel
    pub settings_draft: ImageCacheSettings,

    /// Whether the editor controls are shown
    pub editor_mode: bool,

    /// Application status message displayed in top bar
    pub status_message: String,

    /// Recent editor actions, newest last
    pub edit_log: Vec<String>,
}

impl AppState {
    pub fn new(settings: ImageCacheSettings) -> Self {
        Self {
            catalog: Catalog::sample(),
            settings_draft: settings.clone(),
            settings,
            status_message: "Ready".to_string(),
            ..Default::default()
        }
    }

    pub fn selected_crag(&self) -> Option<&Crag> {
        self.selected_crag
            .as_deref()
            .and_then(|id| self.catalog.crag(id))
    }

    /// Record an editor action and show it in the status bar.
    pub fn log_edit(&mut self, message: String) {
        log::info!("{}", message);
        self.status_message = message.clone();
        self.edit_log.push(message);
        if self.edit_log.len() > EDIT_LOG_CAPACITY {
            let excess = self.edit_log.len() - EDIT_LOG_CAPACITY;
            self.edit_log.drain(..excess);
        }
    }

    /// Validate and persist the settings draft.
    ///
    /// Returns whether the change affects image URLs, which only take
    /// effect once the cache is rebuilt on the next load. An invalid
    /// draft leaves the current settings untouched.
    pub fn apply_settings_draft(&mut self) -> Result<bool, UrlBuilderError> {
        ImageUrlBuilder::from_settings(&self.settings_draft)?;

        let draft = &self.settings_draft;
        let needs_reload = draft.image_base_url != self.settings.image_base_url
            || draft.release != self.settings.release
            || draft.extension != self.settings.extension;

        self.settings = draft.clone();
        self.settings.save();
        self.status_message = if needs_reload {
            "Settings saved; image host changes apply after reload".to_string()
        } else {
            "Settings saved".to_string()
        };
        log::info!("{}", self.status_message);
        Ok(needs_reload)
    }

    /// Status line for a face refresh notification.
    pub fn note_refreshed(&mut self, key: &FaceKey) {
        self.status_message = format!("Photo refreshed: {}", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_crag_lookup() {
        let mut state = AppState::new(ImageCacheSettings::default());
        assert!(state.selected_crag().is_none());

        state.selected_crag = Some("bai-he".to_string());
        assert_eq!(state.selected_crag().map(|c| c.name.as_str()), Some("Bai He"));
    }

    #[test]
    fn test_prefetch_toggle_applies_without_reload() {
        let mut state = AppState::new(ImageCacheSettings::default());
        state.settings_draft.prefetch_on_open = false;

        assert_eq!(state.apply_settings_draft(), Ok(false));
        assert!(!state.settings.prefetch_on_open);
        assert_eq!(state.status_message, "Settings saved");
    }

    #[test]
    fn test_release_change_needs_reload() {
        let mut state = AppState::new(ImageCacheSettings::default());
        state.settings_draft.release = "2099.1".to_string();

        assert_eq!(state.apply_settings_draft(), Ok(true));
        assert_eq!(state.settings.release, "2099.1");
    }

    #[test]
    fn test_invalid_draft_is_rejected() {
        let mut state = AppState::new(ImageCacheSettings::default());
        state.settings_draft.image_base_url = "ftp://images".to_string();

        assert!(matches!(
            state.apply_settings_draft(),
            Err(UrlBuilderError::UnsupportedBaseUrl(_))
        ));
        assert_eq!(state.settings, ImageCacheSettings::default());
    }

    #[test]
    fn test_edit_log_is_bounded() {
        let mut state = AppState::new(ImageCacheSettings::default());
        for n in 0..(EDIT_LOG_CAPACITY + 5) {
            state.log_edit(format!("edit {}", n));
        }
        assert_eq!(state.edit_log.len(), EDIT_LOG_CAPACITY);
        assert_eq!(state.edit_log.first().map(String::as_str), Some("edit 5"));
        assert_eq!(state.status_message, format!("edit {}", EDIT_LOG_CAPACITY + 4));
    }
}
