//! Image cache settings.
//!
//! Settings are persisted to localStorage so they survive page reloads.
//! Native builds always start from defaults.

use serde::{Deserialize, Serialize};

/// Errors from (de)serializing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Stored JSON could not be parsed.
    Parse(String),
    /// Settings could not be serialized.
    Serialize(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Parse(msg) => write!(f, "Failed to parse settings: {}", msg),
            SettingsError::Serialize(msg) => write!(f, "Failed to serialize settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Where face photos live and how their URLs are versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCacheSettings {
    /// Root URL of the face image host.
    pub image_base_url: String,
    /// Shared token used for faces that were never invalidated.
    /// Changing it re-keys every baseline image at once.
    pub release: String,
    /// File extension of stored photos.
    pub extension: String,
    /// Warm the image cache for every face of a crag when it is opened.
    pub prefetch_on_open: bool,
}

impl Default for ImageCacheSettings {
    fn default() -> Self {
        Self {
            image_base_url: "https://images.cragbook.app/faces".to_string(),
            release: env!("CARGO_PKG_VERSION").to_string(),
            extension: "jpg".to_string(),
            prefetch_on_open: true,
        }
    }
}

impl ImageCacheSettings {
    /// localStorage key for persisting settings.
    const STORAGE_KEY: &'static str = "crag_workbench_image_settings";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Load settings from localStorage, falling back to defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return Self::default(),
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        let json = match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded image settings from localStorage");
                settings
            }
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Save settings to localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return,
        };

        let json = match self.to_json() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("{}", e);
                return;
            }
        };

        if let Err(e) = storage.set_item(Self::STORAGE_KEY, &json) {
            log::warn!("Failed to save image settings: {:?}", e);
        } else {
            log::info!("Saved image settings to localStorage");
        }
    }

    /// Native builds have no persistent settings store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("Using default image settings ({})", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
