//! Runtime settings and preferences
//!
//! `Settings` holds the host toggles (layout, player mode, auto-restart).
//! Only the dark-mode flag in `Preferences` is persisted, in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::input::KeyLayout;

/// Who controls player two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    /// Player two is driven by the game's opponent policy (or absent)
    #[default]
    Single,
    /// Two local players
    Versus,
}

impl PlayerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerMode::Single => "single",
            PlayerMode::Versus => "versus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "1p" | "solo" => Some(PlayerMode::Single),
            "versus" | "vs" | "2p" => Some(PlayerMode::Versus),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            PlayerMode::Single => PlayerMode::Versus,
            PlayerMode::Versus => PlayerMode::Single,
        }
    }

    #[inline]
    pub fn is_versus(&self) -> bool {
        *self == PlayerMode::Versus
    }
}

/// Host-facing runtime toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub key_layout: KeyLayout,
    pub player_mode: PlayerMode,
    /// Re-enter the countdown automatically when a round ends
    pub auto_restart: bool,
    /// Theme flag, owned by the page chrome; carried here so hosts can
    /// round-trip a single settings object
    pub dark_mode: bool,
}

impl Settings {
    /// Parse host-supplied JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring invalid settings JSON: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Persisted preferences (a single boolean)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub dark_mode: bool,
}

impl Preferences {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dark-mode";

    /// Stored value is the JS boolean string
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn parse(raw: &str) -> bool {
        raw.trim() == "true"
    }

    /// Load preferences from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                let prefs = Self {
                    dark_mode: Self::parse(&raw),
                };
                log::info!("Loaded preferences (dark mode: {})", prefs.dark_mode);
                return prefs;
            }
        }

        log::info!("Using default preferences");
        Self::default()
    }

    /// Save preferences to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let value = if self.dark_mode { "true" } else { "false" };
            if storage.set_item(Self::STORAGE_KEY, value).is_ok() {
                log::info!("Preferences saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.save();
    }
}
