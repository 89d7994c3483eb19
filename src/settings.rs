//! Game settings and preferences
//!
//! Persisted separately from scores through [`Storage`].

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Longest player name kept
pub const MAX_NAME_CHARS: usize = 20;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Feedback ===
    /// Play sound effects
    pub sound_enabled: bool,
    /// Haptic feedback on eat/game over
    pub vibration_enabled: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Profile ===
    /// Name recorded with leaderboard entries; empty means anonymous
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        // First launch: everything audible
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            sfx_volume: 1.0,
            player_name: String::new(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "settings";

    /// Name to show and record for this player
    pub fn display_name(&self) -> &str {
        let name = self.player_name.trim();
        if name.is_empty() { "PLAYER" } else { name }
    }

    /// Whether scores should be submitted under a name
    pub fn has_player_name(&self) -> bool {
        !self.player_name.trim().is_empty()
    }

    /// Set the player name, trimmed and capped at `MAX_NAME_CHARS`
    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().chars().take(MAX_NAME_CHARS).collect();
    }

    /// Load saved settings. On first launch the defaults are written out so
    /// later runs find a document to edit.
    pub fn load(storage: &Storage) -> Self {
        match storage.load::<Self>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                log::info!("First launch, writing default settings");
                let settings = Self::default();
                settings.save(storage);
                settings
            }
            Err(e) => {
                log::warn!("Failed to load settings: {} (using defaults)", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &Storage) {
        storage.save_logged(Self::STORAGE_KEY, self);
    }
}
