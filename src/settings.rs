//! Game settings and preferences
//!
//! Persisted separately from the profile under a single JSON key.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistenceError, load_or_default, save_json};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 1200,
            QualityPreset::High => 4000,
        }
    }

    /// Whether the scrolling starfield is on by default
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, sparks, trails)
    pub particles: bool,
    /// Scrolling background stars
    pub starfield: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub music_enabled: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            starfield: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.6,
            music_enabled: true,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.starfield = preset.starfield_enabled();
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Storage key
    pub const STORAGE_KEY: &'static str = "neon_storm_settings";

    /// Load settings, falling back to defaults on absence or corruption
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut settings: Self = load_or_default(store, Self::STORAGE_KEY);
        settings.clamp_volumes();
        settings
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), PersistenceError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    fn clamp_volumes(&mut self) {
        for vol in [
            &mut self.master_volume,
            &mut self.sfx_volume,
            &mut self.music_volume,
        ] {
            *vol = if vol.is_finite() { vol.clamp(0.0, 1.0) } else { 1.0 };
        }
    }
}
