//! Game settings and tuning
//!
//! Loaded from a JSON file when one is supplied; every field has a default so
//! partial files are fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::LEVEL_RADIUS;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for `Settings`
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Pacing ===
    /// Seconds between enemy spawns
    pub spawn_interval: f32,
    /// Invulnerability window after a level transition or a lost life
    pub ghost_duration: f32,
    /// "LEVEL COMPLETED" banner time
    pub banner_duration: f32,
    /// Player flight toward the center between levels
    pub flight_duration: f32,

    // === Difficulty ===
    pub starting_lives: u8,
    /// Enemy speed at the start of a run
    pub base_enemy_speed: f32,
    /// Speed added each time the score crosses a multiple of 100
    pub speed_step: f32,
    pub level_radius: f32,
    /// Spawn only this enemy type (debug/testing)
    pub forced_enemy_type: Option<u8>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spawn_interval: 1.5,
            ghost_duration: 2.0,
            banner_duration: 1.5,
            flight_duration: 1.5,

            starting_lives: 3,
            base_enemy_speed: 0.04,
            speed_step: 0.005,
            level_radius: LEVEL_RADIUS,
            forced_enemy_type: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check that every value is usable by the simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("spawn_interval", self.spawn_interval),
            ("level_radius", self.level_radius),
            ("base_enemy_speed", self.base_enemy_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::Invalid(format!("{name} must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("ghost_duration", self.ghost_duration),
            ("banner_duration", self.banner_duration),
            ("flight_duration", self.flight_duration),
            ("speed_step", self.speed_step),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid(format!("{name} must be >= 0, got {value}")));
            }
        }

        if self.starting_lives == 0 {
            return Err(SettingsError::Invalid("starting_lives must be at least 1".into()));
        }
        if let Some(kind) = self.forced_enemy_type {
            if kind > 9 {
                return Err(SettingsError::Invalid(format!(
                    "forced_enemy_type must be 0..=9, got {kind}"
                )));
            }
        }
        Ok(())
    }

    /// Effective effect volume (0 when muted)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }
}
