//! Session settings and timings
//!
//! Persisted as JSON next to the score file. Every field has a default so a
//! partial or missing file still yields a playable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{INITIAL_LIVES, MAX_DT_MS, NUM_TRACKED_SCORES};
use crate::error::SettingsError;

/// Millisecond durations that drive the session phase machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    /// Delay before the intro theme starts
    pub start_noise_wait_ms: u32,
    /// Length of the intro theme
    pub intro_music_ms: u32,
    /// "STAGE N" banner
    pub stage_ms: u32,
    /// "READY" banner
    pub ready_ms: u32,
    /// Interval between stage badge reveals
    pub stage_badge_ms: u32,
    /// "GAME OVER" banner
    pub game_over_ms: u32,
    /// Enemy sprite-frame alternation period
    pub enemy_animation_freq_ms: u32,
    /// "1UP" blink period
    pub text_flash_freq_ms: u32,
    /// Minimum time between player shots
    pub fire_cooldown_ms: u32,
    /// Time an enemy takes to fly from the end of its entry path to its slot
    pub join_formation_ms: u32,
    /// How long a destroyed enemy lingers before removal
    pub death_animation_ms: u32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            start_noise_wait_ms: 0,
            intro_music_ms: 6600,
            stage_ms: 1600,
            ready_ms: 1600,
            stage_badge_ms: 200,
            game_over_ms: 3000,
            enemy_animation_freq_ms: 500,
            text_flash_freq_ms: 800,
            fire_cooldown_ms: 200,
            join_formation_ms: 600,
            death_animation_ms: 600,
        }
    }
}

impl PhaseTimings {
    /// Total length of the Starting phase
    pub fn start_duration_ms(&self) -> u32 {
        self.start_noise_wait_ms + self.intro_music_ms
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    pub timings: PhaseTimings,
    /// Largest `dt_ms` fed to a single tick
    pub max_dt_ms: u32,

    // === Session ===
    pub initial_lives: u8,
    /// Seed for the background star field
    pub star_seed: u64,

    // === Persistence ===
    pub score_file: PathBuf,
    pub num_tracked_scores: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            max_dt_ms: MAX_DT_MS,
            initial_lives: INITIAL_LIVES,
            star_seed: 0x5eed_57a2,
            score_file: PathBuf::from("scores.txt"),
            num_tracked_scores: NUM_TRACKED_SCORES,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from disk, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from disk
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp values that would stall the simulation
    fn sanitized(mut self) -> Self {
        self.max_dt_ms = self.max_dt_ms.max(1);
        self.num_tracked_scores = self.num_tracked_scores.max(1);
        self
    }
}
