//! Star Swarm - choreography core for a formation-based arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paths, waves, formation, phases, collisions)
//! - `highscores`: Persisted score table (plain-text format)
//! - `settings`: JSON-backed timings and session configuration
//! - `error`: Typed errors for the recoverable failure cases

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{ScoreFileError, ScoreLineError, SettingsError, StageError};
pub use highscores::{ScoreRecord, ScoreTable};
pub use settings::{PhaseTimings, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const GAME_WIDTH: f32 = 224.0;
    pub const GAME_HEIGHT: f32 = 288.0;

    /// Vertical extent of the play area (the HUD lives outside it)
    pub const STAGE_TOP_Y: f32 = 30.0;
    pub const STAGE_BOTTOM_Y: f32 = GAME_HEIGHT - 20.0;

    /// Upper bound on a single tick's delta (ms)
    pub const MAX_DT_MS: u32 = 100;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 13.0;
    pub const PLAYER_HEIGHT: f32 = 12.0;
    pub const PLAYER_Y: f32 = STAGE_BOTTOM_Y - 16.0;
    /// Pixels per millisecond
    pub const PLAYER_SPEED: f32 = 0.085;
    pub const INITIAL_LIVES: u8 = 3;

    /// Missiles
    pub const MISSILE_WIDTH: f32 = 2.0;
    pub const MISSILE_HEIGHT: f32 = 10.0;
    /// Pixels per millisecond (player missiles travel up)
    pub const MISSILE_SPEED: f32 = 0.35;

    /// Enemy bounding box edge (pixels)
    pub const ENEMY_SIZE: f32 = 16.0;

    /// Formation breathing
    pub const FORMATION_CELL: f32 = 16.0;
    pub const FORMATION_CYCLE_MS: u64 = 4000;
    pub const FORMATION_MIN_SPREAD: f32 = 1.0;
    pub const FORMATION_MAX_SPREAD: f32 = 3.0;
    pub const FORMATION_MAX_X_OFFSET: f32 = 8.0;
    /// Left edge of column 0 before the horizontal sway
    pub const FORMATION_X_ORIGIN: f32 = 24.0;
    pub const FORMATION_Y_OFFSET: f32 = STAGE_TOP_Y + 16.0;

    /// Path steps
    pub const POSITION_EPSILON: f32 = 0.001;
    pub const MIN_STEP_DURATION_MS: u32 = 1;

    /// Spawn cadence inside the stage catalogue
    pub const INTER_ENEMY_DELAY_MS: u32 = 150;
    pub const INTER_WAVE_DELAY_MS: u32 = 600;

    /// Points per kill
    pub const SCORE_BEE: u64 = 400;
    pub const SCORE_BUTTERFLY: u64 = 400;
    pub const SCORE_TRUMPET: u64 = 400;
    pub const SCORE_PURPLE: u64 = 800;
    pub const SCORE_BOSS: u64 = 800;

    /// Highest stage number in the catalogue
    pub const MAX_STAGE: u32 = 255;

    /// Score table length
    pub const NUM_TRACKED_SCORES: usize = 5;
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(start: f32, stop: f32, t: f32) -> f32 {
    (1.0 - t) * start + t * stop
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
