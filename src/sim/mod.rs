//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through `tick()` and its clamped `dt_ms`
//! - Seeded RNG only
//! - Stable iteration order (by creation order)
//! - No rendering, audio or platform dependencies; effects leave as events

pub mod badges;
pub mod collision;
pub mod formation;
pub mod interp;
pub mod path;
pub mod stage;
pub mod stars;
pub mod state;
pub mod tick;
pub mod timer;

pub use badges::{BadgeReveal, StageBadges};
pub use collision::{Aabb, STAGE_BOUNDS, resolve_missile_hits, resolve_player_hits};
pub use formation::{FormationSlot, formation_position, slot_position};
pub use path::{EnemyPath, PathStep, PathStepKind, Pose};
pub use stage::{
    EnemySpec, EntryPattern, SpawnEvent, Stage, StageScheduler, Wave, flatten, load_stage,
    load_stage_or_empty,
};
pub use stars::StarField;
pub use state::{
    AudioCue, EffectKind, Enemy, EnemyKind, EnemyMode, GameEvent, GamePhase, GameState, Missile,
    MissileOwner, Player, SessionState,
};
pub use tick::{TickInput, tick};
pub use timer::FlipFlopTimer;
