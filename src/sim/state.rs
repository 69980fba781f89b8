//! Game state and core simulation types
//!
//! Everything a session carries lives in [`GameState`]. Enemies sit in a flat
//! arena ordered by creation; other code refers to them by id, never by
//! reference.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::badges::BadgeReveal;
use super::collision::Aabb;
use super::formation::FormationSlot;
use super::path::{EnemyPath, Pose};
use super::stage::StageScheduler;
use super::stars::StarField;
use super::timer::FlipFlopTimer;
use crate::consts::*;
use crate::settings::{PhaseTimings, Settings};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Intro theme playing
    Starting,
    /// "STAGE N" banner and badge reveal
    StageAnnounce,
    /// "READY" banner
    Ready,
    /// Combat
    Active,
    /// Ship lost, respawning
    PlayerReform,
    /// "GAME OVER" banner
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Starting => "Starting",
            GamePhase::StageAnnounce => "StageAnnounce",
            GamePhase::Ready => "Ready",
            GamePhase::Active => "Active",
            GamePhase::PlayerReform => "PlayerReform",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Bee,
    Butterfly,
    Purple,
    Trumpet,
    Boss,
}

impl EnemyKind {
    /// Hits needed to destroy
    pub fn hit_points(&self) -> u8 {
        match self {
            EnemyKind::Boss => 2,
            _ => 1,
        }
    }

    /// Points awarded for the kill
    pub fn points(&self) -> u64 {
        match self {
            EnemyKind::Bee => SCORE_BEE,
            EnemyKind::Butterfly => SCORE_BUTTERFLY,
            EnemyKind::Trumpet => SCORE_TRUMPET,
            EnemyKind::Purple => SCORE_PURPLE,
            EnemyKind::Boss => SCORE_BOSS,
        }
    }

    /// Whether the kill shows a floating score
    pub fn shows_score_text(&self) -> bool {
        matches!(self, EnemyKind::Purple | EnemyKind::Boss)
    }
}

/// What is currently driving an enemy's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyMode {
    /// Flying the scripted entrance
    Entering(EnemyPath),
    /// Flying from the end of the entrance to its slot
    Joining(EnemyPath),
    /// Tracking the formation function
    InFormation,
    /// Destroyed, explosion still showing
    Dying { elapsed_ms: u32 },
}

/// A spawned enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pose: Pose,
    pub slot: Option<FormationSlot>,
    pub mode: EnemyMode,
    pub alive: bool,
    pub hit_points: u8,
    /// Tick the enemy was created on; it is inert until the next tick
    pub spawn_tick: u64,
}

impl Enemy {
    pub fn new(
        id: u32,
        kind: EnemyKind,
        origin: Vec2,
        slot: Option<FormationSlot>,
        path: EnemyPath,
        spawn_tick: u64,
    ) -> Self {
        Self {
            id,
            kind,
            pose: Pose {
                pos: origin,
                heading: 0.0,
            },
            slot,
            mode: EnemyMode::Entering(path),
            alive: true,
            hit_points: kind.hit_points(),
            spawn_tick,
        }
    }

    pub fn in_formation(&self) -> bool {
        matches!(self.mode, EnemyMode::InFormation)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pose.pos, Vec2::splat(ENEMY_SIZE))
    }

    /// Mark destroyed and start the death animation
    pub fn kill(&mut self) {
        self.alive = false;
        self.hit_points = 0;
        self.mode = EnemyMode::Dying { elapsed_ms: 0 };
    }
}

/// Who fired a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileOwner {
    Player,
    Enemy,
}

/// A projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per millisecond
    pub vel: Vec2,
    pub owner: MissileOwner,
}

impl Missile {
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos, Vec2::new(MISSILE_WIDTH, MISSILE_HEIGHT))
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub alive: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(GAME_WIDTH / 2.0, PLAYER_Y),
            alive: false,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Where a fired missile appears
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - PLAYER_HEIGHT / 2.0 + MISSILE_HEIGHT / 2.0)
    }
}

/// State carried across phases and stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub high_score: u64,
    pub lives_remaining: u8,
    pub stage_number: u32,
    pub shots_fired: u32,
    pub hits: u32,
}

impl SessionState {
    pub fn new(lives: u8, high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
            lives_remaining: lives,
            stage_number: 0,
            shots_fired: 0,
            hits: 0,
        }
    }

    /// Add points, keeping the high score in step
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.high_score = self.high_score.max(self.score);
    }

    /// Hits per shot fired (0 with no shots)
    pub fn hit_ratio(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// Visual effects the renderer should spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Enemy explosion
    Explosion,
    /// Ship explosion
    PlayerExplosion,
    /// Floating score text
    ScoreText { points: u64 },
}

/// Sounds the audio layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    /// Intro theme
    Theme,
    /// Player shot
    FighterFire,
    /// Enemy destroyed
    EnemyHit,
    /// Boss hit but not destroyed
    BossHit,
    /// Ship destroyed
    Explosion,
    /// One stage badge revealed
    StageAward,
    /// Game over jingle
    GameOver,
}

impl AudioCue {
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::Theme => "theme",
            AudioCue::FighterFire => "fighter_fire",
            AudioCue::EnemyHit => "enemy_hit_1",
            AudioCue::BossHit => "boss_hit",
            AudioCue::Explosion => "explosion",
            AudioCue::StageAward => "stage_award",
            AudioCue::GameOver => "game_over",
        }
    }
}

/// Output of a tick, consumed by the rendering/audio layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SpawnVisualEffect { kind: EffectKind, x: f32, y: f32 },
    PlayAudioCue { cue: AudioCue },
    ScoreChanged { new_score: u64 },
    LivesChanged { lives: u8 },
    PhaseChanged { old: GamePhase, new: GamePhase },
    /// GameOver finished; return to the title with this high score
    SessionFinished { score: u64, high_score: u64 },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub timings: PhaseTimings,
    pub max_dt_ms: u32,
    /// Score, lives and stage carried across phases
    pub session: SessionState,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Session clock (drives the formation function)
    pub time_ms: u64,
    /// Blocking timer for the current phase
    pub phase_timer_ms: u32,
    /// Time spent in Active on the current stage
    pub stage_elapsed_ms: u32,
    pub has_played_intro: bool,
    pub can_control_player: bool,
    pub last_fire_ms: Option<u64>,
    pub player: Player,
    /// Active enemies in creation order
    pub enemies: Vec<Enemy>,
    pub missiles: Vec<Missile>,
    pub scheduler: StageScheduler,
    pub is_bonus_stage: bool,
    pub badges: BadgeReveal,
    /// Enemy sprite frame toggle
    pub animation_beat: FlipFlopTimer,
    /// "1UP" visibility toggle
    pub text_flash: FlipFlopTimer,
    pub stars: StarField,
    finished: bool,
    next_id: u32,
}

impl GameState {
    /// Start a new session
    pub fn new(settings: &Settings, high_score: u64) -> Self {
        let timings = settings.timings.clone();
        Self {
            max_dt_ms: settings.max_dt_ms.max(1),
            session: SessionState::new(settings.initial_lives, high_score),
            phase: GamePhase::Starting,
            time_ticks: 0,
            time_ms: 0,
            phase_timer_ms: 0,
            stage_elapsed_ms: 0,
            has_played_intro: false,
            can_control_player: false,
            last_fire_ms: None,
            player: Player::default(),
            enemies: Vec::new(),
            missiles: Vec::new(),
            is_bonus_stage: false,
            scheduler: StageScheduler::default(),
            badges: BadgeReveal::default(),
            animation_beat: FlipFlopTimer::new(timings.enemy_animation_freq_ms, false),
            text_flash: FlipFlopTimer::new(timings.text_flash_freq_ms, true),
            stars: StarField::new(settings.star_seed),
            timings,
            finished: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// GameOver has run its course
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Shared sprite-frame flag for enemy animation
    pub fn animation_flag(&self) -> bool {
        self.animation_beat.state()
    }

    /// Whether the "1UP" label is visible
    pub fn show_1up(&self) -> bool {
        self.text_flash.state()
    }

    /// Enemies that can still be hit
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    /// Fire an enemy missile from `pos` toward +y
    #[cfg(test)]
    pub(crate) fn spawn_enemy_missile(&mut self, pos: Vec2, speed: f32) {
        let id = self.next_entity_id();
        self.missiles.push(Missile {
            id,
            pos,
            vel: Vec2::new(0.0, speed),
            owner: MissileOwner::Enemy,
        });
    }
}
