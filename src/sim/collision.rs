//! Collision detection and resolution
//!
//! Everything is axis-aligned rectangle overlap. Iteration follows creation
//! order (missiles, then enemies) so the same inputs always kill the same
//! enemy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{
    AudioCue, EffectKind, Enemy, GameEvent, Missile, MissileOwner, Player, SessionState,
};
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

/// Area in which missiles stay alive
pub const STAGE_BOUNDS: Aabb = Aabb {
    min: Vec2::new(0.0, STAGE_TOP_Y),
    max: Vec2::new(GAME_WIDTH, STAGE_BOTTOM_Y),
};

impl Aabb {
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Whether `other` lies entirely inside (edges inclusive)
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }
}

/// Whether a missile is still inside the stage
pub fn in_stage_bounds(missile: &Missile) -> bool {
    STAGE_BOUNDS.contains(&missile.bounds())
}

/// Enemies that take part in collisions on `tick`
fn is_hittable(enemy: &Enemy, tick: u64) -> bool {
    enemy.alive && enemy.spawn_tick != tick
}

/// Award a kill and emit its effects
fn score_kill(enemy: &Enemy, session: &mut SessionState, events: &mut Vec<GameEvent>) {
    let points = enemy.kind.points();
    session.add_score(points);
    let (x, y) = (enemy.pose.pos.x, enemy.pose.pos.y);
    events.push(GameEvent::SpawnVisualEffect {
        kind: EffectKind::Explosion,
        x,
        y,
    });
    events.push(GameEvent::PlayAudioCue {
        cue: AudioCue::EnemyHit,
    });
    if enemy.kind.shows_score_text() {
        events.push(GameEvent::SpawnVisualEffect {
            kind: EffectKind::ScoreText { points },
            x,
            y,
        });
    }
    events.push(GameEvent::ScoreChanged {
        new_score: session.score,
    });
}

/// Resolve player missiles against enemies
///
/// Each missile kills at most one enemy: the first overlapping one in
/// creation order. Returns the number of hits landed.
pub fn resolve_missile_hits(
    missiles: &mut Vec<Missile>,
    enemies: &mut [Enemy],
    session: &mut SessionState,
    tick: u64,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let mut hits = 0;
    missiles.retain(|missile| {
        if missile.owner != MissileOwner::Player {
            return true;
        }
        let bounds = missile.bounds();
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| is_hittable(e, tick) && e.bounds().overlaps(&bounds))
        else {
            return true;
        };

        hits += 1;
        session.hits += 1;
        enemy.hit_points = enemy.hit_points.saturating_sub(1);
        if enemy.hit_points == 0 {
            log::debug!("Enemy {} ({:?}) destroyed", enemy.id, enemy.kind);
            enemy.kill();
            score_kill(enemy, session, events);
        } else {
            events.push(GameEvent::PlayAudioCue {
                cue: AudioCue::BossHit,
            });
        }
        false
    });
    hits
}

/// Resolve enemy missiles and enemy bodies against the player
///
/// Returns true if the player was destroyed. A rammed enemy is destroyed
/// too and scores as a kill.
pub fn resolve_player_hits(
    player: &Player,
    missiles: &mut Vec<Missile>,
    enemies: &mut [Enemy],
    session: &mut SessionState,
    tick: u64,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !player.alive {
        return false;
    }
    let bounds = player.bounds();

    if let Some(idx) = missiles
        .iter()
        .position(|m| m.owner == MissileOwner::Enemy && m.bounds().overlaps(&bounds))
    {
        missiles.remove(idx);
        return true;
    }

    if let Some(enemy) = enemies
        .iter_mut()
        .find(|e| is_hittable(e, tick) && e.bounds().overlaps(&bounds))
    {
        log::debug!("Enemy {} rammed the player", enemy.id);
        enemy.kill();
        score_kill(enemy, session, events);
        return true;
    }

    false
}
