//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically. Within one
//! tick the order is fixed: continuous timers, phase timer, spawn intake,
//! enemy advance, player and missiles, collisions, then bookkeeping. A phase
//! change decided during the tick is applied once, at the very end.

use std::cmp::Ordering;

use super::collision::{in_stage_bounds, resolve_missile_hits, resolve_player_hits};
use super::formation::slot_position;
use super::path::{EnemyPath, PathStep};
use super::stage::{StageScheduler, load_stage_or_empty, next_stage_number};
use super::state::{
    AudioCue, EffectKind, Enemy, EnemyMode, GameEvent, GamePhase, GameState, Missile,
    MissileOwner, Player,
};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Elapsed time since the previous tick
    pub dt_ms: u32,
    pub left_held: bool,
    pub right_held: bool,
    pub fire_pressed: bool,
    /// Demo mode - steer under the nearest enemy and keep firing
    pub autopilot: bool,
}

impl TickInput {
    /// Input with only a time step
    pub fn idle(dt_ms: u32) -> Self {
        Self {
            dt_ms,
            ..Default::default()
        }
    }
}

/// Advance the game state by one tick and return the events it produced
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.is_finished() {
        return events;
    }

    let dt = input.dt_ms.min(state.max_dt_ms);
    state.time_ticks += 1;
    state.time_ms += dt as u64;

    // Timers that run regardless of phase
    state.animation_beat.advance(dt);
    state.text_flash.advance(dt);
    state.stars.update(dt);
    if state.badges.advance(dt, state.timings.stage_badge_ms) {
        events.push(GameEvent::PlayAudioCue {
            cue: AudioCue::StageAward,
        });
    }

    let input = if input.autopilot {
        autopilot_input(state, input)
    } else {
        input.clone()
    };

    state.phase_timer_ms = state.phase_timer_ms.saturating_add(dt);
    let next = match state.phase {
        GamePhase::Starting => update_starting(state, &mut events),
        GamePhase::StageAnnounce => {
            (state.phase_timer_ms >= state.timings.stage_ms).then_some(GamePhase::Ready)
        }
        GamePhase::Ready => {
            (state.phase_timer_ms >= state.timings.ready_ms).then_some(GamePhase::Active)
        }
        GamePhase::Active => update_active(state, &input, dt, &mut events),
        GamePhase::PlayerReform => {
            spawn_player(state, &mut events);
            Some(GamePhase::Ready)
        }
        GamePhase::GameOver => {
            update_game_over(state, &mut events);
            None
        }
    };

    if let Some(new_phase) = next {
        enter_phase(state, new_phase, &mut events);
    }
    events
}

fn update_starting(state: &mut GameState, events: &mut Vec<GameEvent>) -> Option<GamePhase> {
    if !state.has_played_intro && state.phase_timer_ms >= state.timings.start_noise_wait_ms {
        state.has_played_intro = true;
        events.push(GameEvent::PlayAudioCue {
            cue: AudioCue::Theme,
        });
    }
    (state.phase_timer_ms >= state.timings.start_duration_ms()).then_some(GamePhase::StageAnnounce)
}

fn update_game_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase_timer_ms >= state.timings.game_over_ms {
        log::info!(
            "Session finished: score {}, high score {}, {} hits / {} shots",
            state.session.score,
            state.session.high_score,
            state.session.hits,
            state.session.shots_fired
        );
        state.finish();
        events.push(GameEvent::SessionFinished {
            score: state.session.score,
            high_score: state.session.high_score,
        });
    }
}

fn update_active(
    state: &mut GameState,
    input: &TickInput,
    dt: u32,
    events: &mut Vec<GameEvent>,
) -> Option<GamePhase> {
    state.stage_elapsed_ms = state.stage_elapsed_ms.saturating_add(dt);

    // Spawn intake
    for event in state.scheduler.pop_due(state.stage_elapsed_ms) {
        let id = state.next_entity_id();
        log::debug!(
            "Spawning enemy {} ({:?}) at {} for slot {:?}",
            id,
            event.kind,
            event.origin,
            event.slot
        );
        state.enemies.push(Enemy::new(
            id,
            event.kind,
            event.origin,
            event.slot,
            event.path,
            state.time_ticks,
        ));
    }

    advance_enemies(state, dt);
    update_player(state, input, dt, events);
    advance_missiles(&mut state.missiles, dt);

    let now = state.time_ticks;
    let hits = resolve_missile_hits(
        &mut state.missiles,
        &mut state.enemies,
        &mut state.session,
        now,
        events,
    );
    if hits > 0 {
        log::debug!(
            "{} hit(s) at {}ms, score {}",
            hits,
            state.stage_elapsed_ms,
            state.session.score
        );
    }
    let player_destroyed = resolve_player_hits(
        &state.player,
        &mut state.missiles,
        &mut state.enemies,
        &mut state.session,
        now,
        events,
    );

    if player_destroyed {
        destroy_player(state, events);
        return Some(if state.session.lives_remaining > 0 {
            GamePhase::PlayerReform
        } else {
            GamePhase::GameOver
        });
    }

    if state.scheduler.is_empty() && state.enemies.is_empty() {
        log::info!("Stage {} cleared", state.session.stage_number);
        return Some(GamePhase::StageAnnounce);
    }
    None
}

/// What an enemy's update decided for it
enum EnemyStep {
    Stay,
    Join,
    Settle,
    Remove,
}

fn advance_enemies(state: &mut GameState, dt: u32) {
    let tick = state.time_ticks;
    let now_ms = state.time_ms;
    let join_ms = state.timings.join_formation_ms;
    let death_ms = state.timings.death_animation_ms;

    state.enemies.retain_mut(|enemy| {
        // Created this tick; starts moving next tick
        if enemy.spawn_tick == tick {
            return true;
        }

        let step = match &mut enemy.mode {
            EnemyMode::Entering(path) => {
                enemy.pose = path.advance(dt, enemy.pose);
                if path.is_done() {
                    EnemyStep::Join
                } else {
                    EnemyStep::Stay
                }
            }
            EnemyMode::Joining(path) => {
                enemy.pose = path.advance(dt, enemy.pose);
                if path.is_done() {
                    EnemyStep::Settle
                } else {
                    EnemyStep::Stay
                }
            }
            EnemyMode::InFormation => {
                if let Some(slot) = enemy.slot {
                    enemy.pose.pos = slot_position(slot, now_ms);
                }
                EnemyStep::Stay
            }
            EnemyMode::Dying { elapsed_ms } => {
                *elapsed_ms = elapsed_ms.saturating_add(dt);
                if *elapsed_ms >= death_ms {
                    EnemyStep::Remove
                } else {
                    EnemyStep::Stay
                }
            }
        };

        match step {
            EnemyStep::Stay => true,
            EnemyStep::Join => match enemy.slot {
                Some(slot) => {
                    let target = slot_position(slot, now_ms);
                    enemy.mode = EnemyMode::Joining(EnemyPath::new(vec![PathStep::move_linear(
                        target, join_ms,
                    )]));
                    true
                }
                None => {
                    log::debug!("Enemy {} left the playfield", enemy.id);
                    false
                }
            },
            EnemyStep::Settle => {
                enemy.mode = EnemyMode::InFormation;
                true
            }
            EnemyStep::Remove => false,
        }
    });
}

fn update_player(
    state: &mut GameState,
    input: &TickInput,
    dt: u32,
    events: &mut Vec<GameEvent>,
) {
    if !state.can_control_player || !state.player.alive {
        return;
    }

    let direction = if input.right_held {
        1.0
    } else if input.left_held {
        -1.0
    } else {
        0.0
    };
    let half_width = PLAYER_WIDTH / 2.0;
    state.player.pos.x = (state.player.pos.x + direction * PLAYER_SPEED * dt as f32)
        .clamp(half_width, GAME_WIDTH - half_width);

    let cooled_down = state.last_fire_ms.is_none_or(|last| {
        state.time_ms.saturating_sub(last) >= state.timings.fire_cooldown_ms as u64
    });
    if input.fire_pressed && cooled_down {
        let id = state.next_entity_id();
        state.missiles.push(Missile {
            id,
            pos: state.player.muzzle(),
            vel: glam::Vec2::new(0.0, -MISSILE_SPEED),
            owner: MissileOwner::Player,
        });
        state.last_fire_ms = Some(state.time_ms);
        state.session.shots_fired += 1;
        events.push(GameEvent::PlayAudioCue {
            cue: AudioCue::FighterFire,
        });
    }
}

fn advance_missiles(missiles: &mut Vec<Missile>, dt: u32) {
    for missile in missiles.iter_mut() {
        missile.pos += missile.vel * dt as f32;
    }
    missiles.retain(in_stage_bounds);
}

fn destroy_player(state: &mut GameState, events: &mut Vec<GameEvent>) {
    log::info!(
        "Player destroyed on stage {} ({} lives left)",
        state.session.stage_number,
        state.session.lives_remaining
    );
    state.player.alive = false;
    state.can_control_player = false;
    events.push(GameEvent::SpawnVisualEffect {
        kind: EffectKind::PlayerExplosion,
        x: state.player.pos.x,
        y: state.player.pos.y,
    });
    events.push(GameEvent::PlayAudioCue {
        cue: AudioCue::Explosion,
    });
}

/// Put a fresh ship on the field; every spawn costs a life
fn spawn_player(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.session.lives_remaining = state.session.lives_remaining.saturating_sub(1);
    events.push(GameEvent::LivesChanged {
        lives: state.session.lives_remaining,
    });
    state.player = Player {
        alive: true,
        ..Player::default()
    };
    state.missiles.clear();
    state.last_fire_ms = None;
}

/// Load a stage and reset its per-stage state
fn begin_stage(state: &mut GameState, stage_number: u32) {
    let stage = load_stage_or_empty(stage_number);
    state.session.stage_number = stage_number;
    state.is_bonus_stage = stage.is_bonus;
    state.scheduler = StageScheduler::new(&stage);
    state.stage_elapsed_ms = 0;
    state.badges.start(stage_number);
    state.missiles.clear();
}

fn enter_phase(state: &mut GameState, new: GamePhase, events: &mut Vec<GameEvent>) {
    let old = state.phase;
    state.phase = new;
    state.phase_timer_ms = 0;
    log::info!("Phase {} -> {}", old.as_str(), new.as_str());
    events.push(GameEvent::PhaseChanged { old, new });

    match (old, new) {
        (GamePhase::Starting, GamePhase::StageAnnounce) => {
            spawn_player(state, events);
            begin_stage(state, 1);
        }
        (_, GamePhase::StageAnnounce) => {
            state.can_control_player = false;
            begin_stage(state, next_stage_number(state.session.stage_number));
        }
        (GamePhase::StageAnnounce, GamePhase::Ready) => {
            state.stars.set_moving(true);
        }
        (_, GamePhase::Active) => {
            state.can_control_player = true;
        }
        (_, GamePhase::GameOver) => {
            events.push(GameEvent::PlayAudioCue {
                cue: AudioCue::GameOver,
            });
        }
        _ => {}
    }
}

/// Demo input: line up under the nearest live enemy and fire
fn autopilot_input(state: &GameState, input: &TickInput) -> TickInput {
    let player_x = state.player.pos.x;
    let target = state
        .live_enemies()
        .map(|e| e.pose.pos.x)
        .min_by(|a, b| {
            (a - player_x)
                .abs()
                .partial_cmp(&(b - player_x).abs())
                .unwrap_or(Ordering::Equal)
        });

    let (left_held, right_held) = match target {
        Some(x) if x > player_x + 2.0 => (false, true),
        Some(x) if x < player_x - 2.0 => (true, false),
        _ => (false, false),
    };
    TickInput {
        dt_ms: input.dt_ms,
        left_held,
        right_held,
        fire_pressed: target.is_some(),
        autopilot: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::EnemyKind;
    use glam::Vec2;

    fn new_state() -> GameState {
        GameState::new(&Settings::default(), 0)
    }

    /// Tick with `dt` until `phase` is reached (or give up)
    fn run_until(state: &mut GameState, phase: GamePhase, dt: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            if state.phase == phase {
                break;
            }
            events.extend(tick(state, &TickInput::idle(dt)));
        }
        assert_eq!(state.phase, phase, "never reached {phase:?}");
        events
    }

    /// Active phase with nothing scheduled and the ship in place
    fn bare_active_state() -> GameState {
        let mut state = new_state();
        state.phase = GamePhase::Active;
        state.session.stage_number = 1;
        state.session.lives_remaining = 2;
        state.player.alive = true;
        state.can_control_player = true;
        state
    }

    fn parked_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) {
        let id = state.next_entity_id();
        let mut enemy = Enemy::new(id, kind, pos, None, EnemyPath::new(Vec::new()), 0);
        enemy.mode = EnemyMode::InFormation;
        state.enemies.push(enemy);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = new_state();
        tick(&mut state, &TickInput::idle(5_000));
        assert_eq!(state.time_ms, MAX_DT_MS as u64);
        assert_eq!(state.phase_timer_ms, MAX_DT_MS);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_intro_theme_plays_once() {
        let mut state = new_state();
        let mut themes = 0;
        for _ in 0..10 {
            themes += tick(&mut state, &TickInput::idle(100))
                .iter()
                .filter(|e| **e == GameEvent::PlayAudioCue { cue: AudioCue::Theme })
                .count();
        }
        assert_eq!(themes, 1);
        assert!(state.has_played_intro);
    }

    #[test]
    fn test_start_sequence_to_active() {
        let mut state = new_state();
        let timings = state.timings.clone();

        for _ in 0..timings.start_duration_ms() / 100 {
            tick(&mut state, &TickInput::idle(100));
        }
        assert_eq!(state.phase, GamePhase::StageAnnounce);
        assert_eq!(state.session.stage_number, 1);
        assert!(state.player.alive);
        assert!(!state.stars.is_moving());

        for _ in 0..timings.stage_ms / 100 {
            tick(&mut state, &TickInput::idle(100));
        }
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.stars.is_moving());
        assert!(!state.can_control_player);

        for _ in 0..timings.ready_ms / 100 {
            tick(&mut state, &TickInput::idle(100));
        }
        assert_eq!(state.phase, GamePhase::Active);
        assert!(state.can_control_player);
        assert_eq!(state.session.lives_remaining, INITIAL_LIVES - 1);
    }

    #[test]
    fn test_phase_changes_are_reported() {
        let mut state = new_state();
        let events = run_until(&mut state, GamePhase::Active, 100);
        let changes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { old, new } => Some((*old, *new)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (GamePhase::Starting, GamePhase::StageAnnounce),
                (GamePhase::StageAnnounce, GamePhase::Ready),
                (GamePhase::Ready, GamePhase::Active),
            ]
        );
        assert!(events.contains(&GameEvent::LivesChanged { lives: 2 }));
    }

    #[test]
    fn test_stage_one_badge_chimes_once() {
        let mut state = new_state();
        run_until(&mut state, GamePhase::StageAnnounce, 100);
        let events = run_until(&mut state, GamePhase::Ready, 100);
        let chimes = events
            .iter()
            .filter(|e| **e == GameEvent::PlayAudioCue { cue: AudioCue::StageAward })
            .count();
        assert_eq!(chimes, 1);
        assert_eq!(state.badges.shown, 1);
    }

    #[test]
    fn test_high_stage_chimes_for_every_badge() {
        let mut state = bare_active_state();
        state.session.stage_number = 148;

        let mut events = Vec::new();
        // Announce (1.6s) is one chime short of nine; the rest land in Ready
        for _ in 0..40 {
            events.extend(tick(&mut state, &TickInput::idle(100)));
        }
        assert_eq!(state.session.stage_number, 149);
        assert_eq!(state.badges.total(), 9);
        assert!(state.badges.is_complete());
        let chimes = events
            .iter()
            .filter(|e| **e == GameEvent::PlayAudioCue { cue: AudioCue::StageAward })
            .count();
        assert_eq!(chimes, 9);
        assert_eq!(state.badges.shown, 9);
    }

    /// Flag samples at every 80ms boundary, dying after 1s of Active
    fn sample_flags(dt: u32, total_ms: u64) -> Vec<(u64, GamePhase, bool, bool)> {
        let mut state = new_state();
        let mut samples = Vec::new();
        let mut doomed = false;
        while state.time_ms < total_ms && !state.is_finished() {
            if !doomed && state.phase == GamePhase::Active && state.stage_elapsed_ms >= 1_000 {
                state.session.lives_remaining = 0;
                let pos = state.player.pos;
                state.spawn_enemy_missile(pos, 0.0);
                doomed = true;
            }
            tick(&mut state, &TickInput::idle(dt));
            if state.time_ms % 80 == 0 {
                samples.push((
                    state.time_ms,
                    state.phase,
                    state.animation_flag(),
                    state.show_1up(),
                ));
            }
        }
        samples
    }

    #[test]
    fn test_beat_and_flash_run_in_every_phase() {
        let timings = new_state().timings;
        let coarse = sample_flags(80, 13_600);
        let fine = sample_flags(16, 13_600);
        assert_eq!(coarse.len(), fine.len());

        for (&(t, _, beat, flash), &(t_fine, _, beat_fine, flash_fine)) in coarse.iter().zip(&fine) {
            assert_eq!(t, t_fine);
            assert_eq!(beat, beat_fine, "beat differs at {t}ms");
            assert_eq!(flash, flash_fine, "flash differs at {t}ms");
            assert_eq!(beat, (t / timings.enemy_animation_freq_ms as u64) % 2 == 1);
            assert_eq!(flash, (t / timings.text_flash_freq_ms as u64) % 2 == 0);
        }

        for phase in [
            GamePhase::Starting,
            GamePhase::StageAnnounce,
            GamePhase::Active,
            GamePhase::GameOver,
        ] {
            for samples in [&coarse, &fine] {
                let in_phase: Vec<_> = samples.iter().filter(|s| s.1 == phase).collect();
                assert!(in_phase.iter().any(|s| s.2) && in_phase.iter().any(|s| !s.2), "beat stuck in {phase:?}");
                assert!(in_phase.iter().any(|s| s.3) && in_phase.iter().any(|s| !s.3), "flash stuck in {phase:?}");
            }
        }
    }

    #[test]
    fn test_spawned_enemy_waits_one_tick() {
        let mut state = new_state();
        run_until(&mut state, GamePhase::Active, 100);

        tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.enemies.len(), 1);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.spawn_tick, state.time_ticks);
        assert!(matches!(&enemy.mode, EnemyMode::Entering(path) if path.current_index() == Some(0)));

        tick(&mut state, &TickInput::idle(16));
        assert!(matches!(&state.enemies[0].mode, EnemyMode::Entering(path) if path.current_index() != Some(0)));
    }

    #[test]
    fn test_enemy_reaches_formation() {
        let mut state = new_state();
        run_until(&mut state, GamePhase::Active, 100);

        for _ in 0..2_000 {
            tick(&mut state, &TickInput::idle(16));
            if state.enemies.first().is_some_and(Enemy::in_formation) {
                break;
            }
        }
        assert!(state.enemies[0].in_formation());

        tick(&mut state, &TickInput::idle(16));
        let enemy = &state.enemies[0];
        let slot = enemy.slot.unwrap();
        assert_eq!(enemy.pose.pos, slot_position(slot, state.time_ms));
    }

    #[test]
    fn test_player_movement() {
        let mut state = bare_active_state();
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        let start_x = state.player.pos.x;

        let both = TickInput {
            dt_ms: 100,
            left_held: true,
            right_held: true,
            ..Default::default()
        };
        tick(&mut state, &both);
        assert!((state.player.pos.x - (start_x + PLAYER_SPEED * 100.0)).abs() < 1e-3);

        let left = TickInput {
            dt_ms: 100,
            left_held: true,
            ..Default::default()
        };
        for _ in 0..50 {
            tick(&mut state, &left);
        }
        assert_eq!(state.player.pos.x, PLAYER_WIDTH / 2.0);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut state = bare_active_state();
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        let fire = TickInput {
            dt_ms: 100,
            fire_pressed: true,
            ..Default::default()
        };

        let events = tick(&mut state, &fire);
        assert!(events.contains(&GameEvent::PlayAudioCue { cue: AudioCue::FighterFire }));
        tick(&mut state, &fire);
        assert_eq!(state.session.shots_fired, 1);
        tick(&mut state, &fire);
        assert_eq!(state.session.shots_fired, 2);
    }

    #[test]
    fn test_no_control_outside_active() {
        let mut state = new_state();
        run_until(&mut state, GamePhase::Ready, 100);
        let x = state.player.pos.x;
        tick(
            &mut state,
            &TickInput {
                dt_ms: 100,
                right_held: true,
                fire_pressed: true,
                ..Default::default()
            },
        );
        assert_eq!(state.player.pos.x, x);
        assert_eq!(state.session.shots_fired, 0);
    }

    #[test]
    fn test_missile_kills_enemy_and_scores() {
        let mut state = bare_active_state();
        let x = state.player.pos.x;
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(x, 150.0));

        let mut events = tick(
            &mut state,
            &TickInput {
                dt_ms: 16,
                fire_pressed: true,
                ..Default::default()
            },
        );
        for _ in 0..40 {
            events.extend(tick(&mut state, &TickInput::idle(16)));
            if state.session.hits > 0 {
                break;
            }
        }

        assert_eq!(state.session.score, SCORE_BEE);
        assert_eq!(state.session.hits, 1);
        assert!(state.missiles.is_empty());
        assert!(!state.enemies[0].alive);
        assert!(events.contains(&GameEvent::ScoreChanged { new_score: SCORE_BEE }));
        assert!(events.contains(&GameEvent::PlayAudioCue { cue: AudioCue::EnemyHit }));
    }

    #[test]
    fn test_missiles_leave_the_stage() {
        let mut state = bare_active_state();
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        tick(
            &mut state,
            &TickInput {
                dt_ms: 16,
                fire_pressed: true,
                ..Default::default()
            },
        );
        assert_eq!(state.missiles.len(), 1);
        for _ in 0..10 {
            tick(&mut state, &TickInput::idle(100));
        }
        assert!(state.missiles.is_empty());
        assert_eq!(state.session.hits, 0);
    }

    #[test]
    fn test_death_reforms_and_costs_a_life() {
        let mut state = bare_active_state();
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        let pos = state.player.pos;
        state.spawn_enemy_missile(pos, 0.0);

        let events = tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.phase, GamePhase::PlayerReform);
        assert!(!state.player.alive);
        assert!(!state.can_control_player);
        assert!(events.contains(&GameEvent::PlayAudioCue { cue: AudioCue::Explosion }));

        // Reform is a single-tick pass-through
        let events = tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.player.alive);
        assert_eq!(state.session.lives_remaining, 1);
        assert!(events.contains(&GameEvent::LivesChanged { lives: 1 }));

        run_until(&mut state, GamePhase::Active, 100);
        assert!(state.can_control_player);
    }

    #[test]
    fn test_last_death_ends_session() {
        let mut state = bare_active_state();
        state.session.lives_remaining = 0;
        state.session.score = 1200;
        state.session.high_score = 1200;
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        let pos = state.player.pos;
        state.spawn_enemy_missile(pos, 0.0);

        let events = tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::PlayAudioCue { cue: AudioCue::GameOver }));

        let mut finished = Vec::new();
        for _ in 0..100 {
            finished.extend(
                tick(&mut state, &TickInput::idle(100))
                    .into_iter()
                    .filter(|e| matches!(e, GameEvent::SessionFinished { .. })),
            );
        }
        assert!(state.is_finished());
        assert_eq!(
            finished,
            vec![GameEvent::SessionFinished {
                score: 1200,
                high_score: 1200
            }]
        );

        let ticks = state.time_ticks;
        assert!(tick(&mut state, &TickInput::idle(100)).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_cleared_stage_announces_next() {
        let mut state = bare_active_state();
        tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.phase, GamePhase::StageAnnounce);
        assert_eq!(state.session.stage_number, 2);
        assert_eq!(state.scheduler.remaining(), 40);
        assert!(!state.can_control_player);
    }

    #[test]
    fn test_stage_wraps_after_last() {
        let mut state = bare_active_state();
        state.session.stage_number = MAX_STAGE;
        tick(&mut state, &TickInput::idle(16));
        assert_eq!(state.session.stage_number, 1);
    }

    #[test]
    fn test_dying_enemy_blocks_stage_clear() {
        let mut state = bare_active_state();
        parked_enemy(&mut state, EnemyKind::Bee, Vec2::new(20.0, 60.0));
        state.enemies[0].kill();

        tick(&mut state, &TickInput::idle(100));
        assert_eq!(state.phase, GamePhase::Active);
        for _ in 0..10 {
            tick(&mut state, &TickInput::idle(100));
        }
        assert_eq!(state.phase, GamePhase::StageAnnounce);
    }

    #[test]
    fn test_autopilot_scores() {
        let mut state = new_state();
        run_until(&mut state, GamePhase::Active, 100);
        let input = TickInput {
            dt_ms: 16,
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..3_000 {
            tick(&mut state, &input);
        }
        assert!(state.session.shots_fired > 0);
        assert!(state.session.score > 0);
    }

    #[test]
    fn test_determinism() {
        // Two sessions fed the same inputs end in identical states
        let mut state1 = new_state();
        let mut state2 = new_state();

        let inputs = [
            TickInput::idle(16),
            TickInput {
                dt_ms: 33,
                right_held: true,
                fire_pressed: true,
                ..Default::default()
            },
            TickInput {
                dt_ms: 250,
                left_held: true,
                ..Default::default()
            },
            TickInput {
                dt_ms: 16,
                autopilot: true,
                ..Default::default()
            },
        ];

        for i in 0..2_000 {
            let input = &inputs[i % inputs.len()];
            let events1 = tick(&mut state1, input);
            let events2 = tick(&mut state2, input);
            assert_eq!(events1, events2);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(
            serde_json::to_string(&state1).unwrap(),
            serde_json::to_string(&state2).unwrap()
        );
    }
}
