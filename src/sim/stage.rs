//! Stage catalogue and spawn scheduler
//!
//! Stages are plain data built on demand from a stage number. [`flatten`]
//! turns one into a time-ordered list of [`SpawnEvent`]s and the
//! [`StageScheduler`] hands them out as the stage clock passes their due
//! time.

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::formation::FormationSlot;
use super::path::{EnemyPath, PathStep};
use super::state::EnemyKind;
use crate::consts::*;
use crate::error::StageError;

/// Columns in the formation grid
pub const FORMATION_COLUMNS: u8 = 10;

/// Spawn origins just outside the stage
pub const TOP_LEFT: Vec2 = Vec2::new(100.0, 0.0);
pub const TOP_RIGHT: Vec2 = Vec2::new(124.0, 0.0);
pub const BOTTOM_LEFT: Vec2 = Vec2::new(0.0, 200.0);
pub const BOTTOM_RIGHT: Vec2 = Vec2::new(GAME_WIDTH, 200.0);

/// Pixels per ms along entry loops
const LOOP_SPEED: f32 = 0.12;

/// One enemy within a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub kind: EnemyKind,
    /// None for bonus-stage enemies that never join the formation
    pub slot: Option<FormationSlot>,
}

/// Shared path template for a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPattern {
    /// Drop from the top edge, then a full loop
    TopDive,
    /// Enter along a side, then loop up toward the formation
    SideLoop,
    /// Swing through the stage and leave off the bottom
    FlyThrough,
}

impl EntryPattern {
    /// Build a fresh step list for one enemy starting at `origin`
    ///
    /// Loops turn toward the centre line, so the same pattern mirrors with
    /// the origin's side.
    pub fn build(&self, origin: Vec2) -> Vec<PathStep> {
        let d = if origin.x < GAME_WIDTH / 2.0 { 1.0 } else { -1.0 };
        let mut steps = vec![PathStep::teleport(origin, Some(FRAC_PI_2))];

        match self {
            EntryPattern::TopDive => {
                let bottom = Vec2::new(origin.x, 150.0);
                let radius = 30.0;
                let (start, end) = if d > 0.0 { (PI, -PI) } else { (0.0, TAU) };
                steps.push(PathStep::move_linear(bottom, 900));
                steps.push(PathStep::move_arc_at_speed(
                    bottom + Vec2::new(d * radius, 0.0),
                    radius,
                    start,
                    end,
                    LOOP_SPEED,
                ));
            }
            EntryPattern::SideLoop => {
                let turn_x = GAME_WIDTH / 2.0 - d * 22.0;
                let radius = 40.0;
                let end = if d > 0.0 { -PI } else { TAU };
                steps.push(PathStep::move_linear(Vec2::new(turn_x, origin.y), 800));
                steps.push(PathStep::move_arc_at_speed(
                    Vec2::new(turn_x, origin.y - radius),
                    radius,
                    FRAC_PI_2,
                    end,
                    LOOP_SPEED,
                ));
            }
            EntryPattern::FlyThrough => {
                let top = Vec2::new(origin.x, 120.0);
                let radius = 40.0;
                let (start, end) = if d > 0.0 { (PI, 0.0) } else { (0.0, PI) };
                let exit_x = origin.x + d * 2.0 * radius;
                steps.push(PathStep::move_linear(top, 700));
                steps.push(PathStep::move_arc_at_speed(
                    top + Vec2::new(d * radius, 0.0),
                    radius,
                    start,
                    end,
                    LOOP_SPEED,
                ));
                steps.push(PathStep::move_linear(
                    Vec2::new(exit_x, GAME_HEIGHT + 32.0),
                    900,
                ));
            }
        }
        steps
    }
}

/// Enemies spawned from one origin along one path template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub enemies: Vec<EnemySpec>,
    pub origin: Vec2,
    pub pattern: EntryPattern,
    pub inter_enemy_delay_ms: u32,
}

/// Immutable stage definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub stage_number: u32,
    pub is_bonus: bool,
    pub waves: Vec<Wave>,
    pub inter_wave_delay_ms: u32,
}

impl Stage {
    /// A stage with nothing in it
    pub fn empty(stage_number: u32) -> Self {
        Self {
            stage_number,
            is_bonus: false,
            waves: Vec::new(),
            inter_wave_delay_ms: INTER_WAVE_DELAY_MS,
        }
    }

    pub fn enemy_count(&self) -> usize {
        self.waves.iter().map(|w| w.enemies.len()).sum()
    }
}

/// "Create this enemy at this time"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Relative to the start of the stage's Active time
    pub due_time_ms: u32,
    pub kind: EnemyKind,
    pub origin: Vec2,
    pub slot: Option<FormationSlot>,
    pub path: EnemyPath,
}

/// Bonus stages come every fourth stage starting at 3
pub fn is_bonus_stage(stage_number: u32) -> bool {
    stage_number % 4 == 3
}

/// Stage after `stage_number`, wrapping past the end of the catalogue
pub fn next_stage_number(stage_number: u32) -> u32 {
    if stage_number >= MAX_STAGE {
        1
    } else {
        stage_number + 1
    }
}

/// Look up a stage definition
pub fn load_stage(stage_number: u32) -> Result<Stage, StageError> {
    if !(1..=MAX_STAGE).contains(&stage_number) {
        return Err(StageError::NoSuchStage {
            stage: stage_number,
        });
    }
    let stage = if is_bonus_stage(stage_number) {
        bonus_stage(stage_number)
    } else {
        regular_stage(stage_number)
    };
    log::info!(
        "Loaded stage {} ({} waves, {} enemies{})",
        stage_number,
        stage.waves.len(),
        stage.enemy_count(),
        if stage.is_bonus { ", bonus" } else { "" }
    );
    Ok(stage)
}

/// [`load_stage`], falling back to an empty stage
pub fn load_stage_or_empty(stage_number: u32) -> Stage {
    load_stage(stage_number).unwrap_or_else(|e| {
        log::warn!("{e}; using an empty stage");
        Stage::empty(stage_number)
    })
}

/// Turn a stage into its spawn schedule
pub fn flatten(stage: &Stage) -> Vec<SpawnEvent> {
    let mut events = Vec::with_capacity(stage.enemy_count());
    let mut clock = 0u32;
    for wave in &stage.waves {
        for spec in &wave.enemies {
            events.push(SpawnEvent {
                due_time_ms: clock,
                kind: spec.kind,
                origin: wave.origin,
                slot: spec.slot,
                path: EnemyPath::new(wave.pattern.build(wave.origin)),
            });
            clock = clock.saturating_add(wave.inter_enemy_delay_ms);
        }
        clock = clock.saturating_add(stage.inter_wave_delay_ms);
    }
    events
}

/// Declarative stage construction
struct StageBuilder {
    stage: Stage,
    mirrored: bool,
}

impl StageBuilder {
    fn new(stage_number: u32, is_bonus: bool) -> Self {
        Self {
            stage: Stage {
                stage_number,
                is_bonus,
                waves: Vec::new(),
                inter_wave_delay_ms: INTER_WAVE_DELAY_MS,
            },
            mirrored: false,
        }
    }

    /// Swap origins left/right and reflect slot columns
    fn mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    fn origin(&self, origin: Vec2) -> Vec2 {
        if self.mirrored {
            Vec2::new(GAME_WIDTH - origin.x, origin.y)
        } else {
            origin
        }
    }

    fn slot(&self, row: u8, col: u8) -> FormationSlot {
        if self.mirrored {
            FormationSlot::new(row, FORMATION_COLUMNS - 1 - col)
        } else {
            FormationSlot::new(row, col)
        }
    }

    fn wave(mut self, origin: Vec2, pattern: EntryPattern, enemies: &[(EnemyKind, u8, u8)]) -> Self {
        let enemies = enemies
            .iter()
            .map(|&(kind, row, col)| EnemySpec {
                kind,
                slot: Some(self.slot(row, col)),
            })
            .collect();
        let origin = self.origin(origin);
        self.stage.waves.push(Wave {
            enemies,
            origin,
            pattern,
            inter_enemy_delay_ms: INTER_ENEMY_DELAY_MS,
        });
        self
    }

    fn fly_through(mut self, origin: Vec2, kind: EnemyKind, count: usize) -> Self {
        let origin = self.origin(origin);
        self.stage.waves.push(Wave {
            enemies: vec![EnemySpec { kind, slot: None }; count],
            origin,
            pattern: EntryPattern::FlyThrough,
            inter_enemy_delay_ms: INTER_ENEMY_DELAY_MS,
        });
        self
    }

    fn build(self) -> Stage {
        self.stage
    }
}

/// Formation stage: 40 enemies over six waves
///
/// Stage 1 leads with Purples in the top row; later stages bring Bosses.
/// Even stages are mirrored.
fn regular_stage(stage_number: u32) -> Stage {
    use EnemyKind::*;
    use EntryPattern::*;

    let top = if stage_number == 1 { Purple } else { Boss };

    StageBuilder::new(stage_number, false)
        .mirrored(stage_number % 2 == 0)
        .wave(TOP_RIGHT, TopDive, &[(Bee, 3, 4), (Bee, 4, 4), (Bee, 3, 5), (Bee, 4, 5)])
        .wave(
            TOP_LEFT,
            TopDive,
            &[(Butterfly, 1, 4), (Butterfly, 1, 5), (Butterfly, 2, 4), (Butterfly, 2, 5)],
        )
        .wave(
            BOTTOM_LEFT,
            SideLoop,
            &[
                (top, 0, 3),
                (Butterfly, 1, 3),
                (top, 0, 4),
                (Butterfly, 2, 3),
                (top, 0, 5),
                (Butterfly, 1, 6),
                (top, 0, 6),
                (Butterfly, 2, 6),
            ],
        )
        .wave(
            BOTTOM_RIGHT,
            SideLoop,
            &[
                (Butterfly, 1, 1),
                (Butterfly, 2, 1),
                (Butterfly, 1, 2),
                (Butterfly, 2, 2),
                (Butterfly, 1, 7),
                (Butterfly, 2, 7),
                (Butterfly, 1, 8),
                (Butterfly, 2, 8),
            ],
        )
        .wave(
            TOP_RIGHT,
            TopDive,
            &[
                (Bee, 3, 2),
                (Bee, 4, 2),
                (Bee, 3, 3),
                (Bee, 4, 3),
                (Bee, 3, 6),
                (Bee, 4, 6),
                (Bee, 3, 7),
                (Bee, 4, 7),
            ],
        )
        .wave(
            TOP_LEFT,
            TopDive,
            &[
                (Bee, 3, 0),
                (Bee, 4, 0),
                (Bee, 3, 1),
                (Bee, 4, 1),
                (Bee, 3, 8),
                (Bee, 4, 8),
                (Bee, 3, 9),
                (Bee, 4, 9),
            ],
        )
        .build()
}

/// Bonus stage: five fly-through waves of eight, nothing joins the formation
fn bonus_stage(stage_number: u32) -> Stage {
    use EnemyKind::*;

    StageBuilder::new(stage_number, true)
        .mirrored(stage_number % 8 == 7)
        .fly_through(TOP_LEFT, Bee, 8)
        .fly_through(TOP_RIGHT, Butterfly, 8)
        .fly_through(TOP_LEFT, Trumpet, 8)
        .fly_through(TOP_RIGHT, Bee, 8)
        .fly_through(TOP_LEFT, Trumpet, 8)
        .build()
}

/// Hands out a stage's spawn events as the stage clock advances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageScheduler {
    pending: VecDeque<SpawnEvent>,
}

impl StageScheduler {
    pub fn new(stage: &Stage) -> Self {
        Self {
            pending: flatten(stage).into(),
        }
    }

    /// Remove and return every event due at or before `elapsed_ms`, in order
    pub fn pop_due(&mut self, elapsed_ms: u32) -> Vec<SpawnEvent> {
        let mut due = Vec::new();
        while self
            .pending
            .front()
            .is_some_and(|e| e.due_time_ms <= elapsed_ms)
        {
            if let Some(event) = self.pending.pop_front() {
                due.push(event);
            }
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Events not yet handed out
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::path::Pose;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_out_of_range_stages_fail() {
        assert_eq!(load_stage(0), Err(StageError::NoSuchStage { stage: 0 }));
        assert_eq!(load_stage(256), Err(StageError::NoSuchStage { stage: 256 }));
        assert!(load_stage(1).is_ok());
        assert!(load_stage(MAX_STAGE).is_ok());
    }

    #[test]
    fn test_empty_fallback() {
        let stage = load_stage_or_empty(0);
        assert!(stage.waves.is_empty());
        assert!(StageScheduler::new(&stage).is_empty());
    }

    #[test]
    fn test_stage_one_layout() {
        let stage = load_stage(1).unwrap();
        assert!(!stage.is_bonus);
        assert_eq!(stage.waves.len(), 6);
        assert_eq!(stage.enemy_count(), 40);

        let slots: HashSet<_> = stage
            .waves
            .iter()
            .flat_map(|w| w.enemies.iter().map(|e| e.slot.unwrap()))
            .collect();
        assert_eq!(slots.len(), 40, "every enemy has its own slot");

        let purples = stage
            .waves
            .iter()
            .flat_map(|w| &w.enemies)
            .filter(|e| e.kind == EnemyKind::Purple)
            .count();
        assert_eq!(purples, 4);
    }

    #[test]
    fn test_even_stages_are_mirrored() {
        let odd = load_stage(5).unwrap();
        let even = load_stage(2).unwrap();
        assert_eq!(odd.waves[0].origin, TOP_RIGHT);
        assert_eq!(even.waves[0].origin, TOP_LEFT);
        assert_eq!(odd.waves[0].enemies[0].slot, Some(FormationSlot::new(3, 4)));
        assert_eq!(even.waves[0].enemies[0].slot, Some(FormationSlot::new(3, 5)));
        assert_eq!(even.waves[2].enemies[0].kind, EnemyKind::Boss);
    }

    #[test]
    fn test_bonus_stages() {
        assert!(is_bonus_stage(3));
        assert!(is_bonus_stage(7));
        assert!(!is_bonus_stage(4));
        let stage = load_stage(3).unwrap();
        assert!(stage.is_bonus);
        assert_eq!(stage.enemy_count(), 40);
        assert!(stage.waves.iter().flat_map(|w| &w.enemies).all(|e| e.slot.is_none()));
    }

    #[test]
    fn test_next_stage_wraps() {
        assert_eq!(next_stage_number(1), 2);
        assert_eq!(next_stage_number(MAX_STAGE), 1);
    }

    #[test]
    fn test_flatten_accumulates_delays() {
        let stage = load_stage(1).unwrap();
        let events = flatten(&stage);
        assert_eq!(events.len(), 40);

        // First wave: four enemies, 150ms apart
        let first: Vec<u32> = events[..4].iter().map(|e| e.due_time_ms).collect();
        assert_eq!(first, vec![0, 150, 300, 450]);
        // Second wave starts after the last enemy's delay plus the wave gap
        assert_eq!(events[4].due_time_ms, 4 * INTER_ENEMY_DELAY_MS + INTER_WAVE_DELAY_MS);
        assert!(events.windows(2).all(|w| w[0].due_time_ms <= w[1].due_time_ms));
    }

    #[test]
    fn test_paths_start_at_origin() {
        for pattern in [EntryPattern::TopDive, EntryPattern::SideLoop, EntryPattern::FlyThrough] {
            for origin in [TOP_LEFT, TOP_RIGHT, BOTTOM_LEFT, BOTTOM_RIGHT] {
                let mut path = EnemyPath::new(pattern.build(origin));
                let pose = path.advance(0, Pose::default());
                assert_eq!(pose.pos, origin, "{pattern:?} from {origin}");
            }
        }
    }

    #[test]
    fn test_fly_through_exits_below() {
        let mut path = EnemyPath::new(EntryPattern::FlyThrough.build(TOP_LEFT));
        let mut pose = Pose::default();
        while !path.is_done() {
            pose = path.advance(16, pose);
        }
        assert!(pose.pos.y > GAME_HEIGHT);
    }

    #[test]
    fn test_side_loops_are_mirror_images() {
        let run = |origin: Vec2| {
            let mut path = EnemyPath::new(EntryPattern::SideLoop.build(origin));
            let mut pose = Pose::default();
            while !path.is_done() {
                pose = path.advance(16, pose);
            }
            pose.pos
        };
        let left = run(BOTTOM_LEFT);
        let right = run(BOTTOM_RIGHT);
        assert!((left.x - (GAME_WIDTH - right.x)).abs() < 1e-3);
        assert!((left.y - right.y).abs() < 1e-3);
    }

    #[test]
    fn test_pop_due_in_order_once() {
        let stage = load_stage(1).unwrap();
        let mut scheduler = StageScheduler::new(&stage);
        assert_eq!(scheduler.remaining(), 40);

        let due = scheduler.pop_due(150);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].due_time_ms, 0);
        assert_eq!(due[1].due_time_ms, 150);

        assert!(scheduler.pop_due(150).is_empty());
        assert_eq!(scheduler.remaining(), 38);

        let rest = scheduler.pop_due(u32::MAX);
        assert_eq!(rest.len(), 38);
        assert!(scheduler.is_empty());
    }

    proptest! {
        #[test]
        fn prop_flatten_is_idempotent(n in 1u32..=MAX_STAGE) {
            let stage = load_stage(n).unwrap();
            prop_assert_eq!(flatten(&stage), flatten(&stage));
        }

        #[test]
        fn prop_stage_loading_is_pure(n in 1u32..=MAX_STAGE) {
            prop_assert_eq!(load_stage(n).unwrap(), load_stage(n).unwrap());
        }
    }
}
