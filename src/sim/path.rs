//! Enemy paths
//!
//! An [`EnemyPath`] is an ordered list of [`PathStep`]s driven by a single
//! step timer. Each step is a closed variant dispatched by `match`; steps that
//! need a start point capture it on their first update. Paths are built fresh
//! for every enemy and never shared.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::interp::{arc_angle, arc_length, arc_point, lerp_point, progress};
use crate::consts::{MIN_STEP_DURATION_MS, POSITION_EPSILON};

/// Position and heading (radians) of a moving entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec2,
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            heading,
        }
    }
}

/// One motion directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathStepKind {
    /// Hold position for the duration
    Wait { duration_ms: u32 },
    /// Straight line from wherever the step begins
    MoveLinear {
        target: Vec2,
        duration_ms: u32,
        /// Captured on the first update
        start: Option<Vec2>,
    },
    /// Parametric sweep around `center`
    MoveArc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        duration_ms: u32,
        /// Face along the arc (angle + 90°)
        turn: bool,
    },
    /// Jump immediately
    TeleportTo { target: Vec2, heading: Option<f32> },
}

/// A path step plus its completion flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub kind: PathStepKind,
    pub done: bool,
}

impl PathStep {
    fn from_kind(kind: PathStepKind) -> Self {
        Self { kind, done: false }
    }

    pub fn wait(duration_ms: u32) -> Self {
        Self::from_kind(PathStepKind::Wait { duration_ms })
    }

    pub fn move_linear(target: Vec2, duration_ms: u32) -> Self {
        Self::from_kind(PathStepKind::MoveLinear {
            target,
            duration_ms: duration_ms.max(MIN_STEP_DURATION_MS),
            start: None,
        })
    }

    /// Arc with an explicit duration
    pub fn move_arc(
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        duration_ms: u32,
    ) -> Self {
        Self::from_kind(PathStepKind::MoveArc {
            center,
            radius,
            start_angle,
            end_angle,
            duration_ms: duration_ms.max(MIN_STEP_DURATION_MS),
            turn: true,
        })
    }

    /// Arc whose duration is its length divided by `speed` (pixels per ms)
    pub fn move_arc_at_speed(
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        speed: f32,
    ) -> Self {
        let length = arc_length(start_angle, end_angle, radius);
        let duration_ms = if speed > 0.0 {
            (length / speed).round() as u32
        } else {
            MIN_STEP_DURATION_MS
        };
        Self::move_arc(center, radius, start_angle, end_angle, duration_ms)
    }

    pub fn teleport(target: Vec2, heading: Option<f32>) -> Self {
        Self::from_kind(PathStepKind::TeleportTo { target, heading })
    }

    /// Keep heading fixed while following the arc
    pub fn without_turning(mut self) -> Self {
        if let PathStepKind::MoveArc { ref mut turn, .. } = self.kind {
            *turn = false;
        }
        self
    }

    /// Compute the pose after `step_timer_ms` in this step, setting `done`
    pub fn update(&mut self, step_timer_ms: u32, current: Pose) -> Pose {
        match &mut self.kind {
            PathStepKind::Wait { duration_ms } => {
                if step_timer_ms >= *duration_ms {
                    self.done = true;
                }
                current
            }
            PathStepKind::MoveLinear {
                target,
                duration_ms,
                start,
            } => {
                let from = *start.get_or_insert(current.pos);
                let t = progress(step_timer_ms, *duration_ms);
                let pos = lerp_point(from, *target, t);
                if t >= 1.0 || pos.distance(*target) <= POSITION_EPSILON {
                    self.done = true;
                    return Pose {
                        pos: *target,
                        heading: current.heading,
                    };
                }
                Pose {
                    pos,
                    heading: current.heading,
                }
            }
            PathStepKind::MoveArc {
                center,
                radius,
                start_angle,
                end_angle,
                duration_ms,
                turn,
            } => {
                let t = progress(step_timer_ms, *duration_ms);
                if t >= 1.0 {
                    self.done = true;
                }
                let angle = arc_angle(*start_angle, *end_angle, t);
                Pose {
                    pos: arc_point(*center, *radius, *start_angle, *end_angle, t),
                    heading: if *turn {
                        angle + std::f32::consts::FRAC_PI_2
                    } else {
                        current.heading
                    },
                }
            }
            PathStepKind::TeleportTo { target, heading } => {
                self.done = true;
                Pose {
                    pos: *target,
                    heading: heading.unwrap_or(current.heading),
                }
            }
        }
    }
}

/// Ordered sequence of path steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyPath {
    steps: Vec<PathStep>,
    cursor: usize,
    step_timer_ms: u32,
    done: bool,
    /// Pose produced by the final step, once done
    last: Option<Pose>,
}

impl EnemyPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        let done = steps.is_empty();
        Self {
            steps,
            cursor: 0,
            step_timer_ms: 0,
            done,
            last: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Index of the step currently running (None once done)
    pub fn current_index(&self) -> Option<usize> {
        if self.done { None } else { Some(self.cursor) }
    }

    /// Advance by `dt_ms` from the enemy's last known pose
    pub fn advance(&mut self, dt_ms: u32, current: Pose) -> Pose {
        if self.done {
            return self.last.unwrap_or(current);
        }

        self.step_timer_ms = self.step_timer_ms.saturating_add(dt_ms);
        let step = &mut self.steps[self.cursor];
        let pose = step.update(self.step_timer_ms, current);

        if step.done {
            self.step_timer_ms = 0;
            if self.cursor + 1 < self.steps.len() {
                self.cursor += 1;
            } else {
                self.done = true;
                self.last = Some(pose);
            }
        }
        pose
    }
}
