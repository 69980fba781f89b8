//! Formation position function
//!
//! Stateless: the slot position depends only on the slot and the session
//! clock, so every enemy in formation re-evaluates it each tick and the whole
//! grid "breathes" in lockstep.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Logical (row, col) position within the formation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormationSlot {
    pub row: u8,
    pub col: u8,
}

impl FormationSlot {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Cycle phase in radians for a session time
fn cycle_phase(session_time_ms: u64) -> f32 {
    let t = (session_time_ms % FORMATION_CYCLE_MS) as f32 / FORMATION_CYCLE_MS as f32;
    TAU * t
}

/// Extra pixels between cells at this point of the cycle
pub fn formation_spread(session_time_ms: u64) -> f32 {
    let phi = cycle_phase(session_time_ms);
    let mid = (FORMATION_MIN_SPREAD + FORMATION_MAX_SPREAD) / 2.0;
    (mid + phi.sin() * (FORMATION_MAX_SPREAD - FORMATION_MIN_SPREAD)).round()
}

/// Horizontal sway at this point of the cycle
pub fn formation_x_offset(session_time_ms: u64) -> f32 {
    let phi = cycle_phase(session_time_ms);
    ((2.0 * phi).sin() * FORMATION_MAX_X_OFFSET).round()
}

/// Target position of a formation slot at `session_time_ms`
pub fn formation_position(row: u8, col: u8, session_time_ms: u64) -> Vec2 {
    let spread = formation_spread(session_time_ms);
    let x_offset = formation_x_offset(session_time_ms);
    let pitch = FORMATION_CELL + spread;
    Vec2::new(
        FORMATION_X_ORIGIN + x_offset + col as f32 * pitch,
        FORMATION_Y_OFFSET + row as f32 * pitch,
    )
}

/// [`formation_position`] for a slot
pub fn slot_position(slot: FormationSlot, session_time_ms: u64) -> Vec2 {
    formation_position(slot.row, slot.col, session_time_ms)
}
