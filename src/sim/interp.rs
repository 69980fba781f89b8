//! Interpolation primitives
//!
//! Pure functions mapping a progress fraction to a 2D point. Progress is
//! always clamped to [0, 1] by [`progress`] before it reaches these.

use glam::Vec2;

use crate::{lerp, polar_to_cartesian};

/// Fraction of `duration_ms` covered by `elapsed_ms`, clamped to [0, 1]
#[inline]
pub fn progress(elapsed_ms: u32, duration_ms: u32) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f32 / duration_ms as f32).clamp(0.0, 1.0)
}

/// Point on the segment `start → end`
#[inline]
pub fn lerp_point(start: Vec2, end: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp(start.x, end.x, t), lerp(start.y, end.y, t))
}

/// Angle swept linearly from `start_angle` to `end_angle`
#[inline]
pub fn arc_angle(start_angle: f32, end_angle: f32, t: f32) -> f32 {
    lerp(start_angle, end_angle, t)
}

/// Point on a circular arc around `center`
pub fn arc_point(center: Vec2, radius: f32, start_angle: f32, end_angle: f32, t: f32) -> Vec2 {
    center + polar_to_cartesian(radius, arc_angle(start_angle, end_angle, t))
}

/// Length of the arc between two angles
#[inline]
pub fn arc_length(start_angle: f32, end_angle: f32, radius: f32) -> f32 {
    (end_angle - start_angle).abs() * radius.abs()
}
