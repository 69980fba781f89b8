//! Background star field
//!
//! Positions are drawn once from a seeded [`Pcg32`] so a session's sky is
//! reproducible; after that the field is advanced purely by elapsed time.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

pub const NUM_STARS: usize = 64;

/// Scroll speed per layer (pixels per ms)
pub const LAYER_SPEEDS: [f32; 2] = [0.050, 0.075];

/// Twinkle phases as (shown ms, hidden ms)
pub const TWINKLE_PHASES: [(u32, u32); 5] = [(150, 140), (210, 200), (310, 300), (410, 300), (510, 300)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub layer: u8,
    pub twinkle_phase: u8,
}

/// Shared on/off cycle for every star in one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Twinkle {
    show_ms: u32,
    hide_ms: u32,
    timer_ms: u32,
    visible: bool,
}

impl Twinkle {
    fn new((show_ms, hide_ms): (u32, u32)) -> Self {
        Self {
            show_ms: show_ms.max(1),
            hide_ms: hide_ms.max(1),
            timer_ms: 0,
            visible: true,
        }
    }

    fn advance(&mut self, dt_ms: u32) {
        let limit = if self.visible { self.show_ms } else { self.hide_ms };
        self.timer_ms = self.timer_ms.saturating_add(dt_ms);
        if self.timer_ms >= limit {
            self.timer_ms = 0;
            self.visible = !self.visible;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarField {
    stars: Vec<Star>,
    twinkles: Vec<Twinkle>,
    moving: bool,
}

impl StarField {
    /// Scatter [`NUM_STARS`] stars using `seed`; scrolling starts stopped
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..NUM_STARS)
            .map(|_| Star {
                pos: Vec2::new(
                    rng.random_range(0.0..GAME_WIDTH).floor(),
                    rng.random_range(0.0..GAME_HEIGHT).floor(),
                ),
                layer: rng.random_range(0..LAYER_SPEEDS.len()) as u8,
                twinkle_phase: rng.random_range(0..TWINKLE_PHASES.len()) as u8,
            })
            .collect();
        Self {
            stars,
            twinkles: TWINKLE_PHASES.iter().copied().map(Twinkle::new).collect(),
            moving: false,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    pub fn update(&mut self, dt_ms: u32) {
        if self.moving {
            for star in &mut self.stars {
                let speed = LAYER_SPEEDS[star.layer as usize];
                star.pos.y = (star.pos.y + speed * dt_ms as f32).rem_euclid(GAME_HEIGHT);
            }
        }
        for twinkle in &mut self.twinkles {
            twinkle.advance(dt_ms);
        }
    }

    /// Pixel positions of stars currently shown
    pub fn visible(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.stars
            .iter()
            .filter(|s| self.twinkles[s.twinkle_phase as usize].visible)
            .map(|s| s.pos.round())
    }
}
