//! Procedural paths that trace the level outline: spiral, wave and star
//!
//! Radius is scaled by the outline so an enemy at progress == radius sits
//! exactly on the rim whatever the level shape.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{MoveContext, MovementController};
use crate::polar_to_cartesian;
use crate::sim::level::{STAR_INNER_RATIO, star_corner_angle};

/// Star paths switch between tip and corner every this fraction of the radius
pub const STAR_PHASE: f32 = 0.25;

/// Logarithmic-spiral approximation: angle grows linearly with progress
#[derive(Debug, Clone)]
pub struct SpiralMovement {
    start_angle: f32,
    /// Radians per unit of progress (signed)
    tightness: f32,
    angle: f32,
}

impl SpiralMovement {
    pub fn new(start_angle: f32, rng: &mut Pcg32) -> Self {
        let tightness = rng.random_range(0.15f32..0.35);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            start_angle,
            tightness: tightness * direction,
            angle: start_angle,
        }
    }

    pub fn tightness(&self) -> f32 {
        self.tightness
    }
}

impl MovementController for SpiralMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        self.angle = self.start_angle + ctx.progress * self.tightness;
        polar_to_cartesian(ctx.progress * ctx.level.outline_scale(self.angle), self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

/// Sways side to side around its start angle, wider as it climbs
#[derive(Debug, Clone)]
pub struct WaveMovement {
    start_angle: f32,
    /// Peak angular offset at the rim (radians)
    amplitude: f32,
    /// Full sways between center and rim
    frequency: f32,
    angle: f32,
}

impl WaveMovement {
    pub fn new(start_angle: f32, rng: &mut Pcg32) -> Self {
        Self {
            start_angle,
            amplitude: rng.random_range(0.3f32..0.6),
            frequency: rng.random_range(1.5f32..3.0),
            angle: start_angle,
        }
    }
}

impl MovementController for WaveMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let norm = ctx.normalized();
        self.angle = self.start_angle + self.amplitude * norm * (TAU * self.frequency * norm).sin();
        polar_to_cartesian(ctx.progress * ctx.level.outline_scale(self.angle), self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

/// Zigzags between a star tip and its neighbouring inner corner
#[derive(Debug, Clone)]
pub struct StarMovement {
    tip_angle: f32,
    /// Which corner to swing toward (+1 or -1)
    direction: f32,
    angle: f32,
}

impl StarMovement {
    pub fn new(tip_angle: f32, rng: &mut Pcg32) -> Self {
        Self {
            tip_angle,
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            angle: tip_angle,
        }
    }

    /// 0 at the tip angle, 1 at the inner corner
    fn corner_weight(progress: f32, radius: f32) -> f32 {
        let period = 2.0 * STAR_PHASE * radius;
        if period <= 0.0 {
            return 0.0;
        }
        let local = progress.rem_euclid(period) / period;
        1.0 - (2.0 * local - 1.0).abs()
    }
}

impl MovementController for StarMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let w = Self::corner_weight(ctx.progress, ctx.level.radius());
        let corner = star_corner_angle(self.tip_angle) - self.tip_angle;
        self.angle = self.tip_angle + self.direction * w * corner;
        let scale = 1.0 + (STAR_INNER_RATIO - 1.0) * w;
        polar_to_cartesian(ctx.progress * scale, self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}
