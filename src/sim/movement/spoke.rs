//! Lane-following movement: plain spokes and the bouncing crawl

use std::f32::consts::PI;

use glam::Vec2;

use super::{MoveContext, MovementController, radial_fallback};

/// Bounce phases are this fraction of the level radius long
pub const BOUNCE_PHASE: f32 = 0.2;
/// Peak backward step during a bounce phase, as a fraction of the radius
pub const BOUNCE_AMPLITUDE: f32 = 0.15;

/// Follows one spoke from the center to the rim
#[derive(Debug, Clone)]
pub struct SpokeMovement {
    spoke: usize,
    angle: f32,
}

impl SpokeMovement {
    pub fn new(spoke: usize, angle: f32) -> Self {
        Self { spoke, angle }
    }

    pub fn spoke(&self) -> usize {
        self.spoke
    }
}

/// Interpolate along a spoke at distance `distance`, or fall back to radial
fn along_spoke(ctx: &MoveContext<'_>, spoke: usize, angle: &mut f32, distance: f32) -> Vec2 {
    match ctx.level.spoke(spoke) {
        Some(s) => {
            *angle = s.angle;
            s.point_at(distance / ctx.level.radius())
        }
        None => radial_fallback(*angle, distance),
    }
}

impl MovementController for SpokeMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        along_spoke(ctx, self.spoke, &mut self.angle, ctx.progress)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

/// Effective distance for the bounce crawl: every other phase pulls back
/// along a half sine before surging forward again
pub fn bounce_distance(progress: f32, radius: f32) -> f32 {
    let phase_len = BOUNCE_PHASE * radius;
    if phase_len <= 0.0 || progress <= 0.0 {
        return progress.max(0.0);
    }
    let phase = (progress / phase_len).floor() as i64;
    if phase % 2 == 1 {
        let local = (progress - phase as f32 * phase_len) / phase_len;
        (progress - (local * PI).sin() * BOUNCE_AMPLITUDE * radius).max(0.0)
    } else {
        progress
    }
}

/// Follows a spoke with an oscillating forward/backward crawl
#[derive(Debug, Clone)]
pub struct BounceMovement {
    spoke: usize,
    angle: f32,
}

impl BounceMovement {
    pub fn new(spoke: usize, angle: f32) -> Self {
        Self { spoke, angle }
    }
}

impl MovementController for BounceMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let effective = bounce_distance(ctx.progress, ctx.level.radius());
        along_spoke(ctx, self.spoke, &mut self.angle, effective)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}
