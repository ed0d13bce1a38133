//! Erratic wanderers and straight-line shards

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{MoveContext, MoveRequest, MovementController};
use crate::consts::SPEED_SCALE;
use crate::{angle_delta, polar_to_cartesian};

/// Seconds of movement between pauses
pub const ERRATIC_CYCLE: f32 = 5.0;
/// Pause length (the enemy flashes and sheds shards)
pub const ERRATIC_PAUSE: f32 = 1.0;
/// Shards start this far from the parent
pub const SHARD_OFFSET: f32 = 0.4;
/// Random angular nudge per tick
const WANDER: f32 = 0.1;
/// Share of the heading pulled back to the home spoke each tick
const SPOKE_BIAS: f32 = 0.9;

/// Jitters around a spoke, pausing periodically to spawn a cross of shards
#[derive(Debug, Clone)]
pub struct ErraticMovement {
    spoke: usize,
    angle: f32,
    cycle_timer: f32,
    pause_timer: f32,
}

impl ErraticMovement {
    pub fn new(spoke: usize, angle: f32) -> Self {
        Self {
            spoke,
            angle,
            cycle_timer: 0.0,
            pause_timer: 0.0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_timer > 0.0
    }
}

impl MovementController for ErraticMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        if self.pause_timer > 0.0 {
            self.pause_timer = (self.pause_timer - ctx.dt).max(0.0);
            ctx.hold();
            return ctx.position;
        }

        self.cycle_timer += ctx.dt;
        if self.cycle_timer >= ERRATIC_CYCLE {
            self.cycle_timer = 0.0;
            self.pause_timer = ERRATIC_PAUSE;
            ctx.hold();
            ctx.requests.push(MoveRequest::Flash(ERRATIC_PAUSE));
            for direction in [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y] {
                ctx.requests.push(MoveRequest::SpawnShard {
                    position: ctx.position + direction * SHARD_OFFSET,
                    direction,
                });
            }
            return ctx.position;
        }

        let home = ctx.level.spoke(self.spoke).map_or(self.angle, |s| s.angle);
        let nudge = ctx.rng.random_range(-WANDER..=WANDER);
        let wander = angle_delta(home, self.angle + nudge);
        self.angle = home + wander * (1.0 - SPOKE_BIAS);
        polar_to_cartesian(ctx.progress * ctx.level.outline_scale(self.angle), self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

/// Straight-line mover used for shards; ignores spokes entirely
#[derive(Debug, Clone)]
pub struct LinearMovement {
    direction: Vec2,
}

impl LinearMovement {
    pub fn new(direction: Vec2) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec2::X);
        Self { direction }
    }

    pub fn random(rng: &mut Pcg32) -> Self {
        let theta = rng.random::<f32>() * TAU;
        Self::new(polar_to_cartesian(1.0, theta))
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }
}

impl MovementController for LinearMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        ctx.position + self.direction * ctx.speed * ctx.dt * SPEED_SCALE
    }

    fn angle(&self) -> f32 {
        self.direction.y.atan2(self.direction.x)
    }
}
