//! Angular movers: steady orbit and homing pursuit

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{MoveContext, MovementController};
use crate::{angle_delta, normalize_angle, polar_to_cartesian};

/// Orbit rate in radians per second
pub const CIRCULAR_RATE: f32 = 0.5;

/// Hard clamp on the steering part of a homing turn (radians per tick)
pub const HOMING_MAX_TURN: f32 = 0.08;
/// Peak oscillation added per tick
const HOMING_OSCILLATION: f32 = 0.004;
/// Peak random jitter added per tick
const HOMING_JITTER: f32 = 0.003;
/// Largest extra turn the oscillation and jitter can add on top of the clamp
pub const HOMING_JITTER_BOUND: f32 = HOMING_OSCILLATION + HOMING_JITTER;

/// Spirals outward at a constant angular rate
#[derive(Debug, Clone)]
pub struct CircularMovement {
    angle: f32,
}

impl CircularMovement {
    pub fn new(angle: f32) -> Self {
        Self { angle }
    }
}

impl MovementController for CircularMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        self.angle = normalize_angle(self.angle + ctx.dt * CIRCULAR_RATE);
        polar_to_cartesian(ctx.progress, self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

/// Steers its angle toward the player while climbing outward
#[derive(Debug, Clone)]
pub struct HomingMovement {
    angle: f32,
    wobble_phase: f32,
    last_turn: f32,
}

impl HomingMovement {
    pub fn new(angle: f32, rng: &mut Pcg32) -> Self {
        Self {
            angle,
            wobble_phase: rng.random::<f32>() * TAU,
            last_turn: 0.0,
        }
    }

    /// Signed angle change applied on the last update
    pub fn last_turn(&self) -> f32 {
        self.last_turn
    }
}

impl MovementController for HomingMovement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let target = ctx
            .player
            .position
            .filter(|p| p.is_finite() && p.length_squared() > 0.0)
            .unwrap_or_else(|| ctx.level.outline_point(ctx.player.angle));
        let bearing = target.y.atan2(target.x);

        // Steer harder near the rim, but wobble less there
        let proximity = ctx.normalized().clamp(0.0, 1.0);
        let turn_rate = 1.5 + proximity;
        let steer = (angle_delta(self.angle, bearing) * turn_rate * ctx.dt)
            .clamp(-HOMING_MAX_TURN, HOMING_MAX_TURN);

        let damping = 1.0 - proximity;
        self.wobble_phase = (self.wobble_phase + ctx.dt * 4.0) % TAU;
        let oscillation = self.wobble_phase.sin() * HOMING_OSCILLATION * damping;
        let jitter = ctx.rng.random_range(-1.0f32..=1.0) * HOMING_JITTER * damping;

        self.last_turn = steer + oscillation + jitter;
        self.angle = normalize_angle(self.angle + self.last_turn);
        polar_to_cartesian(ctx.progress, self.angle)
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}
