//! Enemy movement controllers
//!
//! Every enemy owns exactly one controller, picked at spawn from
//! `(type_id, level_type)` and never swapped. Controllers turn path progress
//! into an absolute position each tick:
//!
//! - The enemy advances `progress` by `speed * dt * SPEED_SCALE` before calling
//!   `update`; controllers may `hold()` it (erratic pauses).
//! - Linear and spoke-crossing controllers also read the previous position.
//! - Controllers never touch other enemies. Anything that affects the wider
//!   world (shards, flashes) goes out as a `MoveRequest`.

mod crossing;
mod erratic;
mod orbit;
mod path;
mod pi;
mod spoke;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{LevelGeometry, LevelType};
use crate::consts::SPEED_SCALE;
use crate::polar_to_cartesian;
use crate::scene::Scene;

pub use crossing::{CrossingPhase, SpokeCrossingMovement};
pub use erratic::{
    ERRATIC_CYCLE, ERRATIC_PAUSE, ErraticMovement, LinearMovement, SHARD_OFFSET,
};
pub use orbit::{
    CircularMovement, HOMING_JITTER_BOUND, HOMING_MAX_TURN, HomingMovement,
};
pub use path::{SpiralMovement, StarMovement, WaveMovement};
pub use pi::PiSymbolMovement;
pub use spoke::{BounceMovement, SpokeMovement, bounce_distance};

/// What the controller knows about the player
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerView {
    /// Last known position (None before the player is placed)
    pub position: Option<Vec2>,
    /// Player angle on the rim
    pub angle: f32,
}

/// Side effects a controller asks its enemy to carry out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveRequest {
    /// Flash the enemy body for `duration` seconds
    Flash(f32),
    /// Spawn a shard enemy travelling in a straight line
    SpawnShard { position: Vec2, direction: Vec2 },
}

/// Per-tick inputs for a controller
pub struct MoveContext<'a> {
    pub dt: f32,
    /// Position before this tick
    pub position: Vec2,
    /// Path progress after this tick's advance
    pub progress: f32,
    base: f32,
    step: f32,
    /// Effective speed (base enemy speed × type multiplier)
    pub speed: f32,
    pub level: &'a LevelGeometry,
    pub player: PlayerView,
    pub rng: &'a mut Pcg32,
    pub requests: &'a mut Vec<MoveRequest>,
}

impl<'a> MoveContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dt: f32,
        position: Vec2,
        progress: f32,
        speed: f32,
        level: &'a LevelGeometry,
        player: PlayerView,
        rng: &'a mut Pcg32,
        requests: &'a mut Vec<MoveRequest>,
    ) -> Self {
        let step = (speed * dt * SPEED_SCALE).max(0.0);
        Self {
            dt,
            position,
            progress: progress + step,
            base: progress,
            step,
            speed,
            level,
            player,
            rng,
            requests,
        }
    }

    /// Distance advanced this tick
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Cancel this tick's advance
    pub fn hold(&mut self) {
        self.progress = self.base;
        self.step = 0.0;
    }

    /// Progress as a fraction of the level radius
    pub fn normalized(&self) -> f32 {
        self.progress / self.level.radius()
    }
}

/// Common controller interface
pub trait MovementController {
    /// Advance internal state by `ctx.dt` and return the new absolute position
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2;

    /// Current heading angle (polar angle of the path)
    fn angle(&self) -> f32;

    /// Draw auxiliary visuals
    fn render(&mut self, _scene: &mut dyn Scene) {}

    /// Remove auxiliary visuals; called when the owning enemy goes away
    fn cleanup(&mut self, _scene: &mut dyn Scene) {}
}

/// Plain radial motion used whenever a path cannot be evaluated
#[inline]
pub fn radial_fallback(angle: f32, progress: f32) -> Vec2 {
    let angle = if angle.is_finite() { angle } else { 0.0 };
    let progress = if progress.is_finite() { progress } else { 0.0 };
    polar_to_cartesian(progress, angle)
}

/// Replace a non-finite path result with the radial fallback
pub(crate) fn finite_or_radial(pos: Vec2, angle: f32, progress: f32) -> Vec2 {
    if pos.is_finite() {
        pos
    } else {
        log::warn!("movement produced non-finite position, falling back to radial");
        radial_fallback(angle, progress)
    }
}

/// Movement style selected at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementStyle {
    Spoke,
    SpokeCrossing,
    Zigzag,
    Circular,
    Homing,
    PiSymbol,
    Spiral,
    Wave,
    Star,
    Erratic,
    Bounce,
    Linear,
}

impl MovementStyle {
    /// Construction-time table mapping enemy type and level shape to a style
    pub fn select(type_id: u8, level_type: LevelType) -> Self {
        match type_id {
            0 | 2 => match level_type {
                LevelType::Spiral => MovementStyle::Spiral,
                LevelType::Wave => MovementStyle::Wave,
                LevelType::Star => MovementStyle::Star,
                LevelType::Circle | LevelType::PiSymbol => MovementStyle::Spoke,
            },
            1 => MovementStyle::SpokeCrossing,
            3 => MovementStyle::Zigzag,
            4 => MovementStyle::Circular,
            5 => MovementStyle::Homing,
            6 => MovementStyle::Bounce,
            7 => MovementStyle::Erratic,
            8 | 9 if level_type == LevelType::PiSymbol => MovementStyle::PiSymbol,
            10 => MovementStyle::Linear,
            _ => MovementStyle::Spoke,
        }
    }

    /// Styles that stay on a lane and need a precomputed spoke index
    pub fn is_spoke_bound(&self) -> bool {
        matches!(
            self,
            MovementStyle::Spoke
                | MovementStyle::SpokeCrossing
                | MovementStyle::Zigzag
                | MovementStyle::Bounce
                | MovementStyle::Erratic
        )
    }
}

/// Where a new enemy starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub spoke: usize,
    pub angle: f32,
    /// Fixed heading for linear movers (random when None)
    pub direction: Option<Vec2>,
}

/// Concrete controller owned by an enemy
#[derive(Debug, Clone)]
pub enum Movement {
    Spoke(SpokeMovement),
    SpokeCrossing(SpokeCrossingMovement),
    Circular(CircularMovement),
    Homing(HomingMovement),
    PiSymbol(PiSymbolMovement),
    Spiral(SpiralMovement),
    Wave(WaveMovement),
    Star(StarMovement),
    Erratic(ErraticMovement),
    Bounce(BounceMovement),
    Linear(LinearMovement),
}

impl Movement {
    /// Build the controller for a style
    pub fn build(style: MovementStyle, plan: &SpawnPlan, level: &LevelGeometry, rng: &mut Pcg32) -> Self {
        let spoke_angle = level.spoke(plan.spoke).map(|s| s.angle).unwrap_or(plan.angle);
        match style {
            MovementStyle::Spoke => Movement::Spoke(SpokeMovement::new(plan.spoke, spoke_angle)),
            MovementStyle::SpokeCrossing => Movement::SpokeCrossing(SpokeCrossingMovement::crossing(
                plan.spoke,
                spoke_angle,
                rng,
            )),
            MovementStyle::Zigzag => Movement::SpokeCrossing(SpokeCrossingMovement::zigzag(
                plan.spoke,
                spoke_angle,
                rng,
            )),
            MovementStyle::Circular => Movement::Circular(CircularMovement::new(plan.angle)),
            MovementStyle::Homing => Movement::Homing(HomingMovement::new(plan.angle, rng)),
            MovementStyle::PiSymbol => Movement::PiSymbol(PiSymbolMovement::new(plan.angle, rng)),
            MovementStyle::Spiral => Movement::Spiral(SpiralMovement::new(plan.angle, rng)),
            MovementStyle::Wave => Movement::Wave(WaveMovement::new(plan.angle, rng)),
            MovementStyle::Star => Movement::Star(StarMovement::new(spoke_angle, rng)),
            MovementStyle::Erratic => Movement::Erratic(ErraticMovement::new(plan.spoke, spoke_angle)),
            MovementStyle::Bounce => Movement::Bounce(BounceMovement::new(plan.spoke, spoke_angle)),
            MovementStyle::Linear => Movement::Linear(match plan.direction {
                Some(direction) => LinearMovement::new(direction),
                None => LinearMovement::random(rng),
            }),
        }
    }

    pub fn style(&self) -> MovementStyle {
        match self {
            Movement::Spoke(_) => MovementStyle::Spoke,
            Movement::SpokeCrossing(m) if m.max_jump() > 1 => MovementStyle::Zigzag,
            Movement::SpokeCrossing(_) => MovementStyle::SpokeCrossing,
            Movement::Circular(_) => MovementStyle::Circular,
            Movement::Homing(_) => MovementStyle::Homing,
            Movement::PiSymbol(_) => MovementStyle::PiSymbol,
            Movement::Spiral(_) => MovementStyle::Spiral,
            Movement::Wave(_) => MovementStyle::Wave,
            Movement::Star(_) => MovementStyle::Star,
            Movement::Erratic(_) => MovementStyle::Erratic,
            Movement::Bounce(_) => MovementStyle::Bounce,
            Movement::Linear(_) => MovementStyle::Linear,
        }
    }

    fn controller(&self) -> &dyn MovementController {
        match self {
            Movement::Spoke(m) => m,
            Movement::SpokeCrossing(m) => m,
            Movement::Circular(m) => m,
            Movement::Homing(m) => m,
            Movement::PiSymbol(m) => m,
            Movement::Spiral(m) => m,
            Movement::Wave(m) => m,
            Movement::Star(m) => m,
            Movement::Erratic(m) => m,
            Movement::Bounce(m) => m,
            Movement::Linear(m) => m,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn MovementController {
        match self {
            Movement::Spoke(m) => m,
            Movement::SpokeCrossing(m) => m,
            Movement::Circular(m) => m,
            Movement::Homing(m) => m,
            Movement::PiSymbol(m) => m,
            Movement::Spiral(m) => m,
            Movement::Wave(m) => m,
            Movement::Star(m) => m,
            Movement::Erratic(m) => m,
            Movement::Bounce(m) => m,
            Movement::Linear(m) => m,
        }
    }
}

impl MovementController for Movement {
    fn update(&mut self, ctx: &mut MoveContext<'_>) -> Vec2 {
        let pos = self.controller_mut().update(ctx);
        finite_or_radial(pos, self.angle(), ctx.progress)
    }

    fn angle(&self) -> f32 {
        self.controller().angle()
    }

    fn render(&mut self, scene: &mut dyn Scene) {
        self.controller_mut().render(scene);
    }

    fn cleanup(&mut self, scene: &mut dyn Scene) {
        self.controller_mut().cleanup(scene);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rand::SeedableRng;

    /// Drives one controller the way an enemy would
    pub struct Harness {
        pub level: LevelGeometry,
        pub rng: Pcg32,
        pub requests: Vec<MoveRequest>,
        pub position: Vec2,
        pub progress: f32,
        pub speed: f32,
        pub player: PlayerView,
    }

    impl Harness {
        pub fn new(level_number: u32) -> Self {
            Self {
                level: LevelGeometry::new(level_number, 10.0),
                rng: Pcg32::seed_from_u64(7),
                requests: Vec::new(),
                position: Vec2::ZERO,
                progress: 0.0,
                speed: 0.04,
                player: PlayerView::default(),
            }
        }

        pub fn step(&mut self, controller: &mut dyn MovementController, dt: f32) -> Vec2 {
            let mut ctx = MoveContext::new(
                dt,
                self.position,
                self.progress,
                self.speed,
                &self.level,
                self.player,
                &mut self.rng,
                &mut self.requests,
            );
            let pos = controller.update(&mut ctx);
            self.progress = ctx.progress;
            self.position = pos;
            pos
        }
    }
}
