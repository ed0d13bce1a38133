//! Roto Tempest - A radial arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level geometry, enemy movement, combat loop)
//! - `scene`: Scene collaborator interface (visual handles owned by the renderer)
//! - `audio`: Audio collaborator interface (fire-and-forget sound effects)
//! - `settings`: Data-driven game tuning

pub mod audio;
pub mod scene;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, SoundEffect};
pub use scene::{Scene, Visual, VisualId};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default level radius
    pub const LEVEL_RADIUS: f32 = 10.0;
    /// Scale tying enemy "speed" units to distance units per second
    pub const SPEED_SCALE: f32 = 30.0;
    /// Margin past the rim after which an enemy is always evicted
    pub const OFFSCREEN_MARGIN: f32 = 2.0;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 0.6;
    /// Collision radius is a fraction of the drawn size
    pub const PLAYER_HIT_FACTOR: f32 = 0.8;
    pub const PLAYER_MAX_ANGULAR_SPEED: f32 = 6.0;
    pub const PLAYER_FIRE_COOLDOWN: f32 = 0.15;

    /// Bullets (units per second)
    pub const PLAYER_BULLET_SPEED: f32 = 15.0;
    pub const ENEMY_BULLET_SPEED: f32 = 6.0;
    pub const BOMB_SPEED: f32 = 3.5;
    pub const BULLET_RADIUS: f32 = 0.15;
    pub const BULLET_HIT_MARGIN: f32 = 0.2;
    pub const BULLET_CENTER_CULL: f32 = 1.0;
    pub const BULLET_OUTER_MARGIN: f32 = 5.0;
    pub const BOMB_BLAST_RADIUS: f32 = 1.5;

    /// Scoring
    pub const LEVEL_SCORE_STEP: u64 = 314;
    pub const SPEED_MILESTONE: u64 = 100;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let a = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid may round up to TAU
    if a >= PI { a - TAU } else { a }
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn positive_angle(angle: f32) -> f32 {
    let a = normalize_angle(angle);
    if a < 0.0 { a + std::f32::consts::TAU } else { a }
}

/// Shortest signed rotation taking `from` onto `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Quadratic ease-in-out on [0, 1]
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
