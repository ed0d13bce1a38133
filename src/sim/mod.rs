//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies beyond the injected traits

pub mod bullet;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod manager;
pub mod movement;
pub mod state;
pub mod tick;

pub use bullet::{Bullet, BulletFate};
pub use collision::{Hit, kill_score};
pub use enemy::{ENEMY_KINDS, Enemy, EnemyContext, EnemyKind, EnemyState, SHARD_TYPE, SpawnRequest};
pub use level::{LevelGeometry, LevelType, Spoke};
pub use manager::{EnemyManager, Miss, allowed_type_range, miss_penalty};
pub use movement::{Movement, MovementController, MovementStyle, PlayerView, SpawnPlan};
pub use state::{GameEvent, GameMode, GameState, LevelTransition, MAX_PARTICLES, Particle, Player};
pub use tick::{Services, TickInput, tick};
