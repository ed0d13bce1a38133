//! Player and enemy projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::LevelGeometry;
use crate::consts::*;
use crate::scene::{Scene, Visual, VisualId};

/// What happened to a bullet this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletFate {
    Flying,
    /// Left the play area or reached the center
    Expired,
    /// A bomb reached the rim
    Detonated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub position: Vec2,
    /// Unit vector
    pub direction: Vec2,
    /// Units per second
    pub speed: f32,
    pub enemy_owned: bool,
    pub bomb: bool,
    #[serde(skip)]
    visual: Option<VisualId>,
}

impl Bullet {
    fn new(position: Vec2, direction: Vec2, speed: f32, enemy_owned: bool, bomb: bool) -> Self {
        Self {
            position,
            direction: direction.try_normalize().unwrap_or(Vec2::X),
            speed,
            enemy_owned,
            bomb,
            visual: None,
        }
    }

    /// Player shot from the rim toward the center
    pub fn player(position: Vec2) -> Self {
        let inward = (-position).try_normalize().unwrap_or(Vec2::NEG_X);
        Self::new(position, inward, PLAYER_BULLET_SPEED, false, false)
    }

    pub fn enemy_shot(position: Vec2, direction: Vec2) -> Self {
        Self::new(position, direction, ENEMY_BULLET_SPEED, true, false)
    }

    pub fn bomb(position: Vec2, direction: Vec2) -> Self {
        Self::new(position, direction, BOMB_SPEED, true, true)
    }

    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.position += self.direction * self.speed * dt;
    }

    /// Culling and detonation rules
    pub fn fate(&self, level: &LevelGeometry) -> BulletFate {
        if !self.position.is_finite() {
            return BulletFate::Expired;
        }
        let dist = self.position.length();
        if self.bomb && level.is_beyond_boundary(self.position, 0.0) {
            return BulletFate::Detonated;
        }
        if dist > level.radius() + BULLET_OUTER_MARGIN {
            return BulletFate::Expired;
        }
        if !self.enemy_owned && dist < BULLET_CENTER_CULL {
            return BulletFate::Expired;
        }
        BulletFate::Flying
    }

    pub fn attach(&mut self, scene: &mut dyn Scene) {
        if self.visual.is_none() {
            self.visual = Some(scene.add(Visual::Bullet {
                enemy_owned: self.enemy_owned,
                bomb: self.bomb,
            }));
        }
    }

    pub fn detach(&mut self, scene: &mut dyn Scene) {
        if let Some(id) = self.visual.take() {
            scene.remove(id);
        }
    }
}
