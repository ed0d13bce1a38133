//! Bullet collision resolution
//!
//! Player bullets are resolved one at a time in firing order. Each bullet
//! hits at most one live enemy (the first in spawn order within reach), and
//! any number of bullets may land in the same tick.

use std::f64::consts::PI;

use glam::Vec2;

use super::bullet::Bullet;
use super::enemy::{EnemyContext, SHARD_TYPE};
use super::manager::EnemyManager;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Outcome of one player bullet landing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub enemy_id: u32,
    pub type_id: u8,
    pub position: Vec2,
    pub destroyed: bool,
    /// Score awarded (0 unless destroyed)
    pub points: u64,
}

/// Score for destroying an enemy: floor(type * pi * level); shards pay their flat value
pub fn kill_score(type_id: u8, level_number: u32, point_value: u64) -> u64 {
    if type_id >= SHARD_TYPE {
        return point_value;
    }
    (type_id as f64 * PI * level_number as f64).floor() as u64
}

/// True if a bullet at `bullet` is within hit range of a body at `center`
#[inline]
pub fn bullet_hits(bullet: Vec2, center: Vec2, size: f32) -> bool {
    bullet.distance(center) < size + BULLET_HIT_MARGIN
}

/// Resolve player bullets against enemies. Consumed bullets are removed and
/// their visuals detached; destroyed enemies explode (shard requests land in
/// `ctx.spawns`).
pub fn resolve_player_bullets(
    bullets: &mut Vec<Bullet>,
    enemies: &mut EnemyManager,
    level_number: u32,
    ctx: &mut EnemyContext<'_>,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    let mut i = 0;
    while i < bullets.len() {
        if bullets[i].enemy_owned {
            i += 1;
            continue;
        }
        let pos = bullets[i].position;
        let target = enemies
            .enemies()
            .iter()
            .position(|e| bullet_hits(pos, e.position, e.size));
        let Some(index) = target else {
            i += 1;
            continue;
        };

        let mut bullet = bullets.remove(i);
        bullet.detach(ctx.scene);

        let enemy = &mut enemies.enemies_mut()[index];
        let (enemy_id, type_id, position, point_value) =
            (enemy.id, enemy.type_id, enemy.position, enemy.point_value);
        let destroyed = enemy.take_damage(ctx.scene);
        let points = if destroyed {
            enemies.destroy(index, ctx);
            kill_score(type_id, level_number, point_value)
        } else {
            ctx.audio.play(SoundEffect::EnemyHit);
            0
        };
        hits.push(Hit {
            enemy_id,
            type_id,
            position,
            destroyed,
            points,
        });
    }
    hits
}

/// First enemy bullet touching the player, removed from the list
pub fn take_enemy_bullet_hit(bullets: &mut Vec<Bullet>, player_pos: Vec2) -> Option<Bullet> {
    let reach = BULLET_RADIUS + PLAYER_SIZE * PLAYER_HIT_FACTOR;
    let index = bullets
        .iter()
        .position(|b| b.enemy_owned && b.position.distance(player_pos) < reach)?;
    Some(bullets.remove(index))
}

/// Whether a bomb going off at `at` catches the player
#[inline]
pub fn bomb_blast_hits(at: Vec2, player_pos: Vec2) -> bool {
    at.distance(player_pos) < BOMB_BLAST_RADIUS
}
