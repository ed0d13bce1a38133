//! Enemy roster: spawning, per-tick update, eviction and player contact

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::bullet::Bullet;
use super::enemy::{Enemy, EnemyContext, EnemyState, SpawnRequest};
use super::level::LevelGeometry;
use super::movement::{MovementStyle, SpawnPlan};
use crate::audio::SoundEffect;
use crate::consts::{PLAYER_HIT_FACTOR, PLAYER_SIZE};
use crate::scene::Scene;

/// Highest type the level-driven spawner can pick
pub const MAX_SPAWN_TYPE: u8 = 9;

/// Types unlocked on a level: two new ones per level, capped at 9
pub fn allowed_type_range(level_number: u32) -> RangeInclusive<u8> {
    let top = (level_number.max(1) * 2 - 1).min(MAX_SPAWN_TYPE as u32) as u8;
    0..=top
}

/// Score lost when an enemy of this type reaches the rim. Applies to shards
/// too, so an escaped shard costs more than its parent.
pub fn miss_penalty(type_id: u8) -> u64 {
    // floor(type * 1.5) in integers
    type_id as u64 * 3 / 2
}

/// An enemy that escaped this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miss {
    pub enemy_id: u32,
    pub type_id: u8,
    pub penalty: u64,
}

/// Things produced while materializing spawn requests
#[derive(Debug, Default)]
pub struct Spawned {
    pub shards: usize,
    pub bullets: Vec<Bullet>,
}

/// Result of `EnemyManager::update`
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub missed: Vec<Miss>,
    pub spawned: Spawned,
}

#[derive(Debug, Clone, Default)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    next_id: u32,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Live enemies in spawn order
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Random type from the level's unlocked range
    pub fn pick_type(level_number: u32, rng: &mut Pcg32) -> u8 {
        rng.random_range(allowed_type_range(level_number))
    }

    /// Level-driven spawn: choose a type (or use `forced`), a spoke and a start angle
    pub fn create_enemy(
        &mut self,
        level: &LevelGeometry,
        forced: Option<u8>,
        rng: &mut Pcg32,
        scene: &mut dyn Scene,
    ) -> u32 {
        let type_id = match forced {
            Some(t) => t.min(MAX_SPAWN_TYPE),
            None => Self::pick_type(level.level_number(), rng),
        };
        let style = MovementStyle::select(type_id, level.level_type());
        let spoke = rng.random_range(0..level.spoke_count().max(1));
        let angle = if style.is_spoke_bound() {
            level.spoke(spoke).map_or(0.0, |s| s.angle)
        } else {
            rng.random::<f32>() * TAU
        };
        let plan = SpawnPlan {
            spoke,
            angle,
            direction: None,
        };
        self.spawn_type(type_id, &plan, level, rng, scene)
    }

    /// Spawn a specific type from an explicit plan
    pub fn spawn_type(
        &mut self,
        type_id: u8,
        plan: &SpawnPlan,
        level: &LevelGeometry,
        rng: &mut Pcg32,
        scene: &mut dyn Scene,
    ) -> u32 {
        let id = self.next_id();
        let mut enemy = Enemy::new(id, type_id, plan, level, rng);
        enemy.attach(scene);
        log::debug!(
            "spawned {} #{} on spoke {} ({:?})",
            enemy.kind().name,
            id,
            plan.spoke,
            enemy.movement().style()
        );
        self.enemies.push(enemy);
        id
    }

    pub fn spawn_shard(
        &mut self,
        position: Vec2,
        direction: Vec2,
        level: &LevelGeometry,
        rng: &mut Pcg32,
        scene: &mut dyn Scene,
    ) -> u32 {
        let id = self.next_id();
        let mut shard = Enemy::shard(id, position, direction, level, rng);
        shard.attach(scene);
        self.enemies.push(shard);
        id
    }

    /// Update every enemy, then evict the ones past the boundary, then
    /// materialize what they asked to spawn. Penalties are taken off `score`.
    pub fn update(&mut self, ctx: &mut EnemyContext<'_>, score: &mut u64) -> UpdateReport {
        for enemy in &mut self.enemies {
            enemy.update(ctx);
        }

        let radius = ctx.level.radius();
        let mut missed = Vec::new();
        let mut i = 0;
        while i < self.enemies.len() {
            let enemy = &self.enemies[i];
            let escaped = enemy.state() == EnemyState::Active
                && (ctx.level.is_beyond_boundary(enemy.position, enemy.size)
                    || enemy.is_offscreen(radius));
            if !escaped {
                i += 1;
                continue;
            }
            let mut enemy = self.enemies.remove(i);
            enemy.escape(ctx.scene);
            let penalty = miss_penalty(enemy.type_id);
            *score = score.saturating_sub(penalty);
            ctx.audio.play(SoundEffect::EnemyEscaped);
            log::debug!("{} #{} escaped, -{}", enemy.kind().name, enemy.id, penalty);
            missed.push(Miss {
                enemy_id: enemy.id,
                type_id: enemy.type_id,
                penalty,
            });
        }

        let spawned = self.flush_spawns(ctx);
        UpdateReport { missed, spawned }
    }

    /// Turn pending spawn requests into shards and enemy bullets
    pub fn flush_spawns(&mut self, ctx: &mut EnemyContext<'_>) -> Spawned {
        let mut spawned = Spawned::default();
        let requests: Vec<SpawnRequest> = ctx.spawns.drain(..).collect();
        for request in requests {
            match request {
                SpawnRequest::Shard {
                    position,
                    direction,
                } => {
                    self.spawn_shard(position, direction, ctx.level, ctx.rng, ctx.scene);
                    spawned.shards += 1;
                }
                SpawnRequest::Bullet(bullet) => spawned.bullets.push(bullet),
            }
        }
        spawned
    }

    /// Index of the first enemy touching the player
    pub fn player_contact(&self, player_pos: Vec2) -> Option<usize> {
        let radius = PLAYER_SIZE * PLAYER_HIT_FACTOR;
        self.enemies
            .iter()
            .position(|e| e.check_collision(player_pos, radius))
    }

    pub fn check_player_collision(&self, player_pos: Vec2) -> bool {
        self.player_contact(player_pos).is_some()
    }

    /// Explode and remove the enemy at `index`; shard requests land in `ctx.spawns`
    pub fn destroy(&mut self, index: usize, ctx: &mut EnemyContext<'_>) -> Option<Enemy> {
        if index >= self.enemies.len() {
            return None;
        }
        let mut enemy = self.enemies.remove(index);
        enemy.explode(ctx, true);
        Some(enemy)
    }

    /// Level clear: everything explodes, nothing splits
    pub fn clear_all(&mut self, ctx: &mut EnemyContext<'_>) -> usize {
        let count = self.enemies.len();
        for mut enemy in self.enemies.drain(..) {
            enemy.explode(ctx, false);
        }
        count
    }

    /// Silent removal (new run)
    pub fn cleanup_all(&mut self, scene: &mut dyn Scene) {
        for mut enemy in self.enemies.drain(..) {
            enemy.cleanup(scene);
        }
    }
}
