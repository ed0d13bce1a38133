//! Enemies: behaviour table, per-tick update, damage and explosion
//!
//! An enemy owns its movement controller and its scene handles. It never holds
//! a reference back to the manager; shards and bullets it produces go out as
//! `SpawnRequest`s for the caller to materialize.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::bullet::Bullet;
use super::level::LevelGeometry;
use super::movement::{
    MoveContext, MoveRequest, Movement, MovementController, MovementStyle, PlayerView, SpawnPlan,
};
use super::state::{MAX_PARTICLES, Particle};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::OFFSCREEN_MARGIN;
use crate::polar_to_cartesian;
use crate::scene::{Scene, Visual, VisualId};

/// Type id reserved for shards
pub const SHARD_TYPE: u8 = 10;
/// Hit flash length in seconds
pub const HIT_FLASH: f32 = 0.1;
/// Random extra size added at spawn
const SIZE_JITTER: f32 = 0.1;
/// Cosmetic spin in radians per second
const SPIN_RATE: f32 = 2.0;
const PARTICLES_PER_EXPLOSION: usize = 16;
/// Max angular error on aimed shots (radians)
const AIM_SPREAD: f32 = 0.15;
const BOMB_SPREAD: f32 = 0.3;
const BOMB_AIMED_CHANCE: f64 = 0.7;

/// Ranged attack carried by some enemy types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangedAttack {
    /// Single aimed shot
    Aimed { min_interval: f32, max_interval: f32 },
    /// Slow bomb, mostly aimed
    Bomb { min_interval: f32, max_interval: f32 },
}

impl RangedAttack {
    fn interval(&self, rng: &mut Pcg32) -> f32 {
        let (lo, hi) = match *self {
            RangedAttack::Aimed {
                min_interval,
                max_interval,
            }
            | RangedAttack::Bomb {
                min_interval,
                max_interval,
            } => (min_interval, max_interval),
        };
        lo + rng.random::<f32>() * (hi - lo)
    }
}

/// Fixed per-type stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyKind {
    pub type_id: u8,
    pub name: &'static str,
    pub hit_points: u8,
    pub speed_multiplier: f32,
    pub point_value: u64,
    /// Collision radius before jitter
    pub base_size: f32,
    pub color: u32,
    pub attack: Option<RangedAttack>,
}

#[allow(clippy::too_many_arguments)]
const fn kind(
    type_id: u8,
    name: &'static str,
    hit_points: u8,
    speed_multiplier: f32,
    point_value: u64,
    base_size: f32,
    color: u32,
    attack: Option<RangedAttack>,
) -> EnemyKind {
    EnemyKind {
        type_id,
        name,
        hit_points,
        speed_multiplier,
        point_value,
        base_size,
        color,
        attack,
    }
}

/// Behaviour table indexed by type id
pub const ENEMY_KINDS: [EnemyKind; 11] = [
    kind(0, "Splitter", 1, 1.0, 10, 0.35, 0xFF3B30, None),
    kind(1, "Crosser", 1, 0.8, 20, 0.40, 0xFFCC00, None),
    kind(2, "Dart", 2, 1.5, 30, 0.35, 0x34C759, None),
    kind(3, "Zigzagger", 3, 0.7, 40, 0.45, 0x00C7BE, None),
    kind(
        4,
        "Gunner",
        3,
        0.5,
        50,
        0.45,
        0x5AC8FA,
        Some(RangedAttack::Aimed {
            min_interval: 2.0,
            max_interval: 3.0,
        }),
    ),
    kind(5, "Hunter", 4, 0.6, 60, 0.40, 0xAF52DE, None),
    kind(
        6,
        "Bomber",
        5,
        0.4,
        70,
        0.50,
        0xFF9500,
        Some(RangedAttack::Bomb {
            min_interval: 3.0,
            max_interval: 5.0,
        }),
    ),
    kind(7, "Chaos", 6, 0.9, 80, 0.45, 0xFF2D55, None),
    kind(8, "Glyph", 7, 0.3, 90, 0.50, 0xE5E5EA, None),
    kind(9, "Tank", 8, 0.2, 100, 0.55, 0x8E8E93, None),
    kind(SHARD_TYPE, "Shard", 1, 3.0, 2, 0.2, 0xFFFFFF, None),
];

/// Stats for a type id (unknown ids map to shards)
pub fn enemy_kind(type_id: u8) -> &'static EnemyKind {
    &ENEMY_KINDS[(type_id as usize).min(ENEMY_KINDS.len() - 1)]
}

/// Lifecycle of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    /// Created, not yet updated
    Spawned,
    Active,
    DestroyedByHit,
    DestroyedByBoundary,
}

/// Something an enemy wants added to the world
#[derive(Debug, Clone)]
pub enum SpawnRequest {
    Shard { position: Vec2, direction: Vec2 },
    Bullet(Bullet),
}

/// Shared world access for one enemy operation
pub struct EnemyContext<'a> {
    pub dt: f32,
    /// Base enemy speed (before the type multiplier)
    pub enemy_speed: f32,
    pub level: &'a LevelGeometry,
    pub player: PlayerView,
    pub rng: &'a mut Pcg32,
    pub scene: &'a mut dyn Scene,
    pub audio: &'a mut dyn AudioSink,
    pub particles: &'a mut Vec<Particle>,
    pub spawns: &'a mut Vec<SpawnRequest>,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub type_id: u8,
    pub position: Vec2,
    /// Path parameter driving the controller
    pub progress: f32,
    /// Euclidean distance of `position`, recomputed every tick
    pub distance_from_center: f32,
    pub hit_points: u8,
    pub max_hit_points: u8,
    pub size: f32,
    pub point_value: u64,
    pub speed_multiplier: f32,
    /// Cosmetic spin
    pub rotation: f32,
    /// Grows as the enemy nears the rim
    pub scale: f32,
    state: EnemyState,
    movement: Movement,
    flash_timer: Option<f32>,
    fire_cooldown: Option<f32>,
    visual: Option<VisualId>,
    health_bar: Option<VisualId>,
}

impl Enemy {
    /// New enemy at the center using the controller selected for its type
    pub fn new(id: u32, type_id: u8, plan: &SpawnPlan, level: &LevelGeometry, rng: &mut Pcg32) -> Self {
        let style = MovementStyle::select(type_id, level.level_type());
        let movement = Movement::build(style, plan, level, rng);
        Self::with_movement(id, type_id, movement, Vec2::ZERO, rng)
    }

    /// Shard travelling in a straight line from `position`
    pub fn shard(id: u32, position: Vec2, direction: Vec2, level: &LevelGeometry, rng: &mut Pcg32) -> Self {
        let plan = SpawnPlan {
            spoke: 0,
            angle: direction.y.atan2(direction.x),
            direction: Some(direction),
        };
        let movement = Movement::build(MovementStyle::Linear, &plan, level, rng);
        Self::with_movement(id, SHARD_TYPE, movement, position, rng)
    }

    fn with_movement(id: u32, type_id: u8, movement: Movement, position: Vec2, rng: &mut Pcg32) -> Self {
        let kind = enemy_kind(type_id);
        let fire_cooldown = kind.attack.map(|a| a.interval(rng));
        Self {
            id,
            type_id: kind.type_id,
            position,
            progress: position.length(),
            distance_from_center: position.length(),
            hit_points: kind.hit_points,
            max_hit_points: kind.hit_points,
            size: kind.base_size + rng.random::<f32>() * SIZE_JITTER,
            point_value: kind.point_value,
            speed_multiplier: kind.speed_multiplier,
            rotation: 0.0,
            scale: 0.5,
            state: EnemyState::Spawned,
            movement,
            flash_timer: None,
            fire_cooldown,
            visual: None,
            health_bar: None,
        }
    }

    pub fn kind(&self) -> &'static EnemyKind {
        enemy_kind(self.type_id)
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_timer.is_some()
    }

    /// Colour the renderer should draw this frame
    pub fn display_color(&self) -> u32 {
        if self.is_flashing() {
            0xFFFFFF
        } else {
            self.kind().color
        }
    }

    fn body_visual(&self) -> Visual {
        Visual::Enemy {
            enemy_id: self.id,
            type_id: self.type_id,
            color: self.display_color(),
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_hit_points == 0 {
            0.0
        } else {
            self.hit_points as f32 / self.max_hit_points as f32
        }
    }

    /// Register scene handles for the body (and health bar for multi-hit types)
    pub fn attach(&mut self, scene: &mut dyn Scene) {
        if self.visual.is_none() {
            self.visual = Some(scene.add(self.body_visual()));
        }
        if self.max_hit_points > 1 && self.health_bar.is_none() {
            self.health_bar = Some(scene.add(Visual::HealthBar {
                enemy_id: self.id,
                fraction: self.health_fraction(),
            }));
        }
    }

    /// Advance one tick
    pub fn update(&mut self, ctx: &mut EnemyContext<'_>) {
        let radius = ctx.level.radius();
        let mut requests = Vec::new();
        let mut move_ctx = MoveContext::new(
            ctx.dt,
            self.position,
            self.progress,
            ctx.enemy_speed * self.speed_multiplier,
            ctx.level,
            ctx.player,
            ctx.rng,
            &mut requests,
        );
        let pos = self.movement.update(&mut move_ctx);
        self.progress = move_ctx.progress;
        self.position = pos;
        self.distance_from_center = pos.length();
        self.state = EnemyState::Active;

        self.rotation = (self.rotation + ctx.dt * SPIN_RATE) % TAU;
        self.scale = 0.5 + 0.5 * (self.distance_from_center / radius).clamp(0.0, 1.0);

        if let Some(t) = self.flash_timer {
            let t = t - ctx.dt;
            self.flash_timer = (t > 0.0).then_some(t);
        }

        for request in requests {
            match request {
                MoveRequest::Flash(duration) => self.flash_timer = Some(duration),
                MoveRequest::SpawnShard {
                    position,
                    direction,
                } => ctx.spawns.push(SpawnRequest::Shard {
                    position,
                    direction,
                }),
            }
        }

        if let Some(id) = self.visual {
            ctx.scene.update(id, self.body_visual());
        }
        if let Some(id) = self.health_bar {
            ctx.scene.update(
                id,
                Visual::HealthBar {
                    enemy_id: self.id,
                    fraction: self.health_fraction(),
                },
            );
        }
        self.movement.render(ctx.scene);

        self.update_attack(ctx);
    }

    fn update_attack(&mut self, ctx: &mut EnemyContext<'_>) {
        let (Some(attack), Some(cooldown)) = (self.kind().attack, self.fire_cooldown) else {
            return;
        };
        let cooldown = cooldown - ctx.dt;
        if cooldown > 0.0 {
            self.fire_cooldown = Some(cooldown);
            return;
        }
        self.fire_cooldown = Some(attack.interval(ctx.rng));

        let target = ctx
            .player
            .position
            .unwrap_or_else(|| ctx.level.outline_point(ctx.player.angle));
        let aim = (target - self.position).y.atan2((target - self.position).x);

        let bullet = match attack {
            RangedAttack::Aimed { .. } => {
                let error = ctx.rng.random_range(-AIM_SPREAD..=AIM_SPREAD);
                ctx.audio.play(SoundEffect::EnemyLaser);
                Bullet::enemy_shot(self.position, polar_to_cartesian(1.0, aim + error))
            }
            RangedAttack::Bomb { .. } => {
                let heading = if ctx.rng.random_bool(BOMB_AIMED_CHANCE) {
                    aim + ctx.rng.random_range(-BOMB_SPREAD..=BOMB_SPREAD)
                } else {
                    ctx.rng.random::<f32>() * TAU
                };
                ctx.audio.play(SoundEffect::EnemyBomb);
                Bullet::bomb(self.position, polar_to_cartesian(1.0, heading))
            }
        };
        ctx.spawns.push(SpawnRequest::Bullet(bullet));
    }

    /// Apply one hit; true once the enemy has no hit points left
    pub fn take_damage(&mut self, scene: &mut dyn Scene) -> bool {
        self.hit_points = self.hit_points.saturating_sub(1);
        self.flash_timer = Some(HIT_FLASH);
        if let Some(id) = self.health_bar {
            scene.update(
                id,
                Visual::HealthBar {
                    enemy_id: self.id,
                    fraction: self.health_fraction(),
                },
            );
        }
        self.hit_points == 0
    }

    /// Burst into particles, shed shards (splitters only) and leave the scene.
    /// Shard spawning is skipped when `with_shards` is false (level clear).
    pub fn explode(&mut self, ctx: &mut EnemyContext<'_>, with_shards: bool) {
        let color = self.kind().color;
        for _ in 0..PARTICLES_PER_EXPLOSION {
            if ctx.particles.len() >= MAX_PARTICLES {
                break;
            }
            let theta = ctx.rng.random::<f32>() * TAU;
            let speed = ctx.rng.random_range(1.0f32..4.0);
            ctx.particles.push(Particle {
                pos: self.position,
                vel: polar_to_cartesian(speed, theta),
                color,
                life: 1.0,
                size: ctx.rng.random_range(0.05f32..0.15),
            });
        }

        if with_shards && self.type_id == 0 {
            let count = ctx.rng.random_range(1..=4);
            for _ in 0..count {
                let theta = ctx.rng.random::<f32>() * TAU;
                ctx.spawns.push(SpawnRequest::Shard {
                    position: self.position,
                    direction: polar_to_cartesian(1.0, theta),
                });
            }
        }

        ctx.audio.play(SoundEffect::Explosion);
        self.state = EnemyState::DestroyedByHit;
        self.cleanup(ctx.scene);
    }

    /// Mark as escaped past the rim and drop all visuals
    pub fn escape(&mut self, scene: &mut dyn Scene) {
        self.state = EnemyState::DestroyedByBoundary;
        self.cleanup(scene);
    }

    /// Cancel timers and remove every scene handle this enemy owns
    pub fn cleanup(&mut self, scene: &mut dyn Scene) {
        self.flash_timer = None;
        self.fire_cooldown = None;
        self.movement.cleanup(scene);
        if let Some(id) = self.visual.take() {
            scene.remove(id);
        }
        if let Some(id) = self.health_bar.take() {
            scene.remove(id);
        }
    }

    pub fn is_offscreen(&self, level_radius: f32) -> bool {
        self.distance_from_center > level_radius + OFFSCREEN_MARGIN
    }

    pub fn check_collision(&self, other: Vec2, other_radius: f32) -> bool {
        self.position.distance(other) < other_radius + self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::scene::RecordingScene;
    use rand::SeedableRng;

    struct World {
        level: LevelGeometry,
        rng: Pcg32,
        scene: RecordingScene,
        audio: RecordingAudio,
        particles: Vec<Particle>,
        spawns: Vec<SpawnRequest>,
    }

    impl World {
        fn new(level_number: u32) -> Self {
            Self {
                level: LevelGeometry::new(level_number, 10.0),
                rng: Pcg32::seed_from_u64(11),
                scene: RecordingScene::new(),
                audio: RecordingAudio::default(),
                particles: Vec::new(),
                spawns: Vec::new(),
            }
        }

        fn ctx(&mut self, dt: f32) -> EnemyContext<'_> {
            EnemyContext {
                dt,
                enemy_speed: 0.04,
                level: &self.level,
                player: PlayerView {
                    position: Some(Vec2::new(0.0, -10.0)),
                    angle: -std::f32::consts::FRAC_PI_2,
                },
                rng: &mut self.rng,
                scene: &mut self.scene,
                audio: &mut self.audio,
                particles: &mut self.particles,
                spawns: &mut self.spawns,
            }
        }

        fn spawn(&mut self, type_id: u8) -> Enemy {
            let plan = SpawnPlan {
                spoke: 0,
                angle: 0.0,
                direction: None,
            };
            let mut enemy = Enemy::new(1, type_id, &plan, &self.level, &mut self.rng);
            enemy.attach(&mut self.scene);
            enemy
        }
    }

    #[test]
    fn test_behaviour_table_shape() {
        for (i, kind) in ENEMY_KINDS.iter().enumerate() {
            assert_eq!(kind.type_id as usize, i);
            assert!((0.2..=3.0).contains(&kind.speed_multiplier));
        }
        for pair in ENEMY_KINDS[..10].windows(2) {
            assert!(pair[1].hit_points >= pair[0].hit_points);
            assert!(pair[1].point_value > pair[0].point_value);
        }
        let shard = enemy_kind(SHARD_TYPE);
        assert_eq!(shard.hit_points, 1);
        assert_eq!(shard.speed_multiplier, 3.0);
        assert_eq!(enemy_kind(200).type_id, SHARD_TYPE);
    }

    #[test]
    fn test_zigzagger_dies_on_third_hit() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(3);
        assert_eq!(enemy.hit_points, 3);
        assert_eq!(enemy.distance_from_center, 0.0);
        assert!(!enemy.take_damage(&mut w.scene));
        assert!(!enemy.take_damage(&mut w.scene));
        assert!(enemy.take_damage(&mut w.scene));
    }

    #[test]
    fn test_hit_flash_expires() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(2);
        let body = enemy.visual.expect("attached");
        let tint = |scene: &RecordingScene| match scene.get(body) {
            Some(Visual::Enemy { color, .. }) => *color,
            other => panic!("unexpected visual {other:?}"),
        };
        enemy.take_damage(&mut w.scene);
        assert!(enemy.is_flashing());
        enemy.update(&mut w.ctx(1.0 / 60.0));
        assert_eq!(tint(&w.scene), 0xFFFFFF);
        for _ in 0..6 {
            enemy.update(&mut w.ctx(1.0 / 60.0));
        }
        assert!(!enemy.is_flashing());
        assert_eq!(tint(&w.scene), enemy.kind().color);
    }

    #[test]
    fn test_distance_recomputed_from_position() {
        let mut w = World::new(3);
        for type_id in 0..=9 {
            let mut enemy = w.spawn(type_id);
            for _ in 0..120 {
                enemy.update(&mut w.ctx(1.0 / 60.0));
                assert!((enemy.distance_from_center - enemy.position.length()).abs() < 1e-6);
            }
            enemy.cleanup(&mut w.scene);
        }
        assert!(w.scene.is_empty());
    }

    #[test]
    fn test_splitter_sheds_shards() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(0);
        enemy.explode(&mut w.ctx(1.0 / 60.0), true);
        let shards = w
            .spawns
            .iter()
            .filter(|s| matches!(s, SpawnRequest::Shard { .. }))
            .count();
        assert!((1..=4).contains(&shards));
        assert_eq!(enemy.state(), EnemyState::DestroyedByHit);
        assert_eq!(w.audio.count(SoundEffect::Explosion), 1);
        assert!(!w.particles.is_empty());
        assert!(w.scene.is_empty());
    }

    #[test]
    fn test_level_clear_explosion_has_no_shards() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(0);
        enemy.explode(&mut w.ctx(1.0 / 60.0), false);
        assert!(w.spawns.is_empty());
    }

    #[test]
    fn test_gunner_fires_aimed_shots() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(4);
        for _ in 0..(60 * 4) {
            enemy.update(&mut w.ctx(1.0 / 60.0));
        }
        let shots: Vec<_> = w
            .spawns
            .iter()
            .filter_map(|s| match s {
                SpawnRequest::Bullet(b) => Some(b.clone()),
                _ => None,
            })
            .collect();
        // 2-3 s cooldown: one or two shots in four seconds
        assert!((1..=2).contains(&shots.len()));
        assert!(shots.iter().all(|b| b.enemy_owned && !b.bomb));
        assert!(w.audio.count(SoundEffect::EnemyLaser) == shots.len());
    }

    #[test]
    fn test_bomber_drops_bombs() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(6);
        for _ in 0..(60 * 6) {
            enemy.update(&mut w.ctx(1.0 / 60.0));
        }
        let bombs = w
            .spawns
            .iter()
            .filter(|s| matches!(s, SpawnRequest::Bullet(b) if b.bomb))
            .count();
        assert!((1..=2).contains(&bombs));
    }

    #[test]
    fn test_offscreen_and_collision() {
        let mut w = World::new(1);
        let mut enemy = w.spawn(1);
        enemy.distance_from_center = 12.01;
        assert!(enemy.is_offscreen(10.0));
        enemy.distance_from_center = 11.9;
        assert!(!enemy.is_offscreen(10.0));

        enemy.position = Vec2::new(5.0, 0.0);
        assert!(enemy.check_collision(Vec2::new(5.5, 0.0), 0.2));
        assert!(!enemy.check_collision(Vec2::new(7.0, 0.0), 0.2));
    }

    #[test]
    fn test_health_bar_only_for_multi_hit() {
        let mut w = World::new(1);
        let _single = w.spawn(0);
        assert_eq!(w.scene.len(), 1);
        let _tough = w.spawn(5);
        assert_eq!(w.scene.len(), 3);
    }
}
