//! Fixed timestep simulation tick
//!
//! Mode machine plus the combat loop. Within an active tick the order is
//! fixed: player, spawn, shoot, enemy update, eviction, bullets, bullet
//! collisions, player collisions, difficulty, level-up check.

use glam::Vec2;

use super::bullet::{Bullet, BulletFate};
use super::collision::{bomb_blast_hits, resolve_player_bullets, take_enemy_bullet_hit};
use super::enemy::EnemyContext;
use super::level::LevelGeometry;
use super::manager::Spawned;
use super::state::{GameEvent, GameMode, GameState, LevelTransition};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::ease_in_out_quad;
use crate::scene::Scene;

/// Player scale at the end of the level-up flight
const FLIGHT_END_SCALE: f32 = 0.2;

/// Floor on the spawn interval so the spawn loop always terminates
const MIN_SPAWN_INTERVAL: f32 = SIM_DT;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target player angle (from mouse/touch/keys)
    pub target_angle: Option<f32>,
    /// Fire button held
    pub shoot: bool,
    /// Start a run from the marquee or game-over screen
    pub start: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Collaborators for one tick
pub struct Services<'a> {
    pub scene: &'a mut dyn Scene,
    pub audio: &'a mut dyn AudioSink,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, services: &mut Services<'_>) {
    state.time_ticks += 1;

    // Particles animate on every screen
    for particle in state.particles.iter_mut() {
        particle.update(dt);
    }
    state.particles.retain(|p| p.life > 0.0);

    match state.mode {
        GameMode::Marquee | GameMode::GameOver => {
            if input.start || input.idle_mode {
                start_run(state, services);
            }
            return;
        }
        GameMode::Active => {}
    }

    let (target, shoot) = if input.idle_mode {
        autopilot(state)
    } else {
        (input.target_angle, input.shoot)
    };

    let player = &mut state.player;
    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);
    player.ghost_timer = (player.ghost_timer - dt).max(0.0);

    let frozen = state.transition.is_some_and(|t| t.freezes_play());
    advance_transition(state, dt, services);
    if frozen {
        return;
    }

    step_combat(state, target, shoot, dt, services);

    if state.mode != GameMode::Active {
        return;
    }

    // Difficulty: one speed step per 100-point milestone, never taken back
    let reached = state.score / SPEED_MILESTONE;
    while state.speed_milestone < reached {
        state.speed_milestone += 1;
        state.enemy_speed += state.settings.speed_step;
        log::debug!("enemy speed now {:.3}", state.enemy_speed);
    }

    // Level-up check runs once per tick, after every kill has landed
    let threshold = state.level_number() as u64 * LEVEL_SCORE_STEP;
    if !state.transition_in_progress() && state.score > threshold {
        log::info!("level {} completed with score {}", state.level_number(), state.score);
        state.transition = Some(LevelTransition::Banner {
            remaining: state.settings.banner_duration,
        });
        state.events.push(GameEvent::LevelCompleted(state.level_number()));
        services.audio.play(SoundEffect::LevelComplete);
    }
}

fn start_run(state: &mut GameState, services: &mut Services<'_>) {
    state.reset_run(&mut *services.scene);
    state.set_mode(GameMode::Active);
    state.events.push(GameEvent::ScoreChanged(0));
    state.events.push(GameEvent::LevelStarted(1));
    log::info!("run started (seed {})", state.seed);
}

/// Demo player: face the enemy closest to the rim and keep firing
fn autopilot(state: &GameState) -> (Option<f32>, bool) {
    let threat = state
        .enemies
        .enemies()
        .iter()
        .max_by(|a, b| a.distance_from_center.total_cmp(&b.distance_from_center));
    match threat {
        Some(enemy) if enemy.distance_from_center > 0.0 => {
            let p = enemy.position;
            (Some(p.y.atan2(p.x)), true)
        }
        _ => {
            // Drift slowly so the demo doesn't look frozen
            let t = state.time_ticks as f32 * SIM_DT;
            (Some(state.player.angle + 0.3 * (t * 0.5).sin()), false)
        }
    }
}

/// Step the level-up sequence by one tick
fn advance_transition(state: &mut GameState, dt: f32, services: &mut Services<'_>) {
    let Some(transition) = state.transition else {
        return;
    };

    match transition {
        LevelTransition::Banner { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                state.transition = Some(LevelTransition::Banner { remaining });
                return;
            }
            // Everything on the field goes up, without splitting
            let GameState {
                rng,
                level,
                enemy_speed,
                player,
                enemies,
                bullets,
                particles,
                ..
            } = &mut *state;
            let mut spawns = Vec::new();
            let mut ctx = EnemyContext {
                dt,
                enemy_speed: *enemy_speed,
                level,
                player: player.view(),
                rng,
                scene: &mut *services.scene,
                audio: &mut *services.audio,
                particles,
                spawns: &mut spawns,
            };
            let cleared = enemies.clear_all(&mut ctx);
            for mut bullet in bullets.drain(..) {
                bullet.detach(ctx.scene);
            }
            log::debug!("level clear destroyed {cleared} enemies");
            state.transition = Some(LevelTransition::Flight {
                elapsed: 0.0,
                from: state.player.position,
            });
        }
        LevelTransition::Flight { elapsed, from } => {
            let elapsed = elapsed + dt;
            let duration = state.settings.flight_duration;
            let s = if duration > 0.0 {
                (elapsed / duration).min(1.0)
            } else {
                1.0
            };
            let eased = ease_in_out_quad(s);
            state.player.position = from.lerp(Vec2::ZERO, eased);
            state.player.scale = 1.0 - (1.0 - FLIGHT_END_SCALE) * eased;
            if s < 1.0 {
                state.transition = Some(LevelTransition::Flight { elapsed, from });
                return;
            }
            enter_next_level(state);
        }
        LevelTransition::Ghost { remaining } => {
            let remaining = remaining - dt;
            state.transition = (remaining > 0.0).then_some(LevelTransition::Ghost { remaining });
        }
    }
}

fn enter_next_level(state: &mut GameState) {
    let next = state.level_number() + 1;
    state.level = LevelGeometry::new(next, state.settings.level_radius);
    state.player.place(&state.level);
    state.player.scale = 1.0;
    state.player.ghost_timer = state.settings.ghost_duration;
    state.spawn_timer = 0.0;
    state.levels_completed += 1;
    state.transition = Some(LevelTransition::Ghost {
        remaining: state.settings.ghost_duration,
    });
    state.events.push(GameEvent::LevelStarted(next));
    log::info!("level {} ({}) started", next, state.level.level_type().as_str());
}

fn step_combat(
    state: &mut GameState,
    target: Option<f32>,
    shoot: bool,
    dt: f32,
    services: &mut Services<'_>,
) {
    let mut player_hit = false;
    let mut points = 0u64;

    {
        let GameState {
            rng,
            settings,
            level,
            score,
            enemy_speed,
            player,
            enemies,
            bullets,
            particles,
            spawn_timer,
            events,
            ..
        } = &mut *state;

        if let Some(target) = target {
            player.move_toward(target, dt, PLAYER_MAX_ANGULAR_SPEED);
        }
        player.place(level);

        *spawn_timer += dt;
        // A non-positive interval would never drain the timer
        let interval = settings.spawn_interval.max(MIN_SPAWN_INTERVAL);
        while *spawn_timer >= interval {
            *spawn_timer -= interval;
            let id = enemies.create_enemy(level, settings.forced_enemy_type, rng, &mut *services.scene);
            let type_id = enemies.get(id).map_or(0, |e| e.type_id);
            events.push(GameEvent::EnemySpawned { id, type_id });
        }

        if shoot && player.fire_cooldown <= 0.0 {
            let mut bullet = Bullet::player(player.position);
            bullet.attach(&mut *services.scene);
            bullets.push(bullet);
            player.fire_cooldown = PLAYER_FIRE_COOLDOWN;
            services.audio.play(SoundEffect::PlayerShot);
        }

        let mut spawns = Vec::new();
        let mut ctx = EnemyContext {
            dt,
            enemy_speed: *enemy_speed,
            level,
            player: player.view(),
            rng,
            scene: &mut *services.scene,
            audio: &mut *services.audio,
            particles,
            spawns: &mut spawns,
        };

        // Enemy update, then eviction (inside the manager)
        let score_before = *score;
        let report = enemies.update(&mut ctx, score);
        for miss in &report.missed {
            events.push(GameEvent::EnemyMissed {
                id: miss.enemy_id,
                type_id: miss.type_id,
                penalty: miss.penalty,
            });
        }
        if *score != score_before {
            events.push(GameEvent::ScoreChanged(*score));
        }
        adopt_spawned(report.spawned, bullets, events, ctx.scene);

        // Bullets
        let mut i = 0;
        while i < bullets.len() {
            bullets[i].advance(dt);
            match bullets[i].fate(ctx.level) {
                BulletFate::Flying => i += 1,
                BulletFate::Expired => {
                    let mut bullet = bullets.remove(i);
                    bullet.detach(ctx.scene);
                }
                BulletFate::Detonated => {
                    let mut bullet = bullets.remove(i);
                    bullet.detach(ctx.scene);
                    ctx.audio.play(SoundEffect::BombDetonation);
                    events.push(GameEvent::BombDetonated {
                        position: bullet.position,
                    });
                    if !player.is_ghost() && bomb_blast_hits(bullet.position, player.position) {
                        player_hit = true;
                    }
                }
            }
        }

        // Player bullets against enemies
        let hits = resolve_player_bullets(bullets, enemies, ctx.level.level_number(), &mut ctx);
        for hit in hits.iter().filter(|h| h.destroyed) {
            log::debug!("enemy #{} (type {}) destroyed, +{}", hit.enemy_id, hit.type_id, hit.points);
            events.push(GameEvent::EnemyDestroyed {
                id: hit.enemy_id,
                type_id: hit.type_id,
                points: hit.points,
            });
            points += hit.points;
        }

        // Enemies and enemy fire against the player
        if !player.is_ghost() {
            if let Some(index) = enemies.player_contact(player.position) {
                if let Some(enemy) = enemies.destroy(index, &mut ctx) {
                    events.push(GameEvent::EnemyDestroyed {
                        id: enemy.id,
                        type_id: enemy.type_id,
                        points: 0,
                    });
                }
                player_hit = true;
            }
            if let Some(mut bullet) = take_enemy_bullet_hit(bullets, player.position) {
                bullet.detach(ctx.scene);
                player_hit = true;
            }
        }

        let spawned = enemies.flush_spawns(&mut ctx);
        adopt_spawned(spawned, bullets, events, ctx.scene);
    }

    state.add_score(points);
    if player_hit {
        lose_life(state, services);
    }
}

/// Attach freshly spawned enemy bullets and report shards
fn adopt_spawned(
    spawned: Spawned,
    bullets: &mut Vec<Bullet>,
    events: &mut Vec<GameEvent>,
    scene: &mut dyn Scene,
) {
    if spawned.shards > 0 {
        events.push(GameEvent::ShardsSpawned(spawned.shards));
    }
    for mut bullet in spawned.bullets {
        bullet.attach(scene);
        bullets.push(bullet);
    }
}

fn lose_life(state: &mut GameState, services: &mut Services<'_>) {
    let player = &mut state.player;
    player.lives = player.lives.saturating_sub(1);
    let lives_left = player.lives;
    state.events.push(GameEvent::PlayerHit { lives_left });
    services.audio.play(SoundEffect::PlayerHit);

    if lives_left > 0 {
        state.player.ghost_timer = state.settings.ghost_duration;
        log::info!("player hit, {lives_left} lives left");
        return;
    }

    state.player.alive = false;
    state.enemies.cleanup_all(&mut *services.scene);
    for mut bullet in state.bullets.drain(..) {
        bullet.detach(&mut *services.scene);
    }
    state.transition = None;
    state.set_mode(GameMode::GameOver);
    services.audio.play(SoundEffect::GameOver);
    log::info!(
        "game over on level {} with score {}",
        state.level_number(),
        state.score
    );
}
