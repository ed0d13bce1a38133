//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here. Collaborators (scene, audio)
//! are passed in per tick and never stored.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::level::LevelGeometry;
use super::manager::EnemyManager;
use super::movement::PlayerView;
use crate::normalize_angle;
use crate::scene::Scene;
use crate::settings::Settings;

/// Top-level mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Attract screen, waiting for start
    Marquee,
    Active,
    GameOver,
}

impl GameMode {
    /// Name used by the status event
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Marquee => "marquee",
            GameMode::Active => "active",
            GameMode::GameOver => "gameOver",
        }
    }
}

/// Notifications for the presentation layer, drained each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StatusChanged(GameMode),
    ScoreChanged(u64),
    EnemySpawned { id: u32, type_id: u8 },
    EnemyDestroyed { id: u32, type_id: u8, points: u64 },
    EnemyMissed { id: u32, type_id: u8, penalty: u64 },
    ShardsSpawned(usize),
    BombDetonated { position: Vec2 },
    PlayerHit { lives_left: u8 },
    LevelCompleted(u32),
    LevelStarted(u32),
}

/// Level-up sequence, advanced once per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelTransition {
    /// "LEVEL COMPLETED" banner; the field is frozen
    Banner { remaining: f32 },
    /// Player flies from the rim toward the center
    Flight { elapsed: f32, from: Vec2 },
    /// New level running, player invulnerable
    Ghost { remaining: f32 },
}

impl LevelTransition {
    /// True while enemies, bullets and spawning are suspended
    pub fn freezes_play(&self) -> bool {
        matches!(
            self,
            LevelTransition::Banner { .. } | LevelTransition::Flight { .. }
        )
    }
}

/// The player's ship on the rim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Angle on the rim (radians)
    pub angle: f32,
    pub position: Vec2,
    /// Angular velocity from the last move
    pub angular_vel: f32,
    /// Drawn scale (shrinks during the level-up flight)
    pub scale: f32,
    /// Seconds of invulnerability left
    pub ghost_timer: f32,
    pub fire_cooldown: f32,
    pub lives: u8,
    pub alive: bool,
}

impl Player {
    pub fn new(lives: u8, level: &LevelGeometry) -> Self {
        let mut player = Self {
            angle: -std::f32::consts::FRAC_PI_2, // Start at bottom
            position: Vec2::ZERO,
            angular_vel: 0.0,
            scale: 1.0,
            ghost_timer: 0.0,
            fire_cooldown: 0.0,
            lives,
            alive: true,
        };
        player.place(level);
        player
    }

    /// Snap onto the outline at the current angle
    pub fn place(&mut self, level: &LevelGeometry) {
        self.position = level.outline_point(self.angle);
    }

    /// Update angle toward target (with smoothing)
    pub fn move_toward(&mut self, target_angle: f32, dt: f32, max_speed: f32) {
        let target = normalize_angle(target_angle);
        let current = normalize_angle(self.angle);

        let mut delta = target - current;
        // Handle wraparound
        if delta > std::f32::consts::PI {
            delta -= std::f32::consts::TAU;
        } else if delta < -std::f32::consts::PI {
            delta += std::f32::consts::TAU;
        }

        // Clamp to max angular speed
        let max_delta = max_speed * dt;
        let clamped_delta = delta.clamp(-max_delta, max_delta);

        self.angular_vel = if dt > 0.0 { clamped_delta / dt } else { 0.0 };
        self.angle = normalize_angle(self.angle + clamped_delta);
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost_timer > 0.0
    }

    /// Render opacity (semi-transparent while a ghost)
    pub fn opacity(&self) -> f32 {
        if self.is_ghost() { 0.4 } else { 1.0 }
    }

    /// What enemies get to see
    pub fn view(&self) -> PlayerView {
        PlayerView {
            position: Some(self.position),
            angle: self.angle,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32, // Enemy colour
    pub life: f32,  // 0-1, decreases over time
    pub size: f32,
}

impl Particle {
    /// Drift, drag and fade
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= 0.96;
        self.life -= dt * 1.5;
    }
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub settings: Settings,
    pub mode: GameMode,
    pub level: LevelGeometry,
    pub score: u64,
    /// Base enemy speed, raised at every score milestone
    pub enemy_speed: f32,
    /// Highest multiple of `SPEED_MILESTONE` already rewarded
    pub speed_milestone: u64,
    pub player: Player,
    pub enemies: EnemyManager,
    /// Player and enemy projectiles in firing order
    pub bullets: Vec<Bullet>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Seconds since the last spawn
    pub spawn_timer: f32,
    pub transition: Option<LevelTransition>,
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Completed level transitions this run
    pub levels_completed: u32,
}

impl GameState {
    /// Create a new game state with the given seed, waiting on the marquee.
    /// Unusable settings are replaced by the defaults.
    pub fn new(seed: u64, settings: Settings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Settings::default()
            }
        };
        let level = LevelGeometry::new(1, settings.level_radius);
        let player = Player::new(settings.starting_lives, &level);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: GameMode::Marquee,
            level,
            score: 0,
            enemy_speed: settings.base_enemy_speed,
            speed_milestone: 0,
            player,
            enemies: EnemyManager::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            spawn_timer: 0.0,
            transition: None,
            events: Vec::new(),
            time_ticks: 0,
            levels_completed: 0,
            settings,
        }
    }

    pub fn level_number(&self) -> u32 {
        self.level.level_number()
    }

    /// Wipe the field and start level 1. The RNG keeps running so back-to-back
    /// runs differ but stay reproducible.
    pub fn reset_run(&mut self, scene: &mut dyn Scene) {
        self.enemies.cleanup_all(scene);
        for bullet in &mut self.bullets {
            bullet.detach(scene);
        }
        self.bullets.clear();
        self.particles.clear();
        self.level = LevelGeometry::new(1, self.settings.level_radius);
        self.player = Player::new(self.settings.starting_lives, &self.level);
        self.score = 0;
        self.enemy_speed = self.settings.base_enemy_speed;
        self.speed_milestone = 0;
        self.spawn_timer = 0.0;
        self.transition = None;
        self.levels_completed = 0;
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::info!("mode {} -> {}", self.mode.as_str(), mode.as_str());
            self.mode = mode;
            self.events.push(GameEvent::StatusChanged(mode));
        }
    }

    pub fn add_score(&mut self, points: u64) {
        if points > 0 {
            self.score = self.score.saturating_add(points);
            self.events.push(GameEvent::ScoreChanged(self.score));
        }
    }

    /// True while a level-up sequence is running (re-entry guard)
    pub fn transition_in_progress(&self) -> bool {
        self.transition.is_some()
    }

    /// Take every pending event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_MAX_ANGULAR_SPEED;
    use std::f32::consts::PI;

    #[test]
    fn test_move_toward_wraps_and_clamps() {
        let level = LevelGeometry::new(1, 10.0);
        let mut p = Player::new(3, &level);
        p.angle = PI - 0.05;
        // Shortest way to -PI + 0.05 is forward across the seam
        p.move_toward(-PI + 0.05, 1.0 / 60.0, PLAYER_MAX_ANGULAR_SPEED);
        assert!(p.angular_vel > 0.0);
        assert!((p.angular_vel - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_player_sits_on_outline() {
        let level = LevelGeometry::new(3, 10.0);
        let mut p = Player::new(3, &level);
        p.angle = 0.3;
        p.place(&level);
        assert!((p.position - level.outline_point(0.3)).length() < 1e-5);
    }

    #[test]
    fn test_ghost_opacity() {
        let level = LevelGeometry::new(1, 10.0);
        let mut p = Player::new(3, &level);
        assert_eq!(p.opacity(), 1.0);
        p.ghost_timer = 1.0;
        assert!(p.is_ghost());
        assert!(p.opacity() < 1.0);
    }

    #[test]
    fn test_score_events_and_mode_events() {
        let mut state = GameState::new(1, Settings::default());
        state.add_score(0);
        assert!(state.events.is_empty());
        state.add_score(12);
        state.set_mode(GameMode::Active);
        state.set_mode(GameMode::Active);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::ScoreChanged(12),
                GameEvent::StatusChanged(GameMode::Active)
            ]
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let settings = Settings {
            spawn_interval: 0.0,
            ..Settings::default()
        };
        let state = GameState::new(1, settings);
        assert_eq!(state.settings.spawn_interval, Settings::default().spawn_interval);
    }

    #[test]
    fn test_particles_fade() {
        let mut particle = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::X,
            color: 0,
            life: 1.0,
            size: 0.1,
        };
        for _ in 0..60 {
            particle.update(1.0 / 60.0);
        }
        assert!(particle.life < 0.0);
        assert!(particle.pos.x > 0.0);
    }
}
