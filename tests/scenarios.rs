//! End-to-end gameplay scenarios driven through the public API

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use roto_tempest::audio::RecordingAudio;
use roto_tempest::consts::SIM_DT;
use roto_tempest::polar_to_cartesian;
use roto_tempest::scene::RecordingScene;
use roto_tempest::settings::Settings;
use roto_tempest::sim::{
    Bullet, EnemyContext, EnemyManager, GameEvent, GameMode, GameState, LevelGeometry, LevelType,
    PlayerView, Services, SpawnPlan, SpawnRequest, TickInput, kill_score, tick,
};
use roto_tempest::sim::collision::resolve_player_bullets;
use roto_tempest::sim::state::Particle;

/// Manager plus everything an enemy update needs
struct Field {
    level: LevelGeometry,
    rng: Pcg32,
    scene: RecordingScene,
    audio: RecordingAudio,
    particles: Vec<Particle>,
    spawns: Vec<SpawnRequest>,
    manager: EnemyManager,
    bullets: Vec<Bullet>,
    score: u64,
}

impl Field {
    fn new(level_number: u32, seed: u64) -> Self {
        Self {
            level: LevelGeometry::new(level_number, 10.0),
            rng: Pcg32::seed_from_u64(seed),
            scene: RecordingScene::new(),
            audio: RecordingAudio::default(),
            particles: Vec::new(),
            spawns: Vec::new(),
            manager: EnemyManager::new(),
            bullets: Vec::new(),
            score: 0,
        }
    }

    fn spawn(&mut self, type_id: u8, spoke: usize) -> u32 {
        let plan = SpawnPlan {
            spoke,
            angle: self.level.spokes()[spoke].angle,
            direction: None,
        };
        self.manager
            .spawn_type(type_id, &plan, &self.level, &mut self.rng, &mut self.scene)
    }

    /// One manager update followed by bullet resolution
    fn step(&mut self) -> usize {
        let level_number = self.level.level_number();
        let mut ctx = EnemyContext {
            dt: SIM_DT,
            enemy_speed: 0.04,
            level: &self.level,
            player: PlayerView::default(),
            rng: &mut self.rng,
            scene: &mut self.scene,
            audio: &mut self.audio,
            particles: &mut self.particles,
            spawns: &mut self.spawns,
        };
        let report = self.manager.update(&mut ctx, &mut self.score);
        let hits = resolve_player_bullets(&mut self.bullets, &mut self.manager, level_number, &mut ctx);
        self.score += hits.iter().map(|h| h.points).sum::<u64>();
        report.missed.len()
    }
}

#[test]
fn test_spoke_enemy_evicted_past_rim_without_penalty() {
    let mut field = Field::new(1, 42);
    assert_eq!(field.level.level_type(), LevelType::Circle);
    assert_eq!(field.level.spoke_count(), 16);

    let id = field.spawn(0, 0);
    let mut last_distance = 0.0;
    let mut evicted = false;
    for _ in 0..2000 {
        if field.step() > 0 {
            evicted = true;
            break;
        }
        let enemy = field.manager.get(id).expect("enemy alive until evicted");
        assert!(enemy.position.y.abs() < 1e-4, "spoke 0 runs along +x");
        last_distance = enemy.distance_from_center;
    }
    assert!(evicted);
    assert!(field.manager.get(id).is_none());
    // Leaves once its whole body is past the rim, well before radius + margin
    assert!(last_distance > 10.0 && last_distance <= 10.5 + 0.05);
    assert_eq!(field.score, 0);
    assert!(field.scene.is_empty());
}

#[test]
fn test_offscreen_enemy_removed_on_next_update_with_penalty() {
    for type_id in 0..=9u8 {
        let mut field = Field::new(1, 7);
        field.score = 20;
        field.spawn(type_id, 3);
        field.manager.enemies_mut()[0].progress = 12.5;
        assert_eq!(field.step(), 1, "type {type_id}");
        assert_eq!(field.score, 20 - (type_id as u64 * 3 / 2));
    }
}

#[test]
fn test_zigzagger_survives_two_hits() {
    let mut field = Field::new(1, 1);
    field.spawn(3, 0);
    let enemy = &mut field.manager.enemies_mut()[0];
    assert_eq!(enemy.hit_points, 3);
    assert_eq!(enemy.distance_from_center, 0.0);
    assert!(!enemy.take_damage(&mut field.scene));
    assert!(!enemy.take_damage(&mut field.scene));
    assert!(enemy.take_damage(&mut field.scene));
}

#[test]
fn test_bullet_kill_scores_type_times_pi_times_level() {
    for level_number in [1u32, 3, 7] {
        let mut field = Field::new(level_number, 9);
        // Crossers run on spokes on every level type
        field.spawn(1, 0);
        field.manager.enemies_mut()[0].progress = 5.0;
        let angle = field.level.spokes()[0].angle;
        field.bullets.push(Bullet::player(polar_to_cartesian(5.05, angle)));
        field.step();
        assert!(field.manager.is_empty(), "level {level_number}");
        assert!(field.bullets.is_empty());
        assert_eq!(field.score, kill_score(1, level_number, 20));
        assert_eq!(field.score, (std::f64::consts::PI * level_number as f64).floor() as u64);
    }
}

struct Rig {
    scene: RecordingScene,
    audio: RecordingAudio,
}

impl Rig {
    fn tick(&mut self, state: &mut GameState, input: &TickInput) {
        let mut services = Services {
            scene: &mut self.scene,
            audio: &mut self.audio,
        };
        tick(state, input, SIM_DT, &mut services);
    }
}

#[test]
fn test_simultaneous_kills_trigger_one_level_transition() {
    let mut rig = Rig {
        scene: RecordingScene::new(),
        audio: RecordingAudio::default(),
    };
    let mut state = GameState::new(77, Settings::default());
    rig.tick(
        &mut state,
        &TickInput {
            start: true,
            ..Default::default()
        },
    );
    assert_eq!(state.mode, GameMode::Active);

    // Three crossers, three bullets, all landing on the same tick: 310 + 3 * 3
    state.score = 310;
    for spoke in [0usize, 4, 8] {
        let plan = SpawnPlan {
            spoke,
            angle: state.level.spokes()[spoke].angle,
            direction: None,
        };
        state
            .enemies
            .spawn_type(1, &plan, &state.level, &mut state.rng, &mut rig.scene);
        let angle = state.level.spokes()[spoke].angle;
        state.bullets.push(Bullet::player(polar_to_cartesian(5.2, angle)));
    }
    for enemy in state.enemies.enemies_mut() {
        enemy.progress = 5.0;
    }
    state.drain_events();

    rig.tick(&mut state, &TickInput::default());
    assert!(state.enemies.is_empty());
    assert_eq!(state.score, 319);

    for _ in 0..120 {
        rig.tick(&mut state, &TickInput::default());
    }
    let completed = state
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::LevelCompleted(1)))
        .count();
    assert_eq!(completed, 1);
    assert!(state.transition_in_progress());
}

#[test]
fn test_same_seed_same_game() {
    let play = |seed: u64| {
        let mut rig = Rig {
            scene: RecordingScene::new(),
            audio: RecordingAudio::default(),
        };
        let mut state = GameState::new(seed, Settings::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(60 * 45) {
            rig.tick(&mut state, &input);
        }
        let positions: Vec<Vec2> = state.enemies.enemies().iter().map(|e| e.position).collect();
        (state.score, state.events.clone(), positions, rig.audio.played)
    };
    assert_eq!(play(5), play(5));
}

#[test]
fn test_forced_enemy_type_override() {
    let mut rig = Rig {
        scene: RecordingScene::new(),
        audio: RecordingAudio::default(),
    };
    let settings = Settings::from_json(r#"{ "forced_enemy_type": 3 }"#).expect("valid settings");
    let mut state = GameState::new(3, settings);
    rig.tick(
        &mut state,
        &TickInput {
            start: true,
            ..Default::default()
        },
    );
    for _ in 0..(60 * 8) {
        rig.tick(&mut state, &TickInput::default());
    }
    assert!(!state.enemies.is_empty());
    assert!(state.enemies.enemies().iter().all(|e| e.type_id == 3));
}
