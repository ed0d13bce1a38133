//! Roto Tempest entry point
//!
//! Headless native runner: the autopilot plays for a span of simulated time
//! while events are logged, then a JSON run summary goes to stdout.
//!
//! Usage: `roto-tempest [SETTINGS.json] [--seed N] [--seconds S] [--frame-ms MS]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use serde::Serialize;

    use roto_tempest::audio::LogAudio;
    use roto_tempest::consts::*;
    use roto_tempest::scene::RecordingScene;
    use roto_tempest::settings::Settings;
    use roto_tempest::sim::{GameEvent, GameMode, GameState, Services, TickInput, tick};

    /// Headless autopilot run that prints a JSON summary
    #[derive(Parser, Debug)]
    #[command(name = "roto-tempest", version, about)]
    pub struct Args {
        /// Settings JSON file (defaults are used when absent)
        pub settings: Option<PathBuf>,

        /// RNG seed for the run
        #[arg(long, default_value_t = 314)]
        pub seed: u64,

        /// Simulated seconds to play
        #[arg(long, default_value_t = 120.0)]
        pub seconds: f32,

        /// Simulated frame length fed to the accumulator
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        pub frame_ms: f32,
    }

    /// What gets printed when the run ends
    #[derive(Debug, Default, Serialize)]
    struct RunSummary {
        seed: u64,
        ticks: u64,
        runs_started: u32,
        final_mode: Option<GameMode>,
        level: u32,
        score: u64,
        best_score: u64,
        kills: u32,
        misses: u32,
        shards_spawned: usize,
        bombs_detonated: u32,
        player_hits: u32,
        levels_completed: u32,
        enemies_alive: usize,
        visuals_alive: usize,
    }

    impl RunSummary {
        fn observe(&mut self, event: &GameEvent) {
            match event {
                GameEvent::StatusChanged(GameMode::Active) => self.runs_started += 1,
                GameEvent::StatusChanged(mode) => log::info!("status: {}", mode.as_str()),
                GameEvent::ScoreChanged(score) => self.best_score = self.best_score.max(*score),
                GameEvent::EnemySpawned { .. } => {}
                GameEvent::EnemyDestroyed { points, .. } => {
                    if *points > 0 {
                        self.kills += 1;
                    }
                }
                GameEvent::EnemyMissed { .. } => self.misses += 1,
                GameEvent::ShardsSpawned(n) => self.shards_spawned += n,
                GameEvent::BombDetonated { .. } => self.bombs_detonated += 1,
                GameEvent::PlayerHit { lives_left } => {
                    self.player_hits += 1;
                    log::info!("player hit ({lives_left} left)");
                }
                GameEvent::LevelCompleted(_) => self.levels_completed += 1,
                GameEvent::LevelStarted(n) => log::info!("entering level {n}"),
            }
        }
    }

    /// Game instance holding all state
    struct Runner {
        state: GameState,
        scene: RecordingScene,
        audio: LogAudio,
        accumulator: f32,
        input: TickInput,
        summary: RunSummary,
    }

    impl Runner {
        fn new(seed: u64, settings: Settings) -> Self {
            let audio = LogAudio::new(settings.effective_sfx_volume());
            Self {
                state: GameState::new(seed, settings),
                scene: RecordingScene::new(),
                audio,
                accumulator: 0.0,
                input: TickInput {
                    idle_mode: true,
                    ..Default::default()
                },
                summary: RunSummary {
                    seed,
                    ..Default::default()
                },
            }
        }

        /// Run simulation ticks for one frame
        fn frame(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let mut services = Services {
                    scene: &mut self.scene,
                    audio: &mut self.audio,
                };
                tick(&mut self.state, &self.input, SIM_DT, &mut services);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.state.drain_events() {
                log::trace!("{event:?}");
                self.summary.observe(&event);
            }
        }

        fn finish(mut self) -> RunSummary {
            let state = &self.state;
            self.summary.ticks = state.time_ticks;
            self.summary.final_mode = Some(state.mode);
            self.summary.level = state.level_number();
            self.summary.score = state.score;
            self.summary.best_score = self.summary.best_score.max(state.score);
            self.summary.enemies_alive = state.enemies.len();
            self.summary.visuals_alive = self.scene.len();
            self.summary
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Roto Tempest (headless) starting...");

        let args = Args::parse();

        let settings = match &args.settings {
            Some(path) => Settings::load(path).unwrap_or_else(|e| {
                log::error!("{e}; using default settings");
                Settings::default()
            }),
            None => Settings::default(),
        };

        log::info!("Game initialized with seed: {}", args.seed);
        let mut runner = Runner::new(args.seed, settings);
        let frame = (args.frame_ms / 1000.0).max(0.001);
        let frames = (args.seconds.max(0.0) / frame).ceil() as u64;
        for _ in 0..frames {
            runner.frame(frame);
        }

        let summary = runner.finish();
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("failed to encode summary: {e}"),
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is the deliverable on wasm
}
