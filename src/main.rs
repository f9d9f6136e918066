//! Abyssal Vigil headless runner
//!
//! Drives the simulation in autopilot at a fixed timestep until the run ends,
//! logging progress. Usage: `abyssal-vigil [settings.json] [tuning.json]`.

use std::process::ExitCode;

use abyssal_vigil::audio::{AudioManager, LogBackend};
use abyssal_vigil::consts::*;
use abyssal_vigil::presentation::{AllAssets, HeadlessPresentation};
use abyssal_vigil::sim::{FrameInput, GameEvent, GameScene, WavePhase};
use abyssal_vigil::{Settings, Tuning};

/// Host frame length; deliberately not a multiple of the sim step
const HOST_FRAME_DT: f32 = 1.0 / 45.0;
/// Give up after this many host frames (15 minutes of play)
const MAX_HOST_FRAMES: u32 = 45 * 60 * 15;

struct Runner {
    scene: GameScene,
    audio: AudioManager,
    gfx: HeadlessPresentation,
    input: FrameInput,
    accumulator: f32,
    kills: u32,
}

impl Runner {
    /// Run simulation ticks for one host frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.scene.tick(&self.input, SIM_DT, &mut self.audio);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.observe();
        }

        self.gfx.begin_frame();
        self.scene.draw(&mut self.gfx);
    }

    fn observe(&mut self) {
        for event in self.scene.events() {
            match event {
                GameEvent::EnemyKilled { .. } => self.kills += 1,
                GameEvent::ShopOpened => log::info!(
                    "Shop open for {:.0}s: {} essence, upgrade costs {}",
                    self.scene.waves().intermission_time_left(),
                    self.scene.essence().balance(),
                    self.scene.stats().upgrade_cost()
                ),
                GameEvent::PlayerRevived => log::info!("Revived, next wave incoming"),
                _ => {}
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Abyssal Vigil (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Bad tuning file {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let seed = settings.resolve_seed();
    let scene = match GameScene::new(seed, tuning, settings.god_mode, Box::new(AllAssets)) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to build scene: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Game initialized with seed: {seed}");

    let mut runner = Runner {
        scene,
        audio: AudioManager::from_settings(Box::new(LogBackend), &settings),
        gfx: HeadlessPresentation::default(),
        input: FrameInput {
            autopilot: true,
            ..FrameInput::default()
        },
        accumulator: 0.0,
        kills: 0,
    };

    let mut frames = 0;
    while !runner.scene.is_over() && frames < MAX_HOST_FRAMES {
        runner.update(HOST_FRAME_DT);
        frames += 1;
    }

    let scene = &runner.scene;
    let seconds = scene.time_ticks() as f32 * SIM_DT;
    match scene.phase() {
        WavePhase::GameWon => log::info!("Victory after {seconds:.0}s"),
        WavePhase::GameEndPrompt => log::info!(
            "Defeated on wave {} after {seconds:.0}s",
            scene.waves().wave_number()
        ),
        phase => log::info!("Stopped in {phase:?} after {seconds:.0}s"),
    }
    log::info!(
        "{} kills, {} essence left, {} upgrades, {} sprites drawn",
        runner.kills,
        scene.essence().balance(),
        scene.stats().total_upgrades(),
        runner.gfx.sprites_drawn
    );
    ExitCode::SUCCESS
}
