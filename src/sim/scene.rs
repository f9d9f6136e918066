//! Game scene: owns every actor and runs one fixed step at a time
//!
//! Frame order: input → player → enemies → sword hits → removals →
//! wave scheduler → spawner. Everything random goes through the scene's
//! seeded Pcg32, so a seed plus an input sequence reproduces a run exactly.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{check_player_hit_by_enemy, resolve_player_attacks};
use super::enemy::{DamageOutcome, Enemy, EnemyKind};
use super::entity::ActorId;
use super::essence::AbyssalEssence;
use super::events::GameEvent;
use super::player::Player;
use super::spawner::{EnemySpawner, SpawnContext, spawn};
use super::stats::{PlayerStats, StatKind};
use super::wave::{WavePhase, WaveSignal, WaveSystem};
use crate::audio::AudioManager;
use crate::consts::*;
use crate::error::InitError;
use crate::presentation::{AssetCatalog, Presentation};
use crate::tuning::Tuning;

/// Player commands for a single tick, polled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    pub roll: bool,
    /// Leave the shop before the intermission runs out
    pub shop_done: bool,
    /// Pay to get back up at the end prompt
    pub revive: bool,
    /// Start over after victory or defeat
    pub restart: bool,
    /// Demo mode - the scene plays itself
    pub autopilot: bool,
}

pub struct GameScene {
    tuning: Tuning,
    assets: Box<dyn AssetCatalog>,
    pub player: Player,
    enemies: Vec<Enemy>,
    spawner: EnemySpawner,
    waves: WaveSystem,
    stats: PlayerStats,
    essence: AbyssalEssence,
    rng: Pcg32,
    next_id: u32,
    /// Events raised since the last tick finished
    pending: Vec<GameEvent>,
    /// Events raised during the last completed tick
    frame_events: Vec<GameEvent>,
    shop_open: bool,
    time_ticks: u64,
}

impl GameScene {
    /// Build a scene; fails if the player's sprite sheets are unavailable
    pub fn new(
        seed: u64,
        tuning: Tuning,
        god_mode: bool,
        assets: Box<dyn AssetCatalog>,
    ) -> Result<Self, InitError> {
        let player = Player::new(ActorId(0), &tuning, god_mode);
        player.initialise(assets.as_ref())?;
        log::info!("Scene ready (seed {seed})");

        Ok(Self {
            assets,
            player,
            enemies: Vec::new(),
            spawner: EnemySpawner::new(tuning.spawner.clone()),
            waves: WaveSystem::new(tuning.waves.clone()),
            stats: PlayerStats::new(tuning.stats.clone()),
            essence: AbyssalEssence::default(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            pending: Vec::new(),
            frame_events: Vec::new(),
            shop_open: false,
            time_ticks: 0,
            tuning,
        })
    }

    // === Queries ===

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn waves(&self) -> &WaveSystem {
        &self.waves
    }

    pub fn phase(&self) -> WavePhase {
        self.waves.phase()
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn essence(&self) -> &AbyssalEssence {
        &self.essence
    }

    pub fn is_shop_open(&self) -> bool {
        self.shop_open
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Events raised during the last tick
    pub fn events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    /// No further progress without a restart
    pub fn is_over(&self) -> bool {
        match self.waves.phase() {
            WavePhase::GameWon => true,
            WavePhase::GameEndPrompt => !self.essence.can_afford(REVIVE_ESSENCE_COST),
            _ => false,
        }
    }

    /// Hand out essence (debug and tests)
    pub fn grant_essence(&mut self, amount: i32) {
        self.essence.add(amount);
    }

    // === Shop, revive, restart ===

    /// Buy one level of `stat`; only while the shop is open
    pub fn purchase_upgrade(&mut self, stat: StatKind) -> bool {
        if self.waves.phase() != WavePhase::Intermission {
            return false;
        }
        if !self.stats.attempt_upgrade(stat, &mut self.essence) {
            return false;
        }
        self.player.apply_stats(&self.stats, false);
        self.pending.push(GameEvent::UpgradePurchased {
            stat,
            level: self.stats.level(stat),
        });
        true
    }

    /// Pay to revive at the end prompt and carry on with the next wave
    pub fn try_revive(&mut self) -> bool {
        if self.waves.phase() != WavePhase::GameEndPrompt {
            return false;
        }
        if !self.player.spend_for_revive(&mut self.essence, &self.stats) {
            return false;
        }
        self.waves.resume_after_revive();
        self.enemies.clear();
        self.spawner.reset();
        self.pending.push(GameEvent::PlayerRevived);
        true
    }

    /// Wipe progress and start again from wave zero
    pub fn reset_for_new_game(&mut self) {
        self.stats.reset();
        self.essence.reset();
        self.waves.reset();
        self.spawner.reset();
        self.enemies.clear();
        self.player.reset(&self.stats);
        self.shop_open = false;
        self.pending.clear();
        log::info!("New game");
    }

    // === Per-frame update ===

    /// Advance the scene by one fixed step
    pub fn tick(&mut self, input: &FrameInput, dt: f32, audio: &mut AudioManager) {
        self.time_ticks += 1;

        let input = if input.autopilot {
            self.autopilot_input()
        } else {
            *input
        };

        self.handle_meta_input(&input);
        if !self.shop_open {
            self.apply_player_input(&input);
        }
        self.player.process(dt);

        let was_alive = self.player.entity.alive;
        for enemy in &mut self.enemies {
            enemy.process(dt, &mut self.player, &mut self.rng, &mut self.pending);
        }
        if was_alive && !self.player.entity.alive {
            self.pending.push(GameEvent::PlayerDied);
        }

        self.resolve_hits();
        self.enemies.retain(|e| !e.is_finished());

        for signal in self.waves.tick(dt, self.player.entity.alive) {
            self.handle_wave_signal(signal);
        }

        if self.waves.phase() == WavePhase::InWave {
            self.spawn_enemies(dt);
        }

        for event in &self.pending {
            if let Some(effect) = event.sound() {
                audio.play(effect);
            }
        }
        self.frame_events = std::mem::take(&mut self.pending);
    }

    fn handle_meta_input(&mut self, input: &FrameInput) {
        if input.restart && self.waves.phase().is_terminal() {
            self.reset_for_new_game();
            return;
        }
        if input.revive {
            self.try_revive();
        }
        if input.shop_done && self.shop_open {
            if let Some(signal) = self.waves.end_intermission() {
                self.handle_wave_signal(signal);
            }
        }
    }

    fn apply_player_input(&mut self, input: &FrameInput) {
        let p = &mut self.player;
        match (input.move_left, input.move_right) {
            (true, false) => p.move_left(),
            (false, true) => p.move_right(),
            _ => p.stop_moving(),
        }
        if input.jump && p.jump() {
            self.pending.push(GameEvent::PlayerJumped);
        }
        if input.attack && p.attack() {
            self.pending.push(GameEvent::PlayerAttacked);
        }
        if input.roll && p.roll() {
            self.pending.push(GameEvent::PlayerRolled);
        }
    }

    fn resolve_hits(&mut self) {
        for enemy in &self.enemies {
            if check_player_hit_by_enemy(&self.player, enemy) {
                log::trace!("Contact with {:?} {:?}", enemy.kind, enemy.entity.id);
            }
        }

        for hit in resolve_player_attacks(&mut self.player, &mut self.enemies) {
            self.pending.push(GameEvent::EnemyHit {
                id: hit.target,
                damage: hit.damage,
            });
            if hit.outcome != DamageOutcome::Killed {
                continue;
            }
            let Some(enemy) = self.enemies.get(hit.enemy_index) else {
                continue;
            };
            let kind = enemy.kind;
            let essence = enemy.roll_essence_drop(&mut self.rng);
            self.essence.add(essence);
            self.waves.on_enemy_killed();
            if kind == EnemyKind::Boss {
                self.waves.on_boss_defeated();
            }
            log::debug!("{kind:?} {:?} killed (+{essence} essence)", hit.target);
            self.pending.push(GameEvent::EnemyKilled {
                id: hit.target,
                kind,
                essence,
            });
        }
    }

    fn handle_wave_signal(&mut self, signal: WaveSignal) {
        match signal {
            WaveSignal::WaveStarted(wave) => {
                self.spawner.reset();
                self.pending.push(GameEvent::WaveStarted { wave });
                if self.waves.is_final_wave() {
                    self.spawn_boss();
                }
            }
            WaveSignal::WaveCleared(wave) => {
                self.pending.push(GameEvent::WaveCleared { wave });
            }
            WaveSignal::CleanupEnemies => {
                log::debug!("Clearing {} enemies", self.enemies.len());
                self.enemies.clear();
            }
            WaveSignal::OpenShop => {
                self.shop_open = true;
                self.player.stop_moving();
                self.pending.push(GameEvent::ShopOpened);
            }
            WaveSignal::CloseShop => {
                self.shop_open = false;
                self.pending.push(GameEvent::ShopClosed);
            }
            WaveSignal::Victory => {
                log::info!("Victory with {} essence", self.essence.balance());
                self.pending.push(GameEvent::Victory);
            }
            WaveSignal::Defeated => {
                self.pending.push(GameEvent::Defeat);
            }
        }
    }

    fn spawn_boss(&mut self) {
        let mut ctx = SpawnContext {
            tuning: &self.tuning,
            assets: self.assets.as_ref(),
            rng: &mut self.rng,
            next_id: &mut self.next_id,
        };
        let boss = spawn(EnemyKind::Boss, &mut ctx);
        if let Some(boss) = boss {
            log::info!("Boss arrives on wave {}", self.waves.wave_number());
            self.pending.push(GameEvent::EnemySpawned {
                id: boss.entity.id,
                kind: boss.kind,
            });
            self.enemies.push(boss);
        }
    }

    fn spawn_enemies(&mut self, dt: f32) {
        let alive = |kind| {
            self.enemies
                .iter()
                .filter(|e| e.kind == kind && e.entity.alive)
                .count()
        };
        let bats = alive(EnemyKind::Bat);
        let type2s = alive(EnemyKind::Type2);

        let mut ctx = SpawnContext {
            tuning: &self.tuning,
            assets: self.assets.as_ref(),
            rng: &mut self.rng,
            next_id: &mut self.next_id,
        };
        let spawned = self.spawner.update(dt, bats, type2s, &mut ctx);
        for enemy in spawned {
            self.pending.push(GameEvent::EnemySpawned {
                id: enemy.entity.id,
                kind: enemy.kind,
            });
            self.enemies.push(enemy);
        }
    }

    // === Autopilot ===

    /// Synthesize input: shop greedily, revive when possible, otherwise
    /// chase the nearest enemy and swing when it is in reach. Rolls away
    /// from attacks once below half health.
    fn autopilot_input(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        match self.waves.phase() {
            WavePhase::Intermission => {
                let mut pick = self.stats.total_upgrades() as usize;
                while self.essence.can_afford(self.stats.upgrade_cost()) {
                    let stat = StatKind::ALL[pick % StatKind::ALL.len()];
                    if !self.purchase_upgrade(stat) {
                        break;
                    }
                    pick += 1;
                }
                input.shop_done = true;
            }
            WavePhase::GameEndPrompt => input.revive = true,
            WavePhase::GameWon => {}
            WavePhase::PreWaveDelay | WavePhase::InWave => self.autopilot_fight(&mut input),
        }
        input
    }

    fn autopilot_fight(&self, input: &mut FrameInput) {
        let p = &self.player;
        let pos = p.entity.position;
        let target = self
            .enemies
            .iter()
            .filter(|e| e.entity.alive)
            .min_by(|a, b| {
                let da = (a.entity.position.x - pos.x).abs();
                let db = (b.entity.position.x - pos.x).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(enemy) = target else {
            return;
        };

        let dx = enemy.entity.position.x - pos.x;
        let reach = p.entity.radius + PLAYER_ATTACK_REACH + enemy.entity.radius * 0.5;
        let facing_it = dx * p.facing() >= 0.0;

        let hurt_prone = p.entity.health_fraction() < 0.5;
        if hurt_prone && enemy.is_attacking() && dx.abs() < reach && p.stamina() >= ROLL_STAMINA_COST {
            input.roll = true;
        } else if dx.abs() <= reach && facing_it {
            input.attack = true;
        } else if dx < 0.0 {
            input.move_left = true;
        } else {
            input.move_right = true;
        }
    }

    pub fn draw(&self, gfx: &mut dyn Presentation) {
        for enemy in &self.enemies {
            enemy.draw(gfx);
        }
        self.player.draw(gfx);
    }
}
