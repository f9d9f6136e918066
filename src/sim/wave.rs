//! Wave progression scheduler
//!
//! PRE_WAVE_DELAY → IN_WAVE → INTERMISSION → PRE_WAVE_DELAY ... until the wave
//! number passes the configured maximum (victory) or the player dies mid-wave
//! (end prompt). The scheduler only emits signals; the scene acts on them.

use crate::tuning::WaveTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    PreWaveDelay,
    InWave,
    Intermission,
    GameWon,
    GameEndPrompt,
}

impl WavePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, WavePhase::GameWon | WavePhase::GameEndPrompt)
    }
}

/// Instructions for the scene produced by a scheduler step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveSignal {
    WaveStarted(u32),
    WaveCleared(u32),
    /// Remove every remaining enemy
    CleanupEnemies,
    OpenShop,
    CloseShop,
    Victory,
    Defeated,
}

#[derive(Debug, Clone)]
pub struct WaveSystem {
    tuning: WaveTuning,
    phase: WavePhase,
    wave_number: u32,
    pre_wave_timer: f32,
    wave_timer: f32,
    intermission_timer: f32,
    kills_this_wave: u32,
    boss_defeated: bool,
}

impl WaveSystem {
    pub fn new(tuning: WaveTuning) -> Self {
        Self {
            phase: WavePhase::PreWaveDelay,
            wave_number: 0,
            pre_wave_timer: tuning.pre_wave_delay,
            wave_timer: 0.0,
            intermission_timer: 0.0,
            kills_this_wave: 0,
            boss_defeated: false,
            tuning,
        }
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn kills_this_wave(&self) -> u32 {
        self.kills_this_wave
    }

    /// Seconds left in the current wave
    pub fn wave_time_left(&self) -> f32 {
        self.wave_timer.max(0.0)
    }

    /// Seconds left in the shop
    pub fn intermission_time_left(&self) -> f32 {
        self.intermission_timer.max(0.0)
    }

    /// The boss wave: past the regular wave count
    pub fn is_final_wave(&self) -> bool {
        self.wave_number > self.tuning.max_waves
    }

    /// Count a kill; ignored outside an active wave
    pub fn on_enemy_killed(&mut self) {
        if self.phase == WavePhase::InWave {
            self.kills_this_wave += 1;
        }
    }

    /// End the current wave at the next step (boss down)
    pub fn on_boss_defeated(&mut self) {
        if self.phase == WavePhase::InWave {
            self.boss_defeated = true;
        }
    }

    /// Advance timers by `dt`
    pub fn tick(&mut self, dt: f32, player_alive: bool) -> Vec<WaveSignal> {
        let mut signals = Vec::new();
        match self.phase {
            WavePhase::PreWaveDelay => {
                self.pre_wave_timer -= dt;
                if self.pre_wave_timer <= 0.0 {
                    self.start_wave(&mut signals);
                }
            }
            WavePhase::InWave => {
                if !player_alive {
                    log::info!("Defeated on wave {}", self.wave_number);
                    self.phase = WavePhase::GameEndPrompt;
                    signals.push(WaveSignal::CleanupEnemies);
                    signals.push(WaveSignal::Defeated);
                    return signals;
                }
                self.wave_timer -= dt;
                let early = self.kills_this_wave >= self.tuning.early_end_kills;
                if self.wave_timer <= 0.0 || early || self.boss_defeated {
                    self.end_wave(&mut signals);
                }
            }
            WavePhase::Intermission => {
                self.intermission_timer -= dt;
                if self.intermission_timer <= 0.0 {
                    signals.extend(self.end_intermission());
                }
            }
            WavePhase::GameWon | WavePhase::GameEndPrompt => {}
        }
        signals
    }

    fn start_wave(&mut self, signals: &mut Vec<WaveSignal>) {
        self.wave_number += 1;
        self.kills_this_wave = 0;
        self.boss_defeated = false;
        self.wave_timer = self.tuning.wave_duration;
        self.phase = WavePhase::InWave;
        log::info!("Wave {} started", self.wave_number);
        signals.push(WaveSignal::WaveStarted(self.wave_number));
    }

    fn end_wave(&mut self, signals: &mut Vec<WaveSignal>) {
        log::info!(
            "Wave {} over ({} kills, {:.1}s left)",
            self.wave_number,
            self.kills_this_wave,
            self.wave_time_left()
        );
        signals.push(WaveSignal::CleanupEnemies);
        signals.push(WaveSignal::WaveCleared(self.wave_number));
        if self.wave_number > self.tuning.max_waves {
            self.phase = WavePhase::GameWon;
            signals.push(WaveSignal::Victory);
        } else {
            self.phase = WavePhase::Intermission;
            self.intermission_timer = self.tuning.intermission_duration;
            signals.push(WaveSignal::OpenShop);
        }
    }

    /// Close the shop early or on timeout
    pub fn end_intermission(&mut self) -> Option<WaveSignal> {
        if self.phase != WavePhase::Intermission {
            return None;
        }
        self.pre_wave_timer = self.tuning.pre_wave_delay;
        self.phase = WavePhase::PreWaveDelay;
        Some(WaveSignal::CloseShop)
    }

    /// After a paid revive: count down into the next wave
    pub fn resume_after_revive(&mut self) -> bool {
        if self.phase != WavePhase::GameEndPrompt {
            return false;
        }
        self.kills_this_wave = 0;
        self.boss_defeated = false;
        self.pre_wave_timer = self.tuning.pre_wave_delay;
        self.phase = WavePhase::PreWaveDelay;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.tuning.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn waves() -> WaveSystem {
        WaveSystem::new(WaveTuning::default())
    }

    /// Step until the phase changes or `limit` seconds pass
    fn run_until_change(w: &mut WaveSystem, alive: bool, limit: f32) -> Vec<WaveSignal> {
        let start = w.phase();
        let mut all = Vec::new();
        let mut t = 0.0;
        while w.phase() == start && t < limit {
            all.extend(w.tick(SIM_DT, alive));
            t += SIM_DT;
        }
        all
    }

    #[test]
    fn test_first_wave_starts_after_delay() {
        let mut w = waves();
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
        assert_eq!(w.wave_number(), 0);
        let signals = run_until_change(&mut w, true, 10.0);
        assert_eq!(w.phase(), WavePhase::InWave);
        assert_eq!(w.wave_number(), 1);
        assert_eq!(signals, vec![WaveSignal::WaveStarted(1)]);
    }

    #[test]
    fn test_timer_expiry_opens_shop() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        let signals = run_until_change(&mut w, true, 100.0);
        assert_eq!(w.phase(), WavePhase::Intermission);
        assert_eq!(
            w.intermission_time_left(),
            WaveTuning::default().intermission_duration
        );
        assert_eq!(
            signals,
            vec![
                WaveSignal::CleanupEnemies,
                WaveSignal::WaveCleared(1),
                WaveSignal::OpenShop
            ]
        );
    }

    #[test]
    fn test_early_end_on_kill_threshold() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        for _ in 0..WaveTuning::default().early_end_kills {
            w.on_enemy_killed();
        }
        w.tick(SIM_DT, true);
        assert_eq!(w.phase(), WavePhase::Intermission);
    }

    #[test]
    fn test_kills_ignored_outside_wave() {
        let mut w = waves();
        w.on_enemy_killed();
        assert_eq!(w.kills_this_wave(), 0);
        run_until_change(&mut w, true, 10.0);
        w.on_enemy_killed();
        assert_eq!(w.kills_this_wave(), 1);
    }

    #[test]
    fn test_player_death_prompts() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        let signals = w.tick(SIM_DT, false);
        assert_eq!(w.phase(), WavePhase::GameEndPrompt);
        assert_eq!(
            signals,
            vec![WaveSignal::CleanupEnemies, WaveSignal::Defeated]
        );
        assert!(w.tick(10.0, false).is_empty());
    }

    #[test]
    fn test_death_outside_wave_is_ignored() {
        let mut w = waves();
        w.tick(SIM_DT, false);
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
    }

    #[test]
    fn test_end_intermission_early() {
        let mut w = waves();
        assert_eq!(w.end_intermission(), None);
        run_until_change(&mut w, true, 10.0);
        run_until_change(&mut w, true, 100.0);
        assert_eq!(w.end_intermission(), Some(WaveSignal::CloseShop));
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
        run_until_change(&mut w, true, 10.0);
        assert_eq!(w.wave_number(), 2);
    }

    #[test]
    fn test_intermission_times_out() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        run_until_change(&mut w, true, 100.0);
        let signals = run_until_change(&mut w, true, 100.0);
        assert_eq!(signals, vec![WaveSignal::CloseShop]);
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
    }

    #[test]
    fn test_victory_after_boss_wave() {
        let tuning = WaveTuning {
            max_waves: 1,
            ..WaveTuning::default()
        };
        let mut w = WaveSystem::new(tuning);
        run_until_change(&mut w, true, 10.0);
        assert!(!w.is_final_wave());
        run_until_change(&mut w, true, 100.0);
        w.end_intermission();
        run_until_change(&mut w, true, 10.0);
        assert_eq!(w.wave_number(), 2);
        assert!(w.is_final_wave());
        w.on_boss_defeated();
        let signals = w.tick(SIM_DT, true);
        assert_eq!(w.phase(), WavePhase::GameWon);
        assert!(signals.contains(&WaveSignal::Victory));
        assert!(!signals.contains(&WaveSignal::OpenShop));
    }

    #[test]
    fn test_revive_moves_on_to_next_wave() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        w.on_enemy_killed();
        w.tick(SIM_DT, false);
        assert!(w.resume_after_revive());
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
        assert_eq!(w.kills_this_wave(), 0);
        let signals = run_until_change(&mut w, true, 10.0);
        assert_eq!(signals, vec![WaveSignal::WaveStarted(2)]);
        assert!(!w.resume_after_revive());
    }

    #[test]
    fn test_wave_number_climbs_across_revives() {
        let mut w = waves();
        let mut started = Vec::new();
        for _ in 0..4 {
            for signal in run_until_change(&mut w, true, 10.0) {
                if let WaveSignal::WaveStarted(n) = signal {
                    started.push(n);
                }
            }
            w.tick(SIM_DT, false);
            assert!(w.resume_after_revive());
        }
        assert_eq!(started, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reset() {
        let mut w = waves();
        run_until_change(&mut w, true, 10.0);
        w.reset();
        assert_eq!(w.phase(), WavePhase::PreWaveDelay);
        assert_eq!(w.wave_number(), 0);
    }

    proptest! {
        #[test]
        fn test_wave_never_skips_to_shop_after_last(max_waves in 1u32..5, kill_waves in prop::collection::vec(any::<bool>(), 8)) {
            let tuning = WaveTuning { max_waves, ..WaveTuning::default() };
            let mut w = WaveSystem::new(tuning);
            for early in kill_waves {
                run_until_change(&mut w, true, 10.0);
                if w.phase() != WavePhase::InWave {
                    break;
                }
                let n = w.wave_number();
                if early {
                    for _ in 0..w.tuning.early_end_kills {
                        w.on_enemy_killed();
                    }
                    w.tick(SIM_DT, true);
                    prop_assert_ne!(w.phase(), WavePhase::InWave);
                } else {
                    run_until_change(&mut w, true, 100.0);
                }
                if n > max_waves {
                    prop_assert_eq!(w.phase(), WavePhase::GameWon);
                    break;
                }
                prop_assert_eq!(w.phase(), WavePhase::Intermission);
                w.end_intermission();
            }
        }
    }
}
