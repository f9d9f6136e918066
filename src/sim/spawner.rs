//! Timer-gated enemy spawning
//!
//! Each enemy type has its own countdown. When it runs out and there is room
//! under both the aggregate cap and the type's own cap, one enemy appears just
//! outside a random screen edge. While capped the countdown stays expired, so
//! the spawn happens as soon as room frees up.

use rand::Rng;

use super::enemy::{Enemy, EnemyKind};
use super::entity::ActorId;
use crate::consts::*;
use crate::presentation::AssetCatalog;
use crate::tuning::{SpawnTuning, Tuning};

/// What a spawn needs from the scene: balance, sprite sheets, the shared RNG
/// and the id counter
pub struct SpawnContext<'a, R: Rng> {
    pub tuning: &'a Tuning,
    pub assets: &'a dyn AssetCatalog,
    pub rng: &'a mut R,
    pub next_id: &'a mut u32,
}

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    tuning: SpawnTuning,
    bat_timer: f32,
    type2_timer: f32,
}

impl EnemySpawner {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self {
            bat_timer: tuning.bat_interval,
            type2_timer: tuning.type2_interval,
            tuning,
        }
    }

    /// Re-arm both countdowns to their full interval
    pub fn reset(&mut self) {
        self.bat_timer = self.tuning.bat_interval;
        self.type2_timer = self.tuning.type2_interval;
    }

    /// Advance the timers and return any enemies spawned this step
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        current_bats: usize,
        current_type2s: usize,
        ctx: &mut SpawnContext<'_, R>,
    ) -> Vec<Enemy> {
        let mut spawned = Vec::new();
        let mut bats = current_bats;
        let mut type2s = current_type2s;

        self.bat_timer -= dt;
        if self.bat_timer <= 0.0
            && bats + type2s < self.tuning.max_total
            && bats < self.tuning.max_bats
        {
            if let Some(enemy) = spawn(EnemyKind::Bat, ctx) {
                spawned.push(enemy);
                bats += 1;
            }
            self.bat_timer = self.tuning.bat_interval;
        }

        self.type2_timer -= dt;
        if self.type2_timer <= 0.0
            && bats + type2s < self.tuning.max_total
            && type2s < self.tuning.max_type2
        {
            if let Some(enemy) = spawn(EnemyKind::Type2, ctx) {
                spawned.push(enemy);
                type2s += 1;
            }
            self.type2_timer = self.tuning.type2_interval;
        }

        log::trace!("Population: {bats} bats, {type2s} type2");
        spawned
    }
}

/// Build one enemy at a random screen edge, discarding it if it fails to initialise
pub fn spawn<R: Rng>(kind: EnemyKind, ctx: &mut SpawnContext<'_, R>) -> Option<Enemy> {
    let x = if ctx.rng.random_bool(0.5) {
        -SPAWN_EDGE_OFFSET
    } else {
        SCREEN_WIDTH + SPAWN_EDGE_OFFSET
    };
    let id = ActorId(*ctx.next_id);
    *ctx.next_id += 1;

    let enemy = Enemy::new(id, kind, ctx.tuning, x);
    match enemy.initialise(ctx.assets) {
        Ok(()) => {
            log::debug!("Spawned {kind:?} {id:?} at x={x:.0}");
            Some(enemy)
        }
        Err(e) => {
            log::warn!("Failed to spawn {kind:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{AllAssets, KeyedCatalog};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawner() -> EnemySpawner {
        EnemySpawner::new(SpawnTuning::default())
    }

    fn run(
        s: &mut EnemySpawner,
        seconds: f32,
        bats: usize,
        type2s: usize,
        assets: &dyn AssetCatalog,
    ) -> Vec<Enemy> {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut next_id = 1;
        let mut ctx = SpawnContext {
            tuning: &tuning,
            assets,
            rng: &mut rng,
            next_id: &mut next_id,
        };
        let mut out = Vec::new();
        let steps = (seconds / SIM_DT).round() as usize;
        for _ in 0..steps {
            out.extend(s.update(SIM_DT, bats, type2s, &mut ctx));
        }
        out
    }

    #[test]
    fn test_nothing_before_interval() {
        let mut s = spawner();
        assert!(run(&mut s, 2.9, 0, 0, &AllAssets).is_empty());
    }

    #[test]
    fn test_bat_after_interval() {
        let mut s = spawner();
        let spawned = run(&mut s, 3.1, 0, 0, &AllAssets);
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].kind, EnemyKind::Bat);
        let x = spawned[0].entity.position.x;
        assert!(x < 0.0 || x > SCREEN_WIDTH);
    }

    #[test]
    fn test_type_cap_blocks_spawn() {
        let mut s = spawner();
        let max_bats = SpawnTuning::default().max_bats;
        let spawned = run(&mut s, 5.1, max_bats, 0, &AllAssets);
        assert!(spawned.iter().all(|e| e.kind == EnemyKind::Type2));
        assert_eq!(spawned.len(), 1);
    }

    #[test]
    fn test_total_cap_blocks_everything() {
        let mut s = spawner();
        let t = SpawnTuning::default();
        let spawned = run(&mut s, 20.0, t.max_total - 4, 4, &AllAssets);
        assert!(spawned.is_empty());
    }

    #[test]
    fn test_capped_timer_fires_when_room_frees() {
        let mut s = spawner();
        let max_bats = SpawnTuning::default().max_bats;
        assert!(run(&mut s, 4.0, max_bats, 0, &AllAssets)
            .iter()
            .all(|e| e.kind != EnemyKind::Bat));
        let spawned = run(&mut s, SIM_DT, 0, 0, &AllAssets);
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].kind, EnemyKind::Bat);
    }

    #[test]
    fn test_reset_rearms_timers() {
        let mut s = spawner();
        run(&mut s, 2.9, 0, 0, &AllAssets);
        s.reset();
        assert!(run(&mut s, 2.9, 0, 0, &AllAssets).is_empty());
    }

    #[test]
    fn test_failed_init_is_discarded() {
        let mut s = spawner();
        let spawned = run(&mut s, 10.0, 0, 0, &KeyedCatalog::new());
        assert!(spawned.is_empty());
    }
}
