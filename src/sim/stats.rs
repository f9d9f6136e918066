//! Upgradable player stats

use super::essence::AbyssalEssence;
use crate::tuning::StatTuning;

/// Stats the shop can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    AttackDamage,
    MaxHealth,
    MaxStamina,
    StaminaRegen,
    HealthRegen,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::AttackDamage,
        StatKind::MaxHealth,
        StatKind::MaxStamina,
        StatKind::StaminaRegen,
        StatKind::HealthRegen,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Upgrade levels plus the derived values they produce
#[derive(Debug, Clone)]
pub struct PlayerStats {
    tuning: StatTuning,
    levels: [u32; 5],
    total_upgrades: u32,
    upgrade_cost: i32,
}

impl PlayerStats {
    pub fn new(tuning: StatTuning) -> Self {
        let upgrade_cost = tuning.base_upgrade_cost;
        Self {
            tuning,
            levels: [0; 5],
            total_upgrades: 0,
            upgrade_cost,
        }
    }

    pub fn level(&self, kind: StatKind) -> u32 {
        self.levels[kind.index()]
    }

    pub fn total_upgrades(&self) -> u32 {
        self.total_upgrades
    }

    /// Essence price of the next upgrade of any stat
    pub fn upgrade_cost(&self) -> i32 {
        self.upgrade_cost
    }

    /// Effective value: base + level × per-level increment
    pub fn value(&self, kind: StatKind) -> f32 {
        let t = &self.tuning;
        let (base, step) = match kind {
            StatKind::AttackDamage => (t.base_attack_damage, t.attack_damage_per_level),
            StatKind::MaxHealth => (t.base_max_health, t.max_health_per_level),
            StatKind::MaxStamina => (t.base_max_stamina, t.max_stamina_per_level),
            StatKind::StaminaRegen => (t.base_stamina_regen, t.stamina_regen_per_level),
            StatKind::HealthRegen => (t.base_health_regen, t.health_regen_per_level),
        };
        base + self.level(kind) as f32 * step
    }

    pub fn attack_damage(&self) -> i32 {
        self.value(StatKind::AttackDamage).round() as i32
    }

    pub fn max_health(&self) -> i32 {
        self.value(StatKind::MaxHealth).round() as i32
    }

    pub fn max_stamina(&self) -> f32 {
        self.value(StatKind::MaxStamina)
    }

    pub fn stamina_regen(&self) -> f32 {
        self.value(StatKind::StaminaRegen)
    }

    pub fn health_regen(&self) -> f32 {
        self.value(StatKind::HealthRegen)
    }

    /// Buy one level of `kind` if the essence covers the current cost
    pub fn attempt_upgrade(&mut self, kind: StatKind, essence: &mut AbyssalEssence) -> bool {
        if !essence.spend(self.upgrade_cost) {
            return false;
        }
        self.levels[kind.index()] += 1;
        self.total_upgrades += 1;
        self.recompute_cost();
        log::debug!(
            "Upgraded {kind:?} to level {} (next costs {})",
            self.level(kind),
            self.upgrade_cost
        );
        true
    }

    fn recompute_cost(&mut self) {
        let step = self.tuning.upgrade_cost_step.max(1);
        self.upgrade_cost = self
            .tuning
            .base_upgrade_cost
            .saturating_add(step.saturating_mul(self.total_upgrades as i32));
    }

    /// Back to level zero everywhere
    pub fn reset(&mut self) {
        self.levels = [0; 5];
        self.total_upgrades = 0;
        self.recompute_cost();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_values() {
        let stats = PlayerStats::new(StatTuning::default());
        assert_eq!(stats.max_health(), 100);
        assert_eq!(stats.attack_damage(), 20);
        assert_eq!(stats.upgrade_cost(), 10);
    }

    #[test]
    fn test_upgrade_spends_and_levels() {
        let mut stats = PlayerStats::new(StatTuning::default());
        let mut essence = AbyssalEssence::new(25);
        assert!(stats.attempt_upgrade(StatKind::MaxHealth, &mut essence));
        assert_eq!(essence.balance(), 15);
        assert_eq!(stats.level(StatKind::MaxHealth), 1);
        assert_eq!(stats.max_health(), 120);
        assert_eq!(stats.upgrade_cost(), 15);

        assert!(stats.attempt_upgrade(StatKind::AttackDamage, &mut essence));
        assert_eq!(essence.balance(), 0);
        assert!(!stats.attempt_upgrade(StatKind::AttackDamage, &mut essence));
        assert_eq!(stats.level(StatKind::AttackDamage), 1);
    }

    #[test]
    fn test_reset_restores_cost() {
        let mut stats = PlayerStats::new(StatTuning::default());
        let mut essence = AbyssalEssence::new(100);
        stats.attempt_upgrade(StatKind::HealthRegen, &mut essence);
        stats.reset();
        assert_eq!(stats.level(StatKind::HealthRegen), 0);
        assert_eq!(stats.upgrade_cost(), 10);
    }

    fn any_kind() -> impl Strategy<Value = StatKind> {
        prop::sample::select(StatKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_cost_strictly_increases(budget in 0i32..2000, picks in prop::collection::vec(any_kind(), 1..30)) {
            let mut stats = PlayerStats::new(StatTuning::default());
            let mut essence = AbyssalEssence::new(budget);
            for kind in picks {
                let before_cost = stats.upgrade_cost();
                let before_level = stats.level(kind);
                if stats.attempt_upgrade(kind, &mut essence) {
                    prop_assert!(stats.upgrade_cost() > before_cost);
                    prop_assert_eq!(stats.level(kind), before_level + 1);
                } else {
                    prop_assert_eq!(stats.upgrade_cost(), before_cost);
                    prop_assert_eq!(stats.level(kind), before_level);
                }
            }
        }
    }
}
