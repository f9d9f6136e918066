//! Data-driven game balance
//!
//! Every number a designer would want to tweak lives here. Missing fields in a
//! JSON file fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Player movement and defensive timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Body radius (used for ground clamp and enemy overlap)
    pub radius: f32,
    /// Horizontal run speed (pixels/s)
    pub run_speed: f32,
    /// Upward velocity applied on jump (pixels/s)
    pub jump_impulse: f32,
    /// Downward acceleration while airborne (pixels/s²)
    pub gravity: f32,
    /// Horizontal speed during a roll
    pub roll_speed: f32,
    /// Knockback impulse when hurt
    pub knockback_x: f32,
    pub knockback_y: f32,
    /// Horizontal speed multiplier while the turn animation plays
    pub turn_speed_factor: f32,
    /// Invincibility windows (seconds)
    pub hurt_invincibility: f32,
    pub hard_landing_invincibility: f32,
    pub revive_invincibility: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 24.0,
            run_speed: 280.0,
            jump_impulse: 620.0,
            gravity: 1800.0,
            roll_speed: 520.0,
            knockback_x: 220.0,
            knockback_y: 240.0,
            turn_speed_factor: 0.5,
            hurt_invincibility: 1.0,
            hard_landing_invincibility: 0.3,
            revive_invincibility: 3.0,
        }
    }
}

/// Base values and per-level increments for upgradable stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatTuning {
    pub base_attack_damage: f32,
    pub attack_damage_per_level: f32,
    pub base_max_health: f32,
    pub max_health_per_level: f32,
    pub base_max_stamina: f32,
    pub max_stamina_per_level: f32,
    /// Stamina points per second
    pub base_stamina_regen: f32,
    pub stamina_regen_per_level: f32,
    /// Health points per second
    pub base_health_regen: f32,
    pub health_regen_per_level: f32,
    /// Cost of the first upgrade
    pub base_upgrade_cost: i32,
    /// Added to the cost for every upgrade already bought
    pub upgrade_cost_step: i32,
}

impl Default for StatTuning {
    fn default() -> Self {
        Self {
            base_attack_damage: 20.0,
            attack_damage_per_level: 5.0,
            base_max_health: 100.0,
            max_health_per_level: 20.0,
            base_max_stamina: 100.0,
            max_stamina_per_level: 15.0,
            base_stamina_regen: 12.0,
            stamina_regen_per_level: 3.0,
            base_health_regen: 0.0,
            health_regen_per_level: 0.5,
            base_upgrade_cost: 10,
            upgrade_cost_step: 5,
        }
    }
}

/// Inclusive range of essence dropped on death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssenceDrop {
    pub min: i32,
    pub max: i32,
}

/// Per-archetype enemy numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub max_health: i32,
    pub move_speed: f32,
    /// Starts walking toward the target inside this distance
    pub detection_range: f32,
    /// Starts an attack inside this distance
    pub attack_range: f32,
    /// Seconds between attack starts
    pub attack_cooldown: f32,
    pub attack_damage: i32,
    /// Seconds into a single-phase attack before damage can land
    pub attack_windup: f32,
    /// Collision radius outside the strike frame
    pub base_radius: f32,
    /// Collision radius during the strike frame
    pub strike_radius: f32,
    /// Horizontal distance under which the enemy stops walking
    pub dead_zone: f32,
    #[serde(default)]
    pub essence_drop: Option<EssenceDrop>,
}

impl EnemyArchetype {
    pub fn bat() -> Self {
        Self {
            max_health: 30,
            move_speed: 130.0,
            detection_range: 450.0,
            attack_range: 50.0,
            attack_cooldown: 1.5,
            attack_damage: 10,
            attack_windup: 0.3,
            base_radius: 20.0,
            strike_radius: 20.0,
            dead_zone: 8.0,
            essence_drop: None,
        }
    }

    pub fn type2() -> Self {
        Self {
            max_health: 60,
            move_speed: 90.0,
            detection_range: 550.0,
            attack_range: 70.0,
            attack_cooldown: 2.0,
            attack_damage: 15,
            attack_windup: 0.0,
            base_radius: 28.0,
            strike_radius: 45.0,
            dead_zone: 30.0,
            essence_drop: Some(EssenceDrop { min: 3, max: 6 }),
        }
    }

    pub fn boss() -> Self {
        Self {
            max_health: 400,
            move_speed: 70.0,
            detection_range: 900.0,
            attack_range: 90.0,
            attack_cooldown: 2.5,
            attack_damage: 25,
            attack_windup: 0.0,
            base_radius: 50.0,
            strike_radius: 80.0,
            dead_zone: 45.0,
            essence_drop: Some(EssenceDrop { min: 20, max: 40 }),
        }
    }

    /// Extra reach granted by the larger strike-frame hitbox
    pub fn strike_bonus(&self) -> f32 {
        (self.strike_radius - self.base_radius).max(0.0)
    }
}

/// Enemy table as written in a file
///
/// Each kind has its own defaults, so absent fields are filled from the kind's
/// archetype rather than from a shared `Default`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArchetypeOverrides {
    max_health: Option<i32>,
    move_speed: Option<f32>,
    detection_range: Option<f32>,
    attack_range: Option<f32>,
    attack_cooldown: Option<f32>,
    attack_damage: Option<i32>,
    attack_windup: Option<f32>,
    base_radius: Option<f32>,
    strike_radius: Option<f32>,
    dead_zone: Option<f32>,
    essence_drop: Option<EssenceDrop>,
}

impl ArchetypeOverrides {
    fn apply(self, base: EnemyArchetype) -> EnemyArchetype {
        EnemyArchetype {
            max_health: self.max_health.unwrap_or(base.max_health),
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            detection_range: self.detection_range.unwrap_or(base.detection_range),
            attack_range: self.attack_range.unwrap_or(base.attack_range),
            attack_cooldown: self.attack_cooldown.unwrap_or(base.attack_cooldown),
            attack_damage: self.attack_damage.unwrap_or(base.attack_damage),
            attack_windup: self.attack_windup.unwrap_or(base.attack_windup),
            base_radius: self.base_radius.unwrap_or(base.base_radius),
            strike_radius: self.strike_radius.unwrap_or(base.strike_radius),
            dead_zone: self.dead_zone.unwrap_or(base.dead_zone),
            essence_drop: self.essence_drop.or(base.essence_drop),
        }
    }
}

fn bat_archetype<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyArchetype, D::Error> {
    ArchetypeOverrides::deserialize(d).map(|o| o.apply(EnemyArchetype::bat()))
}

fn type2_archetype<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyArchetype, D::Error> {
    ArchetypeOverrides::deserialize(d).map(|o| o.apply(EnemyArchetype::type2()))
}

fn boss_archetype<'de, D: Deserializer<'de>>(d: D) -> Result<EnemyArchetype, D::Error> {
    ArchetypeOverrides::deserialize(d).map(|o| o.apply(EnemyArchetype::boss()))
}

/// Boss ranged spell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellTuning {
    /// Maximum distance at which the boss considers casting
    pub range: f32,
    pub cooldown: f32,
    pub damage: i32,
    /// Area radius around the captured target position
    pub radius: f32,
    /// Chance of picking the spell over walking in when eligible
    pub chance: f64,
    /// Fixed phase durations (seconds)
    pub windup_duration: f32,
    pub strike_duration: f32,
    pub over_duration: f32,
}

impl Default for SpellTuning {
    fn default() -> Self {
        Self {
            range: 450.0,
            cooldown: 6.0,
            damage: 20,
            radius: 60.0,
            chance: 0.5,
            windup_duration: 0.8,
            strike_duration: 0.3,
            over_duration: 0.5,
        }
    }
}

/// Enemy spawner timers and population caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub bat_interval: f32,
    pub type2_interval: f32,
    pub max_total: usize,
    pub max_bats: usize,
    pub max_type2: usize,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            bat_interval: 3.0,
            type2_interval: 5.0,
            max_total: 10,
            max_bats: 6,
            max_type2: 4,
        }
    }
}

/// Wave scheduler timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub pre_wave_delay: f32,
    pub wave_duration: f32,
    pub intermission_duration: f32,
    /// Kills that end a wave before its timer runs out
    pub early_end_kills: u32,
    /// Game is won once a wave numbered above this completes
    pub max_waves: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            pre_wave_delay: 3.0,
            wave_duration: 60.0,
            intermission_duration: 30.0,
            early_end_kills: 15,
            max_waves: 5,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub stats: StatTuning,
    #[serde(deserialize_with = "bat_archetype")]
    pub bat: EnemyArchetype,
    #[serde(deserialize_with = "type2_archetype")]
    pub type2: EnemyArchetype,
    #[serde(deserialize_with = "boss_archetype")]
    pub boss: EnemyArchetype,
    pub boss_spell: SpellTuning,
    pub spawner: SpawnTuning,
    pub waves: WaveTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            stats: StatTuning::default(),
            bat: EnemyArchetype::bat(),
            type2: EnemyArchetype::type2(),
            boss: EnemyArchetype::boss(),
            boss_spell: SpellTuning::default(),
            spawner: SpawnTuning::default(),
            waves: WaveTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning table
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject tables that would break simulation invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, archetype) in [("bat", &self.bat), ("type2", &self.type2), ("boss", &self.boss)] {
            if archetype.max_health <= 0 {
                return Err(ConfigError::Invalid(format!("{name}: max_health must be positive")));
            }
            if archetype.base_radius <= 0.0 || archetype.strike_radius < archetype.base_radius {
                return Err(ConfigError::Invalid(format!(
                    "{name}: need 0 < base_radius <= strike_radius"
                )));
            }
            if let Some(drop) = archetype.essence_drop {
                if drop.min < 0 || drop.min > drop.max {
                    return Err(ConfigError::Invalid(format!(
                        "{name}: essence drop range {}..={} is empty",
                        drop.min, drop.max
                    )));
                }
            }
        }

        let w = &self.waves;
        if w.pre_wave_delay <= 0.0 || w.wave_duration <= 0.0 || w.intermission_duration <= 0.0 {
            return Err(ConfigError::Invalid("wave timers must be positive".into()));
        }
        if w.early_end_kills == 0 {
            return Err(ConfigError::Invalid("early_end_kills must be at least 1".into()));
        }

        let s = &self.spawner;
        if s.bat_interval <= 0.0 || s.type2_interval <= 0.0 {
            return Err(ConfigError::Invalid("spawn intervals must be positive".into()));
        }

        if !(0.0..=1.0).contains(&self.boss_spell.chance) {
            return Err(ConfigError::Invalid("boss_spell.chance must be within 0..=1".into()));
        }

        if self.stats.base_upgrade_cost <= 0 || self.stats.upgrade_cost_step <= 0 {
            return Err(ConfigError::Invalid("upgrade costs must be positive".into()));
        }

        if self.player.gravity <= 0.0 || self.player.jump_impulse <= 0.0 {
            return Err(ConfigError::Invalid("player gravity and jump impulse must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "waves": { "max_waves": 2 } }"#).unwrap();
        assert_eq!(tuning.waves.max_waves, 2);
        assert_eq!(tuning.waves.early_end_kills, 15);
        assert_eq!(tuning.boss.max_health, 400);
    }

    #[test]
    fn test_partial_enemy_table_keeps_kind_defaults() {
        let tuning = Tuning::from_json(
            r#"{ "bat": { "max_health": 50 }, "boss": { "essence_drop": { "min": 1, "max": 2 } } }"#,
        )
        .unwrap();
        assert_eq!(tuning.bat.max_health, 50);
        assert_eq!(tuning.bat.move_speed, EnemyArchetype::bat().move_speed);
        assert_eq!(tuning.bat.essence_drop, None);
        assert_eq!(tuning.boss.essence_drop, Some(EssenceDrop { min: 1, max: 2 }));
        assert_eq!(tuning.boss.max_health, 400);
        assert_eq!(tuning.type2.strike_radius, EnemyArchetype::type2().strike_radius);
    }

    #[test]
    fn test_partial_enemy_table_still_validated() {
        let result = Tuning::from_json(r#"{ "type2": { "strike_radius": 1.0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_essence_range_rejected() {
        let mut tuning = Tuning::default();
        tuning.type2.essence_drop = Some(EssenceDrop { min: 9, max: 3 });
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_strike_bonus() {
        let boss = EnemyArchetype::boss();
        assert!((boss.strike_bonus() - 30.0).abs() < 1e-5);
        assert_eq!(EnemyArchetype::bat().strike_bonus(), 0.0);
    }
}
