//! Things that happened during a tick
//!
//! The scene collects these so hosts can react (sounds, screen flashes, HUD
//! popups) without the simulation calling into them directly.

use super::enemy::EnemyKind;
use super::entity::ActorId;
use super::stats::StatKind;
use crate::audio::SoundEffect;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    ShopOpened,
    ShopClosed,
    EnemySpawned { id: ActorId, kind: EnemyKind },
    EnemyHit { id: ActorId, damage: i32 },
    EnemyKilled { id: ActorId, kind: EnemyKind, essence: i32 },
    PlayerAttacked,
    PlayerJumped,
    PlayerRolled,
    PlayerDamaged { amount: i32, source: EnemyKind },
    PlayerDied,
    PlayerRevived,
    BossCast,
    SpellImpact { hit: bool },
    UpgradePurchased { stat: StatKind, level: u32 },
    Victory,
    Defeat,
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn sound(&self) -> Option<SoundEffect> {
        let effect = match self {
            GameEvent::WaveStarted { .. } => SoundEffect::WaveStart,
            GameEvent::WaveCleared { .. } => SoundEffect::WaveClear,
            GameEvent::EnemyHit { .. } => SoundEffect::EnemyHit,
            GameEvent::EnemyKilled { .. } => SoundEffect::EnemyDeath,
            GameEvent::PlayerAttacked => SoundEffect::PlayerAttack,
            GameEvent::PlayerJumped => SoundEffect::PlayerJump,
            GameEvent::PlayerRolled => SoundEffect::PlayerRoll,
            GameEvent::PlayerDamaged { .. } => SoundEffect::PlayerHurt,
            GameEvent::PlayerDied => SoundEffect::PlayerDeath,
            GameEvent::PlayerRevived => SoundEffect::PlayerRevive,
            GameEvent::BossCast => SoundEffect::BossCast,
            GameEvent::SpellImpact { .. } => SoundEffect::SpellImpact,
            GameEvent::UpgradePurchased { .. } => SoundEffect::Purchase,
            GameEvent::Victory => SoundEffect::Victory,
            GameEvent::Defeat => SoundEffect::Defeat,
            GameEvent::ShopOpened | GameEvent::ShopClosed | GameEvent::EnemySpawned { .. } => {
                return None;
            }
        };
        Some(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_events() {
        assert_eq!(GameEvent::ShopOpened.sound(), None);
        assert_eq!(
            GameEvent::EnemySpawned {
                id: ActorId(3),
                kind: EnemyKind::Bat
            }
            .sound(),
            None
        );
    }

    #[test]
    fn test_combat_sounds() {
        assert_eq!(
            GameEvent::PlayerDamaged {
                amount: 5,
                source: EnemyKind::Boss
            }
            .sound(),
            Some(SoundEffect::PlayerHurt)
        );
        assert_eq!(GameEvent::Victory.sound(), Some(SoundEffect::Victory));
    }
}
