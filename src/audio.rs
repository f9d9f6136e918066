//! Audio playback seam
//!
//! The simulation only names sounds; an `AudioBackend` supplied by the host
//! turns those names into noise. Fire-and-forget: nothing waits on playback.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Sword swing starts
    PlayerAttack,
    /// Player leaves the ground
    PlayerJump,
    /// Dodge roll starts
    PlayerRoll,
    /// Player takes a hit
    PlayerHurt,
    /// Player health reaches zero
    PlayerDeath,
    /// Player gets back up
    PlayerRevive,
    /// Sword connects with an enemy
    EnemyHit,
    /// Enemy health reaches zero
    EnemyDeath,
    /// Boss starts its cast animation
    BossCast,
    /// Boss spell detonates
    SpellImpact,
    /// Wave begins
    WaveStart,
    /// Wave ends with the player alive
    WaveClear,
    /// Upgrade bought in the shop
    Purchase,
    /// Final wave cleared
    Victory,
    /// Player died mid-wave
    Defeat,
}

impl SoundEffect {
    /// Logical name the host maps to an actual clip
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::PlayerAttack => "player_attack",
            SoundEffect::PlayerJump => "player_jump",
            SoundEffect::PlayerRoll => "player_roll",
            SoundEffect::PlayerHurt => "player_hurt",
            SoundEffect::PlayerDeath => "player_death",
            SoundEffect::PlayerRevive => "player_revive",
            SoundEffect::EnemyHit => "enemy_hit",
            SoundEffect::EnemyDeath => "enemy_death",
            SoundEffect::BossCast => "boss_cast",
            SoundEffect::SpellImpact => "spell_impact",
            SoundEffect::WaveStart => "wave_start",
            SoundEffect::WaveClear => "wave_clear",
            SoundEffect::Purchase => "purchase",
            SoundEffect::Victory => "victory",
            SoundEffect::Defeat => "defeat",
        }
    }
}

/// Whatever actually plays sounds
pub trait AudioBackend {
    fn play_sound(&mut self, id: &str, volume: f32);
}

/// Backend that only logs; used by the headless runner
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_sound(&mut self, id: &str, volume: f32) {
        log::trace!("sound '{id}' at {volume:.2}");
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(LogBackend))
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Build a manager with volumes taken from settings
    pub fn from_settings(backend: Box<dyn AudioBackend>, settings: &crate::Settings) -> Self {
        let mut manager = Self::new(backend);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play_sound(effect.name(), vol);
    }
}
