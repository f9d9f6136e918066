//! Abyssal Vigil - a 2D wave-survival action game
//!
//! Core modules:
//! - `sim`: Combat simulation (actor state machines, collision, spawning, waves)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `audio`: Logical sound ids and the volume-aware playback seam
//! - `presentation`: Draw and asset seams the simulation talks through
//!
//! Rendering, input polling and audio output live outside this crate; the
//! simulation only reaches them through the traits in `presentation` and
//! `audio`.

pub mod audio;
pub mod error;
pub mod presentation;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, InitError};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Visible play area
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;
    /// Floor line actors stand on (y grows downward)
    pub const GROUND_Y: f32 = 620.0;

    /// Player attack frames that can land a hit (inclusive)
    pub const ATTACK_HIT_FRAME_FIRST: usize = 2;
    pub const ATTACK_HIT_FRAME_LAST: usize = 5;
    /// How far the sword hitbox reaches past the player's body
    pub const PLAYER_ATTACK_REACH: f32 = 60.0;

    /// Stamina costs
    pub const JUMP_STAMINA_COST: f32 = 10.0;
    pub const ATTACK_STAMINA_COST: f32 = 5.0;
    pub const ROLL_STAMINA_COST: f32 = 15.0;

    /// Essence spent to get back up after dying
    pub const REVIVE_ESSENCE_COST: i32 = 50;

    /// Spawns appear this far outside the visible bounds
    pub const SPAWN_EDGE_OFFSET: f32 = 60.0;
}

/// Normalise a vector; zero-length vectors come back unchanged
#[inline]
pub fn normalise(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(v)
}

/// Horizontal direction an actor should face to look at `to` from `from`
/// (ties keep facing right)
#[inline]
pub fn facing_sign(from: Vec2, to: Vec2) -> f32 {
    if to.x < from.x { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_zero_is_unchanged() {
        assert_eq!(normalise(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_normalise_unit_length() {
        let n = normalise(Vec2::new(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!((n.x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(facing_sign(Vec2::new(10.0, 0.0), Vec2::new(0.0, 0.0)), -1.0);
        assert_eq!(facing_sign(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)), 1.0);
        assert_eq!(facing_sign(Vec2::ZERO, Vec2::ZERO), 1.0);
    }
}
