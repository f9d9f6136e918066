//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies beyond the injected seams

pub mod anim;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod essence;
pub mod events;
pub mod fsm;
pub mod player;
pub mod scene;
pub mod spawner;
pub mod stats;
pub mod wave;

pub use anim::{AnimTick, AnimationDef, AnimationPlayer};
pub use collision::{Aabb, HitReport, check_player_hit_by_enemy, resolve_player_attacks};
pub use enemy::{DamageOutcome, Enemy, EnemyKind, EnemyState, SpellEffect, SpellPhase};
pub use entity::{ActorId, Entity};
pub use essence::AbyssalEssence;
pub use events::GameEvent;
pub use fsm::{ActorState, StateMachine, StateSpec, StateTable};
pub use player::{Player, PlayerState};
pub use scene::{FrameInput, GameScene};
pub use spawner::{EnemySpawner, SpawnContext};
pub use stats::{PlayerStats, StatKind};
pub use wave::{WavePhase, WaveSignal, WaveSystem};
