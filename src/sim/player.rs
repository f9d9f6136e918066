//! The player character
//!
//! Grounded side-view movement with stamina-gated actions. Horizontal input is
//! locked while attacking, rolling, turning, hurt or dead; changing direction
//! on the ground plays a turn animation at reduced speed before the facing
//! flips.

use std::collections::HashSet;

use glam::Vec2;

use super::anim::AnimationDef;
use super::collision::Aabb;
use super::entity::{ActorId, Entity};
use super::essence::AbyssalEssence;
use super::fsm::{ActorState, StateMachine, StateSpec, StateTable};
use super::stats::PlayerStats;
use crate::consts::*;
use crate::error::InitError;
use crate::presentation::{AssetCatalog, Presentation, SpriteDraw};
use crate::tuning::{PlayerTuning, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Running,
    Jumping,
    Falling,
    Attacking,
    Turning,
    Rolling,
    Hurt,
    Death,
}

impl ActorState for PlayerState {
    const ALL: &'static [Self] = &[
        PlayerState::Idle,
        PlayerState::Running,
        PlayerState::Jumping,
        PlayerState::Falling,
        PlayerState::Attacking,
        PlayerState::Turning,
        PlayerState::Rolling,
        PlayerState::Hurt,
        PlayerState::Death,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn is_death(self) -> bool {
        self == PlayerState::Death
    }

    fn is_hurt(self) -> bool {
        self == PlayerState::Hurt
    }

    fn allows_reentry(self) -> bool {
        matches!(self, PlayerState::Jumping | PlayerState::Falling)
    }
}

impl PlayerState {
    /// States that ignore horizontal movement input
    fn locks_movement(self) -> bool {
        matches!(
            self,
            PlayerState::Attacking
                | PlayerState::Rolling
                | PlayerState::Turning
                | PlayerState::Hurt
                | PlayerState::Death
        )
    }

    /// States that block stamina regeneration
    fn drains_stamina(self) -> bool {
        matches!(
            self,
            PlayerState::Rolling | PlayerState::Attacking | PlayerState::Jumping
        )
    }

    fn can_act(self) -> bool {
        matches!(self, PlayerState::Idle | PlayerState::Running)
    }
}

fn player_table() -> StateTable<PlayerState> {
    StateTable::build(|state| {
        let anim = match state {
            PlayerState::Idle => AnimationDef::new("player_idle", 6, 0.1, true),
            PlayerState::Running => AnimationDef::new("player_run", 8, 0.08, true),
            PlayerState::Jumping => AnimationDef::new("player_jump", 4, 0.1, false),
            PlayerState::Falling => AnimationDef::new("player_fall", 3, 0.1, true),
            PlayerState::Attacking => AnimationDef::new("player_attack", 8, 0.06, false),
            PlayerState::Turning => AnimationDef::new("player_turn", 3, 0.06, false),
            PlayerState::Rolling => AnimationDef::new("player_roll", 7, 0.06, false),
            PlayerState::Hurt => AnimationDef::new("player_hurt", 3, 0.1, false),
            PlayerState::Death => AnimationDef::new("player_death", 8, 0.12, false),
        };
        StateSpec::anim(anim)
    })
}

/// Horizontal speed below which the player counts as standing still
const MOVING_EPSILON: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct Player {
    pub entity: Entity,
    tuning: PlayerTuning,
    fsm: StateMachine<PlayerState>,
    /// +1 facing right, -1 facing left
    facing: f32,
    /// Direction the current turn will face when it completes
    turn_target: f32,
    grounded: bool,
    stamina: f32,
    max_stamina: f32,
    stamina_regen: f32,
    health_regen: f32,
    health_regen_acc: f32,
    attack_damage: i32,
    invincibility: f32,
    pre_roll_velocity: Vec2,
    /// Enemies already damaged by the current swing
    hit_registry: HashSet<ActorId>,
    pub god_mode: bool,
}

impl Player {
    pub fn new(id: ActorId, tuning: &Tuning, god_mode: bool) -> Self {
        let stats = PlayerStats::new(tuning.stats.clone());
        let radius = tuning.player.radius;
        let spawn = Self::spawn_point(radius);
        let mut player = Self {
            entity: Entity::new(id, spawn, stats.max_health(), radius),
            tuning: tuning.player.clone(),
            fsm: StateMachine::new(PlayerState::Idle, player_table()),
            facing: 1.0,
            turn_target: 1.0,
            grounded: true,
            stamina: 0.0,
            max_stamina: 0.0,
            stamina_regen: 0.0,
            health_regen: 0.0,
            health_regen_acc: 0.0,
            attack_damage: 0,
            invincibility: 0.0,
            pre_roll_velocity: Vec2::ZERO,
            hit_registry: HashSet::new(),
            god_mode,
        };
        player.apply_stats(&stats, true);
        player
    }

    fn spawn_point(radius: f32) -> Vec2 {
        Vec2::new(SCREEN_WIDTH * 0.5, GROUND_Y - radius)
    }

    /// Verify every animation sheet is loaded
    pub fn initialise(&self, assets: &dyn AssetCatalog) -> Result<(), InitError> {
        self.fsm.initialise(assets)
    }

    // === Queries ===

    pub fn state(&self) -> PlayerState {
        self.fsm.state()
    }

    pub fn fsm_frame(&self) -> usize {
        self.fsm.frame()
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    pub fn is_rolling(&self) -> bool {
        self.fsm.is(PlayerState::Rolling)
    }

    pub fn is_hurt(&self) -> bool {
        self.fsm.is(PlayerState::Hurt)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    /// Attacking and inside the damage frames of the swing
    pub fn is_attack_frame_active(&self) -> bool {
        self.fsm.is(PlayerState::Attacking)
            && (ATTACK_HIT_FRAME_FIRST..=ATTACK_HIT_FRAME_LAST).contains(&self.fsm.frame())
    }

    /// Sword reach box extending from the body in the facing direction
    pub fn attack_hitbox(&self) -> Aabb {
        let pos = self.entity.position;
        let r = self.entity.radius;
        let far = pos.x + self.facing * (r + PLAYER_ATTACK_REACH);
        Aabb::new(Vec2::new(pos.x, pos.y - r), Vec2::new(far, pos.y + r))
    }

    // === Hit registry ===

    /// Record a hit on `target`; false if this swing already hit it
    pub fn register_hit(&mut self, target: ActorId) -> bool {
        self.hit_registry.insert(target)
    }

    pub fn has_hit(&self, target: ActorId) -> bool {
        self.hit_registry.contains(&target)
    }

    // === Commands ===

    pub fn move_left(&mut self) {
        self.move_towards(-1.0);
    }

    pub fn move_right(&mut self) {
        self.move_towards(1.0);
    }

    fn move_towards(&mut self, dir: f32) {
        let state = self.fsm.state();
        if state.locks_movement() {
            return;
        }

        if dir != self.facing {
            if self.grounded {
                if self.fsm.transition(PlayerState::Turning, self.entity.alive) {
                    self.turn_target = dir;
                    self.entity.velocity.x =
                        dir * self.tuning.run_speed * self.tuning.turn_speed_factor;
                }
                return;
            }
            // Mid-air direction changes snap
            self.facing = dir;
        }

        self.entity.velocity.x = dir * self.tuning.run_speed;
        if self.grounded && state == PlayerState::Idle {
            self.fsm.transition(PlayerState::Running, self.entity.alive);
        }
    }

    pub fn stop_moving(&mut self) {
        let state = self.fsm.state();
        if state.locks_movement() {
            return;
        }
        self.entity.velocity.x = 0.0;
        if self.grounded && state == PlayerState::Running {
            self.fsm.transition(PlayerState::Idle, self.entity.alive);
        }
    }

    /// Spend stamina if there is enough
    pub fn use_stamina(&mut self, cost: f32) -> bool {
        if cost < 0.0 || self.stamina < cost {
            return false;
        }
        self.stamina = (self.stamina - cost).max(0.0);
        true
    }

    pub fn jump(&mut self) -> bool {
        if !self.fsm.state().can_act() || !self.grounded {
            return false;
        }
        if !self.use_stamina(JUMP_STAMINA_COST) {
            return false;
        }
        self.entity.velocity.y = -self.tuning.jump_impulse;
        self.grounded = false;
        self.fsm.transition(PlayerState::Jumping, self.entity.alive);
        true
    }

    pub fn attack(&mut self) -> bool {
        if !self.fsm.state().can_act() || !self.use_stamina(ATTACK_STAMINA_COST) {
            return false;
        }
        self.hit_registry.clear();
        self.entity.velocity.x = 0.0;
        self.fsm.transition(PlayerState::Attacking, self.entity.alive);
        true
    }

    pub fn roll(&mut self) -> bool {
        if !self.fsm.state().can_act() || !self.use_stamina(ROLL_STAMINA_COST) {
            return false;
        }
        self.pre_roll_velocity = self.entity.velocity;
        self.entity.velocity.x = self.facing * self.tuning.roll_speed;
        self.fsm.transition(PlayerState::Rolling, self.entity.alive);
        true
    }

    /// Take damage with knockback pushing away from the facing direction
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let from = self.entity.position + Vec2::new(self.facing, 0.0);
        self.take_hit(amount, from)
    }

    /// Take damage with knockback pushing away from `source`
    ///
    /// Returns whether any damage was applied.
    pub fn take_hit(&mut self, amount: i32, source: Vec2) -> bool {
        if self.is_rolling() || self.is_invincible() || self.god_mode {
            return false;
        }
        if !self.entity.take_damage(amount) {
            return false;
        }

        self.hit_registry.clear();
        if !self.entity.alive {
            self.fsm.transition(PlayerState::Death, false);
            self.entity.velocity = Vec2::ZERO;
            log::info!("Player died");
            return true;
        }

        self.fsm.transition(PlayerState::Hurt, true);
        let away = crate::normalise(Vec2::new(self.entity.position.x - source.x, 0.0));
        let push = if away.x == 0.0 { -self.facing } else { away.x };
        self.entity.velocity = Vec2::new(push * self.tuning.knockback_x, -self.tuning.knockback_y);
        self.grounded = false;
        self.invincibility = self.tuning.hurt_invincibility;
        log::debug!(
            "Player took {amount} ({}/{})",
            self.entity.current_health,
            self.entity.max_health
        );
        true
    }

    // === Per-frame update ===

    pub fn process(&mut self, dt: f32) {
        self.invincibility = (self.invincibility - dt).max(0.0);

        if self.entity.alive {
            self.regenerate(dt);
        }

        self.integrate(dt);

        if let Some(done) = self.fsm.tick(dt) {
            self.on_animation_complete(done);
        }
        self.entity.radius = self.fsm.radius_or(self.tuning.radius);
    }

    fn regenerate(&mut self, dt: f32) {
        if !self.fsm.state().drains_stamina() {
            self.stamina = (self.stamina + self.stamina_regen * dt).min(self.max_stamina);
        }

        let e = &mut self.entity;
        if e.current_health >= e.max_health || self.health_regen <= 0.0 {
            self.health_regen_acc = 0.0;
            return;
        }
        self.health_regen_acc += self.health_regen * dt;
        if self.health_regen_acc >= 1.0 {
            let whole = self.health_regen_acc.floor();
            e.current_health = (e.current_health + whole as i32).min(e.max_health);
            self.health_regen_acc -= whole;
        }
    }

    fn integrate(&mut self, dt: f32) {
        let state = self.fsm.state();
        if state == PlayerState::Attacking || state == PlayerState::Death {
            self.entity.velocity.x = 0.0;
        }
        if !self.grounded {
            self.entity.velocity.y += self.tuning.gravity * dt;
        }
        self.entity.integrate(dt);

        let r = self.entity.radius;
        self.entity.position.x = self.entity.position.x.clamp(r, SCREEN_WIDTH - r);

        let floor = GROUND_Y - r;
        if self.entity.position.y >= floor {
            self.entity.position.y = floor;
            if !self.grounded {
                self.land();
            }
        } else if state == PlayerState::Jumping && self.entity.velocity.y > 0.0 {
            self.fsm.transition(PlayerState::Falling, self.entity.alive);
        }
    }

    fn land(&mut self) {
        let descent = self.entity.velocity.y;
        self.grounded = true;
        self.entity.velocity.y = 0.0;

        if descent > self.tuning.jump_impulse * 0.5 {
            self.invincibility = self
                .invincibility
                .max(self.tuning.hard_landing_invincibility);
        }

        match self.fsm.state() {
            PlayerState::Jumping | PlayerState::Falling => {
                let next = if self.entity.velocity.x.abs() > MOVING_EPSILON {
                    PlayerState::Running
                } else {
                    PlayerState::Idle
                };
                self.fsm.transition(next, self.entity.alive);
            }
            PlayerState::Hurt | PlayerState::Death => self.entity.velocity.x = 0.0,
            _ => {}
        }
    }

    fn on_animation_complete(&mut self, state: PlayerState) {
        let alive = self.entity.alive;
        match state {
            PlayerState::Attacking => {
                self.hit_registry.clear();
                self.fsm.transition(PlayerState::Idle, alive);
            }
            PlayerState::Turning => {
                self.facing = self.turn_target;
                self.entity.velocity.x = self.facing * self.tuning.run_speed;
                self.fsm.transition(PlayerState::Running, alive);
            }
            PlayerState::Rolling => {
                self.entity.velocity.x = self.pre_roll_velocity.x;
                let next = if !self.grounded {
                    PlayerState::Falling
                } else if self.entity.velocity.x.abs() > MOVING_EPSILON {
                    PlayerState::Running
                } else {
                    PlayerState::Idle
                };
                self.fsm.transition(next, alive);
            }
            PlayerState::Jumping => {
                self.fsm.transition(PlayerState::Falling, alive);
            }
            PlayerState::Hurt => {
                let next = if self.grounded {
                    self.entity.velocity.x = 0.0;
                    PlayerState::Idle
                } else {
                    PlayerState::Falling
                };
                self.fsm.transition(next, alive);
            }
            _ => {}
        }
    }

    // === Stats, revival, reset ===

    /// Refresh derived maxima from the stat sheet
    pub fn apply_stats(&mut self, stats: &PlayerStats, reset_current: bool) {
        self.entity.set_max_health(stats.max_health(), reset_current);
        self.max_stamina = stats.max_stamina();
        self.stamina = if reset_current {
            self.max_stamina
        } else {
            self.stamina.min(self.max_stamina)
        };
        self.stamina_regen = stats.stamina_regen();
        self.health_regen = stats.health_regen();
        self.attack_damage = stats.attack_damage();
    }

    /// Pay the revive cost and get back up
    ///
    /// Only valid while dead in the death state.
    pub fn spend_for_revive(&mut self, essence: &mut AbyssalEssence, stats: &PlayerStats) -> bool {
        if self.entity.alive || !self.fsm.is(PlayerState::Death) {
            return false;
        }
        if !essence.spend(REVIVE_ESSENCE_COST) {
            log::debug!(
                "Revive refused: {} essence, need {REVIVE_ESSENCE_COST}",
                essence.balance()
            );
            return false;
        }
        self.apply_stats(stats, true);
        self.health_regen_acc = 0.0;
        self.entity.velocity = Vec2::ZERO;
        self.hit_registry.clear();
        self.fsm.force(PlayerState::Idle);
        self.invincibility = self.tuning.revive_invincibility;
        log::info!("Player revived");
        true
    }

    /// Back to a fresh character at the spawn point
    pub fn reset(&mut self, stats: &PlayerStats) {
        self.entity.position = Self::spawn_point(self.tuning.radius);
        self.entity.velocity = Vec2::ZERO;
        self.entity.radius = self.tuning.radius;
        self.apply_stats(stats, true);
        self.facing = 1.0;
        self.turn_target = 1.0;
        self.grounded = true;
        self.health_regen_acc = 0.0;
        self.invincibility = 0.0;
        self.pre_roll_velocity = Vec2::ZERO;
        self.hit_registry.clear();
        self.fsm.force(PlayerState::Idle);
    }

    pub fn draw(&self, gfx: &mut dyn Presentation) {
        gfx.draw_sprite(&SpriteDraw {
            asset_key: self.fsm.spec().anim.asset_key,
            frame: self.fsm.frame(),
            position: self.entity.position,
            flip_x: self.facing < 0.0,
        });
    }
}
