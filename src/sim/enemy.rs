//! Enemy actors: bat, type-2 brute and boss
//!
//! All three share one state machine and one AI loop; the archetype table
//! decides ranges, timings and radii. The bat bites after a wind-up timer, the
//! brute and boss swing through WINDUP → STRIKE → OVER, and the boss can also
//! cast a delayed area spell at the player's position.

use glam::Vec2;
use rand::Rng;

use super::anim::{AnimationDef, AnimationPlayer};
use super::entity::{ActorId, Entity};
use super::events::GameEvent;
use super::fsm::{ActorState, StateMachine, StateSpec, StateTable};
use super::player::Player;
use crate::consts::*;
use crate::error::InitError;
use crate::facing_sign;
use crate::presentation::{AssetCatalog, Presentation, SpriteDraw};
use crate::tuning::{EnemyArchetype, SpellTuning, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Bat,
    Type2,
    Boss,
}

impl EnemyKind {
    pub fn archetype(self, tuning: &Tuning) -> &EnemyArchetype {
        match self {
            EnemyKind::Bat => &tuning.bat,
            EnemyKind::Type2 => &tuning.type2,
            EnemyKind::Boss => &tuning.boss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Idle,
    Walking,
    /// Single-phase bite (bat)
    Attacking,
    AttackWindup,
    AttackStrike,
    AttackOver,
    /// Boss raising the spell
    Casting,
    SpellWindup,
    SpellStrike,
    SpellOver,
    Hurt,
    Death,
}

impl ActorState for EnemyState {
    const ALL: &'static [Self] = &[
        EnemyState::Idle,
        EnemyState::Walking,
        EnemyState::Attacking,
        EnemyState::AttackWindup,
        EnemyState::AttackStrike,
        EnemyState::AttackOver,
        EnemyState::Casting,
        EnemyState::SpellWindup,
        EnemyState::SpellStrike,
        EnemyState::SpellOver,
        EnemyState::Hurt,
        EnemyState::Death,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn is_death(self) -> bool {
        self == EnemyState::Death
    }

    fn is_hurt(self) -> bool {
        self == EnemyState::Hurt
    }
}

impl EnemyState {
    /// States in which the AI does not pick a new action
    fn is_busy(self) -> bool {
        !matches!(self, EnemyState::Idle | EnemyState::Walking)
    }

    fn is_spell_phase(self) -> bool {
        matches!(
            self,
            EnemyState::SpellWindup | EnemyState::SpellStrike | EnemyState::SpellOver
        )
    }
}

fn enemy_table(kind: EnemyKind, archetype: &EnemyArchetype) -> StateTable<EnemyState> {
    let strike = archetype.strike_radius;
    StateTable::build(|state| match kind {
        EnemyKind::Bat => {
            let fly = AnimationDef::new("bat_fly", 4, 0.1, true);
            match state {
                EnemyState::Attacking => {
                    StateSpec::anim(AnimationDef::new("bat_attack", 6, 0.08, false))
                }
                EnemyState::Hurt => StateSpec::anim(AnimationDef::new("bat_hurt", 2, 0.1, false)),
                EnemyState::Death => {
                    StateSpec::anim(AnimationDef::new("bat_death", 5, 0.1, false))
                }
                _ => StateSpec::anim(fly),
            }
        }
        EnemyKind::Type2 => {
            let idle = AnimationDef::new("type2_idle", 4, 0.12, true);
            match state {
                EnemyState::Walking => {
                    StateSpec::anim(AnimationDef::new("type2_walk", 6, 0.1, true))
                }
                EnemyState::AttackWindup => {
                    StateSpec::anim(AnimationDef::new("type2_attack_windup", 5, 0.1, false))
                }
                EnemyState::AttackStrike => StateSpec::with_radius(
                    AnimationDef::new("type2_attack_strike", 3, 0.08, false),
                    strike,
                ),
                EnemyState::AttackOver => {
                    StateSpec::anim(AnimationDef::new("type2_attack_over", 4, 0.1, false))
                }
                EnemyState::Hurt => {
                    StateSpec::anim(AnimationDef::new("type2_hurt", 3, 0.1, false))
                }
                EnemyState::Death => {
                    StateSpec::anim(AnimationDef::new("type2_death", 6, 0.12, false))
                }
                _ => StateSpec::anim(idle),
            }
        }
        EnemyKind::Boss => {
            let idle = AnimationDef::new("boss_idle", 6, 0.12, true);
            match state {
                EnemyState::Walking => {
                    StateSpec::anim(AnimationDef::new("boss_walk", 8, 0.1, true))
                }
                EnemyState::AttackWindup => {
                    StateSpec::anim(AnimationDef::new("boss_attack_windup", 6, 0.1, false))
                }
                EnemyState::AttackStrike => StateSpec::with_radius(
                    AnimationDef::new("boss_attack_strike", 4, 0.08, false),
                    strike,
                ),
                EnemyState::AttackOver => {
                    StateSpec::anim(AnimationDef::new("boss_attack_over", 5, 0.1, false))
                }
                EnemyState::Casting => {
                    StateSpec::anim(AnimationDef::new("boss_cast", 6, 0.1, false))
                }
                EnemyState::Hurt => StateSpec::anim(AnimationDef::new("boss_hurt", 3, 0.1, false)),
                EnemyState::Death => {
                    StateSpec::anim(AnimationDef::new("boss_death", 10, 0.12, false))
                }
                _ => StateSpec::anim(idle),
            }
        }
    })
}

// === Boss spell ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellPhase {
    Windup,
    Strike,
    Over,
}

impl SpellPhase {
    fn anim(self, tuning: &SpellTuning) -> AnimationDef {
        let (key, frames, duration) = match self {
            SpellPhase::Windup => ("spell_windup", 6, tuning.windup_duration),
            SpellPhase::Strike => ("spell_strike", 4, tuning.strike_duration),
            SpellPhase::Over => ("spell_over", 5, tuning.over_duration),
        };
        AnimationDef::new(key, frames, duration / frames as f32, false)
    }

    fn duration(self, tuning: &SpellTuning) -> f32 {
        match self {
            SpellPhase::Windup => tuning.windup_duration,
            SpellPhase::Strike => tuning.strike_duration,
            SpellPhase::Over => tuning.over_duration,
        }
    }

    fn state(self) -> EnemyState {
        match self {
            SpellPhase::Windup => EnemyState::SpellWindup,
            SpellPhase::Strike => EnemyState::SpellStrike,
            SpellPhase::Over => EnemyState::SpellOver,
        }
    }

    fn next(self) -> Option<SpellPhase> {
        match self {
            SpellPhase::Windup => Some(SpellPhase::Strike),
            SpellPhase::Strike => Some(SpellPhase::Over),
            SpellPhase::Over => None,
        }
    }
}

/// Outcome of advancing a cast by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpellStep {
    Holding,
    Entered(SpellPhase),
    Finished,
}

/// Visual and timing state of a cast in flight
#[derive(Debug, Clone)]
pub struct SpellEffect {
    /// Target location captured when the cast began
    pub position: Vec2,
    phase: SpellPhase,
    elapsed: f32,
    anim: AnimationPlayer,
}

impl SpellEffect {
    fn new(position: Vec2, tuning: &SpellTuning) -> Self {
        Self {
            position,
            phase: SpellPhase::Windup,
            elapsed: 0.0,
            anim: AnimationPlayer::new(SpellPhase::Windup.anim(tuning)),
        }
    }

    pub fn phase(&self) -> SpellPhase {
        self.phase
    }

    fn advance(&mut self, dt: f32, tuning: &SpellTuning) -> SpellStep {
        self.elapsed += dt;
        self.anim.tick(dt);
        if self.elapsed < self.phase.duration(tuning) {
            return SpellStep::Holding;
        }
        match self.phase.next() {
            Some(phase) => {
                self.phase = phase;
                self.elapsed = 0.0;
                self.anim.play(phase.anim(tuning));
                SpellStep::Entered(phase)
            }
            None => SpellStep::Finished,
        }
    }

    fn draw(&self, gfx: &mut dyn Presentation) {
        gfx.draw_sprite(&SpriteDraw {
            asset_key: self.anim.def().asset_key,
            frame: self.anim.frame(),
            position: self.position,
            flip_x: false,
        });
    }
}

/// What a hit did to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead or non-positive amount
    Ignored,
    Hurt,
    Killed,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub entity: Entity,
    pub kind: EnemyKind,
    archetype: EnemyArchetype,
    spell_tuning: Option<SpellTuning>,
    fsm: StateMachine<EnemyState>,
    facing: f32,
    time_since_attack: f32,
    time_since_spell: f32,
    /// Time spent in the current single-phase attack
    attack_elapsed: f32,
    has_dealt_damage: bool,
    spell: Option<SpellEffect>,
    spell_target: Vec2,
    spell_dealt_damage: bool,
}

impl Enemy {
    /// Build an enemy standing on the ground at `x`
    pub fn new(id: ActorId, kind: EnemyKind, tuning: &Tuning, x: f32) -> Self {
        let archetype = kind.archetype(tuning).clone();
        let position = Vec2::new(x, GROUND_Y - archetype.base_radius);
        let spell_tuning = (kind == EnemyKind::Boss).then(|| tuning.boss_spell.clone());
        Self {
            entity: Entity::new(id, position, archetype.max_health, archetype.base_radius),
            kind,
            fsm: StateMachine::new(EnemyState::Idle, enemy_table(kind, &archetype)),
            facing: 1.0,
            // First attack is available as soon as the player is in reach
            time_since_attack: archetype.attack_cooldown,
            time_since_spell: 0.0,
            attack_elapsed: 0.0,
            has_dealt_damage: false,
            spell: None,
            spell_target: position,
            spell_dealt_damage: false,
            archetype,
            spell_tuning,
        }
    }

    /// Verify every sheet this enemy can show is loaded
    pub fn initialise(&self, assets: &dyn AssetCatalog) -> Result<(), InitError> {
        self.fsm.initialise(assets)?;
        if let Some(spell) = &self.spell_tuning {
            for phase in [SpellPhase::Windup, SpellPhase::Strike, SpellPhase::Over] {
                phase.anim(spell).verify(assets)?;
            }
        }
        Ok(())
    }

    pub fn state(&self) -> EnemyState {
        self.fsm.state()
    }

    pub fn archetype(&self) -> &EnemyArchetype {
        &self.archetype
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn spell(&self) -> Option<&SpellEffect> {
        self.spell.as_ref()
    }

    /// In any melee attack phase
    pub fn is_attacking(&self) -> bool {
        matches!(
            self.fsm.state(),
            EnemyState::Attacking
                | EnemyState::AttackWindup
                | EnemyState::AttackStrike
                | EnemyState::AttackOver
        )
    }

    /// Dead and done playing the death animation
    pub fn is_finished(&self) -> bool {
        self.fsm.is(EnemyState::Death) && self.fsm.animation().is_complete()
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.entity.take_damage(amount) {
            return DamageOutcome::Ignored;
        }
        self.spell = None;
        self.entity.velocity = Vec2::ZERO;

        let outcome = if self.entity.alive {
            self.fsm.transition(EnemyState::Hurt, true);
            DamageOutcome::Hurt
        } else {
            self.fsm.transition(EnemyState::Death, false);
            DamageOutcome::Killed
        };
        self.entity.radius = self.fsm.radius_or(self.archetype.base_radius);
        outcome
    }

    /// Essence granted to the killer; zero for kinds that drop nothing
    pub fn roll_essence_drop(&self, rng: &mut impl Rng) -> i32 {
        match self.archetype.essence_drop {
            Some(drop) if drop.max >= drop.min => rng.random_range(drop.min..=drop.max),
            _ => 0,
        }
    }

    // === Per-frame update ===

    pub fn process(
        &mut self,
        dt: f32,
        player: &mut Player,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        self.time_since_attack += dt;
        self.time_since_spell += dt;

        let state = self.fsm.state();
        if !state.is_busy() {
            if player.entity.alive {
                self.think(player, rng, events);
            } else {
                self.entity.velocity.x = 0.0;
                if state == EnemyState::Walking {
                    self.fsm.transition(EnemyState::Idle, true);
                }
            }
        }
        if state != EnemyState::Death {
            self.run_state(dt, player, events);
        }

        self.entity.velocity.y = 0.0;
        self.entity.integrate(dt);

        if let Some(done) = self.fsm.tick(dt) {
            self.on_animation_complete(done);
        }
        self.entity.radius = self.fsm.radius_or(self.archetype.base_radius);
    }

    fn think(&mut self, player: &Player, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        let pos = self.entity.position;
        let target = player.entity.position;
        let dist = pos.distance(target);
        self.facing = facing_sign(pos, target);

        if dist <= self.archetype.attack_range
            && self.time_since_attack >= self.archetype.attack_cooldown
        {
            self.begin_attack();
            return;
        }

        if let Some(spell) = &self.spell_tuning {
            if dist > self.archetype.attack_range
                && dist <= spell.range
                && self.time_since_spell >= spell.cooldown
            {
                self.time_since_spell = 0.0;
                if rng.random_bool(spell.chance.clamp(0.0, 1.0)) {
                    self.begin_cast(target, events);
                    return;
                }
            }
        }

        if dist <= self.archetype.detection_range {
            let dx = target.x - pos.x;
            if dx.abs() > self.archetype.dead_zone {
                self.entity.velocity.x = dx.signum() * self.archetype.move_speed;
                self.fsm.transition(EnemyState::Walking, true);
            } else {
                self.entity.velocity.x = 0.0;
                self.fsm.transition(EnemyState::Idle, true);
            }
        } else {
            self.entity.velocity.x = 0.0;
            self.fsm.transition(EnemyState::Idle, true);
        }
    }

    fn begin_attack(&mut self) {
        self.time_since_attack = 0.0;
        self.attack_elapsed = 0.0;
        self.has_dealt_damage = false;
        self.entity.velocity.x = 0.0;
        let next = match self.kind {
            EnemyKind::Bat => EnemyState::Attacking,
            EnemyKind::Type2 | EnemyKind::Boss => EnemyState::AttackWindup,
        };
        self.fsm.transition(next, true);
        log::trace!("{:?} {:?} attacks", self.kind, self.entity.id);
    }

    fn begin_cast(&mut self, target: Vec2, events: &mut Vec<GameEvent>) {
        self.entity.velocity.x = 0.0;
        self.spell_target = target;
        if self.fsm.transition(EnemyState::Casting, true) {
            events.push(GameEvent::BossCast);
            log::debug!("Boss casting at ({:.0}, {:.0})", target.x, target.y);
        }
    }

    /// Is the target on the side this enemy is facing?
    fn is_in_front(&self, target: Vec2) -> bool {
        (target.x - self.entity.position.x) * self.facing >= 0.0
    }

    fn run_state(&mut self, dt: f32, player: &mut Player, events: &mut Vec<GameEvent>) {
        let pos = self.entity.position;
        match self.fsm.state() {
            EnemyState::Attacking => {
                self.attack_elapsed += dt;
                if self.has_dealt_damage || self.attack_elapsed < self.archetype.attack_windup {
                    return;
                }
                self.has_dealt_damage = true;
                if player.entity.alive
                    && pos.distance(player.entity.position) <= self.archetype.attack_range
                {
                    self.strike_player(player, events);
                }
            }
            EnemyState::AttackStrike => {
                if self.has_dealt_damage || !player.entity.alive {
                    return;
                }
                let reach = self.archetype.attack_range + self.archetype.strike_bonus();
                let target = player.entity.position;
                if self.is_in_front(target) && pos.distance(target) <= reach {
                    self.has_dealt_damage = true;
                    self.strike_player(player, events);
                }
            }
            state if state.is_spell_phase() => self.run_spell(dt, player, events),
            _ => {}
        }
    }

    fn strike_player(&mut self, player: &mut Player, events: &mut Vec<GameEvent>) {
        let amount = self.archetype.attack_damage;
        if player.take_hit(amount, self.entity.position) {
            events.push(GameEvent::PlayerDamaged {
                amount,
                source: self.kind,
            });
        }
    }

    fn run_spell(&mut self, dt: f32, player: &mut Player, events: &mut Vec<GameEvent>) {
        let Some(tuning) = self.spell_tuning.clone() else {
            self.fsm.transition(EnemyState::Idle, true);
            return;
        };
        let Some(spell) = self.spell.as_mut() else {
            self.fsm.transition(EnemyState::Idle, true);
            return;
        };

        if spell.phase == SpellPhase::Strike && !self.spell_dealt_damage {
            self.spell_dealt_damage = true;
            let reach = tuning.radius + player.entity.radius;
            let in_area = player.entity.alive
                && spell.position.distance_squared(player.entity.position) <= reach * reach;
            let source = spell.position;
            let landed = in_area && player.take_hit(tuning.damage, source);
            if landed {
                events.push(GameEvent::PlayerDamaged {
                    amount: tuning.damage,
                    source: self.kind,
                });
            }
            events.push(GameEvent::SpellImpact { hit: landed });
        }

        match spell.advance(dt, &tuning) {
            SpellStep::Holding => {}
            SpellStep::Entered(phase) => {
                self.fsm.transition(phase.state(), true);
            }
            SpellStep::Finished => {
                self.spell = None;
                self.fsm.transition(EnemyState::Idle, true);
            }
        }
    }

    fn on_animation_complete(&mut self, state: EnemyState) {
        match state {
            EnemyState::Attacking | EnemyState::AttackOver | EnemyState::Hurt => {
                self.fsm.transition(EnemyState::Idle, true);
            }
            EnemyState::AttackWindup => {
                self.has_dealt_damage = false;
                self.fsm.transition(EnemyState::AttackStrike, true);
            }
            EnemyState::AttackStrike => {
                self.fsm.transition(EnemyState::AttackOver, true);
            }
            EnemyState::Casting => {
                if let Some(tuning) = &self.spell_tuning {
                    self.spell = Some(SpellEffect::new(self.spell_target, tuning));
                    self.spell_dealt_damage = false;
                    self.fsm.transition(EnemyState::SpellWindup, true);
                } else {
                    self.fsm.transition(EnemyState::Idle, true);
                }
            }
            _ => {}
        }
    }

    pub fn draw(&self, gfx: &mut dyn Presentation) {
        gfx.draw_sprite(&SpriteDraw {
            asset_key: self.fsm.spec().anim.asset_key,
            frame: self.fsm.frame(),
            position: self.entity.position,
            flip_x: self.facing < 0.0,
        });
        if let Some(spell) = &self.spell {
            spell.draw(gfx);
        }
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: EnemyState) {
        self.fsm.force(state);
    }
}
