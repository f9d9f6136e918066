//! Generic animated state machine
//!
//! Every actor is one of these parameterized by its own state enum. The table
//! maps each state to exactly one animation and an optional collision radius;
//! the machine enforces the transition guards shared by all actors.

use std::fmt::Debug;

use super::anim::{AnimTick, AnimationDef, AnimationPlayer};
use crate::error::InitError;
use crate::presentation::AssetCatalog;

/// A closed set of actor states usable as a table index
pub trait ActorState: Copy + Eq + Debug + 'static {
    /// Every variant, in index order
    const ALL: &'static [Self];

    /// Position of this state in `ALL`
    fn index(self) -> usize;

    /// Terminal state while the actor is not alive
    fn is_death(self) -> bool;

    /// State that can only be left once its animation completes
    fn is_hurt(self) -> bool;

    /// States that restart when re-entered instead of being a no-op
    fn allows_reentry(self) -> bool {
        false
    }
}

/// Per-state configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpec {
    pub anim: AnimationDef,
    /// Collision radius while in this state; `None` keeps the base radius
    pub radius: Option<f32>,
}

impl StateSpec {
    pub const fn anim(anim: AnimationDef) -> Self {
        Self { anim, radius: None }
    }

    pub const fn with_radius(anim: AnimationDef, radius: f32) -> Self {
        Self {
            anim,
            radius: Some(radius),
        }
    }
}

/// Fixed table of specs indexed by state
#[derive(Debug, Clone)]
pub struct StateTable<S: ActorState> {
    specs: Vec<StateSpec>,
    _states: std::marker::PhantomData<S>,
}

impl<S: ActorState> StateTable<S> {
    /// Build the table by asking `spec_for` about every state
    pub fn build(mut spec_for: impl FnMut(S) -> StateSpec) -> Self {
        let specs = S::ALL.iter().map(|&s| spec_for(s)).collect();
        Self {
            specs,
            _states: std::marker::PhantomData,
        }
    }

    pub fn get(&self, state: S) -> &StateSpec {
        &self.specs[state.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateSpec> {
        self.specs.iter()
    }
}

/// Current state plus the animation it is playing
#[derive(Debug, Clone)]
pub struct StateMachine<S: ActorState> {
    state: S,
    table: StateTable<S>,
    anim: AnimationPlayer,
}

impl<S: ActorState> StateMachine<S> {
    pub fn new(initial: S, table: StateTable<S>) -> Self {
        let anim = AnimationPlayer::new(table.get(initial).anim);
        Self {
            state: initial,
            table,
            anim,
        }
    }

    pub fn state(&self) -> S {
        self.state
    }

    pub fn is(&self, state: S) -> bool {
        self.state == state
    }

    pub fn frame(&self) -> usize {
        self.anim.frame()
    }

    pub fn animation(&self) -> &AnimationPlayer {
        &self.anim
    }

    pub fn spec(&self) -> &StateSpec {
        self.table.get(self.state)
    }

    /// Collision radius for the current state
    pub fn radius_or(&self, base: f32) -> f32 {
        self.spec().radius.unwrap_or(base)
    }

    /// Request a state change; returns whether the machine accepted it
    pub fn transition(&mut self, next: S, alive: bool) -> bool {
        if self.state.is_death() && !alive {
            return false;
        }
        if self.state.is_hurt() && !self.anim.is_complete() && !next.is_death() {
            return false;
        }

        if next == self.state {
            if next.allows_reentry() {
                self.anim.restart();
                return true;
            }
            if self.anim.is_playing() {
                return false;
            }
            if self.anim.def().looping {
                self.anim.restart();
                return true;
            }
            return false;
        }

        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        self.anim.play(self.table.get(next).anim);
        true
    }

    /// Switch state ignoring every guard (revival, resets)
    pub fn force(&mut self, next: S) {
        self.state = next;
        self.anim.play(self.table.get(next).anim);
    }

    /// Advance the animation; returns the state whose one-shot animation just finished
    pub fn tick(&mut self, dt: f32) -> Option<S> {
        match self.anim.tick(dt) {
            AnimTick::Completed => Some(self.state),
            _ => None,
        }
    }

    /// Verify every sheet the table references is available
    pub fn initialise(&self, assets: &dyn AssetCatalog) -> Result<(), InitError> {
        for spec in self.table.iter() {
            spec.anim.verify(assets)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{AllAssets, KeyedCatalog};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Toy {
        Idle,
        Swing,
        Hurt,
        Death,
        Hop,
    }

    impl ActorState for Toy {
        const ALL: &'static [Self] = &[Toy::Idle, Toy::Swing, Toy::Hurt, Toy::Death, Toy::Hop];

        fn index(self) -> usize {
            self as usize
        }

        fn is_death(self) -> bool {
            self == Toy::Death
        }

        fn is_hurt(self) -> bool {
            self == Toy::Hurt
        }

        fn allows_reentry(self) -> bool {
            self == Toy::Hop
        }
    }

    fn machine() -> StateMachine<Toy> {
        let table = StateTable::build(|s| match s {
            Toy::Idle => StateSpec::anim(AnimationDef::new("toy_idle", 4, 0.1, true)),
            Toy::Swing => StateSpec::with_radius(AnimationDef::new("toy_swing", 3, 0.1, false), 40.0),
            Toy::Hurt => StateSpec::anim(AnimationDef::new("toy_hurt", 2, 0.1, false)),
            Toy::Death => StateSpec::anim(AnimationDef::new("toy_death", 5, 0.1, false)),
            Toy::Hop => StateSpec::anim(AnimationDef::new("toy_hop", 3, 0.1, false)),
        });
        StateMachine::new(Toy::Idle, table)
    }

    #[test]
    fn test_cannot_leave_death_while_dead() {
        let mut fsm = machine();
        assert!(fsm.transition(Toy::Death, false));
        assert!(!fsm.transition(Toy::Idle, false));
        assert!(fsm.is(Toy::Death));
        // Revival happens with alive restored
        assert!(fsm.transition(Toy::Idle, true));
    }

    #[test]
    fn test_hurt_blocks_until_complete() {
        let mut fsm = machine();
        fsm.transition(Toy::Hurt, true);
        assert!(!fsm.transition(Toy::Swing, true));
        assert_eq!(fsm.tick(0.25), Some(Toy::Hurt));
        assert!(fsm.transition(Toy::Idle, true));
    }

    #[test]
    fn test_hurt_can_always_die() {
        let mut fsm = machine();
        fsm.transition(Toy::Hurt, true);
        assert!(fsm.transition(Toy::Death, false));
    }

    #[test]
    fn test_same_state_is_noop_while_playing() {
        let mut fsm = machine();
        fsm.transition(Toy::Swing, true);
        fsm.tick(0.15);
        let frame = fsm.frame();
        assert!(!fsm.transition(Toy::Swing, true));
        assert_eq!(fsm.frame(), frame);
    }

    #[test]
    fn test_reentrant_state_restarts() {
        let mut fsm = machine();
        fsm.transition(Toy::Hop, true);
        fsm.tick(0.15);
        assert!(fsm.transition(Toy::Hop, true));
        assert_eq!(fsm.frame(), 0);
    }

    #[test]
    fn test_radius_swaps_with_state() {
        let mut fsm = machine();
        assert_eq!(fsm.radius_or(20.0), 20.0);
        fsm.transition(Toy::Swing, true);
        assert_eq!(fsm.radius_or(20.0), 40.0);
    }

    #[test]
    fn test_initialise_reports_missing_sheet() {
        let fsm = machine();
        assert!(fsm.initialise(&AllAssets).is_ok());
        assert!(matches!(
            fsm.initialise(&KeyedCatalog::new()),
            Err(InitError::MissingAsset { .. })
        ));
    }
}
