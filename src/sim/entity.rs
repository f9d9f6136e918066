//! Shared actor body: position, motion, health

use glam::Vec2;

/// Stable actor identifier (for hit registries and logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Physical and health state common to every actor
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: ActorId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub current_health: i32,
    pub max_health: i32,
    pub radius: f32,
    pub alive: bool,
}

impl Entity {
    pub fn new(id: ActorId, position: Vec2, max_health: i32, radius: f32) -> Self {
        let max_health = max_health.max(0);
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            current_health: max_health,
            max_health,
            radius,
            alive: max_health > 0,
        }
    }

    /// Subtract health; returns true if any damage was applied
    ///
    /// Non-positive amounts and dead targets are ignored. Health stops at 0.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || !self.alive {
            return false;
        }
        self.current_health = (self.current_health - amount).max(0);
        if self.current_health == 0 {
            self.alive = false;
        }
        true
    }

    /// Circle overlap with another entity
    pub fn is_colliding_with(&self, other: &Entity) -> bool {
        self.position.distance(other.position) < self.radius + other.radius
    }

    /// Change the health cap
    ///
    /// With `reset_current` the actor is refilled to the new cap. Otherwise
    /// current health only moves when it would exceed a lowered cap.
    pub fn set_max_health(&mut self, value: i32, reset_current: bool) {
        self.max_health = value.max(0);
        if reset_current {
            self.current_health = self.max_health;
            self.alive = self.current_health > 0;
        } else {
            self.current_health = self.current_health.min(self.max_health);
        }
    }

    /// Integrate velocity
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.current_health as f32 / self.max_health as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(health: i32) -> Entity {
        Entity::new(ActorId(1), Vec2::ZERO, health, 10.0)
    }

    #[test]
    fn test_damage_clamps_and_kills() {
        let mut e = body(50);
        assert!(e.take_damage(30));
        assert_eq!(e.current_health, 20);
        assert!(e.alive);
        assert!(e.take_damage(100));
        assert_eq!(e.current_health, 0);
        assert!(!e.alive);
    }

    #[test]
    fn test_circle_overlap() {
        let a = body(10);
        let mut b = body(10);
        b.position = Vec2::new(19.0, 0.0);
        assert!(a.is_colliding_with(&b));
        b.position = Vec2::new(20.0, 0.0);
        assert!(!a.is_colliding_with(&b));
    }

    #[test]
    fn test_set_max_health_without_reset() {
        let mut e = body(100);
        e.take_damage(40);
        e.set_max_health(120, false);
        assert_eq!(e.current_health, 60);
        e.set_max_health(50, false);
        assert_eq!(e.current_health, 50);
        e.set_max_health(80, true);
        assert_eq!(e.current_health, 80);
    }

    proptest! {
        #[test]
        fn test_non_positive_damage_is_ignored(health in 1i32..500, amount in -500i32..=0) {
            let mut e = body(health);
            prop_assert!(!e.take_damage(amount));
            prop_assert_eq!(e.current_health, health);
            prop_assert!(e.alive);
        }

        #[test]
        fn test_dead_stays_dead(health in 1i32..200, hits in prop::collection::vec(1i32..300, 1..10)) {
            let mut e = body(health);
            e.take_damage(health);
            prop_assert!(!e.alive);
            for h in hits {
                prop_assert!(!e.take_damage(h));
                prop_assert_eq!(e.current_health, 0);
            }
        }

        #[test]
        fn test_health_stays_in_range(health in 1i32..300, hits in prop::collection::vec(-50i32..100, 0..20)) {
            let mut e = body(health);
            for h in hits {
                e.take_damage(h);
                prop_assert!(e.current_health >= 0 && e.current_health <= e.max_health);
                prop_assert_eq!(e.alive, e.current_health > 0);
            }
        }
    }
}
