//! Hit resolution between the player and enemies
//!
//! The player's sword is an axis-aligned box in front of the body; enemies are
//! circles, tested through their bounding boxes. Enemy attacks resolve inside
//! each enemy's own update, so the enemy-to-player check here is a pure query.

use glam::Vec2;

use super::enemy::{DamageOutcome, Enemy};
use super::entity::ActorId;
use super::player::Player;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Bounding box of a circle
    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        let r = Vec2::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Separating-axis test; both axes must overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let x = self.min.x <= other.max.x && self.max.x >= other.min.x;
        let y = self.min.y <= other.max.y && self.max.y >= other.min.y;
        x && y
    }
}

/// One sword hit that landed this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub target: ActorId,
    pub enemy_index: usize,
    pub damage: i32,
    pub outcome: DamageOutcome,
}

/// Would the player's current swing reach this enemy?
///
/// Ignores the hit registry; only checks state, hit frames and geometry.
pub fn player_attack_reaches(player: &Player, enemy: &Enemy) -> bool {
    if !player.entity.alive || !enemy.entity.alive {
        return false;
    }
    if !player.is_attack_frame_active() {
        return false;
    }
    let target = Aabb::from_circle(enemy.entity.position, enemy.entity.radius);
    player.attack_hitbox().overlaps(&target)
}

/// Apply the player's swing to every enemy it reaches
///
/// Each enemy is hit at most once per swing.
pub fn resolve_player_attacks(player: &mut Player, enemies: &mut [Enemy]) -> Vec<HitReport> {
    let mut hits = Vec::new();
    if !player.is_attack_frame_active() {
        return hits;
    }

    let damage = player.attack_damage();
    for (index, enemy) in enemies.iter_mut().enumerate() {
        if player.has_hit(enemy.entity.id) || !player_attack_reaches(player, enemy) {
            continue;
        }
        player.register_hit(enemy.entity.id);
        let outcome = enemy.take_damage(damage);
        log::debug!(
            "Player hit {:?} {:?} for {damage} ({outcome:?})",
            enemy.kind,
            enemy.entity.id
        );
        hits.push(HitReport {
            target: enemy.entity.id,
            enemy_index: index,
            damage,
            outcome,
        });
    }
    hits
}

/// Is the player currently exposed to this enemy's attack?
///
/// Never applies damage.
pub fn check_player_hit_by_enemy(player: &Player, enemy: &Enemy) -> bool {
    if !player.entity.alive || !enemy.entity.alive {
        return false;
    }
    if player.is_rolling() || player.is_hurt() || player.is_invincible() {
        return false;
    }
    if !enemy.is_attacking() {
        return false;
    }
    player.entity.is_colliding_with(&enemy.entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::presentation::AllAssets;
    use crate::sim::enemy::{EnemyKind, EnemyState};
    use crate::sim::player::PlayerState;
    use crate::tuning::Tuning;

    fn player() -> Player {
        let tuning = Tuning::default();
        let mut p = Player::new(ActorId(0), &tuning, false);
        p.initialise(&AllAssets).unwrap();
        p
    }

    fn type2_at(id: u32, x: f32, y: f32) -> Enemy {
        let tuning = Tuning::default();
        let mut e = Enemy::new(ActorId(id), EnemyKind::Type2, &tuning, x);
        e.entity.position.y = y;
        e
    }

    /// Advance the player's swing into the hit-frame window
    fn swing_to_hit_frame(p: &mut Player) {
        assert!(p.attack());
        let mut guard = 0;
        while p.fsm_frame() < ATTACK_HIT_FRAME_FIRST {
            p.process(SIM_DT);
            guard += 1;
            assert!(guard < 120);
        }
        assert!(p.is_attack_frame_active());
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_circle(Vec2::new(14.0, 5.0), 5.0);
        assert!(a.overlaps(&b));
        let c = Aabb::from_circle(Vec2::new(16.0, 5.0), 5.0);
        assert!(!a.overlaps(&c));
        // Separated on Y only
        let d = Aabb::from_circle(Vec2::new(5.0, 30.0), 5.0);
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_swing_hits_enemy_in_front_once() {
        let mut p = player();
        let pos = p.entity.position;
        let mut enemies = vec![type2_at(1, pos.x + 50.0, pos.y)];
        let health = enemies[0].entity.current_health;

        swing_to_hit_frame(&mut p);
        let mut total = 0;
        while p.is_attack_frame_active() {
            total += resolve_player_attacks(&mut p, &mut enemies).len();
            p.process(SIM_DT);
        }
        assert_eq!(total, 1);
        assert_eq!(
            enemies[0].entity.current_health,
            health - p.attack_damage()
        );
    }

    #[test]
    fn test_swing_misses_enemy_behind() {
        let mut p = player();
        let pos = p.entity.position;
        let mut enemies = vec![type2_at(1, pos.x - 60.0, pos.y)];
        swing_to_hit_frame(&mut p);
        assert!(resolve_player_attacks(&mut p, &mut enemies).is_empty());
    }

    #[test]
    fn test_no_hits_outside_hit_frames() {
        let mut p = player();
        let pos = p.entity.position;
        let mut enemies = vec![type2_at(1, pos.x + 40.0, pos.y)];
        assert!(p.attack());
        assert_eq!(p.state(), PlayerState::Attacking);
        assert_eq!(p.fsm_frame(), 0);
        assert!(resolve_player_attacks(&mut p, &mut enemies).is_empty());
    }

    #[test]
    fn test_new_swing_can_hit_again() {
        let mut p = player();
        let pos = p.entity.position;
        let mut enemies = vec![type2_at(1, pos.x + 50.0, pos.y)];

        swing_to_hit_frame(&mut p);
        assert_eq!(resolve_player_attacks(&mut p, &mut enemies).len(), 1);
        assert!(p.has_hit(ActorId(1)));
        for _ in 0..120 {
            p.process(SIM_DT);
        }
        assert_eq!(p.state(), PlayerState::Idle);
        assert!(!p.has_hit(ActorId(1)));
        swing_to_hit_frame(&mut p);
        assert_eq!(resolve_player_attacks(&mut p, &mut enemies).len(), 1);
    }

    #[test]
    fn test_enemy_contact_query_requires_attack() {
        let p = player();
        let pos = p.entity.position;
        let mut e = type2_at(1, pos.x + 10.0, pos.y);
        assert!(!check_player_hit_by_enemy(&p, &e));
        e.force_state(EnemyState::AttackStrike);
        assert!(check_player_hit_by_enemy(&p, &e));
    }

    fn striking_type2_on(p: &Player) -> Enemy {
        let pos = p.entity.position;
        let mut e = type2_at(1, pos.x + 10.0, pos.y);
        e.force_state(EnemyState::AttackStrike);
        e
    }

    #[test]
    fn test_enemy_contact_query_skips_rolling_player() {
        let mut p = player();
        let e = striking_type2_on(&p);
        assert!(p.roll());
        assert!(p.is_rolling());
        assert!(!check_player_hit_by_enemy(&p, &e));
    }

    #[test]
    fn test_enemy_contact_query_skips_hurt_player() {
        let mut tuning = Tuning::default();
        tuning.player.hurt_invincibility = 0.0;
        let mut p = Player::new(ActorId(0), &tuning, false);
        let e = striking_type2_on(&p);
        assert!(p.take_damage(10));
        assert!(p.is_hurt());
        assert!(!p.is_invincible());
        assert!(!check_player_hit_by_enemy(&p, &e));
    }

    #[test]
    fn test_enemy_contact_query_skips_invincible_player() {
        let mut tuning = Tuning::default();
        tuning.player.hurt_invincibility = 5.0;
        let mut p = Player::new(ActorId(0), &tuning, false);
        assert!(p.take_damage(10));
        for _ in 0..120 {
            p.process(SIM_DT);
        }
        assert!(!p.is_hurt());
        assert!(p.is_invincible());
        let e = striking_type2_on(&p);
        assert!(!check_player_hit_by_enemy(&p, &e));
    }
}
