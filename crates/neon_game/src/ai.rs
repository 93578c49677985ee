//! Enemy steering: a forward-facing sight line, target tracking with a
//! grace period after losing sight, idle wandering, and attack timing.
//!
//! [`steer`] only decides. When it returns an [`AttackKind`] the caller
//! resolves the hit against the world (see `combat::resolve_attack`).

use rand::Rng;

use neon_core::animation::AnimState;
use neon_core::geometry::Rect;

use crate::enemy::{AttackKind, Behavior, Enemy};
use crate::entity::Entity;

/// Thrust while chasing a target, px/s².
pub const CHASE_MOMENTUM: f32 = 2000.0;
/// Thrust while wandering, px/s².
pub const WANDER_MOMENTUM: f32 = 200.0;
pub const SIGHT_HEIGHT: f32 = 5.0;

/// Sight line from the enemy's eyes, `view_distance` long, in the facing
/// direction.
pub fn detection_box(enemy: &Enemy) -> Rect {
    let eyes = enemy.entity.eyes();
    let x = if enemy.entity.facing >= 0.0 {
        eyes.x
    } else {
        eyes.x - enemy.view_distance
    };
    Rect::new(x, eyes.y, enemy.view_distance, SIGHT_HEIGHT)
}

/// Whether the enemy's near edge plus attack range reaches the player's near
/// edge, measured along the facing direction.
pub fn in_attack_reach(enemy: &Enemy, player: &Entity) -> bool {
    let e = &enemy.entity;
    let half_e = e.size.x / 2.0;
    let half_p = player.size.x / 2.0;
    if e.facing >= 0.0 {
        e.position.x + half_e + enemy.attack_range >= player.position.x - half_p
    } else {
        e.position.x - half_e - enemy.attack_range <= player.position.x + half_p
    }
}

pub fn steer<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    player: &Entity,
    dt: f32,
    rng: &mut R,
) -> Option<AttackKind> {
    if enemy.entity.is_dying() {
        return None;
    }
    enemy.time_since_last_attack += dt;
    enemy.time_since_behavior_change += dt;

    if detection_box(enemy).overlaps(&player.body_rect()) {
        enemy.no_detection_time = 0.0;
        if enemy.behavior == Behavior::None {
            log::debug!("Enemy #{} acquired the player", enemy.id);
            enemy.behavior = Behavior::Move;
            enemy.entity.velocity.x = 0.0;
        }
        enemy.target = Some(player.position);

        if !in_attack_reach(enemy, player) {
            enemy.behavior = Behavior::Move;
            move_to_target(enemy);
            return None;
        }

        // In reach: strike on the cadence, only at the start of an
        // upper-body cycle.
        let ready = enemy.time_since_last_attack >= enemy.attack_cooldown();
        if !player.is_dying() && ready && enemy.entity.upper.frame == 0 {
            enemy.time_since_last_attack = 0.0;
            enemy.behavior = Behavior::Attack;
            return begin_attack(enemy);
        }
        return None;
    }

    if enemy.behavior == Behavior::None {
        wander(enemy, rng);
        return None;
    }

    enemy.no_detection_time += dt;
    enemy.target = Some(player.position);
    if enemy.no_detection_time >= enemy.lose_target_interval {
        log::debug!("Enemy #{} lost the player", enemy.id);
        enemy.behavior = Behavior::None;
        enemy.target = None;
    } else {
        enemy.behavior = Behavior::Move;
        move_to_target(enemy);
    }
    None
}

fn look_at_target(enemy: &mut Enemy) {
    let Some(target) = enemy.target else {
        return;
    };
    let wanted = if enemy.entity.position.x >= target.x {
        -1.0
    } else {
        1.0
    };
    if enemy.entity.facing != wanted {
        enemy.entity.turn_around();
    }
}

fn move_to_target(enemy: &mut Enemy) {
    look_at_target(enemy);
    enemy.entity.momentum.x = CHASE_MOMENTUM;
}

fn begin_attack(enemy: &mut Enemy) -> Option<AttackKind> {
    look_at_target(enemy);
    let e = &mut enemy.entity;
    e.upper.state = AnimState::Attacking;
    e.momentum.x = 0.0;
    e.velocity.x = 0.0;
    enemy.attack
}

/// Idle behavior, re-rolled every `behavior_change_interval`: turn and stop
/// (1 in 5), otherwise stop (2 in 5 of the rest) or walk on.
fn wander<R: Rng + ?Sized>(enemy: &mut Enemy, rng: &mut R) {
    if enemy.time_since_behavior_change < enemy.behavior_change_interval {
        return;
    }
    enemy.time_since_behavior_change = 0.0;
    let e = &mut enemy.entity;

    if rng.gen_range(1..=5) <= 1 {
        e.turn_around();
        e.momentum.x = 0.0;
        e.velocity.x = 0.0;
    } else if rng.gen_range(1..=5) <= 2 {
        e.momentum.x = 0.0;
        e.velocity.x = 0.0;
    } else {
        let drift = (e.position.x - enemy.spawn.x) * e.facing;
        if drift > enemy.leash {
            e.turn_around();
            e.velocity.x = 0.0;
        }
        e.momentum.x = WANDER_MOMENTUM;
    }
}
