//! Actor vs ground resolution and collectable pickup.
//!
//! Resolution looks one step ahead: the actor's collision box is moved by the
//! current velocity and tested against every active ground. Blocking grounds
//! resolve vertically (land / bump head) when the predicted box is within
//! [`VERTICAL_TOLERANCE`] of the top or bottom edge, otherwise horizontally by
//! snapping the hitbox flush against the side. Steppable-only grounds can only
//! be landed on from above.
//!
//! When nothing was landed on, gravity is integrated and the actor is airborne.

use neon_core::geometry::Rect;

use crate::entity::Entity;
use crate::pool::Pool;
use crate::props::{EnvProp, Ground, ObjectType};

pub const VERTICAL_TOLERANCE: f32 = 5.0;
pub const GRENADE_AMMO_CAP: i32 = 100;
pub const MAGNUM_AMMO_CAP: i32 = 999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundContact {
    pub grounded: bool,
    /// Airborne last frame, standing this frame.
    pub landed: bool,
}

fn predicted_box(entity: &Entity, dt: f32) -> Rect {
    entity.collision_box().translated(entity.velocity * dt)
}

pub fn resolve_grounds(
    entity: &mut Entity,
    grounds: &Pool<Ground>,
    dt: f32,
    gravity: f32,
) -> GroundContact {
    let was_grounded = entity.grounded;
    let mut supported = false;

    for (_, ground) in grounds.iter_active() {
        let future = predicted_box(entity, dt);
        let g = ground.rect;
        if !g.overlaps(&future) {
            continue;
        }
        let rest_y = g.y - entity.size.y / 2.0 + 1.0;

        if ground.blocks {
            if future.bottom() < g.y + VERTICAL_TOLERANCE && entity.velocity.y >= 0.0 {
                supported = true;
                entity.velocity.y = 0.0;
                entity.position.y = rest_y;
            } else if future.y > g.bottom() - VERTICAL_TOLERANCE && entity.velocity.y < 0.0 {
                entity.velocity.y = 0.0;
            } else if future.x > g.x {
                entity.position.x = entity.hitbox.anchor_right_of(g.right(), entity.facing);
                entity.velocity.x = 0.0;
            } else if future.x < g.x {
                entity.position.x = entity.hitbox.anchor_left_of(g.x, entity.facing);
                entity.velocity.x = 0.0;
            }
        } else if ground.steppable && entity.velocity.y >= 0.0 && entity.position.y <= rest_y {
            supported = true;
            entity.velocity.y = 0.0;
            entity.position.y = rest_y;
        }
    }

    if supported {
        entity.grounded = true;
    } else {
        entity.position.y += entity.velocity.y * dt;
        entity.velocity.y += gravity * dt;
        entity.grounded = false;
    }

    GroundContact {
        grounded: entity.grounded,
        landed: !was_grounded && entity.grounded,
    }
}

/// Slots of active collectable props the entity will touch this step.
pub fn touched_collectables(entity: &Entity, props: &Pool<EnvProp>, dt: f32) -> Vec<usize> {
    let future = predicted_box(entity, dt);
    props
        .iter_active()
        .filter(|(_, prop)| prop.collectable && prop.rect.overlaps(&future))
        .map(|(index, _)| index)
        .collect()
}

/// Grant what a collectable carries. Returns false for non-collectable types.
pub fn apply_pickup(entity: &mut Entity, kind: ObjectType) -> bool {
    match kind {
        ObjectType::AmmoCrate => {
            entity.grenade_ammo = (entity.grenade_ammo + 10).min(GRENADE_AMMO_CAP);
            entity.magnum_ammo = (entity.magnum_ammo + 200).min(MAGNUM_AMMO_CAP);
            true
        }
        ObjectType::HpCrate => {
            entity.heal(50);
            true
        }
        _ => false,
    }
}
