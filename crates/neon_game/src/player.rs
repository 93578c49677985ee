//! Player intent and control.
//!
//! Input is reduced to a [`PlayerIntent`] once per frame, then [`Player::control`]
//! turns it into momentum, jumps and upper-body triggers. Spawning the bullet
//! or grenade is left to the caller, which owns the pools.

use glam::Vec2;

use neon_core::animation::AnimState;
use neon_core::input::{Action, InputState};

use crate::config::GameConfig;
use crate::entity::{Aim, Entity};
use crate::layout::{ActorClass, LayoutRegistry};

pub const PLAYER_MAX_X_SPEED: f32 = 420.0;
/// Forward thrust while a direction is held, px/s².
pub const PLAYER_MOMENTUM: f32 = 3000.0;
pub const PLAYER_JUMP_SPEED: f32 = 520.0;
/// Deceleration when standing on ground with no direction held, px/s².
pub const GROUND_FRICTION: f32 = 2400.0;
pub const DEBUG_HURT_DAMAGE: i32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    /// -1, 0 or +1.
    pub move_x: i8,
    pub jump: bool,
    pub fire: bool,
    pub throw: bool,
    pub aim: Aim,
    pub pause: bool,
    pub debug_hurt: bool,
    pub debug_kill: bool,
}

impl PlayerIntent {
    pub fn from_input(input: &InputState) -> Self {
        let mut move_x = 0;
        if input.is_held(Action::Left) {
            move_x -= 1;
        }
        if input.is_held(Action::Right) {
            move_x += 1;
        }
        let aim = match (input.is_held(Action::Up), input.is_held(Action::Down)) {
            (true, false) => Aim::Up,
            (false, true) => Aim::Down,
            _ => Aim::Forward,
        };
        Self {
            move_x,
            jump: input.is_held(Action::Jump),
            fire: input.is_just_pressed(Action::Fire),
            throw: input.is_just_pressed(Action::Throw),
            aim,
            pause: input.is_just_pressed(Action::Pause),
            debug_hurt: input.is_just_pressed(Action::DebugHurt),
            debug_kill: input.is_just_pressed(Action::DebugKill),
        }
    }
}

/// What the caller still has to carry out after [`Player::control`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub fire: bool,
    pub throw: bool,
    /// Damage dealt by the debug key this frame.
    pub hurt: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct Player {
    pub entity: Entity,
    pub points: i64,
}

impl Player {
    pub fn new(config: &GameConfig, layouts: &LayoutRegistry, position: Vec2) -> Self {
        let mut entity = Entity::new(
            ActorClass::Player,
            position,
            config.player_max_hp,
            PLAYER_MAX_X_SPEED,
            layouts.get(ActorClass::Player),
        );
        entity.jump_speed = PLAYER_JUMP_SPEED;
        entity.magnum_ammo = config.player_start_magnum;
        entity.grenade_ammo = config.player_start_grenades;
        Self { entity, points: 0 }
    }

    pub fn control(&mut self, intent: &PlayerIntent, dt: f32) -> ControlOutcome {
        let mut outcome = ControlOutcome::default();
        let e = &mut self.entity;

        if intent.debug_kill && e.hp > 0 {
            log::info!("Debug kill");
            e.hp = 0;
        }
        if intent.debug_hurt && e.hp > 0 {
            outcome.hurt = Some(DEBUG_HURT_DAMAGE);
        }
        if e.is_dying() {
            e.momentum.x = 0.0;
            return outcome;
        }

        e.aim = intent.aim;
        if intent.move_x != 0 {
            let wanted = f32::from(intent.move_x.signum());
            if e.facing != wanted {
                e.facing = wanted;
                e.velocity.x = 0.0;
            }
            e.momentum.x = PLAYER_MOMENTUM;
        } else {
            e.momentum.x = 0.0;
            if e.grounded {
                e.velocity.x = move_towards(e.velocity.x, 0.0, GROUND_FRICTION * dt);
            }
        }

        if intent.jump && e.grounded {
            e.velocity.y = -e.jump_speed;
        }

        let busy = e.upper.state.is_protected();
        if intent.fire && !busy && e.magnum_ammo > 0 {
            e.magnum_ammo -= 1;
            e.upper.state = AnimState::Attacking;
            outcome.fire = true;
        } else if intent.throw && !busy && e.grenade_ammo > 0 {
            e.grenade_ammo -= 1;
            e.upper.state = AnimState::Throwing;
            outcome.throw = true;
        }
        outcome
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}
