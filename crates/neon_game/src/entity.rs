//! Shared actor body for the player and enemies.
//!
//! [`Entity::update`] runs once per actor per frame, after ground collision:
//! momentum feeds horizontal velocity, locomotion picks the animation state,
//! death is latched on the frame HP first reaches zero, and each body layer is
//! driven through its clip. The position anchor is the sprite's horizontal
//! anchor and vertical center.

use glam::Vec2;

use neon_core::animation::{AnimState, AnimationLayer, FrameStep, Layer, SpriteClip, SpriteLayout};
use neon_core::geometry::{Circle, Hitbox, Rect};

use crate::layout::ActorClass;

/// Horizontal speed of the death recoil, applied on frame advances.
pub const DEATH_RECOIL_SPEED: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    #[default]
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aim {
    #[default]
    Forward,
    Up,
    Down,
}

impl Aim {
    pub fn sign(self) -> i8 {
        match self {
            Aim::Forward => 0,
            Aim::Up => -1,
            Aim::Down => 1,
        }
    }
}

/// Layer states captured at the start of a frame, before AI or control had a
/// chance to change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimSnapshot {
    pub lower: AnimState,
    pub upper: AnimState,
}

/// Lifecycle edges observed during one [`Entity::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityFrame {
    /// HP reached zero this frame; both layers entered DYING.
    pub died: bool,
    /// The corpse timer ran out this frame; the lower layer is now DEAD.
    pub expired: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Entity {
    pub class: ActorClass,
    pub max_hp: i32,
    pub hp: i32,
    pub time_since_death: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Horizontal thrust along the facing direction, px/s².
    pub momentum: Vec2,
    pub max_x_speed: f32,
    pub jump_speed: f32,
    pub grounded: bool,
    /// +1 facing right, -1 facing left.
    pub facing: f32,
    pub size: Vec2,
    pub hitbox: Hitbox,
    pub eyes_offset: Vec2,
    pub lower: AnimationLayer,
    pub upper: AnimationLayer,
    pub aim: Aim,
    pub grenade_ammo: i32,
    pub magnum_ammo: i32,
}

impl Entity {
    pub fn new(
        class: ActorClass,
        position: Vec2,
        max_hp: i32,
        max_x_speed: f32,
        layout: &SpriteLayout,
    ) -> Self {
        let size = layout.frame_size;
        Self {
            class,
            max_hp,
            hp: max_hp,
            time_since_death: 0.0,
            position,
            velocity: Vec2::ZERO,
            momentum: Vec2::ZERO,
            max_x_speed,
            jump_speed: 0.0,
            grounded: false,
            facing: 1.0,
            size,
            hitbox: layout.hitbox,
            eyes_offset: Vec2::new(0.0, -size.y * 0.3),
            lower: AnimationLayer::new(size, layout.frame_time),
            upper: AnimationLayer::new(size, layout.frame_time),
            aim: Aim::Forward,
            grenade_ammo: 0,
            magnum_ammo: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.class {
            ActorClass::Player => EntityKind::Player,
            ActorClass::Enemy(_) => EntityKind::Enemy,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.lower.state.is_terminal()
    }

    pub fn is_dead(&self) -> bool {
        self.lower.state == AnimState::Dead
    }

    pub fn collision_box(&self) -> Rect {
        self.hitbox.box_at(self.position, self.size.y, self.facing)
    }

    /// Full sprite-sized rectangle; what enemies look for when scanning.
    pub fn body_rect(&self) -> Rect {
        Rect::centered(self.position, self.size.x, self.size.y)
    }

    pub fn head(&self) -> Circle {
        Circle::new(self.position + self.eyes_offset, self.hitbox.width * 0.4)
    }

    pub fn eyes(&self) -> Vec2 {
        self.position + self.eyes_offset
    }

    pub fn snapshot(&self) -> AnimSnapshot {
        AnimSnapshot {
            lower: self.lower.state,
            upper: self.upper.state,
        }
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn turn_around(&mut self) {
        self.facing = -self.facing;
    }

    /// Physics, state derivation and animation for one frame.
    pub fn update(
        &mut self,
        dt: f32,
        layout: &SpriteLayout,
        corpse_time: f32,
        before: AnimSnapshot,
    ) -> EntityFrame {
        let mut frame = EntityFrame::default();
        if self.is_dead() {
            return frame;
        }

        self.velocity.x += self.facing * self.momentum.x * dt;
        if self.velocity.x > self.max_x_speed {
            self.velocity.x = self.max_x_speed;
        } else if self.velocity.x < -self.max_x_speed {
            self.velocity.x = -self.max_x_speed;
        }
        if self.velocity.x > 0.0 {
            self.facing = 1.0;
        } else if self.velocity.x < 0.0 {
            self.facing = -1.0;
        }

        if !self.is_dying() {
            self.position.x += self.velocity.x * dt;
            if let Some(state) = self.locomotion_state() {
                self.lower.state = state;
                if !self.upper.state.is_protected() {
                    self.upper.state = state;
                }
            }
        }

        if self.hp <= 0 && !self.is_dying() {
            self.lower.state = AnimState::Dying;
            self.upper.state = AnimState::Dying;
            frame.died = true;
        }

        if self.lower.state == AnimState::Dying {
            self.time_since_death += dt;
            if self.time_since_death >= corpse_time {
                self.lower.state = AnimState::Dead;
                frame.expired = true;
            }
        }

        self.drive_layer(Layer::Lower, dt, layout, before.lower);
        self.drive_layer(Layer::Upper, dt, layout, before.upper);
        frame
    }

    /// `None` while airborne with zero vertical speed (the apex): the previous
    /// state carries over.
    fn locomotion_state(&self) -> Option<AnimState> {
        if self.grounded {
            if self.velocity.x != 0.0 {
                Some(AnimState::Walking)
            } else {
                Some(AnimState::Idle)
            }
        } else if self.velocity.y < 0.0 {
            Some(AnimState::Jumping)
        } else if self.velocity.y > 0.0 {
            Some(AnimState::Falling)
        } else {
            None
        }
    }

    fn clip_for(&self, layout: &SpriteLayout, layer: Layer, state: AnimState) -> Option<SpriteClip> {
        if layer == Layer::Upper && state == AnimState::Attacking {
            layout.attack_clip(self.aim.sign())
        } else {
            layout.clip(layer, state)
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut AnimationLayer {
        match layer {
            Layer::Lower => &mut self.lower,
            Layer::Upper => &mut self.upper,
        }
    }

    fn drive_layer(&mut self, layer: Layer, dt: f32, layout: &SpriteLayout, before: AnimState) {
        let state = self.layer_mut(layer).state;
        let clip = self.clip_for(layout, layer, state);
        let facing = self.facing;

        // A corpse keeps the last dying frame on screen.
        if state != AnimState::Dead {
            if state != before {
                self.layer_mut(layer).rewind();
            } else if let Some(clip) = clip {
                let step = self.layer_mut(layer).advance(dt, &clip);
                if state == AnimState::Dying {
                    self.apply_death_recoil(step, dt);
                }
            }
        }

        self.layer_mut(layer)
            .update_source(clip.map(|c| c.row), facing);
    }

    /// The body slides backwards while the dying clip plays, and again on
    /// every advance while still airborne.
    fn apply_death_recoil(&mut self, step: FrameStep, dt: f32) {
        if !step.advanced {
            return;
        }
        if !step.overflowed {
            self.position.x -= self.facing * DEATH_RECOIL_SPEED * dt;
        }
        if !self.grounded {
            self.position.x -= self.facing * DEATH_RECOIL_SPEED * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutRegistry;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DT: f32 = 1.0 / 60.0;
    const CORPSE: f32 = 2.0;

    fn player(registry: &LayoutRegistry) -> Entity {
        let layout = registry.get(ActorClass::Player);
        let mut e = Entity::new(ActorClass::Player, Vec2::new(100.0, 500.0), 100, 400.0, layout);
        e.grounded = true;
        e
    }

    fn step(e: &mut Entity, registry: &LayoutRegistry) -> EntityFrame {
        let before = e.snapshot();
        e.update(DT, registry.get(e.class), CORPSE, before)
    }

    #[test]
    fn zero_hp_latches_dying_once() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        step(&mut e, &registry);
        e.hp = 0;

        let first = step(&mut e, &registry);
        assert!(first.died);
        assert_eq!(e.lower.state, AnimState::Dying);
        assert_eq!(e.upper.state, AnimState::Dying);

        let second = step(&mut e, &registry);
        assert!(!second.died);
        assert_eq!(e.time_since_death, 2.0 * DT);
    }

    #[test]
    fn dying_never_regresses() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.hp = 0;
        step(&mut e, &registry);
        e.heal(50);
        e.velocity.y = -300.0;
        e.grounded = false;

        let mut expired = 0;
        for _ in 0..300 {
            let frame = step(&mut e, &registry);
            expired += frame.expired as u32;
            assert!(e.lower.state.is_terminal());
        }
        assert_eq!(expired, 1);
        assert_eq!(e.lower.state, AnimState::Dead);
    }

    #[test]
    fn corpse_keeps_last_dying_frame() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.hp = 0;
        for _ in 0..((CORPSE / DT) as usize + 5) {
            step(&mut e, &registry);
        }
        assert!(e.is_dead());
        assert_eq!(e.lower.frame, 6);
        let source = e.lower.source.expect("corpse is drawn");
        assert_eq!(source.y, 10.0 * 122.0);
        assert_eq!(e.upper.source, None);
    }

    #[test]
    fn velocity_stays_within_max_speed() {
        let registry = LayoutRegistry::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = player(&registry);
        for _ in 0..2000 {
            e.momentum.x = rng.gen_range(-50_000.0..50_000.0);
            if rng.gen_bool(0.1) {
                e.turn_around();
            }
            let dt = rng.gen_range(0.001..0.1);
            let before = e.snapshot();
            e.update(dt, registry.get(ActorClass::Player), CORPSE, before);
            assert!(e.velocity.x.abs() <= e.max_x_speed);
        }
    }

    #[test]
    fn facing_follows_velocity_sign_and_survives_standstill() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.velocity.x = -50.0;
        step(&mut e, &registry);
        assert_eq!(e.facing, -1.0);
        e.velocity.x = 0.0;
        step(&mut e, &registry);
        assert_eq!(e.facing, -1.0);
        assert_eq!(e.lower.state, AnimState::Idle);
    }

    #[test]
    fn locomotion_state_from_grounded_and_vertical_speed() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.velocity.x = 120.0;
        step(&mut e, &registry);
        assert_eq!(e.lower.state, AnimState::Walking);
        assert_eq!(e.upper.state, AnimState::Walking);

        e.grounded = false;
        e.velocity.y = -200.0;
        step(&mut e, &registry);
        assert_eq!(e.lower.state, AnimState::Jumping);

        e.velocity.y = 0.0;
        step(&mut e, &registry);
        assert_eq!(e.lower.state, AnimState::Jumping);

        e.velocity.y = 10.0;
        step(&mut e, &registry);
        assert_eq!(e.lower.state, AnimState::Falling);
    }

    #[test]
    fn attack_is_protected_until_clip_ends() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        step(&mut e, &registry);

        let before = e.snapshot();
        e.upper.state = AnimState::Attacking;
        e.velocity.x = 100.0;
        e.update(DT, registry.get(ActorClass::Player), CORPSE, before);
        assert_eq!(e.upper.state, AnimState::Attacking);
        assert_eq!(e.upper.frame, 0);
        assert_eq!(e.lower.state, AnimState::Walking);

        // 4 frames at 0.08s each, one advance per update at most.
        let mut frames = 0;
        while e.upper.state == AnimState::Attacking {
            step(&mut e, &registry);
            frames += 1;
            assert!(frames < 100, "attack never finished");
        }
        assert_eq!(e.upper.state, AnimState::Idle);
        step(&mut e, &registry);
        assert_eq!(e.upper.state, AnimState::Walking);
    }

    #[test]
    fn aim_selects_attack_row() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.aim = Aim::Up;
        let before = e.snapshot();
        e.upper.state = AnimState::Attacking;
        e.update(DT, registry.get(ActorClass::Player), CORPSE, before);
        assert_eq!(e.upper.source.map(|r| r.y), Some(5.0 * 122.0));
    }

    #[test]
    fn source_width_sign_tracks_facing() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.velocity.x = -10.0;
        step(&mut e, &registry);
        assert_eq!(e.lower.source.map(|r| r.width), Some(-122.0));
        assert_eq!(e.upper.source.map(|r| r.width), Some(-122.0));
    }

    #[test]
    fn death_recoil_pushes_against_facing() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.hp = 0;
        step(&mut e, &registry);
        let x0 = e.position.x;
        for _ in 0..30 {
            step(&mut e, &registry);
        }
        assert!(e.position.x < x0);
    }

    #[test]
    fn damage_and_healing_are_clamped() {
        let registry = LayoutRegistry::builtin();
        let mut e = player(&registry);
        e.take_damage(250);
        assert_eq!(e.hp, 0);
        e.heal(500);
        assert_eq!(e.hp, e.max_hp);
    }
}
