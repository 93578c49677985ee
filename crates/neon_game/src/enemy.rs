//! Enemy classes, their tuning table and the pooled enemy record.

use glam::Vec2;

use crate::combat::BulletKind;
use crate::entity::Entity;
use crate::layout::{ActorClass, LayoutRegistry};
use crate::pool::{Pool, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyClass {
    Swordsman,
    #[default]
    Assassin,
    Gunner,
    SniperShooter,
    Drone,
    Turret,
    Boss,
}

impl EnemyClass {
    pub const ALL: [EnemyClass; 7] = [
        EnemyClass::Swordsman,
        EnemyClass::Assassin,
        EnemyClass::Gunner,
        EnemyClass::SniperShooter,
        EnemyClass::Drone,
        EnemyClass::Turret,
        EnemyClass::Boss,
    ];

    /// Classes the level generator rolls from.
    pub const SPAWNABLE: [EnemyClass; 2] = [EnemyClass::Assassin, EnemyClass::Gunner];

    pub fn name(self) -> &'static str {
        match self {
            EnemyClass::Swordsman => "swordsman",
            EnemyClass::Assassin => "assassin",
            EnemyClass::Gunner => "gunner",
            EnemyClass::SniperShooter => "sniper_shooter",
            EnemyClass::Drone => "drone",
            EnemyClass::Turret => "turret",
            EnemyClass::Boss => "boss",
        }
    }

    pub fn profile(self) -> EnemyProfile {
        let base = EnemyProfile {
            max_hp: 60,
            max_x_speed: 220.0,
            view_distance: 600.0,
            attack_range: 40.0,
            attack_speed: 1.0,
            points: 100,
            behavior_change_interval: 2.0,
            lose_target_interval: 3.0,
            leash: 500.0,
            attack: None,
        };
        match self {
            EnemyClass::Assassin => EnemyProfile {
                max_hp: 50,
                max_x_speed: 320.0,
                view_distance: 550.0,
                attack_range: 20.0,
                attack_speed: 1.25,
                points: 150,
                attack: Some(AttackKind::Melee { damage: 30 }),
                ..base
            },
            EnemyClass::Gunner => EnemyProfile {
                max_hp: 70,
                max_x_speed: 180.0,
                view_distance: 900.0,
                attack_range: 550.0,
                attack_speed: 0.8,
                points: 200,
                lose_target_interval: 4.0,
                attack: Some(AttackKind::Ranged {
                    bullet: BulletKind::Magnum,
                }),
                ..base
            },
            EnemyClass::Swordsman => EnemyProfile {
                max_hp: 90,
                attack_range: 30.0,
                points: 180,
                ..base
            },
            EnemyClass::SniperShooter => EnemyProfile {
                view_distance: 1400.0,
                attack_range: 1200.0,
                attack_speed: 0.4,
                points: 300,
                ..base
            },
            EnemyClass::Drone => EnemyProfile {
                max_hp: 30,
                max_x_speed: 350.0,
                points: 120,
                ..base
            },
            EnemyClass::Turret => EnemyProfile {
                max_hp: 150,
                max_x_speed: 0.0,
                points: 250,
                ..base
            },
            EnemyClass::Boss => EnemyProfile {
                max_hp: 1000,
                max_x_speed: 150.0,
                view_distance: 1200.0,
                points: 5000,
                ..base
            },
        }
    }
}

/// What an attack does once it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Melee { damage: i32 },
    Ranged { bullet: BulletKind },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub max_hp: i32,
    pub max_x_speed: f32,
    pub view_distance: f32,
    pub attack_range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    pub points: i32,
    pub behavior_change_interval: f32,
    pub lose_target_interval: f32,
    /// How far wandering may drift from the spawn point.
    pub leash: f32,
    /// `None` for classes with no attack implemented.
    pub attack: Option<AttackKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    #[default]
    None,
    Attack,
    Move,
}

#[derive(Debug, Clone, Default)]
pub struct Enemy {
    pub entity: Entity,
    pub id: u32,
    pub class: EnemyClass,
    pub behavior: Behavior,
    pub target: Option<Vec2>,
    pub view_distance: f32,
    pub attack_range: f32,
    pub time_since_behavior_change: f32,
    pub behavior_change_interval: f32,
    pub no_detection_time: f32,
    pub lose_target_interval: f32,
    pub spawn: Vec2,
    pub leash: f32,
    pub attack_speed: f32,
    pub time_since_last_attack: f32,
    pub points: i32,
    pub attack: Option<AttackKind>,
    pub active: bool,
}

impl Slot for Enemy {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Enemy {
    pub fn new(id: u32, class: EnemyClass, position: Vec2, layouts: &LayoutRegistry) -> Self {
        let profile = class.profile();
        let actor = ActorClass::Enemy(class);
        let entity = Entity::new(
            actor,
            position,
            profile.max_hp,
            profile.max_x_speed,
            layouts.get(actor),
        );
        Self {
            entity,
            id,
            class,
            behavior: Behavior::None,
            target: None,
            view_distance: profile.view_distance,
            attack_range: profile.attack_range,
            time_since_behavior_change: 0.0,
            behavior_change_interval: profile.behavior_change_interval,
            no_detection_time: 0.0,
            lose_target_interval: profile.lose_target_interval,
            spawn: position,
            leash: profile.leash,
            attack_speed: profile.attack_speed,
            // Ready to strike as soon as something is in range.
            time_since_last_attack: f32::MAX,
            points: profile.points,
            attack: profile.attack,
            active: true,
        }
    }

    pub fn attack_cooldown(&self) -> f32 {
        if self.attack_speed > 0.0 {
            1.0 / self.attack_speed
        } else {
            f32::INFINITY
        }
    }
}

pub fn spawn_enemy(
    pool: &mut Pool<Enemy>,
    layouts: &LayoutRegistry,
    id: u32,
    class: EnemyClass,
    position: Vec2,
) -> Option<usize> {
    let slot = pool.spawn(Enemy::new(id, class, position, layouts));
    match slot {
        Some(index) => log::debug!(
            "Enemy #{} ({}) spawned in slot {} at ({:.0}, {:.0})",
            id,
            class.name(),
            index,
            position.x,
            position.y
        ),
        None => log::trace!("Enemy pool full, {} not spawned", class.name()),
    }
    slot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawnable_classes_have_attacks() {
        for class in EnemyClass::SPAWNABLE {
            assert!(class.profile().attack.is_some(), "{:?}", class);
        }
        assert_eq!(
            EnemyClass::Assassin.profile().attack,
            Some(AttackKind::Melee { damage: 30 })
        );
    }

    #[test]
    fn new_enemy_copies_profile() {
        let layouts = LayoutRegistry::builtin();
        let e = Enemy::new(3, EnemyClass::Gunner, Vec2::new(10.0, 20.0), &layouts);
        let p = EnemyClass::Gunner.profile();
        assert_eq!(e.entity.hp, p.max_hp);
        assert_eq!(e.view_distance, p.view_distance);
        assert_eq!(e.spawn, Vec2::new(10.0, 20.0));
        assert_eq!(e.behavior, Behavior::None);
        assert!(e.target.is_none());
        assert!((e.attack_cooldown() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn spawn_respects_capacity() {
        let layouts = LayoutRegistry::builtin();
        let mut pool = Pool::<Enemy>::new(2);
        assert_eq!(spawn_enemy(&mut pool, &layouts, 0, EnemyClass::Gunner, Vec2::ZERO), Some(0));
        assert_eq!(spawn_enemy(&mut pool, &layouts, 1, EnemyClass::Assassin, Vec2::ZERO), Some(1));
        assert_eq!(spawn_enemy(&mut pool, &layouts, 2, EnemyClass::Gunner, Vec2::ZERO), None);
    }
}
