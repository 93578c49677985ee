//! Everything one frame tick mutates: the player, every pool and the audio
//! queue. Systems take `&mut World` and address other pools by slot index.

use glam::Vec2;

use crate::combat::{Bullet, Grenade};
use crate::config::GameConfig;
use crate::enemy::{spawn_enemy, Enemy, EnemyClass};
use crate::fx::{spawn_message, spawn_particle, AudioCues, Message, Particle, ParticleSpec};
use crate::layout::{ActorClass, LayoutRegistry};
use crate::player::Player;
use crate::pool::Pool;
use crate::props::{create_env_prop, EnvProp, Ground, ObjectType};

/// Height of the walkable floor strip at the bottom of every chunk.
pub const FLOOR_HEIGHT: f32 = 130.0;

#[derive(Debug, Clone)]
pub struct World {
    pub config: GameConfig,
    pub layouts: LayoutRegistry,
    pub player: Player,
    pub enemies: Pool<Enemy>,
    pub bullets: Pool<Bullet>,
    pub grenades: Pool<Grenade>,
    pub particles: Pool<Particle>,
    pub messages: Pool<Message>,
    pub grounds: Pool<Ground>,
    pub props: Pool<EnvProp>,
    pub audio: AudioCues,
    next_enemy_id: u32,
    next_prop_id: u32,
}

impl World {
    /// Empty world with the player standing on the first chunk's floor.
    pub fn new(config: GameConfig, layouts: LayoutRegistry) -> Self {
        let size = layouts.get(ActorClass::Player).frame_size;
        let start = Vec2::new(
            config.screen_width * 0.2,
            config.screen_height - FLOOR_HEIGHT - size.y / 2.0 + 1.0,
        );
        let player = Player::new(&config, &layouts, start);
        let caps = config.capacities;
        Self {
            player,
            enemies: Pool::new(caps.enemies),
            bullets: Pool::new(caps.bullets),
            grenades: Pool::new(caps.grenades),
            particles: Pool::new(caps.particles),
            messages: Pool::new(caps.messages),
            grounds: Pool::new(caps.grounds),
            props: Pool::new(caps.env_props),
            audio: AudioCues::default(),
            next_enemy_id: 0,
            next_prop_id: 0,
            config,
            layouts,
        }
    }

    pub fn spawn_enemy(&mut self, class: EnemyClass, position: Vec2) -> Option<usize> {
        let slot = spawn_enemy(
            &mut self.enemies,
            &self.layouts,
            self.next_enemy_id,
            class,
            position,
        );
        if slot.is_some() {
            self.next_enemy_id += 1;
        }
        slot
    }

    /// Place a prop of its natural size with the top-left corner at `position`.
    pub fn place_prop(&mut self, kind: ObjectType, position: Vec2) -> Option<usize> {
        let size = Vec2::splat(kind.traits().size);
        let slot = create_env_prop(
            &mut self.props,
            &mut self.grounds,
            self.next_prop_id,
            kind,
            position,
            size,
        );
        if slot.is_some() {
            self.next_prop_id += 1;
        }
        slot
    }

    pub fn message(&mut self, position: Vec2, value: i32) -> Option<usize> {
        let lifetime = self.config.message_lifetime;
        spawn_message(&mut self.messages, position, value, lifetime)
    }

    pub fn particle(&mut self, spec: ParticleSpec) -> Option<usize> {
        spawn_particle(&mut self.particles, spec)
    }

    /// Top y of the floor strip.
    pub fn floor_top(&self) -> f32 {
        self.config.screen_height - FLOOR_HEIGHT
    }
}
