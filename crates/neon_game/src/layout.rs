//! Per-class sprite layouts.
//!
//! One [`SpriteLayout`] record per [`ActorClass`]. The player and every enemy
//! class read their rows, frame counts, timing and hitbox from here through the
//! same code path. Built-in records match the shipped atlases; a layout file
//! can override any of them by class name.

use glam::Vec2;
use std::collections::HashMap;

use neon_core::animation::{AnimState, LayoutFile, Playback, SpriteClip, SpriteLayout};
use neon_core::geometry::Hitbox;

use crate::enemy::EnemyClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActorClass {
    #[default]
    Player,
    Enemy(EnemyClass),
}

impl ActorClass {
    pub fn name(self) -> &'static str {
        match self {
            ActorClass::Player => "player",
            ActorClass::Enemy(class) => class.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if name == "player" {
            return Some(ActorClass::Player);
        }
        EnemyClass::ALL
            .into_iter()
            .find(|class| class.name() == name)
            .map(ActorClass::Enemy)
    }
}

const ACTOR_GRID: f32 = 122.0;
const ACTOR_HITBOX: Hitbox = Hitbox::new(48.0, 39.0);

fn clip(row: u32, frames: u32, state: AnimState) -> SpriteClip {
    SpriteClip {
        row,
        frames,
        playback: Playback::for_state(state, frames),
    }
}

/// Hero atlas: separate legs and torso rows, three aimed attack rows.
pub fn player_layout() -> SpriteLayout {
    let lower = HashMap::from([
        (AnimState::Idle, clip(0, 6, AnimState::Idle)),
        (AnimState::Jumping, clip(1, 6, AnimState::Jumping)),
        (AnimState::Falling, clip(1, 6, AnimState::Falling)),
        (AnimState::Walking, clip(2, 6, AnimState::Walking)),
        (AnimState::Dying, clip(10, 7, AnimState::Dying)),
    ]);
    let upper = HashMap::from([
        (AnimState::Idle, clip(3, 6, AnimState::Idle)),
        (AnimState::Jumping, clip(4, 6, AnimState::Jumping)),
        (AnimState::Falling, clip(4, 6, AnimState::Falling)),
        (AnimState::Attacking, clip(7, 4, AnimState::Attacking)),
        (AnimState::Walking, clip(8, 8, AnimState::Walking)),
        (AnimState::Throwing, clip(9, 4, AnimState::Throwing)),
    ]);
    SpriteLayout {
        frame_size: Vec2::splat(ACTOR_GRID),
        frame_time: 0.08,
        hitbox: ACTOR_HITBOX,
        lower,
        upper,
        upper_aim_up: Some(clip(5, 4, AnimState::Attacking)),
        upper_aim_down: Some(clip(6, 4, AnimState::Attacking)),
    }
}

/// Enemy atlases share one arrangement; only the attack length differs.
/// There is no airborne or throwing artwork.
pub fn enemy_layout(attack_frames: u32) -> SpriteLayout {
    let lower = HashMap::from([
        (AnimState::Idle, clip(0, 6, AnimState::Idle)),
        (AnimState::Walking, clip(1, 8, AnimState::Walking)),
        (AnimState::Dying, clip(5, 7, AnimState::Dying)),
    ]);
    let upper = HashMap::from([
        (AnimState::Idle, clip(2, 6, AnimState::Idle)),
        (AnimState::Walking, clip(3, 8, AnimState::Walking)),
        (
            AnimState::Attacking,
            clip(4, attack_frames, AnimState::Attacking),
        ),
    ]);
    SpriteLayout {
        frame_size: Vec2::splat(ACTOR_GRID),
        frame_time: 0.1,
        hitbox: ACTOR_HITBOX,
        lower,
        upper,
        upper_aim_up: None,
        upper_aim_down: None,
    }
}

#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    layouts: HashMap<ActorClass, SpriteLayout>,
    fallback: SpriteLayout,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LayoutRegistry {
    pub fn builtin() -> Self {
        let mut layouts = HashMap::new();
        layouts.insert(ActorClass::Player, player_layout());
        for class in EnemyClass::ALL {
            let attack_frames = match class {
                EnemyClass::Swordsman | EnemyClass::Assassin => 6,
                _ => 4,
            };
            layouts.insert(ActorClass::Enemy(class), enemy_layout(attack_frames));
        }
        Self {
            layouts,
            fallback: enemy_layout(4),
        }
    }

    /// Built-in layouts with every class named in `file` replaced. Unknown
    /// class names are skipped with a warning.
    pub fn with_overrides(file: LayoutFile) -> Self {
        let mut registry = Self::builtin();
        for (name, layout) in file.layouts {
            match ActorClass::from_name(&name) {
                Some(class) => {
                    log::debug!("Layout override for '{}'", name);
                    registry.layouts.insert(class, layout);
                }
                None => log::warn!("Layout file names unknown actor class '{}'", name),
            }
        }
        registry
    }

    pub fn get(&self, class: ActorClass) -> &SpriteLayout {
        self.layouts.get(&class).unwrap_or(&self.fallback)
    }
}
