//! One running game: the world plus camera, scenery, RNG and phase.
//!
//! [`Session::step`] advances exactly one fixed tick. Systems run in a fixed
//! order because later ones read what earlier ones wrote this tick:
//!
//!   1. pause toggle
//!   2. player control, then fire / throw
//!   3. enemy steering and attack resolution
//!   4. ground collision and pickups
//!   5. momentum, state derivation and animation for every actor
//!   6. bullets and grenades
//!   7. particles and messages
//!   8. camera, scenery, newly revealed chunks, culling
//!   9. difficulty and game-over check

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use neon_core::geometry::Rect;

use crate::ai::steer;
use crate::chunk::populate_chunk;
use crate::collision::{apply_pickup, resolve_grounds, touched_collectables};
use crate::combat::{
    destroy_env_prop, fire_player_weapon, hurt_entity, resolve_attack, throw_player_grenade,
    update_bullets, update_grenades,
};
use crate::config::GameConfig;
use crate::entity::{AnimSnapshot, EntityKind};
use crate::fx::{update_messages, update_particles, SoundFx};
use crate::layout::{ActorClass, LayoutRegistry};
use crate::player::PlayerIntent;
use crate::props::{deactivate_prop, Ground};
use crate::scenery::{Camera, Scenery};
use crate::world::{World, FLOOR_HEIGHT};

const LEFT_WALL_WIDTH: f32 = 50.0;
/// Chunks travelled per difficulty step.
const CHUNKS_PER_LEVEL: f32 = 5.0;
/// Seconds survived per difficulty step.
const SECONDS_PER_LEVEL: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// Snapshot for logs and the runner's report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub frame: u64,
    pub elapsed: f32,
    pub phase: Phase,
    pub points: i64,
    pub hp: i32,
    pub magnum_ammo: i32,
    pub grenade_ammo: i32,
    pub player_x: f32,
    pub camera_x: f32,
    pub difficulty: u32,
    pub enemies: usize,
    pub props: usize,
    pub bullets: usize,
    pub particles: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub world: World,
    pub camera: Camera,
    pub scenery: Scenery,
    pub phase: Phase,
    pub difficulty: u32,
    pub elapsed: f32,
    pub frame: u64,
    rng: StdRng,
    left_wall: Option<usize>,
}

impl Session {
    pub fn new(config: GameConfig, layouts: LayoutRegistry, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = config.screen_width;
        let height = config.screen_height;
        let scenery = Scenery::new(config.tiles_per_layer, width, &mut rng);
        let mut world = World::new(config, layouts);
        let left_wall = world.grounds.spawn(Ground::left_wall(Rect::new(
            -LEFT_WALL_WIDTH,
            0.0,
            LEFT_WALL_WIDTH,
            height,
        )));

        let mut session = Self {
            world,
            camera: Camera::new(width, height),
            scenery,
            phase: Phase::Active,
            difficulty: 0,
            elapsed: 0.0,
            frame: 0,
            rng,
            left_wall,
        };
        let mut chunks: Vec<i32> = session
            .scenery
            .foreground()
            .map(|layer| layer.tiles.iter().map(|t| t.id).collect())
            .unwrap_or_default();
        chunks.sort_unstable();
        for chunk in chunks {
            session.reveal_chunk(chunk);
        }
        log::info!("Session started with seed {}", seed);
        session
    }

    pub fn step(&mut self, dt: f32, intent: &PlayerIntent) {
        if intent.pause {
            self.toggle_pause();
        }
        if self.phase != Phase::Active {
            return;
        }
        self.elapsed += dt;
        self.frame += 1;

        let player_before = self.world.player.entity.snapshot();
        let enemies_before: Vec<(usize, AnimSnapshot)> = self
            .world
            .enemies
            .iter_active()
            .map(|(index, e)| (index, e.entity.snapshot()))
            .collect();

        self.control_player(dt, intent);
        self.steer_enemies(dt);
        self.collide(dt);
        self.update_actors(dt, player_before, &enemies_before);

        update_bullets(&mut self.world, dt);
        update_grenades(&mut self.world, dt);
        update_particles(
            &mut self.world.particles,
            dt,
            self.camera.min_x,
            self.camera.width,
        );
        update_messages(&mut self.world.messages, dt);

        self.scroll();
        self.update_difficulty();

        if self.world.player.entity.is_dead() {
            self.phase = Phase::GameOver;
            log::info!(
                "Game over after {:.1}s with {} points",
                self.elapsed,
                self.world.player.points
            );
        }
    }

    fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Active => Phase::Paused,
            Phase::Paused => Phase::Active,
            Phase::GameOver => Phase::GameOver,
        };
        self.world.audio.push(SoundFx::Selected);
        log::info!("Session {:?}", self.phase);
    }

    fn control_player(&mut self, dt: f32, intent: &PlayerIntent) {
        let world = &mut self.world;
        let outcome = world.player.control(intent, dt);
        if let Some(damage) = outcome.hurt {
            hurt_entity(&mut world.player.entity, &mut world.audio, damage);
        }
        if outcome.fire {
            fire_player_weapon(world);
        }
        if outcome.throw {
            throw_player_grenade(world);
        }
    }

    fn steer_enemies(&mut self, dt: f32) {
        let world = &mut self.world;
        for index in 0..world.enemies.capacity() {
            let Some(enemy) = world.enemies.get_mut(index).filter(|e| e.active) else {
                continue;
            };
            if let Some(attack) = steer(enemy, &world.player.entity, dt, &mut self.rng) {
                resolve_attack(world, index, attack);
            }
        }
    }

    fn collide(&mut self, dt: f32) {
        let world = &mut self.world;
        let gravity = world.config.gravity;
        let earshot = world.config.screen_width * world.config.audio_cull_factor;

        let contact = resolve_grounds(&mut world.player.entity, &world.grounds, dt, gravity);
        if contact.landed {
            world.audio.push(SoundFx::EntityLanding);
        }
        if !world.player.entity.is_dying() {
            for index in touched_collectables(&world.player.entity, &world.props, dt) {
                collect(world, index);
            }
        }

        let player_x = world.player.entity.position.x;
        for index in 0..world.enemies.capacity() {
            let Some(enemy) = world.enemies.get_mut(index).filter(|e| e.active) else {
                continue;
            };
            let contact = resolve_grounds(&mut enemy.entity, &world.grounds, dt, gravity);
            if contact.landed && (enemy.entity.position.x - player_x).abs() < earshot {
                world.audio.push(SoundFx::EntityLanding);
            }
        }
    }

    fn update_actors(
        &mut self,
        dt: f32,
        player_before: AnimSnapshot,
        enemies_before: &[(usize, AnimSnapshot)],
    ) {
        let world = &mut self.world;
        let corpse_time = world.config.corpse_time;

        let layout = world.layouts.get(ActorClass::Player);
        let frame = world
            .player
            .entity
            .update(dt, layout, corpse_time, player_before);
        if frame.died {
            world.audio.push(SoundFx::Dying);
            log::info!("Player died with {} points", world.player.points);
        }

        for &(index, before) in enemies_before {
            let Some(enemy) = world.enemies.get_mut(index).filter(|e| e.active) else {
                continue;
            };
            let layout = world.layouts.get(enemy.entity.class);
            let frame = enemy.entity.update(dt, layout, corpse_time, before);
            if frame.expired {
                enemy.active = false;
                log::debug!("Enemy #{} corpse removed", enemy.id);
            }
        }
    }

    /// Follow the player, drag the left wall along, reveal and populate new
    /// chunks, and drop whatever fell a screen behind.
    fn scroll(&mut self) {
        self.camera.follow(self.world.player.entity.position.x);
        let min_x = self.camera.min_x;

        if let Some(wall) = self.left_wall.and_then(|i| self.world.grounds.get_mut(i)) {
            wall.rect.x = min_x - wall.rect.width;
        }

        for chunk in self.scenery.update(min_x, &mut self.rng) {
            self.reveal_chunk(chunk);
        }
        self.cull_behind(min_x - self.camera.width);
    }

    fn reveal_chunk(&mut self, chunk: i32) {
        let width = self.world.config.screen_width;
        let left = chunk as f32 * width;
        let floor = Rect::new(left, self.world.floor_top(), width, FLOOR_HEIGHT);
        if self.world.grounds.spawn(Ground::floor(floor)).is_none() {
            log::trace!("Ground pool full, floor of chunk {} missing", chunk);
        }
        populate_chunk(&mut self.world, chunk, self.difficulty, &mut self.rng);
        self.camera.max_x = self.camera.max_x.max(left + width);
        log::info!("Chunk {} revealed at difficulty {}", chunk, self.difficulty);
    }

    fn cull_behind(&mut self, limit: f32) {
        let world = &mut self.world;
        for index in 0..world.props.capacity() {
            let behind = world
                .props
                .get(index)
                .is_some_and(|p| p.active && p.rect.right() < limit);
            if behind {
                deactivate_prop(&mut world.props, &mut world.grounds, index);
            }
        }
        for (_, ground) in world.grounds.iter_active_mut() {
            if !ground.follows_camera && ground.rect.right() < limit {
                ground.active = false;
            }
        }
        for (_, enemy) in world.enemies.iter_active_mut() {
            if enemy.entity.position.x < limit {
                enemy.active = false;
            }
        }
    }

    fn update_difficulty(&mut self) {
        let chunk_width = self.world.config.screen_width;
        let by_distance = self.camera.min_x / (CHUNKS_PER_LEVEL * chunk_width);
        let by_time = self.elapsed / SECONDS_PER_LEVEL;
        let level = (by_distance.floor() + by_time.floor()) as u32;
        let level = level.min(self.world.config.max_difficulty);
        if level != self.difficulty {
            log::info!("Difficulty {} -> {}", self.difficulty, level);
            self.difficulty = level;
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let w = &self.world;
        SessionSummary {
            frame: self.frame,
            elapsed: self.elapsed,
            phase: self.phase,
            points: w.player.points,
            hp: w.player.entity.hp,
            magnum_ammo: w.player.entity.magnum_ammo,
            grenade_ammo: w.player.entity.grenade_ammo,
            player_x: w.player.entity.position.x,
            camera_x: self.camera.min_x,
            difficulty: self.difficulty,
            enemies: w.enemies.active_count(),
            props: w.props.active_count(),
            bullets: w.bullets.active_count(),
            particles: w.particles.active_count(),
        }
    }
}

/// Grant a collectable to the player, show what it was worth and remove it.
fn collect(world: &mut World, index: usize) {
    let Some(prop) = world
        .props
        .get(index)
        .copied()
        .filter(|p| p.active && p.collectable)
    else {
        return;
    };
    if !apply_pickup(&mut world.player.entity, prop.kind) {
        return;
    }
    world.message(Vec2::new(prop.rect.center().x, prop.rect.y), prop.points);
    destroy_env_prop(world, index, EntityKind::Player);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyClass;
    use crate::props::ObjectType;
    use neon_core::animation::AnimState;

    const DT: f32 = 1.0 / 60.0;

    fn session(seed: u64) -> Session {
        let mut s = Session::new(GameConfig::default(), LayoutRegistry::builtin(), seed);
        // Start from an empty level so tests control what is nearby.
        for index in 0..s.world.props.capacity() {
            deactivate_prop(&mut s.world.props, &mut s.world.grounds, index);
        }
        for (_, enemy) in s.world.enemies.iter_active_mut() {
            enemy.active = false;
        }
        s
    }

    fn idle() -> PlayerIntent {
        PlayerIntent::default()
    }

    #[test]
    fn initial_chunks_have_floors() {
        let s = Session::new(GameConfig::default(), LayoutRegistry::builtin(), 4);
        let floors = s
            .world
            .grounds
            .iter_active()
            .filter(|(_, g)| g.source.is_none() && !g.follows_camera)
            .count();
        assert_eq!(floors, 7);
        assert_eq!(s.camera.max_x, 7.0 * 1920.0);
        // Chunk 0 is always safe.
        assert!(s
            .world
            .enemies
            .iter_active()
            .all(|(_, e)| e.entity.position.x >= 1920.0));
    }

    #[test]
    fn player_settles_on_the_floor() {
        let mut s = session(1);
        for _ in 0..30 {
            s.step(DT, &idle());
        }
        let p = &s.world.player.entity;
        assert!(p.grounded);
        assert_eq!(p.position.y, 950.0 - 61.0 + 1.0);
        assert_eq!(p.lower.state, AnimState::Idle);
        assert_eq!(s.world.audio.count(SoundFx::EntityLanding), 1);
    }

    #[test]
    fn pause_freezes_the_world() {
        let mut s = session(2);
        s.step(DT, &idle());
        let pause = PlayerIntent {
            pause: true,
            ..PlayerIntent::default()
        };
        s.step(DT, &pause);
        assert_eq!(s.phase, Phase::Paused);
        let frame = s.frame;
        for _ in 0..10 {
            s.step(DT, &idle());
        }
        assert_eq!(s.frame, frame);
        s.step(DT, &pause);
        assert_eq!(s.phase, Phase::Active);
        assert_eq!(s.frame, frame + 1);
    }

    #[test]
    fn walking_right_scrolls_and_reveals_chunks() {
        let mut s = session(3);
        s.world.player.entity.position.x = 8.0 * 1920.0;
        s.step(DT, &idle());
        assert!(s.camera.min_x > 7.0 * 1920.0);
        assert!(s.camera.max_x >= 8.0 * 1920.0);
        let wall = s.left_wall.and_then(|i| s.world.grounds.get(i)).copied().expect("wall");
        assert_eq!(wall.rect.right(), s.camera.min_x);

        let before = s.camera.min_x;
        s.world.player.entity.position.x = 100.0;
        s.step(DT, &idle());
        assert_eq!(s.camera.min_x, before);
    }

    #[test]
    fn floors_far_behind_are_culled() {
        let mut s = session(5);
        s.world.player.entity.position.x = 6.0 * 1920.0;
        s.step(DT, &idle());
        let limit = s.camera.min_x - 1920.0;
        assert!(s
            .world
            .grounds
            .iter_active()
            .all(|(_, g)| g.follows_camera || g.rect.right() >= limit));
    }

    #[test]
    fn pickup_heals_and_removes_crate() {
        let mut s = session(6);
        s.world.player.entity.hp = 40;
        let p = s.world.player.entity.position;
        let crate_idx = s
            .world
            .place_prop(ObjectType::HpCrate, Vec2::new(p.x - 50.0, 820.0))
            .expect("prop");
        s.step(DT, &idle());
        assert_eq!(s.world.player.entity.hp, 90);
        assert!(!s.world.props.get(crate_idx).expect("prop").active);
        assert_eq!(s.world.messages.active_count(), 1);
        assert_eq!(s.world.player.points, 0);
    }

    #[test]
    fn debug_kill_ends_the_game_after_the_corpse_time() {
        let mut s = session(7);
        let kill = PlayerIntent {
            debug_kill: true,
            ..PlayerIntent::default()
        };
        s.step(DT, &kill);
        assert_eq!(s.world.player.entity.lower.state, AnimState::Dying);
        assert_eq!(s.world.audio.count(SoundFx::Dying), 1);

        let mut steps = 0;
        while s.phase == Phase::Active {
            s.step(DT, &idle());
            steps += 1;
            assert!(steps < 200);
        }
        assert_eq!(s.phase, Phase::GameOver);
        let frame = s.frame;
        s.step(DT, &idle());
        assert_eq!(s.frame, frame);
    }

    #[test]
    fn melee_enemy_walks_up_and_strikes() {
        let mut s = session(8);
        for _ in 0..30 {
            s.step(DT, &idle());
        }
        let p = s.world.player.entity.position;
        s.world
            .spawn_enemy(EnemyClass::Assassin, Vec2::new(p.x + 400.0, p.y))
            .expect("enemy");
        if let Some(e) = s.world.enemies.get_mut(0) {
            e.entity.facing = -1.0;
        }
        for _ in 0..240 {
            s.step(DT, &idle());
        }
        assert!(s.world.player.entity.hp < 100);
        assert!(s.world.audio.count(SoundFx::Sword) >= 1);
    }

    #[test]
    fn difficulty_is_capped() {
        let mut s = session(9);
        s.elapsed = 100_000.0;
        s.step(DT, &idle());
        assert_eq!(s.difficulty, s.world.config.max_difficulty);
    }

    #[test]
    fn firing_spends_ammo_and_spawns_a_bullet() {
        let mut s = session(10);
        let fire = PlayerIntent {
            fire: true,
            ..PlayerIntent::default()
        };
        let ammo = s.world.player.entity.magnum_ammo;
        s.step(DT, &fire);
        let summary = s.summary();
        assert_eq!(summary.magnum_ammo, ammo - 1);
        assert_eq!(summary.bullets, 1);
        assert_eq!(s.world.player.entity.upper.state, AnimState::Attacking);
    }
}
