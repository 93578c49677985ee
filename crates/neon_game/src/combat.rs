//! Projectiles, damage and destruction.
//!
//! Everything here runs against the whole [`World`] because a single hit can
//! reach across pools: a bullet destroys an explosive barrel, whose blast
//! destroys more props and kills enemies, each kill awarding points and
//! spawning a message. Props are deactivated before their own blast goes off,
//! so chains always terminate.

use glam::Vec2;

use neon_core::geometry::{Circle, Rect};

use crate::enemy::AttackKind;
use crate::entity::{Aim, Entity, EntityKind};
use crate::fx::{AudioCues, ParticleKind, ParticleSpec, SoundFx};
use crate::pool::{Pool, Slot};
use crate::props::{deactivate_prop, ObjectType};
use crate::world::World;

/// Vertical speed kept (and reversed) when a grenade bounces.
pub const GRENADE_BOUNCE: f32 = 0.45;
/// Horizontal speed kept when a grenade hits the floor.
pub const GRENADE_ROLL: f32 = 0.7;
pub const GRENADE_RADIUS: f32 = 12.0;
pub const GRENADE_THROW: Vec2 = Vec2::new(450.0, -380.0);
/// Bounces slower than this are silent.
const BOUNCE_SOUND_SPEED: f32 = 60.0;
/// Score messages for kills float this far below the body's center.
const KILL_MESSAGE_OFFSET: Vec2 = Vec2::new(0.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BulletKind {
    #[default]
    Magnum,
    Sniper,
    Laser,
}

impl BulletKind {
    /// px/s
    pub fn speed(self) -> f32 {
        match self {
            BulletKind::Magnum => 1800.0,
            BulletKind::Sniper => 2600.0,
            BulletKind::Laser => 2200.0,
        }
    }

    pub fn power(self) -> i32 {
        match self {
            BulletKind::Magnum => 25,
            BulletKind::Sniper => 60,
            BulletKind::Laser => 15,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            BulletKind::Magnum => Vec2::new(24.0, 6.0),
            BulletKind::Sniper => Vec2::new(36.0, 4.0),
            BulletKind::Laser => Vec2::new(48.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bullet {
    pub kind: BulletKind,
    pub owner: EntityKind,
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
    pub size: Vec2,
    pub power: i32,
    pub lifetime: f32,
    pub active: bool,
}

impl Slot for Bullet {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.position, self.size.x, self.size.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Grenade {
    pub owner: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub fuse: f32,
    /// Visual spin, radians.
    pub angle: f32,
    pub active: bool,
}

impl Slot for Grenade {
    fn is_active(&self) -> bool {
        self.active
    }
}

/// Result of one [`explosion_aoe`] sweep. Counts only direct hits, not
/// whatever chained barrels destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AoeReport {
    pub props_destroyed: usize,
    pub enemies_killed: usize,
}

pub fn aim_direction(facing: f32, aim: Aim) -> Vec2 {
    let dir = Vec2::new(facing, f32::from(aim.sign()));
    dir.normalize_or_zero()
}

/// Where shots leave the shooter's sprite.
pub fn muzzle(shooter: &Entity) -> Vec2 {
    shooter.position
        + Vec2::new(
            shooter.facing * shooter.size.x * 0.35,
            -shooter.size.y * 0.1,
        )
}

pub fn spawn_bullet(
    pool: &mut Pool<Bullet>,
    shooter: &Entity,
    kind: BulletKind,
    lifetime: f32,
) -> Option<usize> {
    let slot = pool.spawn(Bullet {
        kind,
        owner: shooter.kind(),
        position: muzzle(shooter),
        direction: aim_direction(shooter.facing, shooter.aim),
        size: kind.size(),
        power: kind.power(),
        lifetime,
        active: true,
    });
    if slot.is_none() {
        log::trace!("Bullet pool full, {:?} shot dropped", kind);
    }
    slot
}

pub fn spawn_grenade(pool: &mut Pool<Grenade>, thrower: &Entity, fuse: f32) -> Option<usize> {
    let velocity = Vec2::new(
        thrower.facing * GRENADE_THROW.x + thrower.velocity.x,
        GRENADE_THROW.y,
    );
    let slot = pool.spawn(Grenade {
        owner: thrower.kind(),
        position: muzzle(thrower),
        velocity,
        radius: GRENADE_RADIUS,
        fuse,
        angle: 0.0,
        active: true,
    });
    if slot.is_none() {
        log::trace!("Grenade pool full, throw dropped");
    }
    slot
}

pub fn hurt_entity(entity: &mut Entity, audio: &mut AudioCues, damage: i32) {
    audio.push(SoundFx::Hurt);
    entity.take_damage(damage);
}

fn award_kill(world: &mut World, id: u32, points: i32, position: Vec2) {
    world.player.points += i64::from(points);
    world.message(position + KILL_MESSAGE_OFFSET, points);
    log::debug!("Enemy #{} killed for {} points", id, points);
}

/// Zero the enemy's HP and award its points. Enemies already at zero HP or
/// dying are left alone, so a kill pays out once.
pub fn kill_enemy(world: &mut World, index: usize) -> bool {
    let Some(enemy) = world.enemies.get_mut(index).filter(|e| e.active) else {
        return false;
    };
    if enemy.entity.hp <= 0 || enemy.entity.is_dying() {
        return false;
    }
    enemy.entity.hp = 0;
    let (id, points, position) = (enemy.id, enemy.points, enemy.entity.position);
    award_kill(world, id, points, position);
    true
}

/// Deactivate a prop and its ground. Destroyed (non-collectable) props pay
/// out their points; explosive barrels go off with `source` as the blast
/// source.
pub fn destroy_env_prop(world: &mut World, index: usize, source: EntityKind) -> bool {
    let Some(prop) = deactivate_prop(&mut world.props, &mut world.grounds, index) else {
        return false;
    };
    let center = prop.rect.center();
    log::debug!("Prop #{} ({:?}) destroyed", prop.id, prop.kind);

    if !prop.collectable {
        world.player.points += i64::from(prop.points);
        world.message(Vec2::new(center.x, prop.rect.y), prop.points);
    }
    let mut smoke = ParticleSpec::new(ParticleKind::Smoke, center, 0.6);
    smoke.velocity = Vec2::new(0.0, -30.0);
    smoke.scale_range = Vec2::new(0.8, 1.2);
    world.particle(smoke);

    if prop.kind == ObjectType::ExplosiveBarrel {
        let radius = world.config.barrel_blast_radius;
        detonate(world, center, radius, source);
    }
    true
}

fn detonate(world: &mut World, center: Vec2, radius: f32, source: EntityKind) -> AoeReport {
    let mut blast = ParticleSpec::new(ParticleKind::Explosion, center, 0.5);
    blast.scale_range = Vec2::new(1.0, 1.4);
    world.particle(blast);
    world.audio.push(SoundFx::GrenadeExplosion);
    explosion_aoe(world, center, radius, source)
}

/// Destroy every destroyable prop and kill every living enemy touched by the
/// circle. One pass over the largest pool capacity covers both pools.
///
/// `source` is carried for logging only: blasts do not filter victims by who
/// caused them.
pub fn explosion_aoe(world: &mut World, center: Vec2, radius: f32, source: EntityKind) -> AoeReport {
    let blast = Circle::new(center, radius);
    let mut report = AoeReport::default();

    for i in 0..world.config.capacities.max() {
        let prop_hit = world
            .props
            .get(i)
            .is_some_and(|p| p.active && p.destroyable && blast.overlaps_rect(&p.rect));
        if prop_hit && destroy_env_prop(world, i, source) {
            report.props_destroyed += 1;
        }

        let enemy_hit = world.enemies.get(i).is_some_and(|e| {
            e.active && !e.entity.is_dying() && blast.overlaps_rect(&e.entity.collision_box())
        });
        if enemy_hit && kill_enemy(world, i) {
            report.enemies_killed += 1;
        }
    }

    log::debug!(
        "Explosion at ({:.0}, {:.0}) r={} from {:?}: {} props, {} enemies",
        center.x,
        center.y,
        radius,
        source,
        report.props_destroyed,
        report.enemies_killed
    );
    report
}

/// Carry out an attack `steer` decided on for the enemy in `index`.
pub fn resolve_attack(world: &mut World, index: usize, attack: AttackKind) {
    let Some(attacker) = world
        .enemies
        .get(index)
        .filter(|e| e.active)
        .map(|e| e.entity.clone())
    else {
        return;
    };

    match attack {
        AttackKind::Melee { damage } => {
            world.audio.push(SoundFx::Sword);
            hurt_entity(&mut world.player.entity, &mut world.audio, damage);
            let mut spill = ParticleSpec::new(ParticleKind::BloodSpill, world.player.entity.position, 0.3);
            spill.facing = attacker.facing;
            world.particle(spill);
        }
        AttackKind::Ranged { bullet } => {
            world.audio.push(SoundFx::Magnum);
            let lifetime = world.config.bullet_lifetime;
            spawn_bullet(&mut world.bullets, &attacker, bullet, lifetime);
            muzzle_flash(world, &attacker);
        }
    }
}

fn muzzle_flash(world: &mut World, shooter: &Entity) {
    let mut flash = ParticleSpec::new(ParticleKind::MagnumShoot, muzzle(shooter), 0.12);
    flash.facing = shooter.facing;
    world.particle(flash);
}

/// Fire the player's gun; ammo was already taken by `Player::control`.
pub fn fire_player_weapon(world: &mut World) -> Option<usize> {
    let shooter = world.player.entity.clone();
    world.audio.push(SoundFx::Magnum);
    muzzle_flash(world, &shooter);
    let lifetime = world.config.bullet_lifetime;
    spawn_bullet(&mut world.bullets, &shooter, BulletKind::Magnum, lifetime)
}

pub fn throw_player_grenade(world: &mut World) -> Option<usize> {
    world.audio.push(SoundFx::GrenadeLaunch);
    let fuse = world.config.grenade_fuse;
    spawn_grenade(&mut world.grenades, &world.player.entity, fuse)
}

/// Move bullets and resolve their hits. Player bullets only hit enemies and
/// enemy bullets only hit the player; either kind is stopped by the first
/// destroyable prop in its way, destroying it.
pub fn update_bullets(world: &mut World, dt: f32) {
    for i in 0..world.bullets.capacity() {
        let Some(mut bullet) = world.bullets.get(i).copied().filter(|b| b.active) else {
            continue;
        };
        bullet.lifetime -= dt;
        bullet.position += bullet.direction * bullet.kind.speed() * dt;
        if bullet.lifetime <= 0.0 {
            bullet.active = false;
        } else {
            bullet.active = !bullet_hit(world, &bullet);
        }
        if let Some(slot) = world.bullets.get_mut(i) {
            *slot = bullet;
        }
    }
}

fn bullet_hit(world: &mut World, bullet: &Bullet) -> bool {
    let rect = bullet.rect();
    match bullet.owner {
        EntityKind::Player => {
            let victim = world.enemies.iter_active().find_map(|(index, e)| {
                (!e.entity.is_dying() && e.entity.hp > 0 && e.entity.collision_box().overlaps(&rect))
                    .then_some(index)
            });
            if let Some(index) = victim {
                let mut killed = None;
                if let Some(enemy) = world.enemies.get_mut(index) {
                    hurt_entity(&mut enemy.entity, &mut world.audio, bullet.power);
                    if enemy.entity.hp <= 0 {
                        killed = Some((enemy.id, enemy.points, enemy.entity.position));
                    }
                }
                if let Some((id, points, position)) = killed {
                    award_kill(world, id, points, position);
                }
                return true;
            }
        }
        EntityKind::Enemy => {
            let player = &mut world.player.entity;
            if !player.is_dying() && player.collision_box().overlaps(&rect) {
                hurt_entity(player, &mut world.audio, bullet.power);
                return true;
            }
        }
    }

    let prop = world
        .props
        .iter_active()
        .find_map(|(index, p)| (p.destroyable && p.rect.overlaps(&rect)).then_some(index));
    match prop {
        Some(index) => {
            destroy_env_prop(world, index, bullet.owner);
            true
        }
        None => false,
    }
}

/// Fly, bounce and detonate grenades.
pub fn update_grenades(world: &mut World, dt: f32) {
    let gravity = world.config.gravity;
    let radius = world.config.grenade_blast_radius;

    for i in 0..world.grenades.capacity() {
        let Some(mut g) = world.grenades.get(i).copied().filter(|g| g.active) else {
            continue;
        };

        g.fuse -= dt;
        if g.fuse <= 0.0 {
            g.active = false;
            if let Some(slot) = world.grenades.get_mut(i) {
                *slot = g;
            }
            detonate(world, g.position, radius, g.owner);
            continue;
        }

        g.velocity.y += gravity * dt;
        let mut next = g.position + g.velocity * dt;
        let probe = Circle::new(next, g.radius);
        let contact = world
            .grounds
            .iter_active()
            .map(|(_, ground)| *ground)
            .find(|ground| {
                probe.overlaps_rect(&ground.rect)
                    && (ground.blocks || (ground.steppable && g.position.y <= ground.rect.y))
            });

        if let Some(ground) = contact {
            if g.velocity.y > 0.0 && g.position.y <= ground.rect.y {
                next.y = ground.rect.y - g.radius;
                g.velocity.y *= -GRENADE_BOUNCE;
                g.velocity.x *= GRENADE_ROLL;
            } else {
                next.x = g.position.x;
                g.velocity.x *= -GRENADE_BOUNCE;
            }
            if g.velocity.length() > BOUNCE_SOUND_SPEED {
                world.audio.push(SoundFx::GrenadeBouncing);
            }
        }

        g.position = next;
        g.angle += g.velocity.x * dt / g.radius;
        if let Some(slot) = world.grenades.get_mut(i) {
            *slot = g;
        }
    }
}
