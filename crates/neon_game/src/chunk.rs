//! Procedural population of one screen-wide level chunk.
//!
//! A chunk gets at most one prop cluster, placed in rows at fixed heights
//! above the floor, plus `difficulty + 1` enemy spawn trials. Chunk 0 never
//! gets enemies. All randomness comes from the caller's RNG, so a seeded RNG
//! reproduces the same chunk.

use glam::Vec2;
use rand::Rng;

use crate::enemy::EnemyClass;
use crate::props::ObjectType;
use crate::world::World;

/// Percent chance a chunk gets a prop cluster.
pub const CLUSTER_CHANCE: u32 = 60;
/// Percent chance a cluster is overridden to a collectible drop.
pub const COLLECTIBLE_CHANCE: u32 = 3;
/// Percent chance each enemy trial spawns an enemy.
pub const ENEMY_CHANCE: u32 = 70;

/// Row baselines, measured up from the bottom of the screen.
const ROW_LIFT: [f32; 3] = [130.0, 115.0, 105.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cluster {
    SmallGarbage,
    LargeGarbage,
    SmallBarrels,
    LargeBarrels,
    Crates,
    Collectible,
}

impl Cluster {
    const ROLLED: [Cluster; 5] = [
        Cluster::SmallGarbage,
        Cluster::LargeGarbage,
        Cluster::SmallBarrels,
        Cluster::LargeBarrels,
        Cluster::Crates,
    ];
}

/// One placed prop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: ObjectType,
    /// Top-left corner.
    pub position: Vec2,
    pub slot: Option<usize>,
}

/// What [`populate_chunk`] put into the world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkReport {
    pub chunk: i32,
    pub cluster: Option<Cluster>,
    pub props: Vec<Placement>,
    pub enemies: Vec<(EnemyClass, Vec2)>,
}

struct Builder<'a> {
    world: &'a mut World,
    report: ChunkReport,
    origin: f32,
    row_base: [f32; 3],
}

impl Builder<'_> {
    /// Place `kind` sitting on row `row` with its left edge at `x`. Returns
    /// the prop's width.
    fn put(&mut self, kind: ObjectType, x: f32, row: usize) -> f32 {
        let size = kind.traits().size;
        self.put_at(kind, Vec2::new(x, self.row_base[row] - size));
        size
    }

    fn put_at(&mut self, kind: ObjectType, position: Vec2) {
        let slot = self.world.place_prop(kind, position);
        self.report.props.push(Placement {
            kind,
            position,
            slot,
        });
    }
}

fn garbage_bag<R: Rng + ?Sized>(rng: &mut R) -> ObjectType {
    if rng.gen_range(1..=2) == 1 {
        ObjectType::GarbageBag1
    } else {
        ObjectType::GarbageBag2
    }
}

fn card_crate<R: Rng + ?Sized>(rng: &mut R) -> ObjectType {
    match rng.gen_range(1..=3) {
        1 => ObjectType::CardCrate1,
        2 => ObjectType::CardCrate2,
        _ => ObjectType::CardCrate3,
    }
}

fn bag_or_crate<R: Rng + ?Sized>(rng: &mut R) -> ObjectType {
    if rng.gen_range(1..=2) == 1 {
        garbage_bag(rng)
    } else {
        card_crate(rng)
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

pub fn populate_chunk<R: Rng + ?Sized>(
    world: &mut World,
    chunk: i32,
    difficulty: u32,
    rng: &mut R,
) -> ChunkReport {
    let width = world.config.screen_width;
    let height = world.config.screen_height;
    let mut b = Builder {
        world,
        report: ChunkReport {
            chunk,
            ..ChunkReport::default()
        },
        origin: chunk as f32 * width,
        row_base: ROW_LIFT.map(|lift| height - lift),
    };

    if rng.gen_range(1..=100) <= CLUSTER_CHANCE {
        let mut cluster = Cluster::ROLLED[rng.gen_range(0..Cluster::ROLLED.len())];
        if rng.gen_range(1..=100) <= COLLECTIBLE_CHANCE {
            cluster = Cluster::Collectible;
        }
        b.report.cluster = Some(cluster);
        match cluster {
            Cluster::SmallGarbage => small_garbage(&mut b, rng),
            Cluster::LargeGarbage => large_garbage(&mut b, rng),
            Cluster::SmallBarrels => barrels(&mut b, rng, &SMALL_PILE),
            Cluster::LargeBarrels => barrels(&mut b, rng, &LARGE_PILE),
            Cluster::Crates => crates(&mut b, rng),
            Cluster::Collectible => collectible(&mut b, rng),
        }
    }

    if chunk != 0 {
        for _ in 0..=difficulty {
            if rng.gen_range(1..=100) > ENEMY_CHANCE {
                continue;
            }
            let class = EnemyClass::SPAWNABLE[rng.gen_range(0..EnemyClass::SPAWNABLE.len())];
            let x = b.origin + rng.gen_range(50..=500) as f32;
            let y = height - rng.gen_range(160..=height as i32) as f32;
            let position = Vec2::new(x, y);
            b.world.spawn_enemy(class, position);
            b.report.enemies.push((class, position));
        }
    }

    let report = b.report;
    log::debug!(
        "Chunk {} populated: {:?}, {} props, {} enemies",
        chunk,
        report.cluster,
        report.props.len(),
        report.enemies.len()
    );
    report
}

fn small_garbage<R: Rng + ?Sized>(b: &mut Builder<'_>, rng: &mut R) {
    let x_offset = rng.gen_range(100..=700) as f32;
    let per_row = rng.gen_range(1..=3);
    let mut last_w = 0.0;
    for row in 0..2 {
        let mut x = b.origin + x_offset + row as f32 * last_w / 2.0;
        for _ in 0..per_row {
            let kind = if rng.gen_range(1..=100) <= 60 {
                garbage_bag(rng)
            } else {
                card_crate(rng)
            };
            last_w = b.put(kind, x, row);
            x += last_w;
        }
    }
}

fn large_garbage<R: Rng + ?Sized>(b: &mut Builder<'_>, rng: &mut R) {
    let x_offset = rng.gen_range(100..=500) as f32;
    let per_row = rng.gen_range(2..=4);
    let mut containers = 0;
    let mut bins = 0;
    let mut last_w = 0.0;
    for row in 0..2 {
        let mut x = b.origin + x_offset + row as f32 * last_w / 2.0;
        for _ in 0..per_row {
            let roll = rng.gen_range(1..=100);
            let kind = if row == 0 {
                if roll <= 35 {
                    if containers < 1 {
                        containers += 1;
                        ObjectType::TrashContainer
                    } else {
                        bag_or_crate(rng)
                    }
                } else if roll <= 60 {
                    bins += 1;
                    ObjectType::TrashBin
                } else {
                    bag_or_crate(rng)
                }
            } else if roll <= 40 && bins < 2 {
                bins += 1;
                ObjectType::TrashBin
            } else {
                bag_or_crate(rng)
            };
            last_w = b.put(kind, x, row);
            x += last_w;
        }
    }
}

/// Shape of a barrel pile.
struct Pile {
    rows: usize,
    explosive_chance: u32,
    /// Each row holds one more item than the row below it.
    widens: bool,
    /// Rows above the first are offset left or right at random.
    shifts: bool,
}

const SMALL_PILE: Pile = Pile {
    rows: 2,
    explosive_chance: 10,
    widens: true,
    shifts: false,
};

const LARGE_PILE: Pile = Pile {
    rows: 3,
    explosive_chance: 20,
    widens: false,
    shifts: true,
};

fn barrels<R: Rng + ?Sized>(b: &mut Builder<'_>, rng: &mut R, pile: &Pile) {
    let x_offset = rng.gen_range(100..=500) as f32;
    let per_row = rng.gen_range(1..=2);
    let explosive_chance = pile.explosive_chance;
    let mut explosives = 0;
    let mut last_w = 0.0;
    for row in 0..pile.rows {
        let shift = if pile.shifts { random_sign(rng) } else { 1.0 };
        let mut x = b.origin + x_offset + shift * row as f32 * last_w / 2.0;
        let items = if pile.widens { per_row + row } else { per_row };
        for _ in 0..items {
            let roll = rng.gen_range(1..=100);
            let kind = if roll <= explosive_chance {
                if explosives < 1 {
                    explosives += 1;
                    Some(ObjectType::ExplosiveBarrel)
                } else {
                    Some(bag_or_crate(rng))
                }
            } else if roll <= 80 {
                Some(ObjectType::MetalBarrel)
            } else if roll <= 90 {
                Some(bag_or_crate(rng))
            } else {
                None
            };
            // An empty spot still takes up a barrel's width.
            let w = match kind {
                Some(kind) => b.put(kind, x, row),
                None => ObjectType::MetalBarrel.traits().size,
            };
            last_w = w;
            x += w;
        }
    }
}

fn crates<R: Rng + ?Sized>(b: &mut Builder<'_>, rng: &mut R) {
    let x_offset = rng.gen_range(100..=500) as f32;
    let per_row = rng.gen_range(1..=2);
    let stacking = rng.gen_range(1..=4) < 2;
    let mut last_w = 0.0;
    for row in 0..2 {
        let shift = random_sign(rng);
        let mut x = b.origin + x_offset + shift * row as f32 * last_w / 2.0;
        for _ in 0..per_row {
            let roll = rng.gen_range(1..=100);
            let kind = if roll <= 40 {
                ObjectType::MetalCrate
            } else if roll <= 80 {
                ObjectType::MetalBarrel
            } else {
                continue;
            };
            let w = b.put(kind, x, row);
            if stacking && row == 0 && rng.gen_range(1..=5) < 5 {
                let y = b.row_base[row] - 2.0 * w - 2.0;
                b.put_at(kind, Vec2::new(x, y));
            }
            last_w = w;
            x += w;
        }
    }
}

/// A single ammo or HP crate on a random row.
fn collectible<R: Rng + ?Sized>(b: &mut Builder<'_>, rng: &mut R) {
    let x_offset = rng.gen_range(100..=500) as f32;
    let row = rng.gen_range(0..=2usize);
    let kind = if rng.gen_range(1..=2) == 1 {
        ObjectType::AmmoCrate
    } else {
        ObjectType::HpCrate
    };
    let w = kind.traits().size;
    let x = b.origin + x_offset + row as f32 * w / 2.0 * random_sign(rng);
    b.put(kind, x, row);
}
