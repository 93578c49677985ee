//! Static level geometry: grounds and the environment props that own them.
//!
//! Every prop places a [`Ground`] in the ground pool and remembers its slot.
//! Destroying or collecting the prop deactivates both.

use glam::Vec2;

use neon_core::geometry::Rect;

use crate::pool::{Pool, Slot};

/// Side length of one cell in the objects atlas.
pub const OBJECT_CELL: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectType {
    #[default]
    MetalCrate,
    AmmoCrate,
    HpCrate,
    CardCrate1,
    CardCrate2,
    CardCrate3,
    TrashBin,
    ExplosiveBarrel,
    MetalBarrel,
    GarbageBag1,
    GarbageBag2,
    TrashContainer,
}

/// Capabilities of an object type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTraits {
    /// Placed width and height.
    pub size: f32,
    pub destroyable: bool,
    pub collectable: bool,
    /// Actors collide with the sides; otherwise they can only stand on top.
    pub blocking: bool,
    pub points: i32,
    /// (row, column, columns wide, rows tall) in the objects atlas.
    pub atlas: (u32, u32, u32, u32),
}

impl ObjectType {
    pub fn traits(self) -> ObjectTraits {
        let t = |size: f32,
                 destroyable: bool,
                 collectable: bool,
                 blocking: bool,
                 points: i32,
                 atlas: (u32, u32, u32, u32)| ObjectTraits {
            size,
            destroyable,
            collectable,
            blocking,
            points,
            atlas,
        };
        match self {
            ObjectType::MetalCrate => t(130.0, true, false, true, 50, (0, 0, 1, 1)),
            ObjectType::AmmoCrate => t(130.0, false, true, false, 200, (0, 1, 1, 1)),
            ObjectType::HpCrate => t(130.0, false, true, false, 50, (0, 2, 1, 1)),
            ObjectType::CardCrate1 => t(130.0, true, false, true, 10, (0, 3, 1, 1)),
            ObjectType::CardCrate2 => t(130.0, true, false, true, 10, (0, 4, 1, 1)),
            ObjectType::CardCrate3 => t(130.0, true, false, true, 10, (0, 5, 1, 1)),
            ObjectType::TrashBin => t(130.0, true, false, true, 30, (1, 0, 1, 1)),
            ObjectType::ExplosiveBarrel => t(130.0, true, false, true, 100, (1, 1, 1, 1)),
            ObjectType::MetalBarrel => t(140.0, true, false, true, 50, (1, 2, 1, 1)),
            ObjectType::GarbageBag1 => t(100.0, true, false, false, 5, (1, 3, 1, 1)),
            ObjectType::GarbageBag2 => t(80.0, true, false, false, 5, (1, 4, 1, 1)),
            ObjectType::TrashContainer => t(220.0, false, false, true, 150, (2, 0, 3, 2)),
        }
    }

    /// Source rectangle in the objects atlas.
    pub fn atlas_rect(self) -> Rect {
        let (row, col, cols, rows) = self.traits().atlas;
        Rect::new(
            col as f32 * OBJECT_CELL,
            row as f32 * OBJECT_CELL,
            cols as f32 * OBJECT_CELL,
            rows as f32 * OBJECT_CELL,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ground {
    pub rect: Rect,
    pub steppable: bool,
    pub blocks: bool,
    /// Moved with the camera's left bound every frame (the left wall).
    pub follows_camera: bool,
    pub invisible: bool,
    pub active: bool,
    /// Object type when the ground belongs to a prop.
    pub source: Option<ObjectType>,
}

impl Slot for Ground {
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Ground {
    /// Walkable surface that never blocks sideways movement.
    pub fn floor(rect: Rect) -> Self {
        Self {
            rect,
            steppable: true,
            blocks: false,
            follows_camera: false,
            invisible: false,
            active: true,
            source: None,
        }
    }

    pub fn left_wall(rect: Rect) -> Self {
        Self {
            rect,
            steppable: false,
            blocks: true,
            follows_camera: true,
            invisible: true,
            active: true,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvProp {
    pub id: u32,
    pub ground: usize,
    pub kind: ObjectType,
    pub rect: Rect,
    pub frame: Rect,
    pub destroyable: bool,
    pub collectable: bool,
    pub active: bool,
    pub points: i32,
}

impl Slot for EnvProp {
    fn is_active(&self) -> bool {
        self.active
    }
}

/// Place a prop with its top-left corner at `position`. Both a prop slot and a
/// ground slot are needed; if either pool is full nothing is placed.
pub fn create_env_prop(
    props: &mut Pool<EnvProp>,
    grounds: &mut Pool<Ground>,
    id: u32,
    kind: ObjectType,
    position: Vec2,
    size: Vec2,
) -> Option<usize> {
    if props.free_slot().is_none() {
        log::trace!("Prop pool full, {:?} not placed", kind);
        return None;
    }
    let traits = kind.traits();
    let rect = Rect::new(position.x, position.y, size.x, size.y);
    let Some(ground) = grounds.spawn(Ground {
        rect,
        steppable: true,
        blocks: traits.blocking,
        follows_camera: false,
        invisible: true,
        active: true,
        source: Some(kind),
    }) else {
        log::trace!("Ground pool full, {:?} not placed", kind);
        return None;
    };
    props.spawn(EnvProp {
        id,
        ground,
        kind,
        rect,
        frame: kind.atlas_rect(),
        destroyable: traits.destroyable,
        collectable: traits.collectable,
        active: true,
        points: traits.points,
    })
}

/// Deactivate a prop and its ground. Returns the prop when it was active.
pub fn deactivate_prop(
    props: &mut Pool<EnvProp>,
    grounds: &mut Pool<Ground>,
    index: usize,
) -> Option<EnvProp> {
    let prop = props.get_mut(index).filter(|p| p.active)?;
    prop.active = false;
    let prop = *prop;
    if let Some(ground) = grounds.get_mut(prop.ground) {
        ground.active = false;
    }
    Some(prop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_and_ground_share_geometry() {
        let mut props = Pool::<EnvProp>::new(4);
        let mut grounds = Pool::<Ground>::new(4);
        grounds.spawn(Ground::floor(Rect::new(0.0, 950.0, 1920.0, 130.0)));

        let idx = create_env_prop(
            &mut props,
            &mut grounds,
            7,
            ObjectType::MetalBarrel,
            Vec2::new(300.0, 810.0),
            Vec2::splat(140.0),
        )
        .expect("slot available");
        let prop = props.get(idx).copied().expect("prop slot");
        assert_eq!(prop.ground, 1);
        let ground = grounds.get(prop.ground).copied().expect("ground slot");
        assert_eq!(ground.rect, prop.rect);
        assert!(ground.blocks);
        assert_eq!(ground.source, Some(ObjectType::MetalBarrel));
    }

    #[test]
    fn full_ground_pool_places_nothing() {
        let mut props = Pool::<EnvProp>::new(4);
        let mut grounds = Pool::<Ground>::new(1);
        grounds.spawn(Ground::floor(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let placed = create_env_prop(
            &mut props,
            &mut grounds,
            0,
            ObjectType::TrashBin,
            Vec2::ZERO,
            Vec2::splat(130.0),
        );
        assert_eq!(placed, None);
        assert_eq!(props.active_count(), 0);
    }

    #[test]
    fn full_prop_pool_does_not_leak_grounds() {
        let mut props = Pool::<EnvProp>::new(1);
        let mut grounds = Pool::<Ground>::new(4);
        create_env_prop(&mut props, &mut grounds, 0, ObjectType::TrashBin, Vec2::ZERO, Vec2::splat(130.0));
        let second = create_env_prop(&mut props, &mut grounds, 1, ObjectType::TrashBin, Vec2::ZERO, Vec2::splat(130.0));
        assert_eq!(second, None);
        assert_eq!(grounds.active_count(), 1);
    }

    #[test]
    fn deactivation_frees_both_slots_once() {
        let mut props = Pool::<EnvProp>::new(2);
        let mut grounds = Pool::<Ground>::new(2);
        let idx = create_env_prop(&mut props, &mut grounds, 0, ObjectType::CardCrate2, Vec2::ZERO, Vec2::splat(130.0))
            .expect("slot available");
        assert!(deactivate_prop(&mut props, &mut grounds, idx).is_some());
        assert_eq!(grounds.active_count(), 0);
        assert!(deactivate_prop(&mut props, &mut grounds, idx).is_none());
    }

    #[test]
    fn collectables_are_not_destroyable() {
        for kind in [ObjectType::AmmoCrate, ObjectType::HpCrate] {
            let t = kind.traits();
            assert!(t.collectable);
            assert!(!t.destroyable);
            assert!(!t.blocking);
        }
        assert_eq!(ObjectType::TrashContainer.atlas_rect(), Rect::new(0.0, 400.0, 600.0, 400.0));
    }
}
