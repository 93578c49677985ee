//! Axis-aligned rectangles and circles in world space.
//!
//! World space is y-down (screen convention): `y` grows toward the floor, so a
//! rectangle's `bottom()` is its largest y. All overlap tests are strict --
//! rectangles that merely share an edge do not overlap. Gameplay code relies on
//! this (an entity resting exactly on a surface sits one pixel inside it so the
//! contact is re-detected every frame).

use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Copy of this rectangle moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Circle vs rectangle test: reject on the expanded box, accept when the
    /// center projects onto a face, otherwise compare against the nearest corner.
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        let half_w = rect.width / 2.0;
        let half_h = rect.height / 2.0;
        let rect_center = rect.center();
        let dx = (self.center.x - rect_center.x).abs();
        let dy = (self.center.y - rect_center.y).abs();

        if dx > half_w + self.radius || dy > half_h + self.radius {
            return false;
        }
        if dx <= half_w || dy <= half_h {
            return true;
        }

        let corner_x = dx - half_w;
        let corner_y = dy - half_h;
        corner_x * corner_x + corner_y * corner_y <= self.radius * self.radius
    }
}

/// Collision box layout relative to an actor's anchor.
///
/// The box is `width` wide and sits `rear` units behind the anchor when facing
/// right; facing left mirrors it, so the box sits `width - rear` behind the
/// anchor. Snapping an actor against an obstacle must go through
/// [`Hitbox::anchor_right_of`] / [`Hitbox::anchor_left_of`] so the box edge, not
/// the anchor, touches the obstacle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Hitbox {
    pub width: f32,
    pub rear: f32,
}

impl Hitbox {
    pub const fn new(width: f32, rear: f32) -> Self {
        Self { width, rear }
    }

    /// Distance from the box's left edge to the anchor for the given facing sign.
    pub fn rear_offset(&self, facing: f32) -> f32 {
        if facing < 0.0 {
            self.width - self.rear
        } else {
            self.rear
        }
    }

    pub fn box_at(&self, anchor: Vec2, height: f32, facing: f32) -> Rect {
        Rect::new(
            anchor.x - self.rear_offset(facing),
            anchor.y - height / 2.0,
            self.width,
            height,
        )
    }

    /// Anchor x that puts the box's left edge on `edge_x`.
    pub fn anchor_right_of(&self, edge_x: f32, facing: f32) -> f32 {
        edge_x + self.rear_offset(facing)
    }

    /// Anchor x that puts the box's right edge on `edge_x`.
    pub fn anchor_left_of(&self, edge_x: f32, facing: f32) -> f32 {
        edge_x - (self.width - self.rear_offset(facing))
    }
}
