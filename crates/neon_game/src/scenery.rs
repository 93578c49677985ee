//! Camera and parallax background tiling.
//!
//! Each [`BackgroundLayer`] is a strip of screen-wide tiles scrolled at its own
//! parallax factor. A tile that scrolls fully off the left edge is reused at
//! the right end with the next id and a new style. On the foreground layer
//! (factor 1.0) tile ids line up with chunk indices, so every recycled
//! foreground tile is a chunk that needs populating.

use rand::Rng;

use neon_core::geometry::Rect;

/// Where the followed x sits inside the view, as a fraction of its width.
pub const FOLLOW_ANCHOR: f32 = 0.5;
pub const STYLE_VARIANTS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Left edge of the view. Never decreases.
    pub min_x: f32,
    /// Right edge of the revealed level.
    pub max_x: f32,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min_x: 0.0,
            max_x: width,
            width,
            height,
        }
    }

    pub fn follow(&mut self, target_x: f32) {
        let wanted = target_x - self.width * FOLLOW_ANCHOR;
        if wanted > self.min_x {
            self.min_x = wanted;
        }
    }

    pub fn view(&self) -> Rect {
        Rect::new(self.min_x, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Midground,
    Foreground,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [
        LayerKind::Background,
        LayerKind::Midground,
        LayerKind::Foreground,
    ];

    pub fn parallax(self) -> f32 {
        match self {
            LayerKind::Background => 0.2,
            LayerKind::Midground => 0.5,
            LayerKind::Foreground => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: i32,
    pub style: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    pub kind: LayerKind,
    pub tile_width: f32,
    pub tiles: Vec<Tile>,
    next_id: i32,
}

impl BackgroundLayer {
    pub fn new<R: Rng + ?Sized>(kind: LayerKind, count: usize, tile_width: f32, rng: &mut R) -> Self {
        let tiles = (0..count as i32)
            .map(|id| Tile {
                id,
                style: rng.gen_range(0..STYLE_VARIANTS),
            })
            .collect();
        Self {
            kind,
            tile_width,
            tiles,
            next_id: count as i32,
        }
    }

    /// Horizontal scroll of the whole layer for a camera at `min_x`.
    pub fn offset(&self, min_x: f32) -> f32 {
        -min_x * self.kind.parallax()
    }

    /// Screen-space x of a tile's left edge.
    pub fn screen_x(&self, tile: &Tile, min_x: f32) -> f32 {
        tile.id as f32 * self.tile_width + self.offset(min_x)
    }

    /// Recycle tiles that left the screen. Returns the ids given out.
    pub fn update<R: Rng + ?Sized>(&mut self, min_x: f32, rng: &mut R) -> Vec<i32> {
        let mut fresh = Vec::new();
        let offset = self.offset(min_x);
        let width = self.tile_width;
        for tile in &mut self.tiles {
            if tile.id as f32 * width + width + offset <= 0.0 {
                tile.id = self.next_id;
                tile.style = rng.gen_range(0..STYLE_VARIANTS);
                self.next_id += 1;
                fresh.push(tile.id);
            }
        }
        fresh
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenery {
    pub layers: Vec<BackgroundLayer>,
}

impl Scenery {
    pub fn new<R: Rng + ?Sized>(tiles_per_layer: usize, tile_width: f32, rng: &mut R) -> Self {
        let layers = LayerKind::ALL
            .iter()
            .map(|&kind| BackgroundLayer::new(kind, tiles_per_layer, tile_width, rng))
            .collect();
        Self { layers }
    }

    pub fn foreground(&self) -> Option<&BackgroundLayer> {
        self.layers
            .iter()
            .find(|layer| layer.kind == LayerKind::Foreground)
    }

    /// Advance every layer. Returns the foreground ids (chunks) revealed.
    pub fn update<R: Rng + ?Sized>(&mut self, min_x: f32, rng: &mut R) -> Vec<i32> {
        let mut chunks = Vec::new();
        for layer in &mut self.layers {
            let fresh = layer.update(min_x, rng);
            if layer.kind == LayerKind::Foreground {
                chunks = fresh;
            }
        }
        chunks
    }
}
