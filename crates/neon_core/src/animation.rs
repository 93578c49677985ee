//! Frame-based sprite animation for two-layer (legs / torso) actors.
//!
//! An [`AnimationLayer`] is a frame index plus a per-frame timer. Each tick the
//! caller supplies the [`SpriteClip`] for the layer's current state; the clip's
//! [`Playback`] decides what happens when the last frame is passed:
//!
//!  - `Loop` wraps to frame 0
//!  - `Hold(n)` parks on frame `n` (clamped into the clip)
//!  - `Transition(next)` rewinds to frame 0 and switches the layer to `next`
//!
//! The driver knows nothing about entities. Effects tied to a particular state
//! (the death recoil, for instance) are applied by the caller from the
//! [`FrameStep`] that [`AnimationLayer::advance`] returns.
//!
//! Sprite sheets are described by [`SpriteLayout`] records, one per actor class,
//! loaded from JSON by [`load_layout_file`].

use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::geometry::{Hitbox, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimState {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
    Attacking,
    Throwing,
    Dying,
    Dead,
}

impl AnimState {
    /// One-shot upper-body states that locomotion must not overwrite.
    pub fn is_protected(self) -> bool {
        matches!(self, AnimState::Attacking | AnimState::Throwing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AnimState::Dying | AnimState::Dead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Loop,
    Hold(u32),
    Transition(AnimState),
}

impl Playback {
    /// Policy used for a state when the layout does not override it.
    pub fn for_state(state: AnimState, frames: u32) -> Self {
        let last = frames.saturating_sub(1);
        match state {
            AnimState::Idle | AnimState::Walking => Playback::Loop,
            AnimState::Jumping | AnimState::Falling => Playback::Hold(last),
            AnimState::Attacking | AnimState::Throwing => Playback::Transition(AnimState::Idle),
            AnimState::Dying | AnimState::Dead => Playback::Hold(last),
        }
    }
}

/// One row of a sprite sheet and how to play it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteClip {
    pub row: u32,
    pub frames: u32,
    pub playback: Playback,
}

/// What a single [`AnimationLayer::advance`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStep {
    /// The frame timer elapsed and the index moved (or was re-applied).
    pub advanced: bool,
    /// The index ran past the last frame and the playback policy kicked in.
    pub overflowed: bool,
}

/// Runtime animation state for one body layer of one actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationLayer {
    pub state: AnimState,
    pub frame: u32,
    pub elapsed: f32,
    pub frame_time: f32,
    pub frame_size: Vec2,
    /// Source rectangle into the sprite sheet. A negative width mirrors the
    /// sprite horizontally; `None` means the layer draws nothing this frame.
    pub source: Option<Rect>,
}

impl Default for AnimationLayer {
    fn default() -> Self {
        Self::new(Vec2::ONE, 0.1)
    }
}

impl AnimationLayer {
    pub fn new(frame_size: Vec2, frame_time: f32) -> Self {
        Self {
            state: AnimState::Idle,
            frame: 0,
            elapsed: 0.0,
            frame_time,
            frame_size,
            source: Some(Rect::new(0.0, 0.0, frame_size.x, frame_size.y)),
        }
    }

    /// Switch to `state` from its first frame.
    pub fn enter(&mut self, state: AnimState) {
        self.state = state;
        self.rewind();
    }

    pub fn rewind(&mut self) {
        self.frame = 0;
        self.elapsed = 0.0;
    }

    /// Accumulate `dt` seconds and step at most one frame.
    pub fn advance(&mut self, dt: f32, clip: &SpriteClip) -> FrameStep {
        self.elapsed += dt;
        if self.elapsed < self.frame_time {
            return FrameStep::default();
        }

        self.elapsed = 0.0;
        self.frame += 1;
        let last = clip.frames.max(1) - 1;
        if self.frame <= last {
            return FrameStep {
                advanced: true,
                overflowed: false,
            };
        }

        match clip.playback {
            Playback::Loop => self.frame = 0,
            Playback::Hold(fixed) => self.frame = fixed.min(last),
            Playback::Transition(next) => {
                self.frame = 0;
                self.state = next;
            }
        }
        FrameStep {
            advanced: true,
            overflowed: true,
        }
    }

    /// Recompute the source rectangle from the current frame, the sheet row and
    /// the facing sign (negative width mirrors the sprite).
    pub fn update_source(&mut self, row: Option<u32>, facing: f32) {
        self.source = row.map(|row| {
            Rect::new(
                self.frame as f32 * self.frame_size.x,
                row as f32 * self.frame_size.y,
                facing.signum() * self.frame_size.x,
                self.frame_size.y,
            )
        });
    }
}

/// Per-class sprite sheet description: frame geometry, timing, hitbox and
/// the clip for each (layer, state) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteLayout {
    pub frame_size: Vec2,
    pub frame_time: f32,
    pub hitbox: Hitbox,
    pub lower: HashMap<AnimState, SpriteClip>,
    pub upper: HashMap<AnimState, SpriteClip>,
    /// Optional attack rows for diagonal aiming (up / down 45 degrees).
    pub upper_aim_up: Option<SpriteClip>,
    pub upper_aim_down: Option<SpriteClip>,
}

impl SpriteLayout {
    /// Clip for `state` on `layer`.
    ///
    /// States without artwork fall back: airborne states use the looping idle
    /// clip, `Dead` parks on the dying clip. The upper layer has no dying
    /// artwork, the lower layer draws the whole body instead.
    pub fn clip(&self, layer: Layer, state: AnimState) -> Option<SpriteClip> {
        let clips = match layer {
            Layer::Lower => &self.lower,
            Layer::Upper => &self.upper,
        };
        if let Some(clip) = clips.get(&state) {
            return Some(*clip);
        }
        match state {
            AnimState::Jumping | AnimState::Falling => clips.get(&AnimState::Idle).map(|idle| {
                SpriteClip {
                    playback: Playback::Loop,
                    ..*idle
                }
            }),
            AnimState::Dead if layer == Layer::Lower => clips.get(&AnimState::Dying).copied(),
            _ => None,
        }
    }

    /// Attack clip for the given vertical aim (-1 up, 0 forward, +1 down).
    pub fn attack_clip(&self, aim: i8) -> Option<SpriteClip> {
        let aimed = match aim {
            a if a < 0 => self.upper_aim_up,
            a if a > 0 => self.upper_aim_down,
            _ => None,
        };
        aimed.or_else(|| self.clip(Layer::Upper, AnimState::Attacking))
    }
}

/// Top-level layout file: one [`SpriteLayout`] per actor class name.
#[derive(Debug, Clone)]
pub struct LayoutFile {
    pub version: String,
    pub layouts: HashMap<String, SpriteLayout>,
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct LayoutFileJson {
    version: String,
    layouts: HashMap<String, SpriteLayoutJson>,
}

#[derive(Debug, Deserialize)]
struct SpriteLayoutJson {
    frame_width: f32,
    frame_height: f32,
    frame_time: f32,
    hitbox: Hitbox,
    lower: HashMap<AnimState, ClipJson>,
    #[serde(default)]
    upper: HashMap<AnimState, ClipJson>,
    #[serde(default)]
    upper_aim_up: Option<ClipJson>,
    #[serde(default)]
    upper_aim_down: Option<ClipJson>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ClipJson {
    row: u32,
    frames: u32,
    #[serde(default)]
    hold_frame: Option<u32>,
}

impl ClipJson {
    fn into_clip(self, state: AnimState) -> SpriteClip {
        let playback = match (self.hold_frame, Playback::for_state(state, self.frames)) {
            (Some(frame), Playback::Hold(_)) => Playback::Hold(frame),
            (_, default) => default,
        };
        SpriteClip {
            row: self.row,
            frames: self.frames,
            playback,
        }
    }
}

fn convert_clips(clips: HashMap<AnimState, ClipJson>) -> HashMap<AnimState, SpriteClip> {
    clips
        .into_iter()
        .map(|(state, clip)| (state, clip.into_clip(state)))
        .collect()
}

/// Load a sprite layout file from disk.
pub fn load_layout_file(path: &Path) -> Result<LayoutFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read layout file {}: {e}", path.display()))?;
    let json: LayoutFileJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse layout file {}: {e}", path.display()))?;
    validate_layout_json(&json)?;

    let mut layouts = HashMap::new();
    for (name, layout) in json.layouts {
        log::debug!("Layout '{}' loaded from {}", name, path.display());
        layouts.insert(
            name,
            SpriteLayout {
                frame_size: Vec2::new(layout.frame_width, layout.frame_height),
                frame_time: layout.frame_time,
                hitbox: layout.hitbox,
                lower: convert_clips(layout.lower),
                upper: convert_clips(layout.upper),
                upper_aim_up: layout
                    .upper_aim_up
                    .map(|c| c.into_clip(AnimState::Attacking)),
                upper_aim_down: layout
                    .upper_aim_down
                    .map(|c| c.into_clip(AnimState::Attacking)),
            },
        );
    }

    Ok(LayoutFile {
        version: json.version,
        layouts,
    })
}

fn validate_layout_json(json: &LayoutFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Layout validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.layouts.is_empty() {
        return Err("Layout validation failed: layouts map is empty".to_string());
    }
    for (name, layout) in &json.layouts {
        if layout.frame_width <= 0.0 || layout.frame_height <= 0.0 {
            return Err(format!(
                "Layout validation failed: '{}' has a non-positive frame size",
                name
            ));
        }
        if layout.frame_time <= 0.0 {
            return Err(format!(
                "Layout validation failed: '{}' has a non-positive frame_time",
                name
            ));
        }
        if layout.hitbox.width <= 0.0 || layout.hitbox.rear < 0.0 {
            return Err(format!(
                "Layout validation failed: '{}' has an invalid hitbox",
                name
            ));
        }
        if !layout.lower.contains_key(&AnimState::Idle) {
            return Err(format!(
                "Layout validation failed: '{}' has no lower idle clip",
                name
            ));
        }
        let all_clips = layout
            .lower
            .values()
            .chain(layout.upper.values())
            .chain(layout.upper_aim_up.iter())
            .chain(layout.upper_aim_down.iter());
        for clip in all_clips {
            if clip.frames == 0 {
                return Err(format!(
                    "Layout validation failed: '{}' row {} has zero frames",
                    name, clip.row
                ));
            }
            if let Some(hold) = clip.hold_frame {
                if hold >= clip.frames {
                    return Err(format!(
                        "Layout validation failed: '{}' row {} holds frame {} past its {} frames",
                        name, clip.row, hold, clip.frames
                    ));
                }
            }
        }
    }
    Ok(())
}
