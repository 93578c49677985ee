//! Neon side-scroller simulation.
//!
//! The crate is headless: it owns every gameplay pool and advances them one
//! fixed tick at a time through [`session::Session::step`]. Drawing, windowing
//! and sound playback belong to the host, which reads source rectangles off
//! the animation layers and drains [`fx::AudioCues`] each frame.

pub mod ai;
pub mod chunk;
pub mod collision;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod entity;
pub mod fx;
pub mod layout;
pub mod player;
pub mod pool;
pub mod props;
#[cfg(test)]
mod replay;
pub mod scenery;
pub mod session;
pub mod world;
