//! Action-level input tracking with held and edge-triggered queries.
//!
//! - **Held:** `is_held(action)` is true every frame the action is down. Used for
//!   movement, aiming and jumping.
//! - **Edge-triggered:** `is_just_pressed` / `is_just_released` are true only in
//!   the frame the transition happened and are cleared by `end_frame()`. The
//!   host calls `end_frame()` only after a simulation step consumed them, so a
//!   press on a frame with zero fixed steps is not lost.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Fire,
    Throw,
    Pause,
    DebugHurt,
    DebugKill,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Make the held set exactly `actions`, generating press/release edges
    /// for whatever changed.
    pub fn set_held(&mut self, actions: &[Action]) {
        let released: Vec<Action> = self
            .held
            .iter()
            .copied()
            .filter(|a| !actions.contains(a))
            .collect();
        for action in released {
            self.release(action);
        }
        for &action in actions {
            self.press(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.press(Action::Fire);
        assert!(input.is_held(Action::Fire));
        assert!(input.is_just_pressed(Action::Fire));
    }

    #[test]
    fn test_repeat_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.press(Action::Jump);
        input.end_frame();
        input.press(Action::Jump);
        assert!(input.is_held(Action::Jump));
        assert!(!input.is_just_pressed(Action::Jump));
    }

    #[test]
    fn test_release_without_press_is_no_op() {
        let mut input = InputState::new();
        input.release(Action::Left);
        assert!(!input.is_just_released(Action::Left));
        assert!(!input.is_held(Action::Left));
    }

    #[test]
    fn test_end_frame_clears_edges_only() {
        let mut input = InputState::new();
        input.press(Action::Right);
        input.press(Action::Throw);
        input.release(Action::Throw);
        input.end_frame();
        assert!(input.is_held(Action::Right));
        assert!(!input.is_just_pressed(Action::Right));
        assert!(!input.is_just_released(Action::Throw));
    }

    #[test]
    fn test_set_held_generates_edges() {
        let mut input = InputState::new();
        input.set_held(&[Action::Right, Action::Fire]);
        input.end_frame();

        input.set_held(&[Action::Right, Action::Up]);
        assert!(input.is_held(Action::Right));
        assert!(!input.is_just_pressed(Action::Right));
        assert!(input.is_just_pressed(Action::Up));
        assert!(input.is_just_released(Action::Fire));
        assert!(!input.is_held(Action::Fire));
    }
}
