//! Scripted input playback for determinism tests.
//!
//! A replay is a seed, a tick length and a list of steps, each holding a set
//! of actions for some number of ticks. Press and release edges fall out of
//! the changes between consecutive ticks, exactly as live input would
//! produce them.

use neon_core::input::{Action, InputState};
use serde::Deserialize;
use std::path::Path;

use crate::config::GameConfig;
use crate::layout::LayoutRegistry;
use crate::player::PlayerIntent;
use crate::session::Session;

/// Longest tick a replay may ask for, in seconds.
const MAX_REPLAY_DT: f32 = 0.1;

#[derive(Debug, Clone, Deserialize)]
pub struct Replay {
    #[serde(default = "replay_tick")]
    pub dt: f32,
    #[serde(default)]
    pub seed: u64,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayStep {
    #[serde(default)]
    pub hold: Vec<Action>,
    #[serde(default = "one_tick")]
    pub ticks: u32,
}

fn replay_tick() -> f32 {
    1.0 / 60.0
}

fn one_tick() -> u32 {
    1
}

impl Replay {
    pub fn tick_count(&self) -> usize {
        self.steps.iter().map(|s| s.ticks as usize).sum()
    }

    /// Per-tick intents with edges derived from held-set changes.
    pub fn intents(&self) -> Vec<PlayerIntent> {
        let mut input = InputState::new();
        let mut intents = Vec::with_capacity(self.tick_count());
        for step in &self.steps {
            for _ in 0..step.ticks {
                input.set_held(&step.hold);
                intents.push(PlayerIntent::from_input(&input));
                input.end_frame();
            }
        }
        intents
    }

    /// Fresh session seeded from the replay, stepped through every tick.
    pub fn play(&self, config: GameConfig, layouts: LayoutRegistry) -> Session {
        let mut session = Session::new(config, layouts, self.seed);
        for intent in self.intents() {
            session.step(self.dt, &intent);
        }
        session
    }
}

pub fn load_replay(path: &Path) -> Result<Replay, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read replay {}: {e}", path.display()))?;
    let replay: Replay = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    check_replay(&replay)?;
    log::debug!(
        "Replay {} loaded: {} ticks, seed {}",
        path.display(),
        replay.tick_count(),
        replay.seed
    );
    Ok(replay)
}

fn check_replay(replay: &Replay) -> Result<(), String> {
    if !(replay.dt > 0.0 && replay.dt <= MAX_REPLAY_DT) {
        return Err(format!(
            "Replay validation failed: dt {} outside (0, {}]",
            replay.dt, MAX_REPLAY_DT
        ));
    }
    if replay.steps.is_empty() {
        return Err("Replay validation failed: no steps".to_string());
    }
    if let Some(index) = replay.steps.iter().position(|s| s.ticks == 0) {
        return Err(format!(
            "Replay validation failed: step {index} lasts zero ticks"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_replay(tag: &str, json: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "neon_replay_{tag}_{}_{stamp}.json",
            std::process::id()
        ));
        std::fs::write(&path, json).expect("write scratch replay");
        path
    }

    fn shipped_replay() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/replays/run_and_gun.json")
    }

    #[test]
    fn fire_is_an_edge_across_held_ticks() {
        let path = scratch_replay(
            "edges",
            r#"{ "steps": [
                { "hold": ["right"], "ticks": 3 },
                { "hold": ["right", "fire"], "ticks": 2 }
            ] }"#,
        );
        let replay = load_replay(&path).expect("replay loads");
        let _ = std::fs::remove_file(&path);

        let intents = replay.intents();
        assert_eq!(intents.len(), replay.tick_count());
        assert_eq!(intents.len(), 5);
        assert!(intents.iter().all(|i| i.move_x == 1));
        assert_eq!(
            intents.iter().map(|i| i.fire).collect::<Vec<_>>(),
            vec![false, false, false, true, false]
        );
    }

    #[test]
    fn malformed_replays_are_rejected() {
        let cases = [
            ("nosteps", r#"{ "steps": [] }"#, "no steps"),
            ("zeroticks", r#"{ "steps": [{ "hold": [], "ticks": 0 }] }"#, "step 0 lasts zero ticks"),
            ("slowtick", r#"{ "dt": 0.5, "steps": [{ "hold": [] }] }"#, "outside"),
        ];
        for (tag, json, needle) in cases {
            let path = scratch_replay(tag, json);
            let err = load_replay(&path).expect_err("replay should be rejected");
            let _ = std::fs::remove_file(&path);
            assert!(err.contains(needle), "{tag}: {err}");
        }

        let missing = std::env::temp_dir().join("neon_replay_does_not_exist.json");
        let err = load_replay(&missing).expect_err("missing file");
        assert!(err.starts_with("Failed to read replay"));
    }

    #[test]
    fn same_seed_and_inputs_give_same_game() {
        let path = scratch_replay(
            "determinism",
            r#"{ "seed": 42, "steps": [
                { "hold": ["right"], "ticks": 240 },
                { "hold": ["right", "jump"], "ticks": 10 },
                { "hold": ["right", "fire"] },
                { "hold": ["right"], "ticks": 30 },
                { "hold": ["right", "throw"] },
                { "hold": ["right", "up"], "ticks": 120 },
                { "hold": ["right", "up", "fire"] },
                { "hold": ["left"], "ticks": 60 },
                { "hold": ["right"], "ticks": 900 }
            ] }"#,
        );
        let replay = load_replay(&path).expect("replay loads");
        let _ = std::fs::remove_file(&path);

        let mut a = replay.play(GameConfig::default(), LayoutRegistry::builtin());
        let mut b = replay.play(GameConfig::default(), LayoutRegistry::builtin());

        assert_eq!(a.summary(), b.summary());
        let (pa, pb) = (&a.world.player.entity, &b.world.player.entity);
        assert_eq!((pa.position, pa.velocity, pa.lower), (pb.position, pb.velocity, pb.lower));

        let enemies = |s: &Session| {
            s.world
                .enemies
                .iter_active()
                .map(|(i, e)| (i, e.entity.position, e.entity.hp))
                .collect::<Vec<_>>()
        };
        assert_eq!(enemies(&a), enemies(&b));

        let cues_a: Vec<_> = a.world.audio.drain().collect();
        let cues_b: Vec<_> = b.world.audio.drain().collect();
        assert_eq!(cues_a, cues_b);
    }

    #[test]
    fn shipped_replay_is_reproducible() {
        let replay = load_replay(&shipped_replay()).expect("shipped replay loads");
        assert_eq!(replay.seed, 7);
        let first = replay.play(GameConfig::default(), LayoutRegistry::builtin());
        let second = replay.play(GameConfig::default(), LayoutRegistry::builtin());
        assert!(first.frame > 0);
        assert!(first.frame as usize <= replay.tick_count());
        assert_eq!(first.summary(), second.summary());
    }
}
