//! Headless runner.
//!
//! `neon_game [frames] [seed] [config.json]`
//!
//! Loads tuning and sprite layouts from `assets/` (falling back to built-in
//! defaults), then plays a session with a scripted autopilot. The host side
//! is simulated: a synthetic display clock feeds the fixed-timestep
//! [`FrameClock`], input edges are cleared once a simulation step used
//! them, and audio cues are drained and counted every rendered frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use neon_core::animation::load_layout_file;
use neon_core::input::{Action, InputState};
use neon_core::time::FrameClock;
use neon_game::config::{load_config_from_path, GameConfig};
use neon_game::fx::SoundFx;
use neon_game::layout::LayoutRegistry;
use neon_game::player::PlayerIntent;
use neon_game::session::{Phase, Session, SessionSummary};

const CONFIG_PATH: &str = "assets/config/neon.json";
const LAYOUT_PATH: &str = "assets/layouts/actors.json";
const DEFAULT_FRAMES: u64 = 60 * 60;
const DEFAULT_SEED: u64 = 1;
/// Simulated display refresh; not a multiple of the tick rate on purpose so
/// some rendered frames run zero steps and some run two.
const DISPLAY_DT: f32 = 1.0 / 144.0;
/// Distance at which the autopilot opens fire on an enemy ahead.
const FIRE_RANGE: f32 = 900.0;

struct Args {
    frames: u64,
    seed: u64,
    config_path: PathBuf,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let frames = match args.next() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid frame count '{}', using {}", raw, DEFAULT_FRAMES);
            DEFAULT_FRAMES
        }),
        None => DEFAULT_FRAMES,
    };
    let seed = match args.next() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid seed '{}', using {}", raw, DEFAULT_SEED);
            DEFAULT_SEED
        }),
        None => DEFAULT_SEED,
    };
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    Args {
        frames,
        seed,
        config_path,
    }
}

fn load_config(path: &Path) -> GameConfig {
    if !path.exists() {
        log::warn!(
            "Config '{}' was not found, using built-in defaults",
            path.display()
        );
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{}; using built-in defaults", err);
            GameConfig::default()
        }
    }
}

fn load_layouts(path: &Path) -> LayoutRegistry {
    if !path.exists() {
        log::warn!(
            "Layout file '{}' was not found, using built-in layouts",
            path.display()
        );
        return LayoutRegistry::builtin();
    }
    match load_layout_file(path) {
        Ok(file) => {
            log::info!(
                "Loaded {} layout overrides from '{}'",
                file.layouts.len(),
                path.display()
            );
            LayoutRegistry::with_overrides(file)
        }
        Err(err) => {
            log::error!("{}; using built-in layouts", err);
            LayoutRegistry::builtin()
        }
    }
}

/// Scripted player: run right, hop now and then, shoot enemies ahead, lob a
/// grenade at regular intervals.
fn autopilot(session: &Session) -> Vec<Action> {
    let world = &session.world;
    let player = &world.player.entity;
    let frame = session.frame;
    let mut held = vec![Action::Right];

    if frame % 150 == 140 {
        held.push(Action::Jump);
    }

    let facing = player.facing;
    let enemy_ahead = world.enemies.iter_active().any(|(_, e)| {
        let dx = (e.entity.position.x - player.position.x) * facing;
        !e.entity.is_dying() && dx > 0.0 && dx < FIRE_RANGE
    });
    if enemy_ahead && frame % 12 < 6 {
        held.push(Action::Fire);
    }
    if frame % 420 == 0 && frame > 0 {
        held.push(Action::Throw);
    }
    held
}

/// Run every fixed step owed for one rendered frame of `display_dt`.
///
/// Press edges belong to the first step that sees them; later steps in the
/// same frame only see held actions. A frame with no step keeps its edges
/// for the next one.
fn run_frame(
    clock: &mut FrameClock,
    input: &mut InputState,
    session: &mut Session,
    display_dt: f32,
) -> u32 {
    clock.feed(display_dt);
    while clock.should_step() {
        let intent = PlayerIntent::from_input(input);
        session.step(clock.fixed_dt, &intent);
        input.end_frame();
    }
    clock.end_frame();
    clock.steps_this_frame
}

fn log_summary(s: &SessionSummary) {
    log::info!(
        "t={:.0}s frame={} {:?} pts={} hp={} ammo={}/{} x={:.0} cam={:.0} diff={} enemies={} props={} bullets={} particles={}",
        s.elapsed,
        s.frame,
        s.phase,
        s.points,
        s.hp,
        s.magnum_ammo,
        s.grenade_ammo,
        s.player_x,
        s.camera_x,
        s.difficulty,
        s.enemies,
        s.props,
        s.bullets,
        s.particles
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config = load_config(&args.config_path);
    let layouts = load_layouts(Path::new(LAYOUT_PATH));
    let ticks_per_second = (1.0 / config.fixed_dt).round().max(1.0) as u64;

    let mut clock = FrameClock::new(config.fixed_dt);
    let mut input = InputState::new();
    let mut session = Session::new(config, layouts, args.seed);
    let mut sounds: HashMap<SoundFx, u64> = HashMap::new();

    log::info!(
        "Running {} frames with seed {} ({} ticks/s)",
        args.frames,
        args.seed,
        ticks_per_second
    );

    while session.frame < args.frames && session.phase != Phase::GameOver {
        input.set_held(&autopilot(&session));
        let before = session.frame;
        run_frame(&mut clock, &mut input, &mut session, DISPLAY_DT);
        if (before + 1..=session.frame).any(|f| f % ticks_per_second == 0) {
            log_summary(&session.summary());
        }

        for fx in session.world.audio.drain() {
            *sounds.entry(fx).or_insert(0) += 1;
        }
    }

    let summary = session.summary();
    log::info!("Final report after {} rendered frames", clock.frame_count);
    log_summary(&summary);
    let mut counts: Vec<(SoundFx, u64)> = sounds.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (fx, count) in counts {
        log::info!("  {:?}: {}", fx, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_game::player::DEBUG_HURT_DAMAGE;

    fn setup() -> (FrameClock, InputState, Session) {
        let config = GameConfig::default();
        let clock = FrameClock::new(config.fixed_dt);
        let session = Session::new(config, LayoutRegistry::builtin(), 5);
        (clock, InputState::new(), session)
    }

    /// Two and a half ticks of display time: two steps now, the rest carried.
    const SLOW_FRAME: f32 = 2.5 / 60.0;

    #[test]
    fn pause_press_toggles_once_on_a_two_step_frame() {
        let (mut clock, mut input, mut session) = setup();
        input.press(Action::Pause);
        assert_eq!(
            run_frame(&mut clock, &mut input, &mut session, SLOW_FRAME),
            2
        );
        assert_eq!(session.phase, Phase::Paused);

        input.release(Action::Pause);
        run_frame(&mut clock, &mut input, &mut session, SLOW_FRAME);
        assert_eq!(session.phase, Phase::Paused);
    }

    #[test]
    fn debug_hurt_applies_once_per_press() {
        let (mut clock, mut input, mut session) = setup();
        let max_hp = session.world.player.entity.max_hp;
        input.press(Action::DebugHurt);
        assert_eq!(
            run_frame(&mut clock, &mut input, &mut session, SLOW_FRAME),
            2
        );
        assert_eq!(session.world.player.entity.hp, max_hp - DEBUG_HURT_DAMAGE);
        assert_eq!(session.frame, 2);
    }

    #[test]
    fn press_survives_a_frame_without_steps() {
        let (mut clock, mut input, mut session) = setup();
        input.press(Action::Pause);
        assert_eq!(
            run_frame(&mut clock, &mut input, &mut session, 0.25 / 60.0),
            0
        );
        assert_eq!(session.phase, Phase::Active);
        run_frame(&mut clock, &mut input, &mut session, 1.0 / 60.0);
        assert_eq!(session.phase, Phase::Paused);
    }
}
