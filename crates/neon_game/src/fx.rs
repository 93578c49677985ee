//! Feedback pools: particles, floating score messages, and the audio cue
//! queue drained by the host's sound player.

use glam::Vec2;

use neon_core::animation::{AnimationLayer, Playback, SpriteClip};

use crate::pool::{Pool, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundFx {
    Magnum,
    Sword,
    Selected,
    EntityLanding,
    GrenadeLaunch,
    GrenadeBouncing,
    GrenadeExplosion,
    Hurt,
    Dying,
}

/// Cues held before new ones are dropped.
pub const MAX_PENDING_CUES: usize = 512;

/// One-shot sound triggers collected during a frame.
///
/// The host is expected to [`drain`](AudioCues::drain) the queue once per
/// rendered frame. A session stepped without draining stops queueing once
/// [`MAX_PENDING_CUES`] are pending; later cues are discarded.
#[derive(Debug, Clone, Default)]
pub struct AudioCues {
    queue: Vec<SoundFx>,
}

impl AudioCues {
    pub fn push(&mut self, fx: SoundFx) {
        if self.queue.len() >= MAX_PENDING_CUES {
            log::trace!("Audio queue full, {:?} dropped", fx);
            return;
        }
        self.queue.push(fx);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, SoundFx> {
        self.queue.drain(..)
    }

    pub fn pending(&self) -> &[SoundFx] {
        &self.queue
    }

    pub fn count(&self, fx: SoundFx) -> usize {
        self.queue.iter().filter(|&&queued| queued == fx).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    #[default]
    Explosion,
    Smoke,
    BloodSpill,
    MagnumShoot,
}

impl ParticleKind {
    /// (atlas row, frame count, frame size, seconds per frame)
    fn sheet(self) -> (u32, u32, f32, f32) {
        match self {
            ParticleKind::Explosion => (0, 8, 256.0, 0.06),
            ParticleKind::Smoke => (1, 6, 128.0, 0.1),
            ParticleKind::BloodSpill => (2, 6, 96.0, 0.05),
            ParticleKind::MagnumShoot => (3, 4, 64.0, 0.03),
        }
    }
}

/// Parameters for [`spawn_particle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub lifetime: f32,
    pub angular_velocity: f32,
    /// Scale oscillates between `x` and `y`.
    pub scale_range: Vec2,
    pub looping: bool,
    pub facing: f32,
}

impl ParticleSpec {
    pub fn new(kind: ParticleKind, position: Vec2, lifetime: f32) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            lifetime,
            angular_velocity: 0.0,
            scale_range: Vec2::ONE,
            looping: false,
            facing: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub scale_range: Vec2,
    pub scale: f32,
    pub scale_up: bool,
    pub looping: bool,
    pub facing: f32,
    pub row: u32,
    pub frames: u32,
    pub anim: AnimationLayer,
    pub lifetime: f32,
    pub active: bool,
}

impl Slot for Particle {
    fn is_active(&self) -> bool {
        self.active
    }
}

const SCALE_RATE: f32 = 1.5;

pub fn spawn_particle(pool: &mut Pool<Particle>, spec: ParticleSpec) -> Option<usize> {
    let (row, frames, size, frame_time) = spec.kind.sheet();
    let mut anim = AnimationLayer::new(Vec2::splat(size), frame_time);
    anim.update_source(Some(row), spec.facing);
    let slot = pool.spawn(Particle {
        kind: spec.kind,
        position: spec.position,
        velocity: spec.velocity,
        angle: 0.0,
        angular_velocity: spec.angular_velocity,
        scale_range: spec.scale_range,
        scale: spec.scale_range.x,
        scale_up: true,
        looping: spec.looping,
        facing: spec.facing,
        row,
        frames,
        anim,
        lifetime: spec.lifetime,
        active: true,
    });
    if slot.is_none() {
        log::trace!("Particle pool full, {:?} dropped", spec.kind);
    }
    slot
}

/// Move, spin, pulse and animate particles; retire expired ones and those
/// more than `cull_margin` behind `min_x`.
pub fn update_particles(pool: &mut Pool<Particle>, dt: f32, min_x: f32, cull_margin: f32) {
    for (_, p) in pool.iter_active_mut() {
        p.lifetime -= dt;
        if p.lifetime <= 0.0 || p.position.x < min_x - cull_margin {
            p.active = false;
            continue;
        }

        p.position += p.velocity * dt;
        p.angle += p.angular_velocity * dt;

        let (low, high) = (p.scale_range.x, p.scale_range.y);
        if high > low {
            if p.scale_up {
                p.scale += SCALE_RATE * dt;
                if p.scale >= high {
                    p.scale = high;
                    p.scale_up = false;
                }
            } else {
                p.scale -= SCALE_RATE * dt;
                if p.scale <= low {
                    p.scale = low;
                    p.scale_up = true;
                }
            }
        }

        let clip = SpriteClip {
            row: p.row,
            frames: p.frames,
            playback: if p.looping {
                Playback::Loop
            } else {
                Playback::Hold(p.frames.saturating_sub(1))
            },
        };
        p.anim.advance(dt, &clip);
        p.anim.update_source(Some(p.row), p.facing);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageTint {
    #[default]
    White,
    Green,
    Gold,
    Red,
}

impl MessageTint {
    pub fn for_value(value: i32) -> Self {
        match value {
            v if v < 0 => MessageTint::Red,
            v if v < 100 => MessageTint::White,
            v if v < 500 => MessageTint::Green,
            _ => MessageTint::Gold,
        }
    }
}

/// Floating number shown where points or resources were gained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Message {
    pub value: i32,
    pub position: Vec2,
    pub tint: MessageTint,
    pub lifetime: f32,
    pub active: bool,
}

impl Slot for Message {
    fn is_active(&self) -> bool {
        self.active
    }
}

/// Rise speed of floating messages, px/s.
pub const MESSAGE_RISE: f32 = 40.0;

pub fn spawn_message(
    pool: &mut Pool<Message>,
    position: Vec2,
    value: i32,
    lifetime: f32,
) -> Option<usize> {
    let slot = pool.spawn(Message {
        value,
        position,
        tint: MessageTint::for_value(value),
        lifetime,
        active: true,
    });
    if slot.is_none() {
        log::trace!("Message pool full, {} not shown", value);
    }
    slot
}

pub fn update_messages(pool: &mut Pool<Message>, dt: f32) {
    for (_, msg) in pool.iter_active_mut() {
        msg.lifetime -= dt;
        if msg.lifetime <= 0.0 {
            msg.active = false;
            continue;
        }
        msg.position.y -= MESSAGE_RISE * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn audio_queue_drains_in_order() {
        let mut cues = AudioCues::default();
        cues.push(SoundFx::Sword);
        cues.push(SoundFx::Hurt);
        cues.push(SoundFx::Hurt);
        assert_eq!(cues.count(SoundFx::Hurt), 2);
        let drained: Vec<SoundFx> = cues.drain().collect();
        assert_eq!(drained, vec![SoundFx::Sword, SoundFx::Hurt, SoundFx::Hurt]);
        assert!(cues.pending().is_empty());
    }

    #[test]
    fn undrained_queue_stops_at_cap() {
        let mut cues = AudioCues::default();
        for _ in 0..MAX_PENDING_CUES {
            cues.push(SoundFx::EntityLanding);
        }
        cues.push(SoundFx::Dying);
        assert_eq!(cues.pending().len(), MAX_PENDING_CUES);
        assert_eq!(cues.count(SoundFx::Dying), 0);

        assert_eq!(cues.drain().count(), MAX_PENDING_CUES);
        cues.push(SoundFx::Dying);
        assert_eq!(cues.pending(), &[SoundFx::Dying]);
    }

    #[test]
    fn session_stepped_without_draining_stays_bounded() {
        use crate::config::GameConfig;
        use crate::layout::LayoutRegistry;
        use crate::player::PlayerIntent;
        use crate::session::Session;

        let mut session = Session::new(GameConfig::default(), LayoutRegistry::builtin(), 3);
        // Pause toggles cue a sound every tick.
        let toggle = PlayerIntent {
            pause: true,
            ..PlayerIntent::default()
        };
        for _ in 0..MAX_PENDING_CUES * 2 {
            session.step(DT, &toggle);
        }
        assert_eq!(session.world.audio.pending().len(), MAX_PENDING_CUES);
    }

    #[test]
    fn particle_expires_after_lifetime() {
        let mut pool = Pool::<Particle>::new(4);
        spawn_particle(&mut pool, ParticleSpec::new(ParticleKind::Smoke, Vec2::ZERO, 0.5));
        for _ in 0..29 {
            update_particles(&mut pool, DT, 0.0, 1920.0);
        }
        assert_eq!(pool.active_count(), 1);
        for _ in 0..2 {
            update_particles(&mut pool, DT, 0.0, 1920.0);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn particle_behind_camera_is_culled() {
        let mut pool = Pool::<Particle>::new(4);
        spawn_particle(&mut pool, ParticleSpec::new(ParticleKind::Smoke, Vec2::new(100.0, 0.0), 10.0));
        update_particles(&mut pool, DT, 3000.0, 1920.0);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn non_looping_particle_holds_last_frame() {
        let mut pool = Pool::<Particle>::new(1);
        let idx = spawn_particle(
            &mut pool,
            ParticleSpec::new(ParticleKind::MagnumShoot, Vec2::ZERO, 5.0),
        )
        .expect("slot");
        for _ in 0..120 {
            update_particles(&mut pool, DT, 0.0, 1920.0);
        }
        assert_eq!(pool.get(idx).map(|p| p.anim.frame), Some(3));
    }

    #[test]
    fn scale_stays_within_range() {
        let mut pool = Pool::<Particle>::new(1);
        let mut spec = ParticleSpec::new(ParticleKind::Explosion, Vec2::ZERO, 10.0);
        spec.scale_range = Vec2::new(0.5, 1.2);
        spec.angular_velocity = 3.0;
        let idx = spawn_particle(&mut pool, spec).expect("slot");
        for _ in 0..300 {
            update_particles(&mut pool, DT, 0.0, 1920.0);
            let p = pool.get(idx).copied().expect("slot");
            assert!(p.scale >= 0.5 && p.scale <= 1.2);
        }
        assert!(pool.get(idx).map(|p| p.angle).unwrap_or(0.0) > 14.0);
    }

    #[test]
    fn messages_rise_and_fade() {
        let mut pool = Pool::<Message>::new(2);
        spawn_message(&mut pool, Vec2::new(0.0, 500.0), 150, 1.0);
        update_messages(&mut pool, 0.5);
        let msg = pool.get(0).copied().expect("slot");
        assert_eq!(msg.position.y, 480.0);
        assert_eq!(msg.tint, MessageTint::Green);
        update_messages(&mut pool, 0.6);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn tint_follows_value() {
        assert_eq!(MessageTint::for_value(-5), MessageTint::Red);
        assert_eq!(MessageTint::for_value(10), MessageTint::White);
        assert_eq!(MessageTint::for_value(5000), MessageTint::Gold);
    }
}
