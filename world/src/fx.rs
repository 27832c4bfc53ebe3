//! Visual controllers owned by spell instances.
//!
//! Controllers only simulate; rendering reads them through
//! [`EffectSnapshot`]. Each controller is created with the lifetime its
//! instance asked for and reports back the duration it actually runs, which
//! the instance adopts as its time-to-live.

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{EffectSnapshot, TailEmission, UNBOUNDED_LIFETIME};

fn clamp_duration(duration: Duration) -> Duration {
    duration.min(UNBOUNDED_LIFETIME)
}

/// Archetype-specific controller state.
#[derive(Clone, Debug)]
pub(crate) enum Effect {
    Aura(AuraFx),
    Ring(RingFx),
    Fireball(FireballFx),
    Shards(ShardFx),
}

impl Effect {
    pub(crate) fn duration(&self) -> Duration {
        match self {
            Self::Aura(fx) => fx.duration,
            Self::Ring(fx) => fx.duration,
            Self::Fireball(fx) => fx.duration,
            Self::Shards(fx) => fx.duration,
        }
    }

    pub(crate) fn snapshot(&self) -> EffectSnapshot {
        match self {
            Self::Aura(fx) => EffectSnapshot {
                position: fx.position,
                velocity: Vec3::ZERO,
                elapsed: fx.elapsed,
                duration: fx.duration,
                radius: 0.0,
                detonated: false,
                emitting: true,
                emission: None,
            },
            Self::Ring(fx) => EffectSnapshot {
                position: fx.center,
                velocity: Vec3::ZERO,
                elapsed: fx.elapsed,
                duration: fx.duration,
                radius: fx.radius(),
                detonated: false,
                emitting: true,
                emission: None,
            },
            Self::Fireball(fx) => EffectSnapshot {
                position: fx.position,
                velocity: fx.velocity,
                elapsed: fx.elapsed,
                duration: fx.duration,
                radius: 0.0,
                detonated: fx.detonated,
                emitting: fx.emitting,
                emission: fx.emission,
            },
            Self::Shards(fx) => EffectSnapshot {
                position: fx.position,
                velocity: fx.velocity,
                elapsed: fx.elapsed,
                duration: fx.duration,
                radius: 0.0,
                detonated: false,
                emitting: true,
                emission: None,
            },
        }
    }
}

/// Glow that follows an anchor, used by buffs and conjurations.
#[derive(Clone, Debug)]
pub(crate) struct AuraFx {
    position: Vec3,
    elapsed: Duration,
    duration: Duration,
}

impl AuraFx {
    pub(crate) fn new(position: Vec3, duration: Duration) -> Self {
        Self {
            position,
            elapsed: Duration::ZERO,
            duration: clamp_duration(duration),
        }
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    /// Advances the glow; a missing anchor leaves it where it was.
    pub(crate) fn advance(&mut self, dt: Duration, anchor: Option<Vec3>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        if let Some(anchor) = anchor {
            self.position = anchor;
        }
    }
}

/// Expanding ring centered on the caster.
#[derive(Clone, Debug)]
pub(crate) struct RingFx {
    center: Vec3,
    max_radius: f32,
    elapsed: Duration,
    duration: Duration,
}

impl RingFx {
    pub(crate) fn new(center: Vec3, max_radius: f32, duration: Duration) -> Self {
        Self {
            center,
            max_radius,
            elapsed: Duration::ZERO,
            duration: clamp_duration(duration),
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn radius(&self) -> f32 {
        if self.duration.is_zero() {
            return self.max_radius;
        }
        let progress = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.max_radius * progress.min(1.0)
    }
}

/// Travelling fireball with its particle trail.
#[derive(Clone, Debug)]
pub(crate) struct FireballFx {
    position: Vec3,
    velocity: Vec3,
    elapsed: Duration,
    duration: Duration,
    detonated: bool,
    emitting: bool,
    emission: Option<TailEmission>,
}

impl FireballFx {
    pub(crate) fn new(position: Vec3, velocity: Vec3, duration: Duration) -> Self {
        Self {
            position,
            velocity,
            elapsed: Duration::ZERO,
            duration: clamp_duration(duration),
            detonated: false,
            emitting: true,
            emission: None,
        }
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn detonated(&self) -> bool {
        self.detonated
    }

    pub(crate) fn emitting(&self) -> bool {
        self.emitting
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.position += self.velocity * dt.as_secs_f32();
    }

    pub(crate) fn set_emission(&mut self, emission: Option<TailEmission>) {
        self.emission = emission;
    }

    /// Switches to the exploded state, keeping at most `fade` of remaining
    /// runtime.
    ///
    /// Returns `false` if the fireball had already detonated.
    pub(crate) fn detonate(&mut self, fade: Duration) -> bool {
        if self.detonated {
            return false;
        }
        self.detonated = true;
        self.emitting = false;
        self.emission = None;
        self.velocity *= 0.5;
        self.duration = self.duration.min(self.elapsed.saturating_add(fade));
        true
    }
}

/// Straight-line ice shards.
#[derive(Clone, Debug)]
pub(crate) struct ShardFx {
    position: Vec3,
    velocity: Vec3,
    elapsed: Duration,
    duration: Duration,
}

impl ShardFx {
    pub(crate) fn new(origin: Vec3, velocity: Vec3, duration: Duration) -> Self {
        Self {
            position: origin,
            velocity,
            elapsed: Duration::ZERO,
            duration: clamp_duration(duration),
        }
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.position += self.velocity * dt.as_secs_f32();
    }
}
