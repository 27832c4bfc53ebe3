//! Numeric knobs for the built-in archetypes.
//!
//! Every struct deserializes with `#[serde(default)]`, so a configuration file
//! only needs to name the values it overrides. Durations are stored in
//! milliseconds to keep the TOML readable.

use std::time::Duration;

use serde::Deserialize;

use crate::UNBOUNDED_LIFETIME;

const DEFAULT_WARMUP_SPAWN_CHANCE: f64 = 0.9;

/// Tuning for every archetype.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpellTuning {
    /// Speed buff.
    pub speed: SpeedTuning,
    /// Dispel illusion.
    pub dispel: DispelTuning,
    /// Fireball.
    pub fireball: FireballTuning,
    /// Create food.
    pub create_food: CreateFoodTuning,
    /// Ice projectile.
    pub ice_projectile: IceProjectileTuning,
    /// Invisibility.
    pub invisibility: InvisibilityTuning,
}

/// Speed buff tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedTuning {
    /// Default lifetime when the player casts on themselves.
    pub self_duration_ms: u64,
    /// Default lifetime for any other caster, effectively unbounded.
    pub other_duration_ms: u64,
    /// Mana drained from the caster each second.
    pub mana_per_second: f32,
}

impl SpeedTuning {
    /// Default lifetime when the player casts on themselves.
    #[must_use]
    pub fn self_duration(&self) -> Duration {
        Duration::from_millis(self.self_duration_ms)
    }

    /// Default lifetime for any other caster.
    #[must_use]
    pub fn other_duration(&self) -> Duration {
        Duration::from_millis(self.other_duration_ms)
    }
}

impl Default for SpeedTuning {
    fn default() -> Self {
        Self {
            self_duration_ms: 20_000,
            other_duration_ms: UNBOUNDED_LIFETIME.as_millis() as u64,
            mana_per_second: 2.0,
        }
    }
}

/// Dispel illusion tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DispelTuning {
    /// Lifetime of the dispel's own visual.
    pub duration_ms: u64,
    /// Victims must be strictly closer than this to the caster.
    pub radius: f32,
}

impl DispelTuning {
    /// Lifetime of the dispel's own visual.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for DispelTuning {
    fn default() -> Self {
        Self {
            duration_ms: 1_000,
            radius: 1_000.0,
        }
    }
}

/// Fireball tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FireballTuning {
    /// Flight time before the projectile fizzles.
    pub duration_ms: u64,
    /// Time over which the trail ramps up to full density.
    pub warmup_ms: u64,
    /// Upper bound on the lifetime left after detonation.
    pub fade_ms: u64,
    /// Time a detached light lingers after the slot is killed.
    pub light_fade_ms: u64,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Distance the projectile spawns ahead of the launch point.
    pub spawn_offset: f32,
    /// Lower bound of the proximity sphere radius.
    pub min_query_radius: f32,
    /// Proximity sphere radius gained per caster level.
    pub query_radius_per_level: f32,
    /// Full-damage radius gained per caster level.
    pub inner_radius_per_level: f32,
    /// Falloff radius gained per caster level.
    pub outer_radius_per_level: f32,
    /// Probability that a trail puff spawns during warm-up.
    pub warmup_spawn_chance: f64,
    /// Intensity of the travelling light.
    pub light_intensity: f32,
    /// Distance at which the light starts to fall off.
    pub light_fall_start: f32,
    /// Distance at which the light reaches zero.
    pub light_fall_end: f32,
}

impl FireballTuning {
    /// Flight time before the projectile fizzles.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Time over which the trail ramps up to full density.
    #[must_use]
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    /// Upper bound on the lifetime left after detonation.
    #[must_use]
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    /// Time a detached light lingers after the slot is killed.
    #[must_use]
    pub fn light_fade(&self) -> Duration {
        Duration::from_millis(self.light_fade_ms)
    }

    /// Warm-up spawn probability in `0.0..=1.0`.
    ///
    /// A non-finite configured value falls back to the default chance.
    #[must_use]
    pub fn spawn_chance(&self) -> f64 {
        if self.warmup_spawn_chance.is_finite() {
            self.warmup_spawn_chance.clamp(0.0, 1.0)
        } else {
            DEFAULT_WARMUP_SPAWN_CHANCE
        }
    }
}

impl Default for FireballTuning {
    fn default() -> Self {
        Self {
            duration_ms: 6_000,
            warmup_ms: 2_000,
            fade_ms: 1_500,
            light_fade_ms: 500,
            speed: 1_000.0,
            spawn_offset: 60.0,
            min_query_radius: 12.0,
            query_radius_per_level: 2.0,
            inner_radius_per_level: 3.0,
            outer_radius_per_level: 30.0,
            warmup_spawn_chance: DEFAULT_WARMUP_SPAWN_CHANCE,
            light_intensity: 2.2,
            light_fall_start: 400.0,
            light_fall_end: 500.0,
        }
    }
}

/// Create food tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreateFoodTuning {
    /// Default lifetime of the visual.
    pub duration_ms: u64,
}

impl CreateFoodTuning {
    /// Default lifetime of the visual.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for CreateFoodTuning {
    fn default() -> Self {
        Self { duration_ms: 3_500 }
    }
}

/// Ice projectile tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct IceProjectileTuning {
    /// Lifetime of the projectile.
    pub duration_ms: u64,
    /// Distance ahead of the caster where the projectile starts.
    pub forward_offset: f32,
    /// Offset from the player's eye to the ground along +y.
    pub player_ground_offset: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
}

impl IceProjectileTuning {
    /// Lifetime of the projectile.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for IceProjectileTuning {
    fn default() -> Self {
        Self {
            duration_ms: 4_200,
            forward_offset: 150.0,
            player_ground_offset: 160.0,
            speed: 400.0,
        }
    }
}

/// Invisibility tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InvisibilityTuning {
    /// Default lifetime.
    pub duration_ms: u64,
    /// Mana drained from the caster each second.
    pub mana_per_second: f32,
}

impl InvisibilityTuning {
    /// Default lifetime.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for InvisibilityTuning {
    fn default() -> Self {
        Self {
            duration_ms: 60_000,
            mana_per_second: 3.0,
        }
    }
}
