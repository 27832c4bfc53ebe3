#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spellbound runtime.
//!
//! This crate defines the message surface that connects embedders, the
//! authoritative world, and pure systems. Embedders submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point against a [`Host`] that provides audio, spatial queries,
//! combat and entity storage, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

mod host;
mod pool;
mod tuning;

use std::time::Duration;

use glam::Vec3;
use thiserror::Error;

pub use host::{
    ActorKind, ActorSnapshot, AreaDamage, AudioBackend, CombatService, DamageFlags,
    EntityDirectory, Host, PlaybackMode, QueryFilter, SoundCue, SpatialQuery, Sphere,
};
pub use pool::{HandlePool, LightHandle, PoolError, VoiceHandle};
pub use tuning::{
    CreateFoodTuning, DispelTuning, FireballTuning, IceProjectileTuning, InvisibilityTuning,
    SpeedTuning, SpellTuning,
};

/// Lifetime that is effectively infinite until something cancels the spell.
pub const UNBOUNDED_LIFETIME: Duration = Duration::from_millis(200_000_000);

/// Unit vector pointing up. World space uses a y-down convention.
pub const UP: Vec3 = Vec3::NEG_Y;

/// Unique identifier of an entity owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// The player-controlled actor.
    pub const PLAYER: Self = Self(0);

    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the identifier names the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

/// Index of a slot in the spell instance table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Linear RGB color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightColor {
    /// Red channel.
    pub red: f32,
    /// Green channel.
    pub green: f32,
    /// Blue channel.
    pub blue: f32,
}

impl LightColor {
    /// Creates a new color.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

/// Dynamic point light stored in the world's light pool.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Light {
    /// Position in world space.
    pub position: Vec3,
    /// Emitted color.
    pub color: LightColor,
    /// Brightness multiplier.
    pub intensity: f32,
    /// Distance at which falloff begins.
    pub fall_start: f32,
    /// Distance at which the light reaches zero.
    pub fall_end: f32,
    /// Present once the light is detached from its owner and fading out.
    pub fade: Option<LightFade>,
}

/// Remaining lifetime of a detached light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightFade {
    /// Time left before the light is released.
    pub remaining: Duration,
    /// Length of the whole fade.
    pub total: Duration,
}

impl LightFade {
    /// Fraction of the original intensity still visible.
    #[must_use]
    pub fn strength(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f32() / self.total.as_secs_f32()
    }
}

/// Heading and elevation of an actor or projectile, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    /// Rotation around the vertical axis. Zero faces +z.
    pub heading: f32,
    /// Angle above the horizontal plane.
    pub elevation: f32,
}

impl Orientation {
    /// Creates a new orientation.
    #[must_use]
    pub const fn new(heading: f32, elevation: f32) -> Self {
        Self { heading, elevation }
    }

    /// Heading wrapped into `0.0..360.0`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            heading: self.heading.rem_euclid(360.0),
            elevation: self.elevation,
        }
    }

    /// Horizontal unit vector along the heading.
    #[must_use]
    pub fn forward_xz(self) -> Vec3 {
        let heading = self.heading.to_radians();
        Vec3::new(-heading.sin(), 0.0, heading.cos())
    }

    /// Unit vector along heading and elevation.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        let elevation = self.elevation.to_radians();
        self.forward_xz() * elevation.cos() + UP * elevation.sin()
    }
}

/// Behavioral category of a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Archetype {
    /// Sustained haste on the caster or an ally.
    Speed,
    /// One-shot scan cancelling nearby invisibility.
    DispelIllusion,
    /// Fire projectile that detonates on first contact.
    Fireball,
    /// Instant satiation restore with a short visual.
    CreateFood,
    /// Straight-line ice projectile.
    IceProjectile,
    /// Sustained invisibility on the target.
    Invisibility,
}

/// Everything required to launch a spell into a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchRequest {
    /// Archetype to launch.
    pub archetype: Archetype,
    /// Entity casting the spell.
    pub caster: EntityId,
    /// Entity affected by the spell, if any.
    pub target: Option<EntityId>,
    /// Caster proficiency scaling magnitude and radii.
    pub level: f32,
    /// Explicit lifetime overriding the archetype default.
    pub duration: Option<Duration>,
    /// World-space position of the casting hand, when known.
    pub hand: Option<Vec3>,
}

impl LaunchRequest {
    /// Creates a level-one request with no target and default duration.
    #[must_use]
    pub const fn new(archetype: Archetype, caster: EntityId) -> Self {
        Self {
            archetype,
            caster,
            target: None,
            level: 1.0,
            duration: None,
            hand: None,
        }
    }

    /// Sets the target.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the caster level.
    #[must_use]
    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level;
        self
    }

    /// Overrides the archetype's default lifetime.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Supplies the casting hand position.
    #[must_use]
    pub fn with_hand(mut self, hand: Vec3) -> Self {
        self.hand = Some(hand);
        self
    }
}

/// Lifecycle phase of an occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Launched and updated every tick.
    Active,
    /// Ended; waiting for kill and free.
    Ending,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Launches a spell into a vacant slot.
    Launch {
        /// Slot receiving the spell.
        slot: SlotId,
        /// Parameters of the spell.
        request: LaunchRequest,
    },
    /// Advances the simulation clock and updates every active slot.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Releases the slot's audio and visual resources.
    EndSpell {
        /// Slot to end.
        slot: SlotId,
    },
    /// Runs deferred cleanup such as detaching a fading light.
    KillSpell {
        /// Slot to kill.
        slot: SlotId,
    },
    /// Recycles an ended slot.
    FreeSlot {
        /// Slot to recycle.
        slot: SlotId,
    },
    /// Cancels a spell by zeroing its time-to-live.
    ForceEnd {
        /// Slot to cancel.
        slot: SlotId,
        /// Slot whose spell caused the cancellation, if any.
        by: Option<SlotId>,
    },
    /// Removes mana from a caster to pay for sustained spells.
    DrainMana {
        /// Entity paying the upkeep.
        caster: EntityId,
        /// Amount of mana to remove.
        amount: f32,
    },
    /// Ends, kills and frees every slot, drops all lights and rewinds the
    /// clock.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a spell occupies a slot.
    SpellLaunched {
        /// Slot holding the spell.
        slot: SlotId,
        /// Archetype that was launched.
        archetype: Archetype,
        /// Lifetime assigned at launch.
        time_to_live: Duration,
    },
    /// Reports that a spell's lifetime was zeroed by a cancellation.
    SpellCancelled {
        /// Slot that was cancelled.
        slot: SlotId,
        /// Slot whose spell caused the cancellation, if any.
        by: Option<SlotId>,
    },
    /// Reports, once per slot, that its time-to-live reached zero.
    LifetimeExpired {
        /// Slot whose lifetime ran out.
        slot: SlotId,
    },
    /// Confirms that a slot's end hook ran.
    SpellEnded {
        /// Slot that ended.
        slot: SlotId,
    },
    /// Confirms that a slot's kill hook ran.
    SpellKilled {
        /// Slot that was killed.
        slot: SlotId,
    },
    /// Confirms that a slot is vacant again.
    SlotFreed {
        /// Slot that was recycled.
        slot: SlotId,
    },
    /// Reports that a projectile detonated.
    Detonated {
        /// Slot holding the projectile.
        slot: SlotId,
        /// Point of detonation.
        position: Vec3,
        /// Entity whose proximity triggered the detonation.
        struck: EntityId,
    },
    /// Reports that a light left its owner and started fading.
    LightDetached {
        /// Light that is fading.
        light: LightHandle,
        /// Length of the fade.
        fade: Duration,
    },
    /// Reports that a fading light was released.
    LightExpired {
        /// Light that was released.
        light: LightHandle,
    },
    /// Reports that a command violated the slot lifecycle contract.
    CommandRejected {
        /// Slot named by the rejected command.
        slot: SlotId,
        /// Specific contract that was violated.
        reason: SlotError,
    },
}

/// Trail puff emitted by a projectile during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TailEmission {
    /// Size and density of the puff.
    pub intensity: f32,
    /// Whether the puff inherits the projectile's velocity.
    pub trailing: bool,
}

/// Immutable representation of a visual controller used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSnapshot {
    /// Current position of the effect.
    pub position: Vec3,
    /// Movement per second.
    pub velocity: Vec3,
    /// Time the controller has been running.
    pub elapsed: Duration,
    /// Total running time of the controller.
    pub duration: Duration,
    /// Current radius for area visuals; zero for point visuals.
    pub radius: f32,
    /// Whether a projectile has detonated.
    pub detonated: bool,
    /// Whether the controller still emits particles.
    pub emitting: bool,
    /// Trail puff emitted during the most recent tick.
    pub emission: Option<TailEmission>,
}

/// Immutable representation of a single slot used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpellSnapshot {
    /// Slot holding the spell.
    pub slot: SlotId,
    /// Archetype of the spell.
    pub archetype: Archetype,
    /// Entity that cast the spell.
    pub caster: EntityId,
    /// Entity affected by the spell.
    pub target: Option<EntityId>,
    /// Caster proficiency.
    pub level: f32,
    /// Remaining lifetime.
    pub time_to_live: Duration,
    /// Mana drained from the caster each second.
    pub mana_per_second: f32,
    /// World clock reading at launch.
    pub created_at: Duration,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Looping voice owned by the slot.
    pub voice: Option<VoiceHandle>,
    /// Light owned by the slot.
    pub light: Option<LightHandle>,
    /// Visual controller state, absent when the effect failed to construct.
    pub effect: Option<EffectSnapshot>,
}

/// Read-only snapshot describing all occupied slots.
#[derive(Clone, Debug, Default)]
pub struct SpellView {
    snapshots: Vec<SpellSnapshot>,
}

impl SpellView {
    /// Creates a new spell view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SpellSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &SpellSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of a specific slot, if occupied.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&SpellSnapshot> {
        self.snapshots
            .binary_search_by_key(&slot, |snapshot| snapshot.slot)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SpellSnapshot> {
        self.snapshots
    }
}

/// Sustained cost of a single active slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpkeepSnapshot {
    /// Slot charging the upkeep.
    pub slot: SlotId,
    /// Entity paying the upkeep.
    pub caster: EntityId,
    /// Mana drained each second.
    pub mana_per_second: f32,
}

/// Ways a command can violate the slot lifecycle contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SlotError {
    /// The slot index exceeds the table capacity.
    #[error("slot index is outside the instance table")]
    OutOfRange,
    /// Launch targeted a slot that already holds a spell.
    #[error("slot already holds a spell")]
    Occupied,
    /// The command needs a spell but the slot is vacant.
    #[error("slot holds no spell")]
    Vacant,
    /// End targeted a spell that already ended.
    #[error("spell is not active")]
    NotActive,
    /// Kill or free targeted a spell that has not ended.
    #[error("spell has not ended")]
    NotEnding,
}

/// Kinds of pooled resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Dynamic light.
    Light,
    /// Audio voice.
    Voice,
}

/// Failures inside the spell runtime.
///
/// Only [`SpellError::StateViolation`] ever leaves the world, as an
/// [`Event::CommandRejected`]. The other variants are recovered where they
/// occur by running without the missing resource or entity.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SpellError {
    /// A pool had no free handle.
    #[error("{0:?} pool exhausted")]
    ResourceExhausted(ResourceKind),
    /// An entity id did not resolve to a live entity.
    #[error("entity {0:?} does not resolve")]
    InvalidReference(EntityId),
    /// A command broke the slot lifecycle contract.
    #[error("slot {slot:?}: {reason}")]
    StateViolation {
        /// Slot named by the command.
        slot: SlotId,
        /// Contract that was violated.
        reason: SlotError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn forward_follows_heading() {
        assert_vec_close(Orientation::new(0.0, 0.0).forward_xz(), Vec3::Z);
        assert_vec_close(Orientation::new(90.0, 0.0).forward_xz(), Vec3::NEG_X);
        assert_vec_close(Orientation::new(180.0, 30.0).forward_xz(), Vec3::NEG_Z);
    }

    #[test]
    fn positive_elevation_points_up() {
        let direction = Orientation::new(0.0, 90.0).direction();
        assert_vec_close(direction, UP);
        assert!((Orientation::new(37.0, 12.0).direction().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalized_wraps_negative_headings() {
        let wrapped = Orientation::new(-90.0, 5.0).normalized();
        assert!((wrapped.heading - 270.0).abs() < 1e-4);
        assert!((wrapped.elevation - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn light_fade_strength_decays_linearly() {
        let fade = LightFade {
            remaining: Duration::from_millis(250),
            total: Duration::from_millis(500),
        };
        assert!((fade.strength() - 0.5).abs() < 1e-6);

        let instant = LightFade {
            remaining: Duration::ZERO,
            total: Duration::ZERO,
        };
        assert_eq!(instant.strength(), 0.0);
    }

    #[test]
    fn launch_request_builder_sets_fields() {
        let request = LaunchRequest::new(Archetype::Fireball, EntityId::new(4))
            .with_target(EntityId::PLAYER)
            .with_level(5.0)
            .with_duration(Duration::from_secs(3))
            .with_hand(Vec3::ONE);

        assert_eq!(request.target, Some(EntityId::PLAYER));
        assert_eq!(request.duration, Some(Duration::from_secs(3)));
        assert_eq!(request.hand, Some(Vec3::ONE));
        assert!((request.level - 5.0).abs() < f32::EPSILON);
        assert!(!request.caster.is_player());
    }

    #[test]
    fn state_violation_formats_slot_and_reason() {
        let error = SpellError::StateViolation {
            slot: SlotId::new(3),
            reason: SlotError::Occupied,
        };
        assert_eq!(error.to_string(), "slot SlotId(3): slot already holds a spell");
    }
}
