//! Collaborator interfaces the spell runtime consumes.
//!
//! The runtime never renders, mixes audio, resolves collisions or stores
//! entities itself. Embedders implement these traits and hand a [`Host`] to the
//! world's `apply` entry point. Every method is synchronous and must not call
//! back into the world.

use std::ops::{BitOr, BitOrAssign};

use glam::Vec3;

use crate::{EntityId, Orientation, SlotId, VoiceHandle};

/// Sound cues the spell archetypes request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Speed buff starts.
    SpeedStart,
    /// Looping hum while the speed buff is active on the player.
    SpeedLoop,
    /// Speed buff ends.
    SpeedEnd,
    /// Dispel illusion is cast.
    DispelIllusion,
    /// Fireball leaves the caster's hand.
    FireLaunch,
    /// Looping roar while the fireball travels.
    FireWind,
    /// Fireball strikes something.
    FireHit,
    /// Create food is cast.
    CreateFood,
    /// Ice projectile is cast.
    IceProjectileLaunch,
    /// Invisibility starts.
    InvisibilityStart,
    /// Invisibility ends.
    InvisibilityEnd,
}

/// Whether a cue plays once or loops until stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackMode {
    /// Plays to completion and releases its voice on its own.
    OneShot,
    /// Repeats until [`AudioBackend::stop`] is called with its voice.
    Looped,
}

/// Audio output collaborator.
pub trait AudioBackend {
    /// Starts a cue, optionally positioned in world space.
    ///
    /// Returns `None` when no voice could be allocated.
    fn play(
        &mut self,
        cue: SoundCue,
        position: Option<Vec3>,
        volume: f32,
        mode: PlaybackMode,
    ) -> Option<VoiceHandle>;

    /// Stops a voice. Unknown or finished voices are ignored.
    fn stop(&mut self, voice: VoiceHandle);

    /// Moves a positioned voice.
    fn refresh_position(&mut self, voice: VoiceHandle, position: Vec3);
}

/// Sphere in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Vec3,
    /// Radius measured in world units.
    pub radius: f32,
}

/// Which entities a sphere query ignores besides the excluded entity itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryFilter {
    /// Only the excluded entity is ignored.
    ExcludeSelf,
    /// Entities sharing a group with the excluded entity are ignored too.
    ExcludeSameGroup,
}

/// Spatial query collaborator.
pub trait SpatialQuery {
    /// Returns the first entity touching `sphere`, skipping `exclude` and
    /// anything `filter` rules out.
    fn query_sphere(&self, sphere: Sphere, exclude: EntityId, filter: QueryFilter)
        -> Option<EntityId>;

    /// Distance between two entities, or `None` if either does not resolve.
    fn distance(&self, a: EntityId, b: EntityId) -> Option<f32>;
}

/// Bit set describing the nature of inflicted damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DamageFlags(u8);

impl DamageFlags {
    /// No damage type.
    pub const NONE: Self = Self(0);
    /// Fire damage.
    pub const FIRE: Self = Self(1 << 0);
    /// Magical damage.
    pub const MAGICAL: Self = Self(1 << 1);
    /// Cold damage.
    pub const COLD: Self = Self(1 << 2);

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DamageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DamageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Spherical damage request with full damage inside `inner_radius` falling
/// off to nothing at `outer_radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaDamage {
    /// Center of the blast.
    pub center: Vec3,
    /// Radius receiving full damage.
    pub inner_radius: f32,
    /// Radius beyond which nothing is damaged.
    pub outer_radius: f32,
    /// Damage types applied.
    pub flags: DamageFlags,
    /// Entity credited with the damage.
    pub source: EntityId,
}

/// Combat and scene collaborator.
pub trait CombatService {
    /// Damages every eligible entity inside the area.
    fn apply_area_damage(&mut self, damage: AreaDamage);

    /// Tells nearby actors that something loud happened.
    fn notify_audible_event(&mut self, position: Vec3, source: EntityId);

    /// Spawns the explosion visual and scorch mark.
    fn spawn_explosion(&mut self, position: Vec3, magnitude: f32);
}

/// Broad classification of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// The player-controlled actor.
    Player,
    /// A non-player character.
    Npc,
    /// Anything else: items, fixtures.
    Item,
}

/// Read-only view of an entity, captured on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Position in world space.
    pub position: Vec3,
    /// Facing of the entity; for the player this is the camera.
    pub orientation: Orientation,
    /// Classification of the entity.
    pub kind: ActorKind,
    /// Entity the actor is currently focused on, if any.
    pub target_of_interest: Option<EntityId>,
}

/// Entity storage collaborator.
pub trait EntityDirectory {
    /// Resolves a live entity, returning `None` for dead or unknown ids.
    fn actor(&self, entity: EntityId) -> Option<ActorSnapshot>;

    /// Records that `slot` currently affects `entity`.
    fn register_active_effect(&mut self, entity: EntityId, slot: SlotId);

    /// Removes a record created by [`Self::register_active_effect`].
    fn unregister_active_effect(&mut self, entity: EntityId, slot: SlotId);

    /// Fills the entity's satiation pool to its maximum.
    fn restore_satiation(&mut self, entity: EntityId);

    /// Removes mana from the entity's pool.
    fn drain_mana(&mut self, entity: EntityId, amount: f32);
}

/// Everything the world needs from its embedder.
pub trait Host: AudioBackend + SpatialQuery + CombatService + EntityDirectory {}

impl<T> Host for T where T: AudioBackend + SpatialQuery + CombatService + EntityDirectory {}
