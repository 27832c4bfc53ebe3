#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory host for running the Spellbound world without an engine.
//!
//! [`HeadlessHost`] keeps a small actor table, hands out voices from a
//! fixed-capacity pool and records every call it receives so tests and the
//! command-line adapter can inspect what the world asked for.

use std::collections::BTreeMap;

use glam::Vec3;
use spellbound_core::{
    ActorKind, ActorSnapshot, AreaDamage, AudioBackend, CombatService, EntityDirectory,
    EntityId, HandlePool, Orientation, PlaybackMode, QueryFilter, SlotId, SoundCue,
    SpatialQuery, Sphere, VoiceHandle,
};
use tracing::trace;

const DEFAULT_VOICE_CAPACITY: usize = 32;
const MAX_SATIATION: f32 = 100.0;

/// Entity stored by the headless host.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessActor {
    /// Position in world space.
    pub position: Vec3,
    /// Facing of the actor.
    pub orientation: Orientation,
    /// Classification of the actor.
    pub kind: ActorKind,
    /// Faction; sphere queries may skip actors sharing the caster's group.
    pub group: u32,
    /// Body radius added to sphere query radii.
    pub radius: f32,
    /// Entity the actor is focused on.
    pub target_of_interest: Option<EntityId>,
    /// Remaining mana.
    pub mana: f32,
    /// Current satiation.
    pub satiation: f32,
}

impl HeadlessActor {
    /// Creates an actor of the given kind standing at `position`.
    #[must_use]
    pub fn new(kind: ActorKind, position: Vec3) -> Self {
        Self {
            position,
            orientation: Orientation::default(),
            kind,
            group: 0,
            radius: 0.0,
            target_of_interest: None,
            mana: 100.0,
            satiation: 0.0,
        }
    }

    /// Sets the actor's facing.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Moves the actor into a faction.
    #[must_use]
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    /// Sets the body radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Focuses the actor on another entity.
    #[must_use]
    pub fn with_target_of_interest(mut self, target: EntityId) -> Self {
        self.target_of_interest = Some(target);
        self
    }

    fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            position: self.position,
            orientation: self.orientation,
            kind: self.kind,
            target_of_interest: self.target_of_interest,
        }
    }
}

/// A single request the world made of the host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    /// A cue was started.
    Play {
        /// Cue that was requested.
        cue: SoundCue,
        /// Position of the voice, if positioned.
        position: Option<Vec3>,
        /// Whether the cue loops.
        mode: PlaybackMode,
        /// Voice handed back to the world.
        voice: Option<VoiceHandle>,
    },
    /// A looping voice was stopped.
    Stop {
        /// Voice that was stopped.
        voice: VoiceHandle,
    },
    /// Area damage was applied.
    AreaDamage(AreaDamage),
    /// Nearby listeners were alerted.
    AudibleEvent {
        /// Source of the noise.
        position: Vec3,
        /// Entity responsible for the noise.
        source: EntityId,
    },
    /// An explosion visual was spawned.
    Explosion {
        /// Centre of the explosion.
        position: Vec3,
        /// Scale of the explosion.
        magnitude: f32,
    },
    /// A slot started affecting an entity.
    Register {
        /// Affected entity.
        entity: EntityId,
        /// Slot holding the effect.
        slot: SlotId,
    },
    /// A slot stopped affecting an entity.
    Unregister {
        /// Affected entity.
        entity: EntityId,
        /// Slot holding the effect.
        slot: SlotId,
    },
    /// Satiation was restored.
    RestoreSatiation {
        /// Entity that was fed.
        entity: EntityId,
    },
    /// Mana was drained.
    DrainMana {
        /// Entity paying.
        entity: EntityId,
        /// Amount drained.
        amount: f32,
    },
}

#[derive(Clone, Copy, Debug)]
struct PlayingVoice {
    cue: SoundCue,
    position: Option<Vec3>,
}

/// Host implementation backed by plain collections.
#[derive(Debug)]
pub struct HeadlessHost {
    actors: BTreeMap<EntityId, HeadlessActor>,
    voices: HandlePool<VoiceHandle, PlayingVoice>,
    active_effects: Vec<(EntityId, SlotId)>,
    calls: Vec<HostCall>,
}

impl HeadlessHost {
    /// Creates an empty host with the default voice capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_voice_capacity(DEFAULT_VOICE_CAPACITY)
    }

    /// Creates an empty host able to hold `capacity` looping voices.
    #[must_use]
    pub fn with_voice_capacity(capacity: usize) -> Self {
        Self {
            actors: BTreeMap::new(),
            voices: HandlePool::with_capacity(capacity),
            active_effects: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Creates a host holding only the player at the origin.
    #[must_use]
    pub fn with_player() -> Self {
        let mut host = Self::new();
        host.insert_actor(
            EntityId::PLAYER,
            HeadlessActor::new(ActorKind::Player, Vec3::ZERO),
        );
        host
    }

    /// Adds or replaces an actor.
    pub fn insert_actor(&mut self, id: EntityId, actor: HeadlessActor) {
        let _ = self.actors.insert(id, actor);
    }

    /// Removes an actor; later lookups of `id` fail.
    pub fn remove_actor(&mut self, id: EntityId) -> Option<HeadlessActor> {
        self.actors.remove(&id)
    }

    /// Read access to an actor.
    #[must_use]
    pub fn actor_state(&self, id: EntityId) -> Option<&HeadlessActor> {
        self.actors.get(&id)
    }

    /// Mutable access to an actor, for moving it between ticks.
    pub fn actor_state_mut(&mut self, id: EntityId) -> Option<&mut HeadlessActor> {
        self.actors.get_mut(&id)
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of looping voices that were started and not yet stopped.
    #[must_use]
    pub fn active_voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Last position reported for a looping voice.
    #[must_use]
    pub fn voice_position(&self, voice: VoiceHandle) -> Option<Vec3> {
        self.voices.get(voice).and_then(|playing| playing.position)
    }

    /// Cue held by a looping voice.
    #[must_use]
    pub fn voice_cue(&self, voice: VoiceHandle) -> Option<SoundCue> {
        self.voices.get(voice).map(|playing| playing.cue)
    }

    /// Slots currently registered as affecting `entity`.
    #[must_use]
    pub fn active_effects_on(&self, entity: EntityId) -> Vec<SlotId> {
        self.active_effects
            .iter()
            .filter(|(affected, _)| *affected == entity)
            .map(|(_, slot)| *slot)
            .collect()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for HeadlessHost {
    fn play(
        &mut self,
        cue: SoundCue,
        position: Option<Vec3>,
        _volume: f32,
        mode: PlaybackMode,
    ) -> Option<VoiceHandle> {
        // One-shots finish on their own and are never handed back.
        let voice = match mode {
            PlaybackMode::OneShot => None,
            PlaybackMode::Looped => match self.voices.allocate(PlayingVoice { cue, position }) {
                Ok(voice) => Some(voice),
                Err(error) => {
                    trace!(%error, ?cue, "no voice for looping cue");
                    None
                }
            },
        };
        self.calls.push(HostCall::Play {
            cue,
            position,
            mode,
            voice,
        });
        voice
    }

    fn stop(&mut self, voice: VoiceHandle) {
        if self.voices.release(voice).is_none() {
            return;
        }
        self.calls.push(HostCall::Stop { voice });
    }

    fn refresh_position(&mut self, voice: VoiceHandle, position: Vec3) {
        if let Some(playing) = self.voices.get_mut(voice) {
            playing.position = Some(position);
        }
    }
}

impl SpatialQuery for HeadlessHost {
    fn query_sphere(
        &self,
        sphere: Sphere,
        exclude: EntityId,
        filter: QueryFilter,
    ) -> Option<EntityId> {
        let excluded_group = match filter {
            QueryFilter::ExcludeSelf => None,
            QueryFilter::ExcludeSameGroup => self.actors.get(&exclude).map(|actor| actor.group),
        };

        self.actors
            .iter()
            .filter(|(id, _)| **id != exclude)
            .filter(|(_, actor)| Some(actor.group) != excluded_group)
            .find(|(_, actor)| actor.position.distance(sphere.center) <= sphere.radius + actor.radius)
            .map(|(id, _)| *id)
    }

    fn distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        let a = self.actors.get(&a)?;
        let b = self.actors.get(&b)?;
        Some(a.position.distance(b.position))
    }
}

impl CombatService for HeadlessHost {
    fn apply_area_damage(&mut self, damage: AreaDamage) {
        self.calls.push(HostCall::AreaDamage(damage));
    }

    fn notify_audible_event(&mut self, position: Vec3, source: EntityId) {
        self.calls.push(HostCall::AudibleEvent { position, source });
    }

    fn spawn_explosion(&mut self, position: Vec3, magnitude: f32) {
        self.calls.push(HostCall::Explosion {
            position,
            magnitude,
        });
    }
}

impl EntityDirectory for HeadlessHost {
    fn actor(&self, entity: EntityId) -> Option<ActorSnapshot> {
        self.actors.get(&entity).map(HeadlessActor::snapshot)
    }

    fn register_active_effect(&mut self, entity: EntityId, slot: SlotId) {
        self.active_effects.push((entity, slot));
        self.calls.push(HostCall::Register { entity, slot });
    }

    fn unregister_active_effect(&mut self, entity: EntityId, slot: SlotId) {
        self.active_effects
            .retain(|registered| *registered != (entity, slot));
        self.calls.push(HostCall::Unregister { entity, slot });
    }

    fn restore_satiation(&mut self, entity: EntityId) {
        if let Some(actor) = self.actors.get_mut(&entity) {
            actor.satiation = MAX_SATIATION;
        }
        self.calls.push(HostCall::RestoreSatiation { entity });
    }

    fn drain_mana(&mut self, entity: EntityId, amount: f32) {
        if let Some(actor) = self.actors.get_mut(&entity) {
            actor.mana = (actor.mana - amount).max(0.0);
        }
        self.calls.push(HostCall::DrainMana { entity, amount });
    }
}
