//! Per-archetype state machines.
//!
//! Every archetype implements [`SpellBehavior`] over the shared
//! [`SpellInstance`] record and is dispatched by the instance's archetype tag.
//! The instance being processed is taken out of the table first, so
//! [`SpellContext::peers`] only ever shows the other slots.

mod create_food;
mod dispel;
mod fireball;
mod ice_projectile;
mod invisibility;
mod speed;

use std::time::Duration;

use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use spellbound_core::{
    Archetype, Command, EntityId, Event, Host, LaunchRequest, PlaybackMode, SoundCue,
    SpellError, SpellTuning,
};
use tracing::debug;

use crate::{lights::LightPool, table::SpellInstance, table::SpellTable};

/// Everything an archetype may touch while handling one instance.
pub(crate) struct SpellContext<'a, H: Host + ?Sized> {
    pub(crate) host: &'a mut H,
    pub(crate) lights: &'a mut LightPool,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) tuning: &'a SpellTuning,
    pub(crate) peers: &'a SpellTable,
    /// Commands against other slots, applied once the current one finishes.
    pub(crate) follow_ups: &'a mut Vec<Command>,
    pub(crate) events: &'a mut Vec<Event>,
}

impl<H: Host + ?Sized> SpellContext<'_, H> {
    /// Resolves an entity's position.
    pub(crate) fn position_of(&self, entity: EntityId) -> Result<Vec3, SpellError> {
        self.host
            .actor(entity)
            .map(|actor| actor.position)
            .ok_or(SpellError::InvalidReference(entity))
    }

    /// Plays a positioned one-shot cue.
    pub(crate) fn play_once(&mut self, cue: SoundCue, position: Option<Vec3>) {
        // One-shot voices release themselves; there is nothing to track.
        let _ = self.host.play(cue, position, 1.0, PlaybackMode::OneShot);
    }

    /// Registers `instance` as affecting `entity` until [`Self::unregister`].
    pub(crate) fn register(&mut self, instance: &mut SpellInstance, entity: EntityId) {
        if instance.registered_on.is_some() {
            return;
        }
        self.host.register_active_effect(entity, instance.slot);
        instance.registered_on = Some(entity);
    }

    pub(crate) fn unregister(&mut self, instance: &mut SpellInstance) {
        if let Some(entity) = instance.registered_on.take() {
            self.host.unregister_active_effect(entity, instance.slot);
        }
    }

    /// Stops the instance's looping voice if it holds one.
    pub(crate) fn stop_voice(&mut self, instance: &mut SpellInstance) {
        if let Some(voice) = instance.voice.take() {
            self.host.stop(voice);
        }
    }
}

/// Logs a recoverable failure and hands back the fallback.
pub(crate) fn recover<T>(result: Result<T, SpellError>, fallback: T) -> T {
    result.unwrap_or_else(|error| {
        debug!(%error, "continuing without resource");
        fallback
    })
}

/// Launch / Update / End / Kill hooks of one archetype.
pub(crate) trait SpellBehavior {
    /// Initializes a freshly created instance, including its time-to-live.
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        request: &LaunchRequest,
    );

    /// Advances an instance that holds a visual controller.
    fn update<H: Host + ?Sized>(
        _ctx: &mut SpellContext<'_, H>,
        _instance: &mut SpellInstance,
        _dt: Duration,
    ) {
    }

    /// Releases audio and visual resources.
    fn end<H: Host + ?Sized>(_ctx: &mut SpellContext<'_, H>, _instance: &mut SpellInstance) {}

    /// Runs deferred cleanup after [`Self::end`].
    fn kill<H: Host + ?Sized>(_ctx: &mut SpellContext<'_, H>, _instance: &mut SpellInstance) {}
}

macro_rules! dispatch {
    ($archetype:expr, $hook:ident($($arg:expr),*)) => {
        match $archetype {
            Archetype::Speed => speed::Speed::$hook($($arg),*),
            Archetype::DispelIllusion => dispel::DispelIllusion::$hook($($arg),*),
            Archetype::Fireball => fireball::Fireball::$hook($($arg),*),
            Archetype::CreateFood => create_food::CreateFood::$hook($($arg),*),
            Archetype::IceProjectile => ice_projectile::IceProjectile::$hook($($arg),*),
            Archetype::Invisibility => invisibility::Invisibility::$hook($($arg),*),
        }
    };
}

pub(crate) fn launch<H: Host + ?Sized>(
    ctx: &mut SpellContext<'_, H>,
    instance: &mut SpellInstance,
    request: &LaunchRequest,
) {
    dispatch!(instance.archetype, launch(ctx, instance, request));
}

/// Instances without a controller are left untouched.
pub(crate) fn update<H: Host + ?Sized>(
    ctx: &mut SpellContext<'_, H>,
    instance: &mut SpellInstance,
    dt: Duration,
) {
    if instance.effect.is_none() {
        return;
    }
    dispatch!(instance.archetype, update(ctx, instance, dt));
}

pub(crate) fn end<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
    dispatch!(instance.archetype, end(ctx, instance));
}

pub(crate) fn kill<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
    dispatch!(instance.archetype, kill(ctx, instance));
}
