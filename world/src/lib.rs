#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spell-instance state for Spellbound.
//!
//! The world owns the instance table, the dynamic light pool, the simulation
//! clock and the random stream used for flicker and particle spawns. It is
//! mutated exclusively through [`apply`] and observed through [`query`].

mod fx;
mod lights;
mod spells;
mod table;

use std::time::Duration;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use spellbound_core::{
    Command, Event, Host, LaunchRequest, Phase, SlotError, SlotId, SpellError, SpellTuning,
};
use tracing::{debug, error, trace, warn};

use crate::{
    lights::LightPool,
    spells::SpellContext,
    table::{SpellInstance, SpellTable},
};

const DEFAULT_SLOT_CAPACITY: usize = 20;
const DEFAULT_LIGHT_CAPACITY: usize = 64;
const DEFAULT_RNG_SEED: u64 = 0x5eed_c0de_f1a5_4e11;

/// Construction parameters of a [`World`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of instance slots.
    pub slot_capacity: usize,
    /// Number of dynamic lights shared by every slot and the fade list.
    pub light_capacity: usize,
    /// Seed of the flicker and particle random stream.
    pub rng_seed: u64,
    /// Per-archetype numbers.
    pub tuning: SpellTuning,
    /// Panics on rejected commands in debug builds. Release builds only log.
    pub fatal_violations: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            light_capacity: DEFAULT_LIGHT_CAPACITY,
            rng_seed: DEFAULT_RNG_SEED,
            tuning: SpellTuning::default(),
            fatal_violations: cfg!(debug_assertions),
        }
    }
}

/// Represents the authoritative Spellbound world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    table: SpellTable,
    lights: LightPool,
    rng: ChaCha8Rng,
    clock: Duration,
}

impl World {
    /// Creates an empty world with every slot vacant.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            table: SpellTable::with_capacity(config.slot_capacity),
            lights: LightPool::with_capacity(config.light_capacity),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            clock: Duration::ZERO,
            config,
        }
    }

    /// Borrows everything an archetype hook may touch.
    ///
    /// The instance being processed must already be taken out of the table.
    fn context<'a, H: Host + ?Sized>(
        &'a mut self,
        host: &'a mut H,
        follow_ups: &'a mut Vec<Command>,
        events: &'a mut Vec<Event>,
    ) -> SpellContext<'a, H> {
        SpellContext {
            host,
            lights: &mut self.lights,
            rng: &mut self.rng,
            tuning: &self.config.tuning,
            peers: &self.table,
            follow_ups,
            events,
        }
    }

    fn launch<H: Host + ?Sized>(
        &mut self,
        slot: SlotId,
        request: &LaunchRequest,
        host: &mut H,
        follow_ups: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SlotError> {
        self.table.check_vacant(slot)?;

        let caster_position = host.actor(request.caster).map_or_else(
            || {
                let error = SpellError::InvalidReference(request.caster);
                debug!(%error, ?slot, "launching from the origin");
                Vec3::ZERO
            },
            |actor| actor.position,
        );
        let mut instance = SpellInstance::new(
            slot,
            request.archetype,
            request.caster,
            request.target,
            request.level,
            caster_position,
            self.clock,
        );

        let mut ctx = self.context(host, follow_ups, out_events);
        spells::launch(&mut ctx, &mut instance, request);

        let time_to_live = instance.time_to_live;
        debug!(?slot, archetype = ?request.archetype, ?time_to_live, "spell launched");
        self.table.restore(instance);
        out_events.push(Event::SpellLaunched {
            slot,
            archetype: request.archetype,
            time_to_live,
        });
        Ok(())
    }

    fn tick<H: Host + ?Sized>(
        &mut self,
        dt: Duration,
        host: &mut H,
        follow_ups: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
        self.lights.advance(dt, out_events);

        let slots: Vec<SlotId> = self.table.slot_ids().collect();
        for slot in slots {
            let Some(mut instance) = self.table.take(slot) else {
                continue;
            };

            if instance.phase == Phase::Active {
                instance.time_to_live = instance.time_to_live.saturating_sub(dt);
                if instance.time_to_live.is_zero() {
                    if !instance.expiry_reported {
                        instance.expiry_reported = true;
                        trace!(?slot, "lifetime expired");
                        out_events.push(Event::LifetimeExpired { slot });
                    }
                } else {
                    let mut ctx = self.context(host, follow_ups, out_events);
                    spells::update(&mut ctx, &mut instance, dt);
                }
            }

            self.table.restore(instance);
        }
    }

    fn end<H: Host + ?Sized>(
        &mut self,
        slot: SlotId,
        host: &mut H,
        follow_ups: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SlotError> {
        self.table.check_phase(slot, Phase::Active)?;
        let Some(mut instance) = self.table.take(slot) else {
            return Err(SlotError::Vacant);
        };

        let mut ctx = self.context(host, follow_ups, out_events);
        spells::end(&mut ctx, &mut instance);

        instance.phase = Phase::Ending;
        instance.time_to_live = Duration::ZERO;
        instance.expiry_reported = true;
        self.table.restore(instance);
        debug!(?slot, "spell ended");
        out_events.push(Event::SpellEnded { slot });
        Ok(())
    }

    fn kill<H: Host + ?Sized>(
        &mut self,
        slot: SlotId,
        host: &mut H,
        follow_ups: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SlotError> {
        self.table.check_phase(slot, Phase::Ending)?;
        let Some(mut instance) = self.table.take(slot) else {
            return Err(SlotError::Vacant);
        };

        let mut ctx = self.context(host, follow_ups, out_events);
        spells::kill(&mut ctx, &mut instance);

        self.table.restore(instance);
        out_events.push(Event::SpellKilled { slot });
        Ok(())
    }

    fn free<H: Host + ?Sized>(
        &mut self,
        slot: SlotId,
        host: &mut H,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SlotError> {
        self.table.check_phase(slot, Phase::Ending)?;
        let Some(mut instance) = self.table.take(slot) else {
            return Err(SlotError::Vacant);
        };

        // The controller is dropped with the instance.
        if let Some(voice) = instance.voice.take() {
            warn!(?slot, ?voice, "freeing slot that still holds a voice");
            host.stop(voice);
        }
        if let Some(light) = instance.light.take() {
            warn!(?slot, ?light, "freeing slot that still holds a light");
            let _ = self.lights.release(light);
        }
        if let Some(entity) = instance.registered_on.take() {
            warn!(?slot, ?entity, "freeing slot that is still registered");
            host.unregister_active_effect(entity, slot);
        }

        debug!(?slot, archetype = ?instance.archetype, "slot freed");
        out_events.push(Event::SlotFreed { slot });
        Ok(())
    }

    fn force_end(
        &mut self,
        slot: SlotId,
        by: Option<SlotId>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SlotError> {
        self.table.check_phase(slot, Phase::Active)?;
        let Some(instance) = self.table.get_mut(slot) else {
            return Err(SlotError::Vacant);
        };
        if instance.time_to_live.is_zero() {
            return Ok(());
        }

        instance.time_to_live = Duration::ZERO;
        debug!(?slot, ?by, "spell cancelled");
        out_events.push(Event::SpellCancelled { slot, by });
        Ok(())
    }

    fn reset<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        follow_ups: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let live: Vec<SlotId> = self.table.iter().map(|instance| instance.slot).collect();
        for slot in live {
            let active = self.table.check_phase(slot, Phase::Active).is_ok();
            let outcome = if active {
                self.end(slot, host, follow_ups, out_events)
            } else {
                Ok(())
            }
            .and_then(|()| self.kill(slot, host, follow_ups, out_events))
            .and_then(|()| self.free(slot, host, out_events));
            if let Err(reason) = outcome {
                reject(slot, reason, self.config.fatal_violations, out_events);
            }
        }

        // Nothing a reset slot asked for may run against the fresh world.
        follow_ups.clear();
        self.lights.clear(out_events);
        self.clock = Duration::ZERO;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
        debug!("world reset");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

fn reject(slot: SlotId, reason: SlotError, fatal: bool, out_events: &mut Vec<Event>) {
    let error = SpellError::StateViolation { slot, reason };
    error!(%error, "rejecting command");
    debug_assert!(!fatal, "{error}");
    out_events.push(Event::CommandRejected { slot, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands an archetype raises against other slots, such as the
/// cancellations issued by a dispel, are applied before this call returns.
pub fn apply<H: Host + ?Sized>(
    world: &mut World,
    command: Command,
    host: &mut H,
    out_events: &mut Vec<Event>,
) {
    let mut follow_ups = Vec::new();
    apply_one(world, command, host, &mut follow_ups, out_events);

    while !follow_ups.is_empty() {
        for follow_up in std::mem::take(&mut follow_ups) {
            apply_one(world, follow_up, host, &mut follow_ups, out_events);
        }
    }
}

fn apply_one<H: Host + ?Sized>(
    world: &mut World,
    command: Command,
    host: &mut H,
    follow_ups: &mut Vec<Command>,
    out_events: &mut Vec<Event>,
) {
    let outcome = match command {
        Command::Launch { slot, request } => world
            .launch(slot, &request, host, follow_ups, out_events)
            .map_err(|reason| (slot, reason)),
        Command::Tick { dt } => {
            world.tick(dt, host, follow_ups, out_events);
            Ok(())
        }
        Command::EndSpell { slot } => world
            .end(slot, host, follow_ups, out_events)
            .map_err(|reason| (slot, reason)),
        Command::KillSpell { slot } => world
            .kill(slot, host, follow_ups, out_events)
            .map_err(|reason| (slot, reason)),
        Command::FreeSlot { slot } => world
            .free(slot, host, out_events)
            .map_err(|reason| (slot, reason)),
        Command::ForceEnd { slot, by } => world
            .force_end(slot, by, out_events)
            .map_err(|reason| (slot, reason)),
        Command::DrainMana { caster, amount } => {
            host.drain_mana(caster, amount);
            Ok(())
        }
        Command::Reset => {
            world.reset(host, follow_ups, out_events);
            Ok(())
        }
    };

    if let Err((slot, reason)) = outcome {
        reject(slot, reason, world.config.fatal_violations, out_events);
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use spellbound_core::{Light, LightHandle, SlotId, SpellSnapshot, SpellView, UpkeepSnapshot};

    use super::World;

    /// Reports whether the slot currently holds a spell.
    #[must_use]
    pub fn is_live(world: &World, slot: SlotId) -> bool {
        world.table.get(slot).is_some()
    }

    /// Captures a snapshot of a single slot.
    #[must_use]
    pub fn spell(world: &World, slot: SlotId) -> Option<SpellSnapshot> {
        world.table.get(slot).map(|instance| instance.snapshot())
    }

    /// Captures a read-only view of every live slot.
    #[must_use]
    pub fn spell_view(world: &World) -> SpellView {
        SpellView::from_snapshots(world.table.iter().map(|instance| instance.snapshot()).collect())
    }

    /// Resolves a light handle, returning `None` once the light was released.
    #[must_use]
    pub fn light(world: &World, handle: LightHandle) -> Option<Light> {
        world.lights.get(handle).copied()
    }

    /// Lists every allocated light, owned or fading, in pool order.
    #[must_use]
    pub fn lights(world: &World) -> Vec<(LightHandle, Light)> {
        world
            .lights
            .iter()
            .map(|(handle, light)| (handle, *light))
            .collect()
    }

    /// Summarises light pool occupancy.
    #[must_use]
    pub fn light_stats(world: &World) -> LightStats {
        LightStats {
            in_use: world.lights.len(),
            fading: world.lights.fading_count(),
            capacity: world.lights.capacity(),
        }
    }

    /// Reports the mana cost of every active sustained spell.
    #[must_use]
    pub fn upkeep(world: &World) -> Vec<UpkeepSnapshot> {
        world.table.iter().filter_map(|instance| instance.upkeep()).collect()
    }

    /// Simulated time elapsed since construction or the last reset.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of slots in the instance table.
    #[must_use]
    pub fn capacity(world: &World) -> usize {
        world.table.capacity()
    }

    /// Light pool occupancy.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LightStats {
        /// Lights currently allocated, including fading ones.
        pub in_use: usize,
        /// Lights detached from their slot and fading out.
        pub fading: usize,
        /// Total number of lights in the pool.
        pub capacity: usize,
    }
}
