//! Drives the world together with its systems until each command settles.

use spellbound_core::{Command, Event};
use spellbound_headless::HeadlessHost;
use spellbound_system_expiry::Expiry;
use spellbound_system_upkeep::Upkeep;
use spellbound_world::{self as world, query, World, WorldConfig};

/// World, host and systems wired into one loop.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    host: HeadlessHost,
    expiry: Expiry,
    upkeep: Upkeep,
    log: Vec<Event>,
    host_calls: usize,
}

impl Session {
    pub(crate) fn new(config: WorldConfig, host: HeadlessHost) -> Self {
        Self {
            world: World::new(config),
            host,
            expiry: Expiry::default(),
            upkeep: Upkeep::default(),
            log: Vec::new(),
            host_calls: 0,
        }
    }

    /// Applies `command` and feeds the resulting events back through the
    /// systems until they stop emitting commands.
    pub(crate) fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut self.host, &mut events);

        while !events.is_empty() {
            let mut commands = Vec::new();
            self.expiry.handle(&events, &mut commands);
            let upkeep = query::upkeep(&self.world);
            self.upkeep.handle(&events, &upkeep, &mut commands);
            self.log.append(&mut events);

            for command in commands {
                world::apply(&mut self.world, command, &mut self.host, &mut events);
            }
        }

        // Only the tally is reported; the call log would grow with every tick.
        self.host_calls += self.host.take_calls().len();
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn host(&self) -> &HeadlessHost {
        &self.host
    }

    /// Number of host calls made so far.
    pub(crate) fn host_calls(&self) -> usize {
        self.host_calls
    }

    /// Every event produced so far.
    pub(crate) fn log(&self) -> &[Event] {
        &self.log
    }
}
