#![allow(dead_code)]

use std::time::Duration;

use spellbound_core::{Command, Event, LaunchRequest, SlotId};
use spellbound_headless::HeadlessHost;
use spellbound_system_expiry::Expiry;
use spellbound_system_upkeep::Upkeep;
use spellbound_world::{self as world, query, World, WorldConfig};

pub const STEP: Duration = Duration::from_millis(50);

/// World, headless host and the retirement systems driven in lockstep.
pub struct Harness {
    pub world: World,
    pub host: HeadlessHost,
    expiry: Expiry,
    upkeep: Upkeep,
    pub log: Vec<Event>,
}

impl Harness {
    pub fn new(host: HeadlessHost) -> Self {
        Self::with_config(WorldConfig::default(), host)
    }

    pub fn with_config(config: WorldConfig, host: HeadlessHost) -> Self {
        Self {
            world: World::new(config),
            host,
            expiry: Expiry::default(),
            upkeep: Upkeep::default(),
            log: Vec::new(),
        }
    }

    /// Applies a command without running any system; returns its events.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut self.host, &mut events);
        self.log.extend(events.iter().cloned());
        events
    }

    /// Applies a command and every command the systems raise in response.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut produced = Vec::new();
        let mut events = self.apply(command);

        while !events.is_empty() {
            let mut commands = Vec::new();
            self.expiry.handle(&events, &mut commands);
            self.upkeep
                .handle(&events, &query::upkeep(&self.world), &mut commands);
            produced.append(&mut events);

            for command in commands {
                events.extend(self.apply(command));
            }
        }
        produced
    }

    pub fn launch(&mut self, slot: u32, request: LaunchRequest) -> Vec<Event> {
        self.submit(Command::Launch {
            slot: SlotId::new(slot),
            request,
        })
    }

    /// Ticks `count` times by [`STEP`], collecting every event.
    pub fn run(&mut self, count: usize) -> Vec<Event> {
        (0..count)
            .flat_map(|_| self.submit(Command::Tick { dt: STEP }))
            .collect()
    }
}

pub fn count(events: &[Event], matches: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| matches(event)).count()
}
