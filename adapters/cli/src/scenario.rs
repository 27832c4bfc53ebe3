//! Scripted casts run by the command-line adapter.

use std::{fmt, time::Duration};

use clap::ValueEnum;
use glam::Vec3;
use spellbound_core::{
    ActorKind, Archetype, Command, EntityId, Event, LaunchRequest, Orientation, SlotId,
};
use spellbound_headless::{HeadlessActor, HeadlessHost};
use spellbound_world::{query, WorldConfig};
use tracing::info;

use crate::session::Session;

const CASTER_LEVEL: f32 = 5.0;
const ENEMY: EntityId = EntityId::new(2);
const HOSTILE_GROUP: u32 = 1;

/// Scripted situations the CLI can play back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// The player throws a fireball at an enemy straight ahead.
    Fireball,
    /// The player hastes themself and lets the buff run.
    Speed,
    /// An enemy turns invisible and the player dispels it.
    Dispel,
}

/// Outcome of a scenario run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Report {
    pub(crate) scenario: Scenario,
    pub(crate) elapsed: Duration,
    pub(crate) launched: usize,
    pub(crate) detonations: usize,
    pub(crate) cancellations: usize,
    pub(crate) freed: usize,
    pub(crate) rejected: usize,
    pub(crate) live_slots: usize,
    pub(crate) lights_in_use: usize,
    pub(crate) host_calls: usize,
    pub(crate) player_mana: f32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {:?}", self.scenario)?;
        writeln!(f, "elapsed: {} ms", self.elapsed.as_millis())?;
        writeln!(f, "launched: {}", self.launched)?;
        writeln!(f, "detonations: {}", self.detonations)?;
        writeln!(f, "cancellations: {}", self.cancellations)?;
        writeln!(f, "freed: {}", self.freed)?;
        writeln!(f, "rejected: {}", self.rejected)?;
        writeln!(f, "live slots: {}", self.live_slots)?;
        writeln!(f, "lights in use: {}", self.lights_in_use)?;
        writeln!(f, "host calls: {}", self.host_calls)?;
        write!(f, "player mana: {:.1}", self.player_mana)
    }
}

/// Plays `scenario` for `ticks` steps of `step` each.
pub(crate) fn run(scenario: Scenario, config: WorldConfig, ticks: u32, step: Duration) -> Report {
    let mut session = Session::new(config, stage(scenario));
    for command in opening(scenario) {
        session.submit(command);
    }
    for _ in 0..ticks {
        session.submit(Command::Tick { dt: step });
    }

    let report = summarize(scenario, &session);
    info!(?scenario, launched = report.launched, freed = report.freed, "scenario finished");
    report
}

fn stage(scenario: Scenario) -> HeadlessHost {
    let mut host = HeadlessHost::with_player();
    match scenario {
        Scenario::Fireball => host.insert_actor(
            ENEMY,
            HeadlessActor::new(ActorKind::Npc, Vec3::new(0.0, 0.0, 1_500.0))
                .with_group(HOSTILE_GROUP)
                .with_radius(40.0),
        ),
        Scenario::Dispel => host.insert_actor(
            ENEMY,
            HeadlessActor::new(ActorKind::Npc, Vec3::new(300.0, 0.0, 0.0))
                .with_group(HOSTILE_GROUP)
                .with_orientation(Orientation::new(90.0, 0.0))
                .with_target_of_interest(EntityId::PLAYER),
        ),
        Scenario::Speed => {}
    }
    host
}

fn opening(scenario: Scenario) -> Vec<Command> {
    let player = |archetype| LaunchRequest::new(archetype, EntityId::PLAYER).with_level(CASTER_LEVEL);
    match scenario {
        Scenario::Fireball => vec![Command::Launch {
            slot: SlotId::new(0),
            request: player(Archetype::Fireball),
        }],
        Scenario::Speed => vec![Command::Launch {
            slot: SlotId::new(0),
            request: player(Archetype::Speed),
        }],
        Scenario::Dispel => vec![
            Command::Launch {
                slot: SlotId::new(0),
                request: LaunchRequest::new(Archetype::Invisibility, ENEMY).with_level(2.0),
            },
            Command::Launch {
                slot: SlotId::new(1),
                request: player(Archetype::DispelIllusion),
            },
        ],
    }
}

fn summarize(scenario: Scenario, session: &Session) -> Report {
    let count = |matches: fn(&Event) -> bool| session.log().iter().filter(|event| matches(event)).count();
    let world = session.world();

    Report {
        scenario,
        elapsed: query::clock(world),
        launched: count(|event| matches!(event, Event::SpellLaunched { .. })),
        detonations: count(|event| matches!(event, Event::Detonated { .. })),
        cancellations: count(|event| matches!(event, Event::SpellCancelled { .. })),
        freed: count(|event| matches!(event, Event::SlotFreed { .. })),
        rejected: count(|event| matches!(event, Event::CommandRejected { .. })),
        live_slots: query::spell_view(world).iter().count(),
        lights_in_use: query::light_stats(world).in_use,
        host_calls: session.host_calls(),
        player_mana: session
            .host()
            .actor_state(EntityId::PLAYER)
            .map_or(0.0, |player| player.mana),
    }
}
