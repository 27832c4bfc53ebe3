mod support;

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{
    ActorKind, Archetype, Command, EntityId, Event, Light, LightHandle, LaunchRequest,
    SlotId, SpellSnapshot,
};
use spellbound_headless::{HeadlessActor, HeadlessHost, HostCall};
use spellbound_world::{query, WorldConfig};
use support::Harness;

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    calls: Vec<HostCall>,
    spells: Vec<SpellSnapshot>,
    lights: Vec<(LightHandle, Light)>,
}

fn scripted_commands() -> Vec<Command> {
    let player = EntityId::PLAYER;
    let npc = EntityId::new(5);
    let mut commands = vec![
        Command::Launch {
            slot: SlotId::new(0),
            request: LaunchRequest::new(Archetype::Fireball, player).with_level(4.0),
        },
        Command::Launch {
            slot: SlotId::new(1),
            request: LaunchRequest::new(Archetype::Invisibility, npc).with_level(2.0),
        },
        Command::Launch {
            slot: SlotId::new(2),
            request: LaunchRequest::new(Archetype::Speed, player),
        },
    ];
    commands.extend((0..30).map(|_| Command::Tick {
        dt: Duration::from_millis(33),
    }));
    commands.push(Command::Launch {
        slot: SlotId::new(3),
        request: LaunchRequest::new(Archetype::DispelIllusion, player).with_level(3.0),
    });
    commands.extend((0..40).map(|step| Command::Tick {
        dt: Duration::from_millis(20 + step % 3 * 15),
    }));
    commands
}

fn replay(commands: Vec<Command>, seed: u64) -> ReplayOutcome {
    let mut host = HeadlessHost::with_player();
    host.insert_actor(
        EntityId::new(5),
        HeadlessActor::new(ActorKind::Npc, Vec3::new(200.0, 0.0, 900.0)).with_group(1),
    );
    let config = WorldConfig {
        rng_seed: seed,
        ..WorldConfig::default()
    };
    let mut harness = Harness::with_config(config, host);
    for command in commands {
        let _ = harness.submit(command);
    }

    ReplayOutcome {
        events: harness.log.clone(),
        calls: harness.host.calls().to_vec(),
        spells: query::spell_view(&harness.world).into_vec(),
        lights: query::lights(&harness.world),
    }
}

#[test]
fn replay_is_deterministic() {
    let first = replay(scripted_commands(), 0x1234);
    let second = replay(scripted_commands(), 0x1234);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::SpellCancelled { .. })));
    assert!(!first
        .events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
}

#[test]
fn reset_replays_like_a_fresh_world() {
    let host = HeadlessHost::with_player();
    let mut harness = Harness::new(host);
    for command in scripted_commands() {
        let _ = harness.submit(command);
    }
    let _ = harness.submit(Command::Reset);
    assert_eq!(query::spell_view(&harness.world).iter().count(), 0);
    assert_eq!(query::light_stats(&harness.world).in_use, 0);
    assert_eq!(harness.host.active_voice_count(), 0);

    let mut fresh = Harness::new(HeadlessHost::with_player());
    let command = Command::Launch {
        slot: SlotId::new(0),
        request: LaunchRequest::new(Archetype::Fireball, EntityId::PLAYER),
    };
    let reused = harness.submit(command.clone());
    let expected = fresh.submit(command);
    assert_eq!(reused, expected);

    let _ = harness.run(5);
    let _ = fresh.run(5);
    let colors = |lights: Vec<(LightHandle, Light)>| {
        lights.into_iter().map(|(_, light)| light.color).collect::<Vec<_>>()
    };
    let after_reset = colors(query::lights(&harness.world));
    assert_eq!(after_reset.len(), 1);
    assert_eq!(after_reset, colors(query::lights(&fresh.world)));
}
