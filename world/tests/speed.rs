mod support;

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{
    ActorKind, Archetype, Command, EntityId, Event, LaunchRequest, PlaybackMode, SlotId,
    SoundCue,
};
use spellbound_headless::{HeadlessActor, HeadlessHost, HostCall};
use spellbound_world::query;
use support::Harness;

const SLOT: SlotId = SlotId::new(4);

fn looped_plays(calls: &[HostCall]) -> Vec<Option<spellbound_core::VoiceHandle>> {
    calls
        .iter()
        .filter_map(|call| match call {
            HostCall::Play {
                mode: PlaybackMode::Looped,
                voice,
                ..
            } => Some(*voice),
            _ => None,
        })
        .collect()
}

fn cue_count(calls: &[HostCall], wanted: SoundCue) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, HostCall::Play { cue, .. } if *cue == wanted))
        .count()
}

#[test]
fn self_buff_lifecycle_uses_one_voice_and_one_registration() {
    let mut harness = Harness::new(HeadlessHost::with_player());

    let events = harness.launch(4, LaunchRequest::new(Archetype::Speed, EntityId::PLAYER));
    assert!(events.contains(&Event::SpellLaunched {
        slot: SLOT,
        archetype: Archetype::Speed,
        time_to_live: Duration::from_secs(20),
    }));
    let voices = looped_plays(harness.host.calls());
    assert_eq!(voices.len(), 1);
    let voice = voices[0].expect("loop voice allocated");
    assert_eq!(harness.host.active_effects_on(EntityId::PLAYER), vec![SLOT]);

    let _ = harness.run(10);
    let snapshot = query::spell(&harness.world, SLOT).expect("buff active");
    assert_eq!(snapshot.time_to_live, Duration::from_millis(19_500));
    assert_eq!(snapshot.voice, Some(voice));

    let before = harness.host.calls().len();
    let _ = harness.apply(Command::EndSpell { slot: SLOT });
    let calls = &harness.host.calls()[before..];
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, HostCall::Stop { .. }))
            .collect::<Vec<_>>(),
        vec![&HostCall::Stop { voice }]
    );
    assert_eq!(cue_count(calls, SoundCue::SpeedEnd), 1);
    assert_eq!(harness.host.active_voice_count(), 0);

    let _ = harness.apply(Command::KillSpell { slot: SLOT });
    let _ = harness.apply(Command::FreeSlot { slot: SLOT });
    assert!(!query::is_live(&harness.world, SLOT));

    let registrations: Vec<&HostCall> = harness
        .host
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::Register { .. } | HostCall::Unregister { .. }))
        .collect();
    assert_eq!(
        registrations,
        vec![
            &HostCall::Register {
                entity: EntityId::PLAYER,
                slot: SLOT,
            },
            &HostCall::Unregister {
                entity: EntityId::PLAYER,
                slot: SLOT,
            },
        ]
    );
    assert!(harness.host.active_effects_on(EntityId::PLAYER).is_empty());
}

#[test]
fn buff_on_npc_is_unbounded_and_silent() {
    let ally = EntityId::new(5);
    let caster = EntityId::new(6);
    let mut host = HeadlessHost::with_player();
    host.insert_actor(ally, HeadlessActor::new(ActorKind::Npc, Vec3::new(0.0, 0.0, 200.0)));
    host.insert_actor(caster, HeadlessActor::new(ActorKind::Npc, Vec3::ZERO));
    let mut harness = Harness::new(host);

    let _ = harness.launch(0, LaunchRequest::new(Archetype::Speed, caster).with_target(ally));

    let snapshot = query::spell(&harness.world, SlotId::new(0)).expect("buff active");
    assert_eq!(snapshot.time_to_live, spellbound_core::UNBOUNDED_LIFETIME);
    assert_eq!(snapshot.target, Some(ally));
    assert_eq!(snapshot.voice, None);
    assert!(looped_plays(harness.host.calls()).is_empty());
    assert_eq!(harness.host.active_effects_on(ally), vec![SlotId::new(0)]);

    let _ = harness.host.take_calls();
    let _ = harness.apply(Command::EndSpell { slot: SlotId::new(0) });
    let calls = harness.host.take_calls();
    assert!(!calls.iter().any(|call| matches!(call, HostCall::Stop { .. })));
    assert_eq!(cue_count(&calls, SoundCue::SpeedEnd), 1);
}

#[test]
fn explicit_duration_overrides_default_and_expires() {
    let mut harness = Harness::new(HeadlessHost::with_player());
    let _ = harness.launch(
        1,
        LaunchRequest::new(Archetype::Speed, EntityId::PLAYER)
            .with_duration(Duration::from_millis(300)),
    );

    let events = harness.run(6);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::LifetimeExpired { .. }))
            .count(),
        1
    );
    assert!(!query::is_live(&harness.world, SlotId::new(1)));
    assert_eq!(harness.host.active_voice_count(), 0);

    let mana = harness
        .host
        .actor_state(EntityId::PLAYER)
        .map(|player| player.mana)
        .expect("player exists");
    // Six 50 ms ticks at 2 mana per second.
    assert!((mana - 99.4).abs() < 1e-3, "mana was {mana}");
}

#[test]
fn loop_voice_follows_the_target() {
    let mut harness = Harness::new(HeadlessHost::with_player());
    let _ = harness.launch(0, LaunchRequest::new(Archetype::Speed, EntityId::PLAYER));
    let voice = query::spell(&harness.world, SlotId::new(0))
        .and_then(|spell| spell.voice)
        .expect("loop voice");

    let moved = Vec3::new(10.0, 0.0, 30.0);
    if let Some(player) = harness.host.actor_state_mut(EntityId::PLAYER) {
        player.position = moved;
    }
    let _ = harness.run(1);

    assert_eq!(harness.host.voice_position(voice), Some(moved));
    let effect = query::spell(&harness.world, SlotId::new(0))
        .and_then(|spell| spell.effect)
        .expect("aura");
    assert_eq!(effect.position, moved);
}
