mod support;

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{
    ActorKind, Archetype, EntityId, Event, LaunchRequest, Orientation, SlotId, SoundCue,
    UNBOUNDED_LIFETIME,
};
use spellbound_headless::{HeadlessActor, HeadlessHost, HostCall};
use spellbound_world::query;
use support::{count, Harness};

fn satiation_calls(host: &HeadlessHost) -> usize {
    host.calls()
        .iter()
        .filter(|call| matches!(call, HostCall::RestoreSatiation { .. }))
        .count()
}

#[test]
fn player_feeding_themself_is_satiated() {
    let mut harness = Harness::new(HeadlessHost::with_player());
    let _ = harness.launch(0, LaunchRequest::new(Archetype::CreateFood, EntityId::PLAYER));

    assert_eq!(satiation_calls(&harness.host), 1);
    let player = harness.host.actor_state(EntityId::PLAYER).expect("player");
    assert!(player.satiation > 0.0);
    let snapshot = query::spell(&harness.world, SlotId::new(0)).expect("food conjured");
    assert_eq!(snapshot.time_to_live, Duration::from_millis(3_500));
    assert!(harness
        .host
        .calls()
        .iter()
        .any(|call| matches!(call, HostCall::Play { cue: SoundCue::CreateFood, position: Some(position), .. } if *position == Vec3::ZERO)));
}

#[test]
fn conjuring_for_others_does_not_feed_anyone() {
    let npc = EntityId::new(4);
    let mut host = HeadlessHost::with_player();
    host.insert_actor(npc, HeadlessActor::new(ActorKind::Npc, Vec3::new(50.0, 0.0, 0.0)));
    let mut harness = Harness::new(host);

    let _ = harness.launch(0, LaunchRequest::new(Archetype::CreateFood, EntityId::PLAYER).with_target(npc));
    let _ = harness.launch(1, LaunchRequest::new(Archetype::CreateFood, npc));

    assert_eq!(satiation_calls(&harness.host), 0);
}

#[test]
fn explicit_duration_sets_conjuration_lifetime() {
    let mut harness = Harness::new(HeadlessHost::with_player());
    let _ = harness.launch(
        0,
        LaunchRequest::new(Archetype::CreateFood, EntityId::PLAYER)
            .with_duration(Duration::from_millis(200)),
    );

    let _ = harness.run(3);
    assert!(query::is_live(&harness.world, SlotId::new(0)));
    let _ = harness.run(1);
    assert!(!query::is_live(&harness.world, SlotId::new(0)));
}

#[test]
fn player_shards_start_at_ground_level_ahead() {
    let mut host = HeadlessHost::with_player();
    if let Some(player) = host.actor_state_mut(EntityId::PLAYER) {
        player.position = Vec3::new(100.0, -160.0, 0.0);
        player.orientation = Orientation::new(-90.0, 25.0);
    }
    let mut harness = Harness::new(host);
    let _ = harness.launch(0, LaunchRequest::new(Archetype::IceProjectile, EntityId::PLAYER));

    let snapshot = query::spell(&harness.world, SlotId::new(0)).expect("shards");
    assert_eq!(snapshot.time_to_live, Duration::from_millis(4_200));
    let effect = snapshot.effect.expect("controller");
    // Heading -90 faces +x; elevation is ignored.
    assert!(effect.position.abs_diff_eq(Vec3::new(250.0, 0.0, 0.0), 1e-3));
    assert!(effect.velocity.abs_diff_eq(Vec3::new(400.0, 0.0, 0.0), 1e-3));

    let _ = harness.run(10);
    let effect = query::spell(&harness.world, SlotId::new(0))
        .and_then(|spell| spell.effect)
        .expect("controller");
    assert!(effect.position.abs_diff_eq(Vec3::new(450.0, 0.0, 0.0), 1e-2));
}

#[test]
fn npc_shards_ignore_explicit_duration() {
    let npc = EntityId::new(8);
    let mut host = HeadlessHost::with_player();
    host.insert_actor(
        npc,
        HeadlessActor::new(ActorKind::Npc, Vec3::new(0.0, -40.0, 0.0))
            .with_orientation(Orientation::new(180.0, 0.0)),
    );
    let mut harness = Harness::new(host);
    let _ = harness.launch(
        3,
        LaunchRequest::new(Archetype::IceProjectile, npc).with_duration(Duration::from_secs(1)),
    );

    let snapshot = query::spell(&harness.world, SlotId::new(3)).expect("shards");
    assert_eq!(snapshot.time_to_live, Duration::from_millis(4_200));
    let effect = snapshot.effect.expect("controller");
    assert!(effect.position.abs_diff_eq(Vec3::new(0.0, -40.0, -150.0), 1e-3));
}

#[test]
fn invisibility_runs_without_a_controller() {
    let mut harness = Harness::new(HeadlessHost::with_player());
    let _ = harness.launch(
        0,
        LaunchRequest::new(Archetype::Invisibility, EntityId::PLAYER)
            .with_duration(Duration::from_millis(500)),
    );

    let snapshot = query::spell(&harness.world, SlotId::new(0)).expect("concealed");
    assert_eq!(snapshot.effect, None);
    assert_eq!(snapshot.target, Some(EntityId::PLAYER));
    assert!((snapshot.mana_per_second - 3.0).abs() < f32::EPSILON);
    assert_eq!(harness.host.active_effects_on(EntityId::PLAYER), vec![SlotId::new(0)]);

    let _ = harness.run(9);
    assert_eq!(
        query::spell(&harness.world, SlotId::new(0)).map(|spell| spell.time_to_live),
        Some(Duration::from_millis(50))
    );
    let _ = harness.run(1);
    assert!(!query::is_live(&harness.world, SlotId::new(0)));
    assert!(harness.host.active_effects_on(EntityId::PLAYER).is_empty());
    let ends = harness
        .host
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::Play { cue: SoundCue::InvisibilityEnd, .. }))
        .count();
    assert_eq!(ends, 1);
}

#[test]
fn unknown_caster_launches_from_the_origin() {
    let stranger = EntityId::new(42);
    let mut harness = Harness::new(HeadlessHost::new());

    let mut events = harness.launch(0, LaunchRequest::new(Archetype::Fireball, stranger).with_level(3.0));
    events.extend(harness.launch(1, LaunchRequest::new(Archetype::Speed, stranger)));
    events.extend(harness.launch(2, LaunchRequest::new(Archetype::IceProjectile, stranger)));
    assert_eq!(count(&events, |event| matches!(event, Event::SpellLaunched { .. })), 3);

    let fireball = query::spell(&harness.world, SlotId::new(0))
        .and_then(|spell| spell.effect)
        .expect("fireball controller");
    assert!(fireball.velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 1_000.0), 1e-2));

    let speed = query::spell(&harness.world, SlotId::new(1)).expect("buff active");
    assert_eq!(speed.target, Some(stranger));
    assert_eq!(speed.time_to_live, UNBOUNDED_LIFETIME);
    assert_eq!(speed.effect.map(|effect| effect.position), Some(Vec3::ZERO));

    let shards = query::spell(&harness.world, SlotId::new(2))
        .and_then(|spell| spell.effect)
        .expect("shards controller");
    assert!(shards.position.abs_diff_eq(Vec3::new(0.0, 0.0, 150.0), 1e-3));

    events.extend(harness.run(5));
    assert_eq!(count(&events, |event| matches!(event, Event::CommandRejected { .. })), 0);
    for slot in 0..3 {
        assert!(query::is_live(&harness.world, SlotId::new(slot)));
    }
}
