mod support;

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{
    ActorKind, Archetype, DamageFlags, EntityId, Event, LaunchRequest, SlotId,
};
use spellbound_headless::{HeadlessActor, HeadlessHost, HostCall};
use spellbound_world::query;
use support::{count, Harness};

const LEVEL: f32 = 5.0;
const SLOT: SlotId = SlotId::new(0);

fn fireball_over_open_ground() -> Harness {
    let mut host = HeadlessHost::with_player();
    // Off to the side of the flight path.
    host.insert_actor(
        EntityId::new(7),
        HeadlessActor::new(ActorKind::Npc, Vec3::new(1_000.0, 0.0, 0.0)).with_group(1),
    );
    let mut harness = Harness::new(host);
    let _ = harness.launch(0, LaunchRequest::new(Archetype::Fireball, EntityId::PLAYER).with_level(LEVEL));
    harness
}

fn area_damage(host: &HeadlessHost) -> Vec<spellbound_core::AreaDamage> {
    host.calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::AreaDamage(damage) => Some(*damage),
            _ => None,
        })
        .collect()
}

#[test]
fn warm_up_ramps_trail_without_detonating() {
    let mut harness = fireball_over_open_ground();
    let mut intensities = Vec::new();

    for tick in 1..=40 {
        let events = harness.run(1);
        assert_eq!(count(&events, |event| matches!(event, Event::Detonated { .. })), 0);

        let effect = query::spell(&harness.world, SLOT)
            .and_then(|spell| spell.effect)
            .expect("fireball has a controller");
        assert!(!effect.detonated);
        if tick < 40 {
            if let Some(emission) = effect.emission {
                assert!(!emission.trailing, "tick {tick} trails during warm-up");
                assert!(emission.intensity >= 1.0 && emission.intensity <= LEVEL);
                intensities.push(emission.intensity);
            }
        } else {
            let emission = effect.emission.expect("full trail after warm-up");
            assert!(emission.trailing);
            assert!((emission.intensity - LEVEL).abs() < f32::EPSILON);
        }
    }

    assert!(!intensities.is_empty(), "warm-up never spawned particles");
    assert!(intensities.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(area_damage(&harness.host).is_empty());
}

#[test]
fn blocker_triggers_exactly_one_detonation() {
    let mut harness = fireball_over_open_ground();
    let _ = harness.run(40);

    let before = query::spell(&harness.world, SLOT).expect("fireball in flight");
    let effect = before.effect.expect("controller");
    let next_position = effect.position + effect.velocity * support::STEP.as_secs_f32();
    let blocker = EntityId::new(9);
    harness.host.insert_actor(
        blocker,
        HeadlessActor::new(ActorKind::Npc, next_position).with_group(1),
    );

    let events = harness.run(1);
    assert_eq!(
        count(&events, |event| matches!(event, Event::Detonated { struck, .. } if *struck == blocker)),
        1
    );
    let after = query::spell(&harness.world, SLOT).expect("fireball fading");
    assert_eq!(after.time_to_live, Duration::from_millis(1_500));
    let effect = after.effect.expect("controller");
    assert!(effect.detonated);
    assert!(!effect.emitting);
    assert_eq!(effect.emission, None);

    let damage = area_damage(&harness.host);
    assert_eq!(damage.len(), 1);
    assert!((damage[0].inner_radius - 15.0).abs() < f32::EPSILON);
    assert!((damage[0].outer_radius - 150.0).abs() < f32::EPSILON);
    assert_eq!(damage[0].flags, DamageFlags::FIRE | DamageFlags::MAGICAL);
    assert_eq!(damage[0].source, EntityId::PLAYER);

    let events = harness.run(10);
    assert_eq!(count(&events, |event| matches!(event, Event::Detonated { .. })), 0);
    assert_eq!(area_damage(&harness.host).len(), 1);
    let explosions = harness
        .host
        .calls()
        .iter()
        .filter(|call| matches!(call, HostCall::Explosion { .. }))
        .count();
    assert_eq!(explosions, 1);
}

#[test]
fn detonated_fireball_retires_after_its_fade() {
    let mut harness = fireball_over_open_ground();
    let _ = harness.run(2);
    let position = query::spell(&harness.world, SLOT)
        .and_then(|spell| spell.effect)
        .map(|effect| effect.position)
        .expect("controller");
    harness.host.insert_actor(
        EntityId::new(9),
        HeadlessActor::new(ActorKind::Npc, position).with_radius(100.0).with_group(1),
    );
    let _ = harness.run(1);

    let events = harness.run(29);
    assert!(query::is_live(&harness.world, SLOT));
    assert_eq!(count(&events, |event| matches!(event, Event::LifetimeExpired { .. })), 0);

    let events = harness.run(1);
    assert_eq!(
        count(&events, |event| matches!(event, Event::LifetimeExpired { slot } if *slot == SLOT)),
        1
    );
    assert!(!query::is_live(&harness.world, SLOT));
    assert_eq!(harness.host.active_voice_count(), 0);
}

#[test]
fn npc_fireball_pitches_toward_its_focus() {
    let caster = EntityId::new(3);
    let mut host = HeadlessHost::with_player();
    host.insert_actor(
        caster,
        HeadlessActor::new(ActorKind::Npc, Vec3::new(0.0, 0.0, -1_000.0))
            .with_group(1)
            .with_target_of_interest(EntityId::PLAYER),
    );
    // The player stands 80 units below the caster's hand.
    let mut harness = Harness::new(host);
    let _ = harness.launch(2, LaunchRequest::new(Archetype::Fireball, caster).with_level(LEVEL));

    let effect = query::spell(&harness.world, SlotId::new(2))
        .and_then(|spell| spell.effect)
        .expect("controller");
    assert!(effect.velocity.z > 0.0);
    // y-down world: aiming at something lower means positive y velocity.
    assert!(effect.velocity.y > 0.0);
    assert!((effect.velocity.length() - 1_000.0).abs() < 1e-2);
}

#[test]
fn late_hit_never_extends_remaining_lifetime() {
    let mut harness = fireball_over_open_ground();
    let _ = harness.run(100);

    let before = query::spell(&harness.world, SLOT).expect("fireball in flight");
    assert_eq!(before.time_to_live, Duration::from_millis(1_000));
    let effect = before.effect.expect("controller");
    let next_position = effect.position + effect.velocity * support::STEP.as_secs_f32();
    harness.host.insert_actor(
        EntityId::new(9),
        HeadlessActor::new(ActorKind::Npc, next_position).with_group(1),
    );

    let events = harness.run(1);
    assert_eq!(count(&events, |event| matches!(event, Event::Detonated { .. })), 1);
    let after = query::spell(&harness.world, SLOT).expect("fireball fading");
    assert_eq!(after.time_to_live, Duration::from_millis(950));
    let effect = after.effect.expect("controller");
    assert!(effect.detonated);
    assert_eq!(effect.duration, Duration::from_secs(6));

    let _ = harness.run(18);
    assert!(query::is_live(&harness.world, SLOT));
    let events = harness.run(1);
    assert_eq!(
        count(&events, |event| matches!(event, Event::LifetimeExpired { slot } if *slot == SLOT)),
        1
    );
}

#[test]
fn fireball_passes_through_its_casters_allies() {
    let mut harness = fireball_over_open_ground();
    let _ = harness.run(10);

    let effect = query::spell(&harness.world, SLOT)
        .and_then(|spell| spell.effect)
        .expect("controller");
    let next_position = effect.position + effect.velocity * support::STEP.as_secs_f32();
    let ally = EntityId::new(4);
    harness.host.insert_actor(
        ally,
        HeadlessActor::new(ActorKind::Npc, next_position)
            .with_group(0)
            .with_radius(50.0),
    );

    let events = harness.run(3);
    assert_eq!(count(&events, |event| matches!(event, Event::Detonated { .. })), 0);
    let effect = query::spell(&harness.world, SLOT)
        .and_then(|spell| spell.effect)
        .expect("still in flight");
    assert!(!effect.detonated);
    assert!(area_damage(&harness.host).is_empty());
}
