//! Fire projectile that lights its path and detonates on first contact.

use std::time::Duration;

use glam::Vec3;
use rand::Rng;
use spellbound_core::{
    ActorKind, ActorSnapshot, AreaDamage, DamageFlags, EntityId, Event, FireballTuning, Host,
    LaunchRequest, LightColor, LightHandle, Orientation, PlaybackMode, QueryFilter, SoundCue,
    Sphere, TailEmission, UP,
};
use tracing::{debug, trace};

use super::{SpellBehavior, SpellContext};
use crate::{
    fx::{Effect, FireballFx},
    table::SpellInstance,
};

/// Height of an NPC's casting hand above its origin.
const NPC_HAND_HEIGHT: f32 = 80.0;
/// Reach of an NPC's casting hand along its heading.
const NPC_HAND_REACH: f32 = 30.0;

pub(crate) struct Fireball;

impl SpellBehavior for Fireball {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        request: &LaunchRequest,
    ) {
        let tuning = ctx.tuning;
        let caster = ctx.host.actor(instance.caster);

        let origin = launch_origin(instance, caster, request.hand);
        let aim = aim(ctx, instance.caster, caster).normalized();
        let spawn = origin + aim.forward_xz() * tuning.fireball.spawn_offset;
        let velocity = aim.direction() * tuning.fireball.speed;

        // The controller owns the flight time; explicit durations do not apply.
        instance.attach_effect(Effect::Fireball(FireballFx::new(
            spawn,
            velocity,
            tuning.fireball.duration(),
        )));

        ctx.play_once(SoundCue::FireLaunch, Some(instance.caster_position));
        instance.voice = ctx.host.play(
            SoundCue::FireWind,
            Some(instance.caster_position),
            1.0,
            PlaybackMode::Looped,
        );
    }

    fn update<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        dt: Duration,
    ) {
        let spells = ctx.tuning;
        let tuning = &spells.fireball;
        let Some(Effect::Fireball(fx)) = instance.effect.as_mut() else {
            return;
        };

        fx.advance(dt);
        let position = fx.position();
        track_light(ctx, &mut instance.light, position, tuning);

        if !dt.is_zero() {
            let emission = trail_emission(fx, instance.level, tuning, &mut *ctx.rng);
            fx.set_emission(emission);

            if !fx.detonated() {
                let sphere = Sphere {
                    center: position,
                    radius: (instance.level * tuning.query_radius_per_level)
                        .max(tuning.min_query_radius),
                };
                let struck =
                    ctx.host
                        .query_sphere(sphere, instance.caster, QueryFilter::ExcludeSameGroup);
                if let Some(struck) = struck {
                    if fx.detonate(tuning.fade()) {
                        instance.time_to_live = instance.time_to_live.min(tuning.fade());
                        detonate(ctx, instance, position, struck);
                    }
                }
            }
        }

        if let Some(voice) = instance.voice {
            ctx.host.refresh_position(voice, position);
        }
    }

    fn end<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
        ctx.stop_voice(instance);
    }

    fn kill<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
        let Some(light) = instance.light.take() else {
            return;
        };
        let fade = ctx.tuning.fireball.light_fade();
        if ctx.lights.detach(light, fade) {
            ctx.events.push(Event::LightDetached { light, fade });
        }
    }
}

fn launch_origin(
    instance: &SpellInstance,
    caster: Option<ActorSnapshot>,
    hand: Option<Vec3>,
) -> Vec3 {
    if instance.caster.is_player() {
        if let Some(hand) = hand {
            return hand;
        }
    }

    match caster {
        Some(actor) if actor.kind == ActorKind::Npc => {
            instance.caster_position
                + actor.orientation.normalized().forward_xz() * NPC_HAND_REACH
                + UP * NPC_HAND_HEIGHT
        }
        _ => instance.caster_position,
    }
}

/// The player aims with the camera; NPCs keep their heading and pitch toward
/// whatever they are focused on.
fn aim<H: Host + ?Sized>(
    ctx: &SpellContext<'_, H>,
    caster_id: EntityId,
    caster: Option<ActorSnapshot>,
) -> Orientation {
    let Some(caster) = caster else {
        return Orientation::default();
    };
    if caster_id.is_player() {
        return caster.orientation;
    }

    let mut start = caster.position;
    if caster.kind == ActorKind::Npc {
        start += UP * NPC_HAND_HEIGHT;
    }

    let elevation = caster
        .target_of_interest
        .and_then(|focus| ctx.position_of(focus).ok())
        .map_or(0.0, |end| {
            let horizontal = Vec3::new(end.x - start.x, 0.0, end.z - start.z).length();
            let rise = (end - start).dot(UP);
            rise.atan2(horizontal).to_degrees()
        });

    Orientation::new(caster.orientation.heading, elevation)
}

fn track_light<H: Host + ?Sized>(
    ctx: &mut SpellContext<'_, H>,
    handle: &mut Option<LightHandle>,
    position: Vec3,
    tuning: &FireballTuning,
) {
    if !handle.is_some_and(|light| ctx.lights.is_valid(light)) {
        *handle = match ctx.lights.allocate() {
            Ok(light) => Some(light),
            Err(error) => {
                trace!(%error, "fireball travelling without light");
                None
            }
        };
    }

    let Some(light) = handle.and_then(|light| ctx.lights.get_mut(light)) else {
        return;
    };
    light.position = position;
    light.intensity = tuning.light_intensity;
    light.fall_start = tuning.light_fall_start;
    light.fall_end = tuning.light_fall_end;
    light.color = LightColor::new(
        1.0 - ctx.rng.gen::<f32>() * 0.3,
        0.6 - ctx.rng.gen::<f32>() * 0.1,
        0.3 - ctx.rng.gen::<f32>() * 0.1,
    );
}

/// Trail puffs ramp from intensity one toward the caster level during the
/// warm-up window, then trail at full intensity.
fn trail_emission(
    fx: &FireballFx,
    level: f32,
    tuning: &FireballTuning,
    rng: &mut impl Rng,
) -> Option<TailEmission> {
    if !fx.emitting() {
        return None;
    }

    let warmup = tuning.warmup();
    if fx.elapsed() >= warmup {
        return Some(TailEmission {
            intensity: level,
            trailing: true,
        });
    }

    if !rng.gen_bool(tuning.spawn_chance()) {
        return None;
    }
    let ramp = fx.elapsed().as_secs_f32() / warmup.as_secs_f32() * 10.0;
    Some(TailEmission {
        intensity: ramp.min(level).max(1.0),
        trailing: false,
    })
}

fn detonate<H: Host + ?Sized>(
    ctx: &mut SpellContext<'_, H>,
    instance: &SpellInstance,
    position: Vec3,
    struck: EntityId,
) {
    let tuning = &ctx.tuning.fireball;
    let (slot, caster, level) = (instance.slot, instance.caster, instance.level);
    let damage = AreaDamage {
        center: position,
        inner_radius: tuning.inner_radius_per_level * level,
        outer_radius: tuning.outer_radius_per_level * level,
        flags: DamageFlags::FIRE | DamageFlags::MAGICAL,
        source: caster,
    };

    debug!(?slot, ?struck, "fireball detonated");
    ctx.host.spawn_explosion(position, level);
    ctx.host.apply_area_damage(damage);
    ctx.play_once(SoundCue::FireHit, Some(position));
    ctx.host.notify_audible_event(position, caster);
    ctx.events.push(Event::Detonated {
        slot,
        position,
        struck,
    });
}
