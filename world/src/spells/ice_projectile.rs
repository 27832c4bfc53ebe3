//! Straight volley of ice shards along the caster's heading.

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{Host, LaunchRequest, Orientation, SoundCue};

use super::{SpellBehavior, SpellContext};
use crate::{
    fx::{Effect, ShardFx},
    table::SpellInstance,
};

pub(crate) struct IceProjectile;

impl SpellBehavior for IceProjectile {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        _request: &LaunchRequest,
    ) {
        let tuning = &ctx.tuning.ice_projectile;
        let (forward_offset, ground_offset, speed, duration) = (
            tuning.forward_offset,
            tuning.player_ground_offset,
            tuning.speed,
            tuning.duration(),
        );

        let caster = ctx.host.actor(instance.caster);
        let heading = caster.map_or(0.0, |actor| actor.orientation.heading);
        // The player's position is at eye height; shards skim the ground.
        let mut origin = instance.caster_position;
        if instance.caster.is_player() {
            origin += Vec3::new(0.0, ground_offset, 0.0);
        }

        let forward = Orientation::new(heading, 0.0).normalized().forward_xz();
        origin += forward * forward_offset;

        ctx.play_once(SoundCue::IceProjectileLaunch, Some(instance.caster_position));
        instance.attach_effect(Effect::Shards(ShardFx::new(
            origin,
            forward * speed,
            duration,
        )));
    }

    fn update<H: Host + ?Sized>(
        _ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        dt: Duration,
    ) {
        if let Some(Effect::Shards(shards)) = instance.effect.as_mut() {
            shards.advance(dt);
        }
    }
}
