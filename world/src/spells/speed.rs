//! Sustained haste on the caster or an ally.

use std::time::Duration;

use spellbound_core::{Host, LaunchRequest, PlaybackMode, SoundCue};

use super::{recover, SpellBehavior, SpellContext};
use crate::{
    fx::{AuraFx, Effect},
    table::SpellInstance,
};

pub(crate) struct Speed;

impl SpellBehavior for Speed {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        request: &LaunchRequest,
    ) {
        let tuning = ctx.tuning;
        if instance.caster.is_player() {
            instance.target = Some(instance.caster);
        }
        let target = *instance.target.get_or_insert(instance.caster);
        let position = recover(ctx.position_of(target), instance.caster_position);

        ctx.play_once(SoundCue::SpeedStart, Some(position));
        // The loop is reserved for buffs on the player.
        if target.is_player() {
            instance.voice =
                ctx.host
                    .play(SoundCue::SpeedLoop, Some(position), 1.0, PlaybackMode::Looped);
        }

        let default = if instance.caster.is_player() {
            tuning.speed.self_duration()
        } else {
            tuning.speed.other_duration()
        };
        instance.mana_per_second = tuning.speed.mana_per_second;
        instance.attach_effect(Effect::Aura(AuraFx::new(
            position,
            request.duration.unwrap_or(default),
        )));
        ctx.register(instance, target);
    }

    fn update<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        dt: Duration,
    ) {
        let anchor = instance
            .target
            .and_then(|target| ctx.position_of(target).ok());
        if let (Some(voice), Some(position)) = (instance.voice, anchor) {
            ctx.host.refresh_position(voice, position);
        }
        if let Some(Effect::Aura(aura)) = instance.effect.as_mut() {
            aura.advance(dt, anchor);
        }
    }

    fn end<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
        ctx.unregister(instance);
        ctx.stop_voice(instance);

        let last_known = match &instance.effect {
            Some(Effect::Aura(aura)) => aura.position(),
            _ => instance.caster_position,
        };
        let position = instance
            .target
            .and_then(|target| ctx.position_of(target).ok())
            .unwrap_or(last_known);
        ctx.play_once(SoundCue::SpeedEnd, Some(position));
    }
}
