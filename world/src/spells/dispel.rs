//! One-shot scan cancelling nearby invisibility.

use std::time::Duration;

use spellbound_core::{Archetype, Command, Host, LaunchRequest, Phase, SoundCue};
use tracing::debug;

use super::{SpellBehavior, SpellContext};
use crate::{
    fx::{Effect, RingFx},
    table::SpellInstance,
};

pub(crate) struct DispelIllusion;

impl SpellBehavior for DispelIllusion {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        _request: &LaunchRequest,
    ) {
        let tuning = &ctx.tuning.dispel;
        let radius = tuning.radius;
        let duration = tuning.duration();

        ctx.play_once(SoundCue::DispelIllusion, None);
        instance.attach_effect(Effect::Ring(RingFx::new(
            instance.caster_position,
            radius,
            duration,
        )));

        let victims: Vec<_> = ctx
            .peers
            .iter()
            .filter(|peer| peer.phase == Phase::Active && peer.archetype == Archetype::Invisibility)
            .filter(|peer| peer.level <= instance.level)
            .filter_map(|peer| {
                let target = peer.target?;
                if target == instance.caster {
                    return None;
                }
                // Unresolvable positions skip the candidate.
                let distance = ctx.host.distance(target, instance.caster)?;
                (distance < radius).then_some(peer.slot)
            })
            .collect();

        for victim in victims {
            debug!(dispel = ?instance.slot, ?victim, "dispelling illusion");
            ctx.follow_ups.push(Command::ForceEnd {
                slot: victim,
                by: Some(instance.slot),
            });
        }
    }

    fn update<H: Host + ?Sized>(
        _ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        dt: Duration,
    ) {
        if let Some(Effect::Ring(ring)) = instance.effect.as_mut() {
            ring.advance(dt);
        }
    }
}
