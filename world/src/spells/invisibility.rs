//! Upkeep-driven concealment; the only archetype without a visual controller.

use spellbound_core::{Host, LaunchRequest, SoundCue, UNBOUNDED_LIFETIME};

use super::{recover, SpellBehavior, SpellContext};
use crate::table::SpellInstance;

pub(crate) struct Invisibility;

impl SpellBehavior for Invisibility {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        request: &LaunchRequest,
    ) {
        let tuning = &ctx.tuning.invisibility;
        instance.time_to_live = request
            .duration
            .unwrap_or_else(|| tuning.duration())
            .min(UNBOUNDED_LIFETIME);
        instance.mana_per_second = tuning.mana_per_second;

        let target = *instance.target.get_or_insert(instance.caster);
        let position = recover(ctx.position_of(target), instance.caster_position);
        ctx.play_once(SoundCue::InvisibilityStart, Some(position));
        ctx.register(instance, target);
    }

    fn end<H: Host + ?Sized>(ctx: &mut SpellContext<'_, H>, instance: &mut SpellInstance) {
        ctx.unregister(instance);
        let position = instance
            .target
            .and_then(|target| ctx.position_of(target).ok())
            .unwrap_or(instance.caster_position);
        ctx.play_once(SoundCue::InvisibilityEnd, Some(position));
    }
}
