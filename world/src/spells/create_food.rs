//! Conjures a meal for the caster.

use std::time::Duration;

use spellbound_core::{EntityId, Host, LaunchRequest, SoundCue};
use tracing::debug;

use super::{SpellBehavior, SpellContext};
use crate::{
    fx::{AuraFx, Effect},
    table::SpellInstance,
};

pub(crate) struct CreateFood;

impl SpellBehavior for CreateFood {
    fn launch<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        request: &LaunchRequest,
    ) {
        let duration = request
            .duration
            .unwrap_or_else(|| ctx.tuning.create_food.duration());

        ctx.play_once(SoundCue::CreateFood, Some(instance.caster_position));

        let target = instance.target.unwrap_or(instance.caster);
        if instance.caster.is_player() && target.is_player() {
            debug!(slot = ?instance.slot, "satiating player");
            ctx.host.restore_satiation(EntityId::PLAYER);
        }

        instance.attach_effect(Effect::Aura(AuraFx::new(instance.caster_position, duration)));
    }

    fn update<H: Host + ?Sized>(
        ctx: &mut SpellContext<'_, H>,
        instance: &mut SpellInstance,
        dt: Duration,
    ) {
        let anchor = ctx.position_of(instance.caster).ok();
        if let Some(Effect::Aura(aura)) = instance.effect.as_mut() {
            aura.advance(dt, anchor);
        }
    }
}
