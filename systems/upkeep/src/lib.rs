#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Charges casters for their sustained spells.

use std::{collections::BTreeMap, time::Duration};

use spellbound_core::{Command, EntityId, Event, UpkeepSnapshot};
use tracing::trace;

/// Pure system that converts elapsed time into mana drain commands.
#[derive(Debug, Default)]
pub struct Upkeep;

impl Upkeep {
    /// Consumes world events and the current upkeep view to emit one drain
    /// command per paying caster, ordered by caster.
    pub fn handle(&mut self, events: &[Event], upkeep: &[UpkeepSnapshot], out: &mut Vec<Command>) {
        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        if elapsed.is_zero() {
            return;
        }

        let mut owed: BTreeMap<EntityId, f32> = BTreeMap::new();
        for snapshot in upkeep {
            *owed.entry(snapshot.caster).or_default() +=
                snapshot.mana_per_second * elapsed.as_secs_f32();
        }

        for (caster, amount) in owed {
            if amount <= 0.0 {
                continue;
            }
            trace!(?caster, amount, "charging upkeep");
            out.push(Command::DrainMana { caster, amount });
        }
    }
}
