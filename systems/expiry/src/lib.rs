#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Retires spells whose lifetime ran out.

use spellbound_core::{Command, Event};
use tracing::debug;

/// Pure system that answers expiry reports with the end, kill and free
/// sequence.
#[derive(Debug, Default)]
pub struct Expiry;

impl Expiry {
    /// Consumes world events and emits retirement commands in report order.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::LifetimeExpired { slot } = *event else {
                continue;
            };
            debug!(?slot, "retiring expired spell");
            out.extend([
                Command::EndSpell { slot },
                Command::KillSpell { slot },
                Command::FreeSlot { slot },
            ]);
        }
    }
}
