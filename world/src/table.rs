//! Fixed-capacity storage for spell instances.

use std::time::Duration;

use glam::Vec3;
use spellbound_core::{
    Archetype, EntityId, LightHandle, Phase, SlotError, SlotId, SpellSnapshot, UpkeepSnapshot,
    VoiceHandle,
};

use crate::fx::Effect;

/// State of a single occupied slot.
#[derive(Clone, Debug)]
pub(crate) struct SpellInstance {
    pub(crate) slot: SlotId,
    pub(crate) archetype: Archetype,
    pub(crate) caster: EntityId,
    pub(crate) target: Option<EntityId>,
    pub(crate) level: f32,
    /// Where the caster stood at launch.
    pub(crate) caster_position: Vec3,
    pub(crate) time_to_live: Duration,
    pub(crate) mana_per_second: f32,
    pub(crate) created_at: Duration,
    pub(crate) phase: Phase,
    pub(crate) expiry_reported: bool,
    /// Entity holding an active-effect registration for this slot.
    pub(crate) registered_on: Option<EntityId>,
    pub(crate) voice: Option<VoiceHandle>,
    pub(crate) light: Option<LightHandle>,
    pub(crate) effect: Option<Effect>,
}

impl SpellInstance {
    pub(crate) fn new(
        slot: SlotId,
        archetype: Archetype,
        caster: EntityId,
        target: Option<EntityId>,
        level: f32,
        caster_position: Vec3,
        created_at: Duration,
    ) -> Self {
        Self {
            slot,
            archetype,
            caster,
            target,
            level,
            caster_position,
            time_to_live: Duration::ZERO,
            mana_per_second: 0.0,
            created_at,
            phase: Phase::Active,
            expiry_reported: false,
            registered_on: None,
            voice: None,
            light: None,
            effect: None,
        }
    }

    /// Installs the visual controller and adopts the duration it reports.
    pub(crate) fn attach_effect(&mut self, effect: Effect) {
        self.time_to_live = effect.duration();
        self.effect = Some(effect);
    }

    pub(crate) fn snapshot(&self) -> SpellSnapshot {
        SpellSnapshot {
            slot: self.slot,
            archetype: self.archetype,
            caster: self.caster,
            target: self.target,
            level: self.level,
            time_to_live: self.time_to_live,
            mana_per_second: self.mana_per_second,
            created_at: self.created_at,
            phase: self.phase,
            voice: self.voice,
            light: self.light,
            effect: self.effect.as_ref().map(Effect::snapshot),
        }
    }

    pub(crate) fn upkeep(&self) -> Option<UpkeepSnapshot> {
        (self.phase == Phase::Active && self.mana_per_second > 0.0).then(|| UpkeepSnapshot {
            slot: self.slot,
            caster: self.caster,
            mana_per_second: self.mana_per_second,
        })
    }
}

/// Slot array; a slot exists exactly when it holds an instance.
#[derive(Clone, Debug)]
pub(crate) struct SpellTable {
    slots: Vec<Option<SpellInstance>>,
}

impl SpellTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len()).filter_map(|index| u32::try_from(index).ok().map(SlotId::new))
    }

    fn index(&self, slot: SlotId) -> Result<usize, SlotError> {
        usize::try_from(slot.get())
            .ok()
            .filter(|index| *index < self.slots.len())
            .ok_or(SlotError::OutOfRange)
    }

    /// Validates that `slot` can receive a launch.
    pub(crate) fn check_vacant(&self, slot: SlotId) -> Result<(), SlotError> {
        let index = self.index(slot)?;
        match self.slots[index] {
            Some(_) => Err(SlotError::Occupied),
            None => Ok(()),
        }
    }

    /// Validates that `slot` exists and is in `phase`.
    pub(crate) fn check_phase(&self, slot: SlotId, phase: Phase) -> Result<(), SlotError> {
        let index = self.index(slot)?;
        let instance = self.slots[index].as_ref().ok_or(SlotError::Vacant)?;
        if instance.phase == phase {
            return Ok(());
        }
        Err(match phase {
            Phase::Active => SlotError::NotActive,
            Phase::Ending => SlotError::NotEnding,
        })
    }

    pub(crate) fn get(&self, slot: SlotId) -> Option<&SpellInstance> {
        let index = self.index(slot).ok()?;
        self.slots[index].as_ref()
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut SpellInstance> {
        let index = self.index(slot).ok()?;
        self.slots[index].as_mut()
    }

    /// Removes the instance, leaving the slot vacant.
    ///
    /// Callers that only need exclusive access while other slots stay
    /// readable must hand the instance back through [`Self::restore`].
    pub(crate) fn take(&mut self, slot: SlotId) -> Option<SpellInstance> {
        let index = self.index(slot).ok()?;
        self.slots[index].take()
    }

    /// Puts an instance back into the slot it names.
    pub(crate) fn restore(&mut self, instance: SpellInstance) {
        if let Ok(index) = self.index(instance.slot) {
            debug_assert!(self.slots[index].is_none(), "restoring over a live slot");
            self.slots[index] = Some(instance);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SpellInstance> {
        self.slots.iter().flatten()
    }
}
