//! Fixed-capacity arenas that hand out generation-checked handles.
//!
//! Pools never grow past the capacity they were created with. When every slot
//! is in use [`HandlePool::allocate`] fails with [`PoolError::Exhausted`] and
//! callers are expected to carry on without the resource.

use slotmap::{new_key_type, Key, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Handle to a dynamic light owned by the world.
    pub struct LightHandle;

    /// Handle to a looping voice allocated by an [`AudioBackend`](crate::AudioBackend).
    pub struct VoiceHandle;
}

/// Reasons a pool operation may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Every slot of the pool is currently allocated.
    #[error("pool exhausted: all {capacity} slots are in use")]
    Exhausted {
        /// Fixed capacity of the pool that ran out of slots.
        capacity: usize,
    },
}

/// Fixed-capacity arena addressed through typed keys.
///
/// Released keys become stale: the underlying slot's version advances, so a
/// stale key never aliases whatever reuses the slot.
#[derive(Clone, Debug)]
pub struct HandlePool<K: Key, T> {
    values: SlotMap<K, T>,
    capacity: usize,
}

impl<K: Key, T> HandlePool<K, T> {
    /// Creates an empty pool with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    /// Total number of values the pool may hold at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether no value is allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reports whether every slot is allocated.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    /// Stores `value` and returns its key.
    pub fn allocate(&mut self, value: T) -> Result<K, PoolError> {
        if self.is_full() {
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
            });
        }
        Ok(self.values.insert(value))
    }

    /// Releases the value referenced by `key`.
    ///
    /// Returns `None` for stale or foreign keys, so releasing twice is
    /// harmless.
    pub fn release(&mut self, key: K) -> Option<T> {
        self.values.remove(key)
    }

    /// Reports whether `key` still refers to a live value.
    #[must_use]
    pub fn is_valid(&self, key: K) -> bool {
        self.values.contains_key(key)
    }

    /// Borrows the value referenced by `key`.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        self.values.get(key)
    }

    /// Mutably borrows the value referenced by `key`.
    #[must_use]
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.values.get_mut(key)
    }

    /// Iterates over live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.values.iter()
    }

    /// Releases every value, invalidating all outstanding keys.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
