//! Dynamic light pool and the fade list for lights outliving their owner.

use std::time::Duration;

use spellbound_core::{
    Event, HandlePool, Light, LightFade, LightHandle, ResourceKind, SpellError,
};

/// Fixed-capacity light arena.
///
/// A light belongs either to one slot or to the fade list. Fading lights are
/// released by [`LightPool::advance`] once their fade elapses.
#[derive(Clone, Debug)]
pub(crate) struct LightPool {
    pool: HandlePool<LightHandle, Light>,
    fading: Vec<LightHandle>,
}

impl LightPool {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: HandlePool::with_capacity(capacity),
            fading: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn allocate(&mut self) -> Result<LightHandle, SpellError> {
        self.pool
            .allocate(Light::default())
            .map_err(|_| SpellError::ResourceExhausted(ResourceKind::Light))
    }

    pub(crate) fn is_valid(&self, handle: LightHandle) -> bool {
        self.pool.is_valid(handle)
    }

    pub(crate) fn get(&self, handle: LightHandle) -> Option<&Light> {
        self.pool.get(handle)
    }

    pub(crate) fn get_mut(&mut self, handle: LightHandle) -> Option<&mut Light> {
        self.pool.get_mut(handle)
    }

    /// Releases an owned light immediately.
    pub(crate) fn release(&mut self, handle: LightHandle) -> bool {
        self.fading.retain(|fading| *fading != handle);
        self.pool.release(handle).is_some()
    }

    /// Moves ownership of a light to the fade list.
    ///
    /// Returns `false` when the handle no longer refers to a live light.
    pub(crate) fn detach(&mut self, handle: LightHandle, fade: Duration) -> bool {
        let Some(light) = self.pool.get_mut(handle) else {
            return false;
        };
        light.fade = Some(LightFade {
            remaining: fade,
            total: fade,
        });
        if !self.fading.contains(&handle) {
            self.fading.push(handle);
        }
        true
    }

    /// Ages every fading light and releases the ones whose fade elapsed.
    pub(crate) fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let pool = &mut self.pool;
        self.fading.retain(|handle| {
            let Some(fade) = pool.get_mut(*handle).and_then(|light| light.fade.as_mut()) else {
                return false;
            };
            fade.remaining = fade.remaining.saturating_sub(dt);
            if !fade.remaining.is_zero() {
                return true;
            }
            let _ = pool.release(*handle);
            out_events.push(Event::LightExpired { light: *handle });
            false
        });
    }

    pub(crate) fn fading_count(&self) -> usize {
        self.fading.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.pool.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (LightHandle, &Light)> {
        self.pool.iter()
    }

    /// Releases every light. Fading lights are reported as expired.
    pub(crate) fn clear(&mut self, out_events: &mut Vec<Event>) {
        out_events.extend(
            self.fading
                .drain(..)
                .map(|light| Event::LightExpired { light }),
        );
        self.pool.clear();
    }
}
