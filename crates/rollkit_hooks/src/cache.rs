//! Per-entity attribute cache.
//!
//! Every [`Host`](crate::Host) owns a [`HookCache`]. Values preset by the
//! assembly step and values produced by the dispatcher live side by side:
//! a preset value is simply a value that was resolved before the first
//! request.
//!
//! # Slots
//!
//! A slot holds `Some(value)` for a resolved attribute, or `None` when a
//! nullable attribute resolved to nothing. Missing slots mean the attribute
//! has not been resolved yet.
//!
//! # Thread Safety
//!
//! Slots are written with insert-if-absent semantics under a
//! [`RwLock`], so the first stored value wins and later reads only take
//! the shared lock.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::hook::{Hook, HookValue};

/// Stored result of one attribute.
pub(crate) type Slot = Option<Arc<dyn HookValue>>;

/// Attribute values of one entity, keyed by hook name.
#[derive(Default)]
pub struct HookCache {
    slots: RwLock<HashMap<&'static str, Slot>>,
}

impl HookCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Presets `hook` to `value`, builder style.
    #[must_use]
    pub fn with<T: HookValue>(self, hook: Hook<T>, value: T) -> Self {
        self.set(hook, value);
        self
    }

    /// Stores `value` for `hook`, replacing any cached value.
    pub fn set<T: HookValue>(&self, hook: Hook<T>, value: T) {
        self.slots
            .write()
            .insert(hook.name(), Some(Arc::new(value)));
    }

    /// Returns true if a value (or a resolved null) is cached for `hook`.
    #[must_use]
    pub fn contains<T>(&self, hook: Hook<T>) -> bool {
        self.slots.read().contains_key(hook.name())
    }

    /// Drops the cached value of `hook` so the next access resolves it again.
    ///
    /// Returns true if a value was cached.
    pub fn invalidate<T>(&self, hook: Hook<T>) -> bool {
        self.slots.write().remove(hook.name()).is_some()
    }

    /// Drops every cached value, including preset ones.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Returns the number of cached slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Returns the cached slot for `name`, if any.
    pub(crate) fn slot(&self, name: &str) -> Option<Slot> {
        self.slots.read().get(name).cloned()
    }

    /// Stores `slot` unless a value is already present; returns the stored slot.
    pub(crate) fn insert_if_absent(&self, name: &'static str, slot: Slot) -> Slot {
        self.slots.write().entry(name).or_insert(slot).clone()
    }
}

impl fmt::Debug for HookCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read();
        let mut names: Vec<&str> = slots.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("HookCache").field("slots", &names).finish()
    }
}
