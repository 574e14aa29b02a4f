//! Context-keyed storage
//!
//! Bindings keep their per-context state (descriptor registries, native event
//! tables, configuration) here instead of in process-wide statics, so the
//! state is dropped together with the context that owns it.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-indexed storage owned by a single [`ScriptContext`](crate::ScriptContext)
///
/// Holds at most one value per type.
#[derive(Default)]
pub struct ContextStorage {
    slots: HashMap<TypeId, Box<dyn Any>>,
}

impl ContextStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the stored value of type `T`
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
    }

    /// Get the stored value of type `T` mutably
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_mut::<T>())
    }

    /// Store a value, returning the previous value of the same type
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.slots
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Get the stored value of type `T`, creating it on first use
    pub fn get_or_insert_with<T: 'static, F>(&mut self, init: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let slot = self
            .slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()));
        // The slot was keyed by `TypeId::of::<T>()`, so the downcast holds
        match slot.downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("context storage slot holds a foreign type"),
        }
    }

    /// Remove and return the stored value of type `T`
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Check if a value of type `T` is stored
    pub fn contains<T: 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
