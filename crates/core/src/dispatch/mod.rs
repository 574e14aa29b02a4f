//! Event dispatch
//!
//! Drives one dispatch cycle for a native event:
//!
//! ```text
//! table.insert(native) → descriptor builds ScriptedEvent → host object
//!     → listeners (registration order) → table.remove(handle) → outcome
//! ```
//!
//! Once a cycle ends, the back reference held by the scripted instance is
//! stale. Script that kept the object can still read its snapshotted fields,
//! while live fields such as `target` read as `null`.
//!
//! # Example
//!
//! ```ignore
//! use jsbridge_core::dispatch::EventDispatcher;
//! use jsbridge_core::events::NativeEventData;
//!
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.add_event_listener("intersectionchange", |ctx, event| {
//!     let ratio = ctx.get_property(event, "intersectionRatio")?;
//!     tracing::info!("ratio: {}", ratio);
//!     Ok(())
//! });
//!
//! let outcome = dispatcher.dispatch_intersection_change(
//!     &mut ctx,
//!     NativeEventData::new("intersectionchange"),
//!     0.5,
//! );
//! ```

pub mod queue;

use std::rc::Rc;

use jsbridge_engine::{ObjectId, ScriptContext, ScriptResult, ScriptValue};
use jsbridge_sdk as sdk;
use slotmap::{new_key_type, SlotMap};
use tracing::{trace, warn};

use crate::events::{
    CustomEventInstance, EventFlags, EventInstance, EventKind, EventPhase,
    IntersectionChangeEventInstance, NativeCustomEvent, NativeEventData, NativeEventHandle,
    NativeEventTable, NativeIntersectionChangeEvent, ScriptedEvent, TypeDescriptor,
};

pub use queue::{DispatchQueue, PendingDispatch, QueueError, QueueSender};

new_key_type! {
    /// Key for registered listeners, used for removal
    pub struct ListenerKey;
}

/// Listener callback
///
/// An `Err` is reported and the remaining listeners still run.
pub type EventListener = Rc<dyn Fn(&mut ScriptContext, ObjectId) -> ScriptResult<()>>;

struct Listener {
    event_type: String,
    callback: EventListener,
}

/// Result of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Script object of the dispatched event, owned by the engine from now on
    pub object: ObjectId,
    pub listeners_invoked: usize,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

/// Per-context listener registry and dispatch driver
#[derive(Default)]
pub struct EventDispatcher {
    listeners: SlotMap<ListenerKey, Listener>,
    /// Registration order; slotmap iteration order is not stable across removals
    order: Vec<ListenerKey>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events of `event_type`
    ///
    /// # Returns
    /// A key that can be used to unregister the listener via
    /// `remove_event_listener`.
    pub fn add_event_listener<F>(&mut self, event_type: impl Into<String>, callback: F) -> ListenerKey
    where
        F: Fn(&mut ScriptContext, ObjectId) -> ScriptResult<()> + 'static,
    {
        let key = self.listeners.insert(Listener {
            event_type: event_type.into(),
            callback: Rc::new(callback),
        });
        self.order.push(key);
        key
    }

    /// Remove a listener by its key
    ///
    /// Returns `true` if the listener was found and removed.
    pub fn remove_event_listener(&mut self, key: ListenerKey) -> bool {
        if self.listeners.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    /// Number of listeners registered for `event_type`
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .values()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listeners for `event_type` in registration order
    ///
    /// Snapshotted so listeners added during dispatch run next time.
    fn listeners_for(&self, event_type: &str) -> Vec<EventListener> {
        self.order
            .iter()
            .filter_map(|key| self.listeners.get(*key))
            .filter(|l| l.event_type == event_type)
            .map(|l| Rc::clone(&l.callback))
            .collect()
    }

    /// Dispatch a plain `Event`
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type))]
    pub fn dispatch_event(&self, ctx: &mut ScriptContext, event: NativeEventData) -> DispatchOutcome {
        self.dispatch(ctx, event, |ctx, handle, data| {
            let descriptor = TypeDescriptor::instance(ctx, EventKind::Event);
            EventInstance::from_native(descriptor, Some(handle), data).into()
        })
    }

    /// Dispatch an `IntersectionChangeEvent`
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type, intersection_ratio = intersection_ratio))]
    pub fn dispatch_intersection_change(
        &self,
        ctx: &mut ScriptContext,
        event: NativeEventData,
        intersection_ratio: f64,
    ) -> DispatchOutcome {
        self.dispatch(ctx, event, |ctx, handle, data| {
            let descriptor = TypeDescriptor::instance(ctx, EventKind::IntersectionChange);
            let record = NativeIntersectionChangeEvent::new(handle, intersection_ratio);
            IntersectionChangeEventInstance::from_native(descriptor, data, record).into()
        })
    }

    /// Dispatch a `CustomEvent` carrying `detail`
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type))]
    pub fn dispatch_custom(
        &self,
        ctx: &mut ScriptContext,
        event: NativeEventData,
        detail: ScriptValue,
    ) -> DispatchOutcome {
        self.dispatch(ctx, event, |ctx, handle, data| {
            let descriptor = TypeDescriptor::instance(ctx, EventKind::Custom);
            let record = NativeCustomEvent::new(handle, detail);
            CustomEventInstance::from_native(descriptor, data, record).into()
        })
    }

    /// Dispatch an intersection change handed down by the observer
    ///
    /// Returns `None` if `ptr` or its generic event is null.
    ///
    /// # Safety
    /// `ptr` must be null or point to a valid record for the duration of the
    /// call (see [`NativeIntersectionChangeEvent::read_raw`]).
    pub unsafe fn dispatch_raw_intersection_change(
        &self,
        ctx: &mut ScriptContext,
        ptr: *const sdk::NativeIntersectionChangeEvent,
        target: Option<ObjectId>,
    ) -> Option<DispatchOutcome> {
        let Some((event, ratio)) = NativeIntersectionChangeEvent::read_raw(ptr) else {
            warn!("Ignored null intersection change event");
            return None;
        };
        Some(self.dispatch_intersection_change(ctx, event.with_target(target), ratio))
    }

    /// Dispatch a `CustomEvent` handed down by native code
    ///
    /// Returns `None` if `ptr` or its generic event is null.
    ///
    /// # Safety
    /// Same contract as [`NativeCustomEvent::read_raw`].
    pub unsafe fn dispatch_raw_custom_event(
        &self,
        ctx: &mut ScriptContext,
        ptr: *const sdk::NativeCustomEvent,
        target: Option<ObjectId>,
    ) -> Option<DispatchOutcome> {
        let Some((event, detail)) = NativeCustomEvent::read_raw(ptr) else {
            warn!("Ignored null custom event");
            return None;
        };
        Some(self.dispatch_custom(ctx, event.with_target(target), detail))
    }

    fn dispatch<F>(&self, ctx: &mut ScriptContext, mut event: NativeEventData, build: F) -> DispatchOutcome
    where
        F: FnOnce(&mut ScriptContext, NativeEventHandle, &NativeEventData) -> ScriptedEvent,
    {
        event.phase = EventPhase::AtTarget;
        event.current_target = event.target;
        let event_type = event.event_type.clone();

        let handle = ctx
            .storage_mut()
            .get_or_insert_with(NativeEventTable::default)
            .insert(event.clone());
        let scripted = build(ctx, handle, &event);
        let object = ctx.insert_host_object(Box::new(scripted));

        let mut listeners_invoked = 0;
        for listener in self.listeners_for(&event_type) {
            listeners_invoked += 1;
            if let Err(e) = listener(ctx, object) {
                warn!("Listener for '{}' failed: {}", event_type, e);
            }

            let stopped = ctx.with_host::<ScriptedEvent, _, _>(object, |e| {
                e.base().immediate_propagation_stopped()
            });
            match stopped {
                Ok(Some(false)) => {}
                Ok(Some(true)) => {
                    trace!("'{}' stopped after {} listener(s)", event_type, listeners_invoked);
                    break;
                }
                _ => {
                    warn!("'{}' event object is gone; ending dispatch", event_type);
                    break;
                }
            }
        }

        let flags = ctx
            .with_host::<ScriptedEvent, _, _>(object, |e| e.base().flags())
            .ok()
            .flatten()
            .unwrap_or_default();

        if let Some(table) = ctx.storage_mut().get_mut::<NativeEventTable>() {
            table.remove(handle);
        }

        DispatchOutcome {
            object,
            listeners_invoked,
            default_prevented: flags.contains(EventFlags::DEFAULT_PREVENTED),
            propagation_stopped: flags.contains(EventFlags::PROPAGATION_STOPPED),
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
