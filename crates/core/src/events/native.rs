//! Dispatch-owned native event table
//!
//! Generic native events live in a [`NativeEventTable`] stored in the
//! context for the duration of one dispatch. Native records and scripted
//! instances refer to them through a [`NativeEventHandle`]. The handle is a
//! slotmap key, so once dispatch removes the entry every later lookup returns
//! `None` instead of touching freed memory, even if the slot is reused.
//!
//! ```text
//! dispatch start ──► table.insert(event) ──► handle
//!                                              │
//!                    listeners read target ◄───┤  (live lookup)
//!                                              │
//! dispatch end   ──► table.remove(handle) ──► handle is stale
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use jsbridge_engine::ObjectId;
use jsbridge_sdk as sdk;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Non-owning reference to a generic native event
    pub struct NativeEventHandle;
}

/// Dispatch phase reported through `eventPhase`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EventPhase {
    #[default]
    None = 0,
    Capturing = 1,
    AtTarget = 2,
    Bubbling = 3,
}

impl EventPhase {
    pub const ALL: &'static [EventPhase] = &[
        EventPhase::None,
        EventPhase::Capturing,
        EventPhase::AtTarget,
        EventPhase::Bubbling,
    ];

    /// Name of the constant on the `Event` class object
    pub const fn constant_name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Capturing => "CAPTURING_PHASE",
            Self::AtTarget => "AT_TARGET",
            Self::Bubbling => "BUBBLING_PHASE",
        }
    }

    pub fn from_constant_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.constant_name() == name)
    }

    pub const fn as_number(self) -> f64 {
        self as u8 as f64
    }
}

/// Milliseconds since the Unix epoch
pub(crate) fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Generic part of a native event
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEventData {
    /// Event type, e.g. "intersectionchange"
    pub event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Creation time in milliseconds
    pub time_stamp: f64,
    /// Set if a native handler prevented the default action before dispatch
    pub default_prevented: bool,
    /// Script object of the event target
    pub target: Option<ObjectId>,
    /// Script object whose listeners are running
    pub current_target: Option<ObjectId>,
    pub phase: EventPhase,
}

impl NativeEventData {
    /// Create event data stamped with the current time
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            cancelable: false,
            time_stamp: now_millis(),
            default_prevented: false,
            target: None,
            current_target: None,
            phase: EventPhase::None,
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn with_target(mut self, target: Option<ObjectId>) -> Self {
        self.target = target;
        self
    }

    pub fn with_time_stamp(mut self, time_stamp: f64) -> Self {
        self.time_stamp = time_stamp;
        self
    }

    /// Copy a native event record
    ///
    /// Target pointers are opaque to the bridge and are not carried over; the
    /// dispatcher's caller supplies the script-side target.
    ///
    /// # Safety
    /// `ptr` must be null or point to a valid `NativeEvent` whose `type_`
    /// string is null or valid.
    pub unsafe fn from_raw(ptr: *const sdk::NativeEvent) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        let raw = &*ptr;
        let event_type = if raw.type_.is_null() {
            String::new()
        } else {
            (*raw.type_).to_string_lossy()
        };

        Some(Self {
            event_type,
            bubbles: raw.bubbles != 0,
            cancelable: raw.cancelable != 0,
            time_stamp: raw.time_stamp as f64,
            default_prevented: raw.default_prevented != 0,
            target: None,
            current_target: None,
            phase: EventPhase::None,
        })
    }
}

/// Generic native events alive in the current dispatch cycle
#[derive(Debug, Default)]
pub struct NativeEventTable {
    events: SlotMap<NativeEventHandle, NativeEventData>,
}

impl NativeEventTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: NativeEventData) -> NativeEventHandle {
        self.events.insert(event)
    }

    /// Resolve a handle; `None` if the dispatch that owned it has ended
    pub fn get(&self, handle: NativeEventHandle) -> Option<&NativeEventData> {
        self.events.get(handle)
    }

    pub fn get_mut(&mut self, handle: NativeEventHandle) -> Option<&mut NativeEventData> {
        self.events.get_mut(handle)
    }

    pub fn remove(&mut self, handle: NativeEventHandle) -> Option<NativeEventData> {
        self.events.remove(handle)
    }

    pub fn contains(&self, handle: NativeEventHandle) -> bool {
        self.events.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
