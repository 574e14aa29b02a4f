//! IntersectionChangeEvent binding
//!
//! Delivered to listeners when the visible fraction of an observed element
//! crosses one of its thresholds.

use jsbridge_sdk as sdk;

use super::instance::RecordEventInstance;
use super::native::{NativeEventData, NativeEventHandle};
use super::{EventKind, EventRecord};

/// Native record of an intersection change
#[derive(Debug, jsbridge_macros::HostProperties)]
#[host(enum_name = "IntersectionChangeEventProperty")]
pub struct NativeIntersectionChangeEvent {
    native_event: Option<NativeEventHandle>,

    /// Visible fraction in [0, 1]; producers are trusted, never clamped
    #[host(property, name = "intersectionRatio")]
    intersection_ratio: f64,
}

impl NativeIntersectionChangeEvent {
    pub fn new(native_event: NativeEventHandle, intersection_ratio: f64) -> Self {
        Self {
            native_event: Some(native_event),
            intersection_ratio,
        }
    }

    pub fn intersection_ratio(&self) -> f64 {
        self.intersection_ratio
    }

    /// Copy a record handed down by the observer
    ///
    /// # Safety
    /// `ptr` must be null or point to a valid record whose `native_event` is
    /// null or valid (see [`NativeEventData::from_raw`]).
    pub unsafe fn read_raw(
        ptr: *const sdk::NativeIntersectionChangeEvent,
    ) -> Option<(NativeEventData, f64)> {
        if ptr.is_null() {
            return None;
        }
        let raw = &*ptr;
        let data = NativeEventData::from_raw(raw.native_event)?;
        Some((data, raw.intersection_ratio))
    }
}

impl EventRecord for NativeIntersectionChangeEvent {
    const KIND: EventKind = EventKind::IntersectionChange;

    fn detached() -> Self {
        Self {
            native_event: None,
            intersection_ratio: 0.0,
        }
    }

    fn native_event(&self) -> Option<NativeEventHandle> {
        self.native_event
    }
}

pub type IntersectionChangeEventInstance = RecordEventInstance<NativeIntersectionChangeEvent>;

impl IntersectionChangeEventInstance {
    pub fn intersection_ratio(&self) -> f64 {
        self.record().intersection_ratio()
    }
}
