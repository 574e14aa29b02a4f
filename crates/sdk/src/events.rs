//! Native event record type definitions
//!
//! Field order and widths match what the observer subsystem writes. Booleans
//! travel as `i64` (non-zero = true) and the timestamp is milliseconds since
//! the embedder's time origin.

use std::ffi::c_void;

use crate::string::NativeString;

/// Generic event data shared by every event kind
#[repr(C)]
#[derive(Debug)]
pub struct NativeEvent {
    /// Event type, e.g. "intersectionchange"
    pub type_: *const NativeString,
    /// Non-zero if the event bubbles
    pub bubbles: i64,
    /// Non-zero if the event can be cancelled
    pub cancelable: i64,
    /// Creation time in milliseconds
    pub time_stamp: i64,
    /// Non-zero if a native handler already prevented the default action
    pub default_prevented: i64,
    /// Opaque target id (0 = no target)
    pub target: *mut c_void,
    /// Opaque current target id (0 = no target)
    pub current_target: *mut c_void,
}

/// Intersection change record handed down when the visibility of an
/// observed element crosses a threshold
#[repr(C)]
#[derive(Debug)]
pub struct NativeIntersectionChangeEvent {
    /// Generic part of the event (owned by the dispatch path)
    pub native_event: *mut NativeEvent,
    /// Visible fraction of the target, nominally 0.0..=1.0
    pub intersection_ratio: f64,
}

/// Custom event record; `detail` is an opaque UTF-16 string
#[repr(C)]
#[derive(Debug)]
pub struct NativeCustomEvent {
    /// Generic part of the event (owned by the dispatch path)
    pub native_event: *mut NativeEvent,
    /// Detail payload, may be null
    pub detail: *const NativeString,
}
