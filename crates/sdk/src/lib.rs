//! jsbridge SDK - Native Event Record Definitions
//!
//! This crate contains the `#[repr(C)]` records the layout/observer subsystem
//! hands to the bridge when it fires an event. It has no dependencies and
//! compiles quickly, allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`events`] - Native event records (generic and type-specific)
//! - [`string`] - UTF-16 string slices shared with the native side

pub mod events;
pub mod string;

pub use events::*;
pub use string::NativeString;
