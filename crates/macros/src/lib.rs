//! jsbridge Proc Macros
//!
//! This crate provides proc macros for the jsbridge framework:
//!
//! - `#[derive(HostProperties)]` - Expose native record fields as named
//!   script properties
//!
//! # HostProperties Example
//!
//! ```ignore
//! use jsbridge_macros::HostProperties;
//!
//! #[derive(HostProperties)]
//! #[host(enum_name = "IntersectionChangeEventProperty")]
//! pub struct NativeIntersectionChangeEvent {
//!     native_event: Option<NativeEventHandle>,
//!
//!     #[host(property, name = "intersectionRatio")]
//!     intersection_ratio: f64,
//! }
//!
//! // Generated:
//! // - enum IntersectionChangeEventProperty { IntersectionRatio }
//! // - IntersectionChangeEventProperty::ALL / name() / is_readonly()
//! // - impl HostProperties for NativeIntersectionChangeEvent
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes
//!
//! - `#[host(enum_name = "Name")]` - **Required.** Name of the generated
//!   property identifier enum.
//!
//! ## Field Attributes
//!
//! - `#[host(property)]` - Expose the field to script.
//! - `#[host(name = "scriptName")]` - Script-visible name (default: camelCase
//!   of the field name).
//! - `#[host(readonly)]` - Ignore script writes; init dictionaries still apply.
//!
//! Fields without `#[host(property)]` (such as the back reference to the
//! generic native event) are left alone.

mod host_properties;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for native event records
///
/// Generates a closed property identifier enum, a cached name table and
/// typed field access for the engine's property protocol.
///
/// # Generated Code
///
/// - `enum {enum_name}` with one variant per exposed field
/// - `{enum_name}::ALL`, `name()`, `is_readonly()`
/// - A `HostProperties` implementation whose `property_table()` is built once
///   per process and cached
///
/// Field values convert through `ToScriptValue` / `FromScriptValue`, so
/// writes use the engine's standard coercions (ToNumber for `f64`, and so on).
#[proc_macro_derive(HostProperties, attributes(host))]
pub fn derive_host_properties(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    host_properties::derive_host_properties(input).into()
}
