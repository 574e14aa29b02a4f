//! jsbridge Engine - Script Engine Boundary
//!
//! This crate models the contract the embedding scripting engine offers to
//! native bindings:
//! - Script values and the standard numeric/boolean/string coercions
//! - One [`ScriptContext`] per engine context, with a class registration
//!   point and a context-keyed storage facility
//! - Host objects whose property get/set/enumerate calls are routed to
//!   native code through the [`HostObject`] capability
//!
//! # Architecture
//!
//! Bindings register a [`HostClass`] per bound type with
//! [`ScriptContext::define_class`]. Script instantiation goes through
//! [`ScriptContext::construct`], which stores the returned [`HostObject`] in
//! the context's object table and hands back an [`ObjectId`].
//!
//! # Thread Safety
//!
//! Contexts are single-threaded. [`ScriptContext`] is neither `Send` nor
//! `Sync`; everything touching it runs on the context's thread.

pub mod context;
pub mod error;
pub mod host;
pub mod storage;
pub mod value;

pub use context::{ContextId, ObjectId, ScriptContext};
pub use error::{ScriptError, ScriptResult};
pub use host::{HostClass, HostObject, PropertyNameAccumulator};
pub use storage::ContextStorage;
pub use value::{FromScriptValue, ScriptValue, ToScriptValue};
