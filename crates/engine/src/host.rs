//! Host object capability
//!
//! A host object is created by native code but visible to script as if it
//! were an ordinary object. The engine routes every property access on it to
//! the [`HostObject`] implementation; construction from script is routed to
//! the [`HostClass`] registered for its class name.

use std::any::Any;

use crate::context::ScriptContext;
use crate::error::ScriptResult;
use crate::value::ScriptValue;

/// Property protocol for one host object instance
pub trait HostObject: Any {
    /// Class name reported to script (e.g. "IntersectionChangeEvent")
    fn class_name(&self) -> &str;

    /// Resolve a property read
    ///
    /// `Ok(None)` means "not found" and lets the engine fall back to its own
    /// lookup (prototype chain, then `undefined`).
    fn get_property(&self, ctx: &ScriptContext, name: &str) -> ScriptResult<Option<ScriptValue>>;

    /// Handle a property write
    fn set_property(&mut self, ctx: &ScriptContext, name: &str, value: ScriptValue)
        -> ScriptResult<()>;

    /// Append every enumerable property name
    fn get_property_names(&self, accumulator: &mut PropertyNameAccumulator);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Class-level behaviour of a bound type
pub trait HostClass {
    /// Class name under which the type is visible to script
    fn class_name(&self) -> &str;

    /// Called when script instantiates the class (`new ClassName(...)`)
    ///
    /// Argument errors must be reported as `Err`; nothing is registered in
    /// the context when construction fails.
    fn construct(&self, ctx: &mut ScriptContext, args: &[ScriptValue])
        -> ScriptResult<Box<dyn HostObject>>;

    /// Static property read on the class object itself
    fn get_property(&self, name: &str) -> Option<ScriptValue>;
}

/// Collects property names during enumeration
///
/// Mirrors the engine-provided accumulator: names are appended in the order
/// they are reported.
#[derive(Debug, Default, Clone)]
pub struct PropertyNameAccumulator {
    names: Vec<String>,
}

impl PropertyNameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one name
    pub fn add(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Append several names
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}
