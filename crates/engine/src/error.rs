//! Error types for the engine exception channel

/// Exceptions surfaced to script code
///
/// Every user-visible failure of a binding funnels through this type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// Bad argument shape or an operation on the wrong kind of value
    #[error("TypeError: {0}")]
    TypeError(String),

    /// No class or binding registered under this name
    #[error("ReferenceError: {0} is not defined")]
    ReferenceError(String),

    /// A class with this name is already registered in the context
    #[error("Class already defined: {0}")]
    ClassAlreadyDefined(String),

    /// The object was reclaimed by the engine
    #[error("Object has been collected")]
    ObjectCollected,

    /// A host object was re-entered while it was being mutated
    #[error("Host object is busy")]
    Reentrant,
}

/// Result type for engine operations
pub type ScriptResult<T> = Result<T, ScriptError>;
