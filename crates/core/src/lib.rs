//! jsbridge - Core Logic
//!
//! Reflects native event records into a scripting engine's object model:
//! per-context type descriptors, host-object instances that resolve property
//! names against cached tables, and the dispatch cycle that ties instance
//! lifetime to native event lifetime.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - `#[repr(C)]` native event records
//! - [`engine`] - Script values, contexts and the host object protocol

// Allow the crate to refer to itself as `jsbridge_core` for proc macro compatibility
extern crate self as jsbridge_core;

use tracing::info;

// Re-export SDK and engine crates
pub use jsbridge_engine as engine;
pub use jsbridge_sdk as sdk;

pub mod config;
pub mod dispatch;
pub mod events;
pub mod logging;

// Re-export commonly used items
pub use config::{BridgeConfig, ConfigError, ConfigResult};
pub use dispatch::{
    DispatchOutcome, DispatchQueue, EventDispatcher, ListenerKey, PendingDispatch, QueueError,
    QueueSender,
};
pub use events::{
    install_bindings, EventKind, HostProperties, IntersectionChangeEventInstance,
    NativeEventData, NativeIntersectionChangeEvent, ScriptedEvent, TypeDescriptor,
};

// Re-export macros
pub use jsbridge_macros::HostProperties;

/// Load config, start logging and bind every event kind into `ctx`
///
/// Falls back to defaults if the config file cannot be read.
pub fn init(ctx: &mut engine::ScriptContext) -> engine::ScriptResult<BridgeConfig> {
    let config = BridgeConfig::load().unwrap_or_else(|e| {
        eprintln!("jsbridge: using default config ({})", e);
        BridgeConfig::default()
    });
    logging::init(&config);

    install_bindings(ctx, &config)?;
    info!("jsbridge bindings installed in {}", ctx.id());
    Ok(config)
}
