//! Scripted Event Bindings
//!
//! Expose native event records to script as host objects whose properties
//! resolve lazily against a per-kind name table.
//!
//! # Architecture
//!
//! ```text
//! observer → NativeIntersectionChangeEvent → TypeDescriptor (per context)
//!          → ScriptedEvent host object → property table → record field
//! ```
//!
//! # Example
//!
//! ```ignore
//! use jsbridge_core::engine::{ScriptContext, ScriptValue};
//! use jsbridge_core::events::install_bindings;
//! use jsbridge_core::BridgeConfig;
//!
//! let mut ctx = ScriptContext::new();
//! install_bindings(&mut ctx, &BridgeConfig::default())?;
//!
//! // new IntersectionChangeEvent("intersectionchange")
//! let event = ctx.construct("IntersectionChangeEvent", &[ScriptValue::from("intersectionchange")])?;
//! ctx.set_property(event, "intersectionRatio", ScriptValue::Number(0.5))?;
//! ```

mod custom;
mod descriptor;
mod event;
mod instance;
mod intersection;
mod native;
mod properties;

use jsbridge_engine::{ScriptContext, ScriptResult};
use tracing::debug;

use crate::config::BridgeConfig;

pub use custom::{CustomEventInstance, CustomEventProperty, NativeCustomEvent};
pub use descriptor::{
    bind_custom_event, bind_event, bind_intersection_change_event, DescriptorRegistry,
    TypeDescriptor,
};
pub use event::{EventFlags, EventInit, EventInstance, EventProperty};
pub use instance::{EventRecord, RecordEventInstance, ScriptedEvent};
pub use intersection::{
    IntersectionChangeEventInstance, IntersectionChangeEventProperty,
    NativeIntersectionChangeEvent,
};
pub use native::{EventPhase, NativeEventData, NativeEventHandle, NativeEventTable};
pub use properties::{map_of, names_of, HostProperties, PropertyId, PropertyTable};

/// Closed set of event kinds bound into script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Event,
    IntersectionChange,
    Custom,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        EventKind::Event,
        EventKind::IntersectionChange,
        EventKind::Custom,
    ];

    /// Class name visible to script
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::IntersectionChange => "IntersectionChangeEvent",
            Self::Custom => "CustomEvent",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.class_name() == name)
    }
}

/// Bind every event kind into a context
///
/// Stores `config` in the context first so descriptors pick up its settings.
/// Safe to call more than once; later calls keep the descriptors created by
/// the first one.
pub fn install_bindings(ctx: &mut ScriptContext, config: &BridgeConfig) -> ScriptResult<()> {
    ctx.storage_mut().insert(config.clone());

    bind_event(ctx)?;
    bind_intersection_change_event(ctx)?;
    bind_custom_event(ctx)?;

    debug!("Installed {} event bindings in {}", EventKind::ALL.len(), ctx.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use jsbridge_engine::{ScriptError, ScriptValue};

    use super::*;

    #[test]
    fn test_class_names() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_class_name(kind.class_name()), Some(*kind));
        }
        assert_eq!(EventKind::from_class_name("MouseEvent"), None);
    }

    #[test]
    fn test_install_bindings() {
        let mut ctx = ScriptContext::new();
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();

        assert_eq!(
            ctx.class_names(),
            vec!["CustomEvent", "Event", "IntersectionChangeEvent"]
        );
        assert!(ctx.storage().contains::<BridgeConfig>());

        // Second install is harmless
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();
    }

    #[test]
    fn test_construct_from_script() {
        let mut ctx = ScriptContext::new();
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();

        let event = ctx
            .construct("IntersectionChangeEvent", &[ScriptValue::from("intersectionchange")])
            .unwrap();
        assert_eq!(
            ctx.get_property(event, "intersectionRatio").unwrap(),
            ScriptValue::Number(0.0)
        );

        ctx.set_property(event, "intersectionRatio", ScriptValue::Number(1.0))
            .unwrap();
        assert_eq!(
            ctx.get_property(event, "intersectionRatio").unwrap(),
            ScriptValue::Number(1.0)
        );

        ctx.set_property(event, "foo", ScriptValue::from("bar")).unwrap();
        assert_eq!(ctx.get_property(event, "foo").unwrap(), ScriptValue::from("bar"));
        assert_eq!(ctx.get_property(event, "bar").unwrap(), ScriptValue::Undefined);
    }

    #[test]
    fn test_failed_construct_allocates_nothing() {
        let mut ctx = ScriptContext::new();
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();
        let before = ctx.object_count();

        let err = ctx.construct("IntersectionChangeEvent", &[]).unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));
        assert_eq!(ctx.object_count(), before);
    }

    #[test]
    fn test_class_statics() {
        let mut ctx = ScriptContext::new();
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();

        assert_eq!(
            ctx.get_class_property("IntersectionChangeEvent", "BUBBLING_PHASE")
                .unwrap(),
            ScriptValue::Number(3.0)
        );
        assert_eq!(
            ctx.get_class_property("Event", "length").unwrap(),
            ScriptValue::Number(1.0)
        );
        assert_eq!(
            ctx.get_class_property("CustomEvent", "missing").unwrap(),
            ScriptValue::Undefined
        );
    }

    #[test]
    fn test_expando_disabled_by_config() {
        let mut ctx = ScriptContext::new();
        let config = BridgeConfig {
            allow_expando_properties: false,
            ..BridgeConfig::default()
        };
        install_bindings(&mut ctx, &config).unwrap();

        let event = ctx.construct("Event", &[ScriptValue::from("load")]).unwrap();
        let err = ctx
            .set_property(event, "foo", ScriptValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));

        // Known names are unaffected
        ctx.set_property(event, "cancelBubble", ScriptValue::Boolean(true))
            .unwrap();
    }

    fn no_expando() -> BridgeConfig {
        BridgeConfig {
            allow_expando_properties: false,
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn test_config_installed_after_first_dispatch() {
        let mut ctx = ScriptContext::new();
        let dispatcher = crate::dispatch::EventDispatcher::new();

        // Creates the Event descriptor before any config is stored
        let outcome = dispatcher.dispatch_event(&mut ctx, NativeEventData::new("load"));
        install_bindings(&mut ctx, &no_expando()).unwrap();

        let err = ctx
            .set_property(outcome.object, "foo", ScriptValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));
    }

    #[test]
    fn test_reinstall_with_new_config() {
        let mut ctx = ScriptContext::new();
        install_bindings(&mut ctx, &BridgeConfig::default()).unwrap();
        let event = ctx.construct("Event", &[ScriptValue::from("load")]).unwrap();
        ctx.set_property(event, "before", ScriptValue::Number(1.0))
            .unwrap();

        install_bindings(&mut ctx, &no_expando()).unwrap();

        let err = ctx
            .set_property(event, "after", ScriptValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));
        // Properties defined earlier stay writable
        ctx.set_property(event, "before", ScriptValue::Number(2.0))
            .unwrap();
        assert_eq!(
            ctx.get_property(event, "before").unwrap(),
            ScriptValue::Number(2.0)
        );
    }
}
