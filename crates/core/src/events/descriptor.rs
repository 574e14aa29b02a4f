//! Context-scoped type descriptors
//!
//! A [`TypeDescriptor`] is the class-level half of a bound event kind: the
//! engine calls it to construct instances from script and to read static
//! properties on the class object. Each context gets its own descriptor per
//! kind, held in a [`DescriptorRegistry`] inside the context's storage, so
//! descriptors are torn down together with the context that owns them.

use std::collections::HashMap;
use std::rc::Rc;

use jsbridge_engine::{
    ContextId, HostClass, HostObject, ObjectId, ScriptContext, ScriptError, ScriptResult,
    ScriptValue,
};
use tracing::debug;

use super::custom::NativeCustomEvent;
use super::event::{EventInit, EventInstance};
use super::instance::{EventRecord, RecordEventInstance, ScriptedEvent};
use super::intersection::NativeIntersectionChangeEvent;
use super::native::EventPhase;
use super::EventKind;
use crate::config::BridgeConfig;

/// Descriptors created in one context, one per kind
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<EventKind, Rc<TypeDescriptor>>,
}

impl DescriptorRegistry {
    pub fn get(&self, kind: EventKind) -> Option<&Rc<TypeDescriptor>> {
        self.descriptors.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Class-level behaviour of one event kind in one context
#[derive(Debug)]
pub struct TypeDescriptor {
    kind: EventKind,
    context: ContextId,
}

impl TypeDescriptor {
    /// Get the descriptor for `kind` in `ctx`, creating it on first use
    ///
    /// Every call for the same context and kind returns the same `Rc`.
    pub fn instance(ctx: &mut ScriptContext, kind: EventKind) -> Rc<Self> {
        if let Some(descriptor) = Self::existing(ctx, kind) {
            return descriptor;
        }

        let descriptor = Rc::new(Self {
            kind,
            context: ctx.id(),
        });
        debug!("Created {} descriptor for {}", kind.class_name(), ctx.id());

        ctx.storage_mut()
            .get_or_insert_with(DescriptorRegistry::default)
            .descriptors
            .insert(kind, Rc::clone(&descriptor));
        descriptor
    }

    /// Get the descriptor for `kind` in `ctx` if one was created
    pub fn existing(ctx: &ScriptContext, kind: EventKind) -> Option<Rc<Self>> {
        ctx.storage()
            .get::<DescriptorRegistry>()
            .and_then(|registry| registry.get(kind))
            .cloned()
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Context that owns this descriptor
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Whether instances accept ad hoc properties
    ///
    /// Read from the config currently stored in `ctx`, so a later
    /// `install_bindings` also applies to descriptors created before it.
    pub fn allow_expando(&self, ctx: &ScriptContext) -> bool {
        ctx.storage()
            .get::<BridgeConfig>()
            .map(|config| config.allow_expando_properties)
            .unwrap_or(true)
    }

    /// Build an instance for `new ClassName(type, eventInitDict?)`
    ///
    /// Argument checks run before anything is built, so a failed call leaves
    /// nothing behind.
    pub fn construct_event(
        descriptor: &Rc<Self>,
        ctx: &ScriptContext,
        args: &[ScriptValue],
    ) -> ScriptResult<ScriptedEvent> {
        let class_name = descriptor.kind.class_name();

        let Some(event_type) = args.first() else {
            return Err(ScriptError::TypeError(format!(
                "Failed to construct '{}': 1 argument required, but only 0 present.",
                class_name
            )));
        };
        let event_type = event_type.to_script_string();

        let dict = match args.get(1) {
            None => None,
            Some(value) if value.is_nullish() => None,
            Some(ScriptValue::Object(id)) => Some(*id),
            Some(_) => {
                return Err(ScriptError::TypeError(format!(
                    "Failed to construct '{}': parameter 2 ('eventInitDict') is not an object.",
                    class_name
                )))
            }
        };
        let init = dict.map(|dict| EventInit::read(ctx, dict)).transpose()?;

        let descriptor = Rc::clone(descriptor);
        let event = match descriptor.kind {
            EventKind::Event => {
                let mut event = EventInstance::from_payload(descriptor, &event_type);
                if let Some(init) = &init {
                    event.apply_init(init);
                }
                ScriptedEvent::Event(event)
            }
            EventKind::IntersectionChange => Self::construct_record::<NativeIntersectionChangeEvent>(
                descriptor,
                ctx,
                &event_type,
                dict,
                init,
            )?
            .into(),
            EventKind::Custom => {
                Self::construct_record::<NativeCustomEvent>(descriptor, ctx, &event_type, dict, init)?
                    .into()
            }
        };
        Ok(event)
    }

    fn construct_record<R: EventRecord>(
        descriptor: Rc<Self>,
        ctx: &ScriptContext,
        event_type: &str,
        dict: Option<ObjectId>,
        init: Option<EventInit>,
    ) -> ScriptResult<RecordEventInstance<R>> {
        let mut event = RecordEventInstance::<R>::from_payload(descriptor, event_type);
        if let Some(init) = &init {
            event.base_mut().apply_init(init);
        }
        if let Some(dict) = dict {
            event.apply_record_init(ctx, dict)?;
        }
        Ok(event)
    }

    /// Static property on the class object
    ///
    /// Names this kind does not define fall back to the base `Event` statics.
    pub fn get_property(&self, name: &str) -> Option<ScriptValue> {
        match name {
            "name" => Some(ScriptValue::from(self.kind.class_name())),
            "length" => Some(ScriptValue::Number(1.0)),
            _ => Self::base_static(name),
        }
    }

    fn base_static(name: &str) -> Option<ScriptValue> {
        EventPhase::from_constant_name(name).map(|phase| ScriptValue::Number(phase.as_number()))
    }
}

impl HostClass for TypeDescriptor {
    fn class_name(&self) -> &str {
        self.kind.class_name()
    }

    fn construct(&self, ctx: &mut ScriptContext, args: &[ScriptValue]) -> ScriptResult<Box<dyn HostObject>> {
        let descriptor = Self::instance(ctx, self.kind);
        let event = Self::construct_event(&descriptor, ctx, args)?;
        Ok(Box::new(event))
    }

    fn get_property(&self, name: &str) -> Option<ScriptValue> {
        TypeDescriptor::get_property(self, name)
    }
}

/// Register the descriptor of `kind` as a class in `ctx`
///
/// Binding the same kind twice is a no-op.
fn bind(ctx: &mut ScriptContext, kind: EventKind) -> ScriptResult<Rc<TypeDescriptor>> {
    let descriptor = TypeDescriptor::instance(ctx, kind);
    if !ctx.has_class(kind.class_name()) {
        ctx.define_class(Rc::clone(&descriptor) as Rc<dyn HostClass>)?;
    }
    Ok(descriptor)
}

pub fn bind_event(ctx: &mut ScriptContext) -> ScriptResult<Rc<TypeDescriptor>> {
    bind(ctx, EventKind::Event)
}

pub fn bind_intersection_change_event(ctx: &mut ScriptContext) -> ScriptResult<Rc<TypeDescriptor>> {
    bind(ctx, EventKind::IntersectionChange)
}

pub fn bind_custom_event(ctx: &mut ScriptContext) -> ScriptResult<Rc<TypeDescriptor>> {
    bind(ctx, EventKind::Custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_stable_per_context() {
        let mut ctx = ScriptContext::new();
        let first = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);
        let second = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.context(), ctx.id());

        let other_kind = TypeDescriptor::instance(&mut ctx, EventKind::Event);
        assert!(!Rc::ptr_eq(&first, &other_kind));
        assert_eq!(ctx.storage().get::<DescriptorRegistry>().map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_instance_is_distinct_across_contexts() {
        let mut ctx_a = ScriptContext::new();
        let mut ctx_b = ScriptContext::new();

        let a = TypeDescriptor::instance(&mut ctx_a, EventKind::IntersectionChange);
        let b = TypeDescriptor::instance(&mut ctx_b, EventKind::IntersectionChange);

        assert!(!Rc::ptr_eq(&a, &b));
        assert_ne!(a.context(), b.context());
    }

    #[test]
    fn test_existing_before_and_after_creation() {
        let mut ctx = ScriptContext::new();
        assert!(TypeDescriptor::existing(&ctx, EventKind::Custom).is_none());

        let created = TypeDescriptor::instance(&mut ctx, EventKind::Custom);
        let found = TypeDescriptor::existing(&ctx, EventKind::Custom).unwrap();
        assert!(Rc::ptr_eq(&created, &found));
    }

    #[test]
    fn test_expando_follows_config() {
        let mut ctx = ScriptContext::new();
        ctx.storage_mut().insert(BridgeConfig {
            allow_expando_properties: false,
            ..BridgeConfig::default()
        });

        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Event);
        assert!(!descriptor.allow_expando(&ctx));
    }

    #[test]
    fn test_expando_tracks_config_replaced_later() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Event);
        assert!(descriptor.allow_expando(&ctx));

        ctx.storage_mut().insert(BridgeConfig {
            allow_expando_properties: false,
            ..BridgeConfig::default()
        });
        assert!(!descriptor.allow_expando(&ctx));
    }

    #[test]
    fn test_static_properties() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);

        assert_eq!(
            descriptor.get_property("name"),
            Some(ScriptValue::from("IntersectionChangeEvent"))
        );
        assert_eq!(descriptor.get_property("length"), Some(ScriptValue::Number(1.0)));
        assert_eq!(
            descriptor.get_property("AT_TARGET"),
            Some(ScriptValue::Number(2.0))
        );
        assert_eq!(descriptor.get_property("intersectionRatio"), None);
    }

    #[test]
    fn test_construct_requires_type() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);

        let err = TypeDescriptor::construct_event(&descriptor, &ctx, &[]).unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));
        assert!(err.to_string().contains("IntersectionChangeEvent"));
    }

    #[test]
    fn test_construct_rejects_non_object_init() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Event);

        let args = [ScriptValue::from("load"), ScriptValue::Number(1.0)];
        let err = TypeDescriptor::construct_event(&descriptor, &ctx, &args).unwrap_err();
        assert!(matches!(err, ScriptError::TypeError(_)));

        let args = [ScriptValue::from("load"), ScriptValue::Null];
        assert!(TypeDescriptor::construct_event(&descriptor, &ctx, &args).is_ok());
    }

    #[test]
    fn test_construct_reads_init_dict() {
        let mut ctx = ScriptContext::new();
        let dict = ctx.create_object([
            ("cancelable", ScriptValue::Boolean(true)),
            ("intersectionRatio", ScriptValue::Number(0.3)),
        ]);
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);

        let args = [ScriptValue::from("intersectionchange"), ScriptValue::Object(dict)];
        let event = TypeDescriptor::construct_event(&descriptor, &ctx, &args).unwrap();

        assert!(event.base().cancelable());
        assert!(!event.base().bubbles());
        assert_eq!(
            event.as_intersection_change().map(|e| e.intersection_ratio()),
            Some(0.3)
        );
    }

    #[test]
    fn test_custom_detail_from_init_dict() {
        let mut ctx = ScriptContext::new();
        let dict = ctx.create_object([("detail", ScriptValue::from("payload"))]);
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Custom);

        let args = [ScriptValue::from("ping"), ScriptValue::Object(dict)];
        let event = TypeDescriptor::construct_event(&descriptor, &ctx, &args).unwrap();

        assert_eq!(
            event.as_custom().map(|e| e.record().detail().clone()),
            Some(ScriptValue::from("payload"))
        );
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut ctx = ScriptContext::new();
        let first = bind_intersection_change_event(&mut ctx).unwrap();
        let second = bind_intersection_change_event(&mut ctx).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert!(ctx.has_class("IntersectionChangeEvent"));
    }
}
