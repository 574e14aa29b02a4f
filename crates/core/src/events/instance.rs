//! Scripted event instances
//!
//! A [`RecordEventInstance`] pairs the base event state with one native
//! record. Property access checks the record's own table first and hands
//! every other name to the base instance unchanged, so inherited names,
//! ad hoc properties and "not found" all behave the same for every kind.

use std::any::Any;
use std::rc::Rc;

use jsbridge_engine::{
    HostObject, ObjectId, PropertyNameAccumulator, ScriptContext, ScriptResult, ScriptValue,
};
use tracing::trace;

use super::custom::CustomEventInstance;
use super::descriptor::TypeDescriptor;
use super::event::EventInstance;
use super::intersection::IntersectionChangeEventInstance;
use super::native::{NativeEventData, NativeEventHandle};
use super::properties::{names_of, HostProperties};
use super::EventKind;

/// Native record of a concrete event kind
pub trait EventRecord: HostProperties {
    const KIND: EventKind;

    /// Record of an event synthesized by script, fields at their defaults
    fn detached() -> Self;

    /// Back reference to the generic native event
    fn native_event(&self) -> Option<NativeEventHandle>;
}

/// Scripted instance of a record-carrying event kind
#[derive(Debug)]
pub struct RecordEventInstance<R> {
    base: EventInstance,
    record: R,
}

impl<R: EventRecord> RecordEventInstance<R> {
    /// Wrap a record handed down by dispatch
    pub(crate) fn from_native(
        descriptor: Rc<TypeDescriptor>,
        data: &NativeEventData,
        record: R,
    ) -> Self {
        Self {
            base: EventInstance::from_native(descriptor, record.native_event(), data),
            record,
        }
    }

    /// Build an instance from the event type string alone
    pub(crate) fn from_payload(descriptor: Rc<TypeDescriptor>, data: &str) -> Self {
        Self {
            base: EventInstance::from_payload(descriptor, data),
            record: R::detached(),
        }
    }

    /// Copy the record's members out of an `eventInitDict`
    ///
    /// Members the dictionary leaves undefined keep their defaults. Read-only
    /// members are still initialized here.
    pub(crate) fn apply_record_init(&mut self, ctx: &ScriptContext, dict: ObjectId) -> ScriptResult<()> {
        let table = R::property_table();
        for name in table.names() {
            let value = ctx.get_property(dict, name)?;
            if value.is_undefined() {
                continue;
            }
            if let Some(property) = table.lookup(name) {
                self.record.init_property(property, &value);
            }
        }
        Ok(())
    }

    pub fn base(&self) -> &EventInstance {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut EventInstance {
        &mut self.base
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn get_property(&self, ctx: &ScriptContext, name: &str) -> ScriptResult<Option<ScriptValue>> {
        match R::lookup(name) {
            Some(property) => Ok(Some(self.record.get_property(property))),
            None => self.base.get_property(ctx, name),
        }
    }

    pub fn set_property(&mut self, ctx: &ScriptContext, name: &str, value: ScriptValue) -> ScriptResult<()> {
        match R::lookup(name) {
            Some(property) => {
                if !self.record.set_property(property, &value) {
                    trace!("Ignored write to read-only property '{}'", name);
                }
                Ok(())
            }
            None => self.base.set_property(ctx, name, value),
        }
    }

    /// Inherited names, own names, then ad hoc names
    pub fn get_property_names(&self, accumulator: &mut PropertyNameAccumulator) {
        accumulator.extend(names_of(R::KIND).iter().copied());
        self.base.append_expando_names(accumulator);
    }
}

/// Every event kind exposed to script
#[derive(Debug)]
pub enum ScriptedEvent {
    Event(EventInstance),
    IntersectionChange(IntersectionChangeEventInstance),
    Custom(CustomEventInstance),
}

impl ScriptedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Event(_) => EventKind::Event,
            Self::IntersectionChange(_) => EventKind::IntersectionChange,
            Self::Custom(_) => EventKind::Custom,
        }
    }

    pub fn base(&self) -> &EventInstance {
        match self {
            Self::Event(event) => event,
            Self::IntersectionChange(event) => event.base(),
            Self::Custom(event) => event.base(),
        }
    }

    pub fn base_mut(&mut self) -> &mut EventInstance {
        match self {
            Self::Event(event) => event,
            Self::IntersectionChange(event) => event.base_mut(),
            Self::Custom(event) => event.base_mut(),
        }
    }

    pub fn as_intersection_change(&self) -> Option<&IntersectionChangeEventInstance> {
        match self {
            Self::IntersectionChange(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomEventInstance> {
        match self {
            Self::Custom(event) => Some(event),
            _ => None,
        }
    }
}

impl From<EventInstance> for ScriptedEvent {
    fn from(event: EventInstance) -> Self {
        Self::Event(event)
    }
}

impl From<IntersectionChangeEventInstance> for ScriptedEvent {
    fn from(event: IntersectionChangeEventInstance) -> Self {
        Self::IntersectionChange(event)
    }
}

impl From<CustomEventInstance> for ScriptedEvent {
    fn from(event: CustomEventInstance) -> Self {
        Self::Custom(event)
    }
}

impl HostObject for ScriptedEvent {
    fn class_name(&self) -> &str {
        self.kind().class_name()
    }

    fn get_property(&self, ctx: &ScriptContext, name: &str) -> ScriptResult<Option<ScriptValue>> {
        match self {
            Self::Event(event) => event.get_property(ctx, name),
            Self::IntersectionChange(event) => event.get_property(ctx, name),
            Self::Custom(event) => event.get_property(ctx, name),
        }
    }

    fn set_property(&mut self, ctx: &ScriptContext, name: &str, value: ScriptValue) -> ScriptResult<()> {
        match self {
            Self::Event(event) => event.set_property(ctx, name, value),
            Self::IntersectionChange(event) => event.set_property(ctx, name, value),
            Self::Custom(event) => event.set_property(ctx, name, value),
        }
    }

    fn get_property_names(&self, accumulator: &mut PropertyNameAccumulator) {
        match self {
            Self::Event(event) => event.get_property_names(accumulator),
            Self::IntersectionChange(event) => event.get_property_names(accumulator),
            Self::Custom(event) => event.get_property_names(accumulator),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_object_routing() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::IntersectionChange);
        let event: ScriptedEvent =
            IntersectionChangeEventInstance::from_payload(descriptor, "intersectionchange").into();

        assert_eq!(event.kind(), EventKind::IntersectionChange);
        assert_eq!(HostObject::class_name(&event), "IntersectionChangeEvent");

        let id = ctx.insert_host_object(Box::new(event));
        ctx.set_property(id, "intersectionRatio", ScriptValue::Number(0.5))
            .unwrap();
        assert_eq!(
            ctx.get_property(id, "intersectionRatio").unwrap(),
            ScriptValue::Number(0.5)
        );
        assert_eq!(ctx.get_property(id, "nope").unwrap(), ScriptValue::Undefined);

        let ratio = ctx
            .with_host::<ScriptedEvent, _, _>(id, |event| {
                event.as_intersection_change().map(|e| e.intersection_ratio())
            })
            .unwrap()
            .flatten();
        assert_eq!(ratio, Some(0.5));
    }

    #[test]
    fn test_base_mut_reaches_flags() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Custom);
        let mut event: ScriptedEvent = CustomEventInstance::from_payload(descriptor, "ping").into();

        event.base_mut().stop_propagation();
        assert!(event.base().propagation_stopped());
        assert!(event.as_intersection_change().is_none());
        assert!(event.as_custom().is_some());
    }

    #[test]
    fn test_plain_event_has_only_base_names() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Event);
        let event: ScriptedEvent = EventInstance::from_payload(descriptor, "load").into();
        let id = ctx.insert_host_object(Box::new(event));

        let names = ctx.property_names(id).unwrap();
        assert_eq!(names.len(), names_of(EventKind::Event).len());
        assert!(!names.iter().any(|n| n == "intersectionRatio"));
    }
}
