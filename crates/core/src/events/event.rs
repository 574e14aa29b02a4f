//! Base event contract
//!
//! Every bound event kind inherits these properties and the
//! cancel/propagation flags. Type-specific instances resolve their own names
//! first and delegate everything else here.

use std::rc::Rc;
use std::sync::OnceLock;

use bitflags::bitflags;
use jsbridge_engine::{
    ObjectId, PropertyNameAccumulator, ScriptContext, ScriptError, ScriptResult, ScriptValue,
};
use tracing::{trace, warn};

use super::descriptor::TypeDescriptor;
use super::native::{now_millis, NativeEventData, NativeEventHandle, NativeEventTable};
use super::properties::PropertyTable;

/// Properties of the base event contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventProperty {
    Type,
    Bubbles,
    Cancelable,
    TimeStamp,
    DefaultPrevented,
    Target,
    CurrentTarget,
    SrcElement,
    EventPhase,
    ReturnValue,
    CancelBubble,
}

impl EventProperty {
    /// Every base property, in enumeration order
    pub const ALL: &'static [Self] = &[
        Self::Type,
        Self::Bubbles,
        Self::Cancelable,
        Self::TimeStamp,
        Self::DefaultPrevented,
        Self::Target,
        Self::CurrentTarget,
        Self::SrcElement,
        Self::EventPhase,
        Self::ReturnValue,
        Self::CancelBubble,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Bubbles => "bubbles",
            Self::Cancelable => "cancelable",
            Self::TimeStamp => "timeStamp",
            Self::DefaultPrevented => "defaultPrevented",
            Self::Target => "target",
            Self::CurrentTarget => "currentTarget",
            Self::SrcElement => "srcElement",
            Self::EventPhase => "eventPhase",
            Self::ReturnValue => "returnValue",
            Self::CancelBubble => "cancelBubble",
        }
    }

    /// Only the legacy cancel switches accept writes
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::ReturnValue | Self::CancelBubble)
    }

    pub fn table() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<EventProperty>> = OnceLock::new();
        TABLE.get_or_init(|| PropertyTable::new(Self::ALL.iter().map(|p| (p.name(), *p))))
    }
}

bitflags! {
    /// Per-instance event state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u32 {
        const BUBBLES = 0x01;
        const CANCELABLE = 0x02;
        const DEFAULT_PREVENTED = 0x04;
        const PROPAGATION_STOPPED = 0x08;
        const IMMEDIATE_PROPAGATION_STOPPED = 0x10;
    }
}

/// Base members of an `eventInitDict`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
}

impl EventInit {
    /// Read the base members from a script object
    pub fn read(ctx: &ScriptContext, dict: ObjectId) -> ScriptResult<Self> {
        Ok(Self {
            bubbles: ctx.get_property(dict, "bubbles")?.to_boolean(),
            cancelable: ctx.get_property(dict, "cancelable")?.to_boolean(),
        })
    }
}

/// Base part of every scripted event instance
#[derive(Debug)]
pub struct EventInstance {
    descriptor: Rc<TypeDescriptor>,
    event_type: String,
    time_stamp: f64,
    flags: EventFlags,
    native_event: Option<NativeEventHandle>,
    /// Ad hoc properties defined by script, in definition order
    expando: Vec<(String, ScriptValue)>,
}

impl EventInstance {
    /// Wrap an event handed down by the dispatch path
    ///
    /// Immutable init data is copied so it stays readable after dispatch;
    /// targets and phase are read live through `native_event`.
    pub(crate) fn from_native(
        descriptor: Rc<TypeDescriptor>,
        native_event: Option<NativeEventHandle>,
        data: &NativeEventData,
    ) -> Self {
        let mut flags = EventFlags::empty();
        flags.set(EventFlags::BUBBLES, data.bubbles);
        flags.set(EventFlags::CANCELABLE, data.cancelable);
        flags.set(EventFlags::DEFAULT_PREVENTED, data.default_prevented && data.cancelable);

        Self {
            descriptor,
            event_type: data.event_type.clone(),
            time_stamp: data.time_stamp,
            flags,
            native_event,
            expando: Vec::new(),
        }
    }

    /// Build an event synthesized by script from its type string
    pub(crate) fn from_payload(descriptor: Rc<TypeDescriptor>, data: &str) -> Self {
        Self {
            descriptor,
            event_type: data.to_string(),
            time_stamp: now_millis(),
            flags: EventFlags::empty(),
            native_event: None,
            expando: Vec::new(),
        }
    }

    pub(crate) fn apply_init(&mut self, init: &EventInit) {
        self.flags.set(EventFlags::BUBBLES, init.bubbles);
        self.flags.set(EventFlags::CANCELABLE, init.cancelable);
    }

    pub fn descriptor(&self) -> &Rc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    pub fn bubbles(&self) -> bool {
        self.flags.contains(EventFlags::BUBBLES)
    }

    pub fn cancelable(&self) -> bool {
        self.flags.contains(EventFlags::CANCELABLE)
    }

    pub fn default_prevented(&self) -> bool {
        self.flags.contains(EventFlags::DEFAULT_PREVENTED)
    }

    pub fn propagation_stopped(&self) -> bool {
        self.flags.contains(EventFlags::PROPAGATION_STOPPED)
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.flags.contains(EventFlags::IMMEDIATE_PROPAGATION_STOPPED)
    }

    /// Back reference to the generic native event, if any
    pub fn native_event(&self) -> Option<NativeEventHandle> {
        self.native_event
    }

    /// No-op unless the event is cancelable
    pub fn prevent_default(&mut self) {
        if self.cancelable() {
            self.flags.insert(EventFlags::DEFAULT_PREVENTED);
        }
    }

    pub fn stop_propagation(&mut self) {
        self.flags.insert(EventFlags::PROPAGATION_STOPPED);
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.flags
            .insert(EventFlags::PROPAGATION_STOPPED | EventFlags::IMMEDIATE_PROPAGATION_STOPPED);
    }

    /// Resolve the back reference
    ///
    /// A stale handle means script kept the event past its dispatch cycle.
    fn live_event<'a>(&self, ctx: &'a ScriptContext) -> Option<&'a NativeEventData> {
        let handle = self.native_event?;
        let live = ctx
            .storage()
            .get::<NativeEventTable>()
            .and_then(|table| table.get(handle));
        if live.is_none() {
            warn!(
                "'{}' event accessed after its dispatch ended; native event is gone",
                self.event_type
            );
        }
        live
    }

    fn object_or_null(target: Option<ObjectId>) -> ScriptValue {
        target.map(ScriptValue::Object).unwrap_or(ScriptValue::Null)
    }

    /// Resolve a base property or an ad hoc property
    pub fn get_property(&self, ctx: &ScriptContext, name: &str) -> ScriptResult<Option<ScriptValue>> {
        let Some(property) = EventProperty::table().lookup(name) else {
            return Ok(self
                .expando
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()));
        };

        let value = match property {
            EventProperty::Type => ScriptValue::String(self.event_type.clone()),
            EventProperty::Bubbles => ScriptValue::Boolean(self.bubbles()),
            EventProperty::Cancelable => ScriptValue::Boolean(self.cancelable()),
            EventProperty::TimeStamp => ScriptValue::Number(self.time_stamp),
            EventProperty::DefaultPrevented => ScriptValue::Boolean(self.default_prevented()),
            EventProperty::ReturnValue => ScriptValue::Boolean(!self.default_prevented()),
            EventProperty::CancelBubble => ScriptValue::Boolean(self.propagation_stopped()),
            EventProperty::Target | EventProperty::SrcElement => {
                Self::object_or_null(self.live_event(ctx).and_then(|e| e.target))
            }
            EventProperty::CurrentTarget => {
                Self::object_or_null(self.live_event(ctx).and_then(|e| e.current_target))
            }
            EventProperty::EventPhase => ScriptValue::Number(
                self.live_event(ctx)
                    .map(|e| e.phase.as_number())
                    .unwrap_or(0.0),
            ),
        };
        Ok(Some(value))
    }

    /// Handle a write to a base property or define an ad hoc property
    pub fn set_property(&mut self, ctx: &ScriptContext, name: &str, value: ScriptValue) -> ScriptResult<()> {
        if let Some(property) = EventProperty::table().lookup(name) {
            match property {
                EventProperty::ReturnValue => {
                    if !value.to_boolean() {
                        self.prevent_default();
                    }
                }
                EventProperty::CancelBubble => {
                    if value.to_boolean() {
                        self.stop_propagation();
                    }
                }
                _ => trace!("Ignored write to read-only event property '{}'", name),
            }
            return Ok(());
        }

        if let Some((_, slot)) = self.expando.iter_mut().find(|(key, _)| key == name) {
            *slot = value;
            return Ok(());
        }

        if !self.descriptor.allow_expando(ctx) {
            return Err(ScriptError::TypeError(format!(
                "Cannot add property {}, object is not extensible",
                name
            )));
        }

        trace!("Defined ad hoc property '{}' on '{}' event", name, self.event_type);
        self.expando.push((name.to_string(), value));
        Ok(())
    }

    /// Append base names, then ad hoc names
    pub fn get_property_names(&self, accumulator: &mut PropertyNameAccumulator) {
        accumulator.extend(EventProperty::table().names().iter().copied());
        self.append_expando_names(accumulator);
    }

    pub(crate) fn append_expando_names(&self, accumulator: &mut PropertyNameAccumulator) {
        accumulator.extend(self.expando.iter().map(|(key, _)| key.clone()));
    }
}
