//! CustomEvent binding

use jsbridge_engine::ScriptValue;
use jsbridge_sdk as sdk;

use super::instance::RecordEventInstance;
use super::native::{NativeEventData, NativeEventHandle};
use super::{EventKind, EventRecord};

/// Native record of an application-defined event
#[derive(Debug, jsbridge_macros::HostProperties)]
#[host(enum_name = "CustomEventProperty")]
pub struct NativeCustomEvent {
    native_event: Option<NativeEventHandle>,

    /// Payload chosen by the sender; fixed once the event exists
    #[host(property, readonly)]
    detail: ScriptValue,
}

impl NativeCustomEvent {
    pub fn new(native_event: NativeEventHandle, detail: ScriptValue) -> Self {
        Self {
            native_event: Some(native_event),
            detail,
        }
    }

    pub fn detail(&self) -> &ScriptValue {
        &self.detail
    }

    /// Copy a record handed down by native code
    ///
    /// A null `detail` string becomes `null`.
    ///
    /// # Safety
    /// `ptr` must be null or point to a valid record whose `native_event` and
    /// `detail` are each null or valid.
    pub unsafe fn read_raw(ptr: *const sdk::NativeCustomEvent) -> Option<(NativeEventData, ScriptValue)> {
        if ptr.is_null() {
            return None;
        }
        let raw = &*ptr;
        let data = NativeEventData::from_raw(raw.native_event)?;
        let detail = if raw.detail.is_null() {
            ScriptValue::Null
        } else {
            ScriptValue::String((*raw.detail).to_string_lossy())
        };
        Some((data, detail))
    }
}

impl EventRecord for NativeCustomEvent {
    const KIND: EventKind = EventKind::Custom;

    fn detached() -> Self {
        Self {
            native_event: None,
            detail: ScriptValue::Null,
        }
    }

    fn native_event(&self) -> Option<NativeEventHandle> {
        self.native_event
    }
}

pub type CustomEventInstance = RecordEventInstance<NativeCustomEvent>;

#[cfg(test)]
mod tests {
    use jsbridge_engine::ScriptContext;

    use super::*;
    use crate::events::TypeDescriptor;

    #[test]
    fn test_detail_defaults_to_null() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Custom);
        let event = CustomEventInstance::from_payload(descriptor, "ping");

        assert_eq!(
            event.get_property(&ctx, "detail").unwrap(),
            Some(ScriptValue::Null)
        );
    }

    #[test]
    fn test_detail_is_read_only() {
        let mut ctx = ScriptContext::new();
        let descriptor = TypeDescriptor::instance(&mut ctx, EventKind::Custom);
        let mut event = CustomEventInstance::from_payload(descriptor, "ping");

        event.set_property(&ctx, "detail", ScriptValue::Number(3.0)).unwrap();
        assert_eq!(event.record().detail(), &ScriptValue::Null);
    }

    #[test]
    fn test_read_raw() {
        let type_units: Vec<u16> = "ping".encode_utf16().collect();
        let type_ = sdk::NativeString::from_units(&type_units);
        let detail_units: Vec<u16> = "payload".encode_utf16().collect();
        let detail = sdk::NativeString::from_units(&detail_units);
        let mut native = sdk::NativeEvent {
            type_: &type_,
            bubbles: 1,
            cancelable: 0,
            time_stamp: 3,
            default_prevented: 0,
            target: std::ptr::null_mut(),
            current_target: std::ptr::null_mut(),
        };

        let raw = sdk::NativeCustomEvent {
            native_event: &mut native,
            detail: &detail,
        };
        let (data, value) = unsafe { NativeCustomEvent::read_raw(&raw) }.unwrap();
        assert_eq!(data.event_type, "ping");
        assert!(data.bubbles);
        assert_eq!(value, ScriptValue::from("payload"));

        let no_detail = sdk::NativeCustomEvent {
            native_event: &mut native,
            detail: std::ptr::null(),
        };
        let (_, value) = unsafe { NativeCustomEvent::read_raw(&no_detail) }.unwrap();
        assert_eq!(value, ScriptValue::Null);

        assert!(unsafe { NativeCustomEvent::read_raw(std::ptr::null()) }.is_none());
    }
}
