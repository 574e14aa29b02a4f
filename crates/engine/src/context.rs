//! Script engine contexts
//!
//! A [`ScriptContext`] stands for one engine context: it owns the classes
//! registered by bindings, the objects created in it and the context-keyed
//! storage bindings use for their singletons. Dropping the context tears all
//! of that down in one place.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ThreadId;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::error::{ScriptError, ScriptResult};
use crate::host::{HostClass, HostObject, PropertyNameAccumulator};
use crate::storage::ContextStorage;
use crate::value::ScriptValue;

new_key_type! {
    /// Handle to an object in a context's object table
    pub struct ObjectId;
}

/// Process-unique context identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

type SharedHostObject = Rc<RefCell<Box<dyn HostObject>>>;

/// Entry in the object table
enum HeapObject {
    /// Ordinary script object (e.g. an init dictionary literal)
    Plain(Vec<(String, ScriptValue)>),
    /// Object backed by native code
    Host(SharedHostObject),
}

/// One scripting engine context
pub struct ScriptContext {
    id: ContextId,
    owner: ThreadId,
    classes: HashMap<String, Rc<dyn HostClass>>,
    objects: SlotMap<ObjectId, HeapObject>,
    storage: ContextStorage,
}

impl ScriptContext {
    /// Create a new, empty context bound to the calling thread
    pub fn new() -> Self {
        let id = ContextId::next();
        debug!("Created script context {}", id);
        Self {
            id,
            owner: std::thread::current().id(),
            classes: HashMap::new(),
            objects: SlotMap::with_key(),
            storage: ContextStorage::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Check if the caller runs on the thread that created this context
    pub fn is_owner_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Context-keyed storage
    pub fn storage(&self) -> &ContextStorage {
        &self.storage
    }

    /// Context-keyed storage (mutable)
    pub fn storage_mut(&mut self) -> &mut ContextStorage {
        &mut self.storage
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Register a host class under its class name
    pub fn define_class(&mut self, class: Rc<dyn HostClass>) -> ScriptResult<()> {
        let name = class.class_name().to_string();
        if self.classes.contains_key(&name) {
            return Err(ScriptError::ClassAlreadyDefined(name));
        }
        debug!("Defined class '{}' in {}", name, self.id);
        self.classes.insert(name, class);
        Ok(())
    }

    /// Look up a registered class
    pub fn class(&self, name: &str) -> Option<Rc<dyn HostClass>> {
        self.classes.get(name).cloned()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Names of all registered classes, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate a registered class (`new ClassName(...args)`)
    pub fn construct(&mut self, class_name: &str, args: &[ScriptValue]) -> ScriptResult<ObjectId> {
        let class = self
            .class(class_name)
            .ok_or_else(|| ScriptError::ReferenceError(class_name.to_string()))?;
        let object = class.construct(self, args)?;
        Ok(self.insert_host_object(object))
    }

    /// Read a static property on a class object (`ClassName.prop`)
    pub fn get_class_property(&self, class_name: &str, name: &str) -> ScriptResult<ScriptValue> {
        let class = self
            .class(class_name)
            .ok_or_else(|| ScriptError::ReferenceError(class_name.to_string()))?;
        Ok(class.get_property(name).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Expose a native object to script
    pub fn insert_host_object(&mut self, object: Box<dyn HostObject>) -> ObjectId {
        let class_name = object.class_name().to_string();
        let id = self
            .objects
            .insert(HeapObject::Host(Rc::new(RefCell::new(object))));
        trace!("Allocated {} host object {:?} in {}", class_name, id, self.id);
        id
    }

    /// Create an ordinary object with the given own properties
    pub fn create_object<I, K>(&mut self, properties: I) -> ObjectId
    where
        I: IntoIterator<Item = (K, ScriptValue)>,
        K: Into<String>,
    {
        let properties = properties
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        self.objects.insert(HeapObject::Plain(properties))
    }

    /// Check if the object is still alive
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Reclaim an object, dropping its native backing
    ///
    /// Returns `false` if the object was already collected.
    pub fn collect(&mut self, id: ObjectId) -> bool {
        let removed = self.objects.remove(id).is_some();
        if removed {
            trace!("Collected object {:?} in {}", id, self.id);
        }
        removed
    }

    fn host_object(&self, id: ObjectId) -> ScriptResult<Option<SharedHostObject>> {
        match self.objects.get(id) {
            Some(HeapObject::Host(object)) => Ok(Some(Rc::clone(object))),
            Some(HeapObject::Plain(_)) => Ok(None),
            None => Err(ScriptError::ObjectCollected),
        }
    }

    /// Read a property (`object[name]`)
    ///
    /// Names not found anywhere resolve to `undefined`.
    pub fn get_property(&self, id: ObjectId, name: &str) -> ScriptResult<ScriptValue> {
        match self.objects.get(id) {
            Some(HeapObject::Plain(properties)) => Ok(properties
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()),
            Some(HeapObject::Host(object)) => {
                let object = Rc::clone(object);
                let object = object.try_borrow().map_err(|_| ScriptError::Reentrant)?;
                Ok(object.get_property(self, name)?.unwrap_or_default())
            }
            None => Err(ScriptError::ObjectCollected),
        }
    }

    /// Write a property (`object[name] = value`)
    pub fn set_property(&mut self, id: ObjectId, name: &str, value: ScriptValue) -> ScriptResult<()> {
        let object = match self.objects.get_mut(id) {
            Some(HeapObject::Plain(properties)) => {
                match properties.iter_mut().find(|(key, _)| key == name) {
                    Some((_, slot)) => *slot = value,
                    None => properties.push((name.to_string(), value)),
                }
                return Ok(());
            }
            Some(HeapObject::Host(object)) => Rc::clone(object),
            None => return Err(ScriptError::ObjectCollected),
        };

        let mut object = object.try_borrow_mut().map_err(|_| ScriptError::Reentrant)?;
        object.set_property(self, name, value)
    }

    /// Enumerate property names (`Object.keys`-style reflection)
    pub fn property_names(&self, id: ObjectId) -> ScriptResult<Vec<String>> {
        match self.objects.get(id) {
            Some(HeapObject::Plain(properties)) => {
                Ok(properties.iter().map(|(key, _)| key.clone()).collect())
            }
            Some(HeapObject::Host(object)) => {
                let object = object.try_borrow().map_err(|_| ScriptError::Reentrant)?;
                let mut accumulator = PropertyNameAccumulator::new();
                object.get_property_names(&mut accumulator);
                Ok(accumulator.into_names())
            }
            None => Err(ScriptError::ObjectCollected),
        }
    }

    /// Class name of a host object, `None` for ordinary objects
    pub fn class_of(&self, id: ObjectId) -> ScriptResult<Option<String>> {
        match self.host_object(id)? {
            Some(object) => {
                let object = object.try_borrow().map_err(|_| ScriptError::Reentrant)?;
                Ok(Some(object.class_name().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Run `f` against the native type behind a host object
    ///
    /// Returns `Ok(None)` if the object is not a host object of type `T`.
    pub fn with_host<T, R, F>(&self, id: ObjectId, f: F) -> ScriptResult<Option<R>>
    where
        T: HostObject,
        F: FnOnce(&T) -> R,
    {
        let Some(object) = self.host_object(id)? else {
            return Ok(None);
        };
        let object = object.try_borrow().map_err(|_| ScriptError::Reentrant)?;
        Ok(object.as_any().downcast_ref::<T>().map(f))
    }

    /// Mutable variant of [`with_host`](Self::with_host)
    pub fn with_host_mut<T, R, F>(&self, id: ObjectId, f: F) -> ScriptResult<Option<R>>
    where
        T: HostObject,
        F: FnOnce(&mut T) -> R,
    {
        let Some(object) = self.host_object(id)? else {
            return Ok(None);
        };
        let mut object = object.try_borrow_mut().map_err(|_| ScriptError::Reentrant)?;
        Ok(object.as_any_mut().downcast_mut::<T>().map(f))
    }
}

impl Default for ScriptContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("id", &self.id)
            .field("classes", &self.class_names())
            .field("objects", &self.objects.len())
            .field("storage", &self.storage.len())
            .finish()
    }
}

impl Drop for ScriptContext {
    fn drop(&mut self) {
        debug!(
            "Destroying script context {} ({} objects, {} classes)",
            self.id,
            self.objects.len(),
            self.classes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    /// Minimal host object storing one numeric field
    struct Point {
        x: f64,
    }

    impl HostObject for Point {
        fn class_name(&self) -> &str {
            "Point"
        }

        fn get_property(&self, _ctx: &ScriptContext, name: &str) -> ScriptResult<Option<ScriptValue>> {
            Ok(match name {
                "x" => Some(ScriptValue::Number(self.x)),
                _ => None,
            })
        }

        fn set_property(
            &mut self,
            _ctx: &ScriptContext,
            name: &str,
            value: ScriptValue,
        ) -> ScriptResult<()> {
            match name {
                "x" => {
                    self.x = value.to_number();
                    Ok(())
                }
                _ => Err(ScriptError::TypeError(format!("cannot set {}", name))),
            }
        }

        fn get_property_names(&self, accumulator: &mut PropertyNameAccumulator) {
            accumulator.add("x");
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct PointClass;

    impl HostClass for PointClass {
        fn class_name(&self) -> &str {
            "Point"
        }

        fn construct(
            &self,
            _ctx: &mut ScriptContext,
            args: &[ScriptValue],
        ) -> ScriptResult<Box<dyn HostObject>> {
            let x = args
                .first()
                .ok_or_else(|| ScriptError::TypeError("x required".to_string()))?;
            Ok(Box::new(Point { x: x.to_number() }))
        }

        fn get_property(&self, name: &str) -> Option<ScriptValue> {
            (name == "name").then(|| ScriptValue::from("Point"))
        }
    }

    #[test]
    fn test_context_ids_are_unique() {
        let a = ScriptContext::new();
        let b = ScriptContext::new();
        assert_ne!(a.id(), b.id());
        assert!(a.is_owner_thread());
    }

    #[test]
    fn test_define_class_rejects_duplicates() {
        let mut ctx = ScriptContext::new();
        ctx.define_class(Rc::new(PointClass)).unwrap();
        let err = ctx.define_class(Rc::new(PointClass)).unwrap_err();
        assert_eq!(err, ScriptError::ClassAlreadyDefined("Point".to_string()));
        assert_eq!(ctx.class_names(), vec!["Point"]);
    }

    #[test]
    fn test_construct_and_property_routing() {
        let mut ctx = ScriptContext::new();
        ctx.define_class(Rc::new(PointClass)).unwrap();

        let id = ctx.construct("Point", &[ScriptValue::from("2.5")]).unwrap();
        assert_eq!(ctx.get_property(id, "x").unwrap(), ScriptValue::Number(2.5));
        assert_eq!(ctx.get_property(id, "y").unwrap(), ScriptValue::Undefined);

        ctx.set_property(id, "x", ScriptValue::Boolean(true)).unwrap();
        assert_eq!(ctx.get_property(id, "x").unwrap(), ScriptValue::Number(1.0));
        assert_eq!(ctx.property_names(id).unwrap(), vec!["x".to_string()]);
        assert_eq!(ctx.class_of(id).unwrap().as_deref(), Some("Point"));
    }

    #[test]
    fn test_construct_errors() {
        let mut ctx = ScriptContext::new();
        assert!(matches!(
            ctx.construct("Point", &[]),
            Err(ScriptError::ReferenceError(_))
        ));

        ctx.define_class(Rc::new(PointClass)).unwrap();
        assert!(matches!(
            ctx.construct("Point", &[]),
            Err(ScriptError::TypeError(_))
        ));
        assert_eq!(ctx.object_count(), 0);
    }

    #[test]
    fn test_class_property() {
        let mut ctx = ScriptContext::new();
        ctx.define_class(Rc::new(PointClass)).unwrap();
        assert_eq!(
            ctx.get_class_property("Point", "name").unwrap(),
            ScriptValue::from("Point")
        );
        assert_eq!(
            ctx.get_class_property("Point", "missing").unwrap(),
            ScriptValue::Undefined
        );
    }

    #[test]
    fn test_plain_objects() {
        let mut ctx = ScriptContext::new();
        let id = ctx.create_object([("bubbles", ScriptValue::Boolean(true))]);
        assert_eq!(ctx.get_property(id, "bubbles").unwrap(), ScriptValue::Boolean(true));

        ctx.set_property(id, "detail", ScriptValue::from("payload")).unwrap();
        assert_eq!(
            ctx.property_names(id).unwrap(),
            vec!["bubbles".to_string(), "detail".to_string()]
        );
        assert_eq!(ctx.class_of(id).unwrap(), None);
    }

    #[test]
    fn test_with_host_downcast() {
        let mut ctx = ScriptContext::new();
        let id = ctx.insert_host_object(Box::new(Point { x: 3.0 }));

        let x = ctx.with_host::<Point, _, _>(id, |p| p.x).unwrap();
        assert_eq!(x, Some(3.0));

        ctx.with_host_mut::<Point, _, _>(id, |p| p.x = 4.0).unwrap();
        assert_eq!(ctx.get_property(id, "x").unwrap(), ScriptValue::Number(4.0));

        let wrong = ctx.with_host::<PointWrapper, _, _>(id, |_| ()).unwrap();
        assert!(wrong.is_none());
    }

    struct PointWrapper;

    impl HostObject for PointWrapper {
        fn class_name(&self) -> &str {
            "PointWrapper"
        }

        fn get_property(&self, _ctx: &ScriptContext, _name: &str) -> ScriptResult<Option<ScriptValue>> {
            Ok(None)
        }

        fn set_property(
            &mut self,
            _ctx: &ScriptContext,
            _name: &str,
            _value: ScriptValue,
        ) -> ScriptResult<()> {
            Ok(())
        }

        fn get_property_names(&self, _accumulator: &mut PropertyNameAccumulator) {}

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_collected_objects() {
        let mut ctx = ScriptContext::new();
        let id = ctx.insert_host_object(Box::new(Point { x: 1.0 }));
        assert!(ctx.collect(id));
        assert!(!ctx.collect(id));
        assert!(!ctx.contains_object(id));
        assert_eq!(ctx.get_property(id, "x"), Err(ScriptError::ObjectCollected));
        assert_eq!(
            ctx.set_property(id, "x", ScriptValue::Null),
            Err(ScriptError::ObjectCollected)
        );
    }

    #[test]
    fn test_storage_dropped_with_context() {
        struct Marker(Rc<RefCell<bool>>);
        impl Drop for Marker {
            fn drop(&mut self) {
                *self.0.borrow_mut() = true;
            }
        }

        let dropped = Rc::new(RefCell::new(false));
        {
            let mut ctx = ScriptContext::new();
            ctx.storage_mut().insert(Marker(Rc::clone(&dropped)));
        }
        assert!(*dropped.borrow());
    }
}
