//! Property name registry
//!
//! Every bound event kind resolves script property names through a table
//! built once per process. Resolution is total: a name missing from the table
//! is "not found", which the caller turns into base-event delegation or the
//! engine's own fallback.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::OnceLock;

use jsbridge_engine::ScriptValue;

use super::custom::{CustomEventProperty, NativeCustomEvent};
use super::event::EventProperty;
use super::intersection::{IntersectionChangeEventProperty, NativeIntersectionChangeEvent};
use super::EventKind;

/// Immutable name -> property id table
#[derive(Debug)]
pub struct PropertyTable<P> {
    names: Vec<&'static str>,
    map: HashMap<&'static str, P>,
}

impl<P: Copy> PropertyTable<P> {
    /// Build a table from `(name, id)` pairs
    ///
    /// Names keep their first-seen order; a repeated name keeps its first id.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, P)>,
    {
        let mut names = Vec::new();
        let mut map = HashMap::new();
        for (name, id) in entries {
            if map.contains_key(name) {
                continue;
            }
            names.push(name);
            map.insert(name, id);
        }
        Self { names, map }
    }

    /// Resolve a property name
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<P> {
        self.map.get(name).copied()
    }

    /// Property names in declaration order
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn map(&self) -> &HashMap<&'static str, P> {
        &self.map
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Native record whose fields are exposed as script properties
///
/// Normally implemented with `#[derive(HostProperties)]`.
pub trait HostProperties: Sized + 'static {
    /// Closed set of exposed fields
    type Property: Copy + Eq + Hash + fmt::Debug + 'static;

    /// Name table for this record, built once and cached
    fn property_table() -> &'static PropertyTable<Self::Property>;

    /// Whether script writes to `property` are ignored
    fn is_readonly(property: Self::Property) -> bool;

    /// Read a field as a script value
    fn get_property(&self, property: Self::Property) -> ScriptValue;

    /// Write a field, ignoring read-only markers (construction path)
    fn init_property(&mut self, property: Self::Property, value: &ScriptValue);

    /// Write a field from script
    ///
    /// Returns `false` if the property is read-only and the write was ignored.
    fn set_property(&mut self, property: Self::Property, value: &ScriptValue) -> bool {
        if Self::is_readonly(property) {
            return false;
        }
        self.init_property(property, value);
        true
    }

    /// Resolve a script name against this record's table
    #[inline]
    fn lookup(name: &str) -> Option<Self::Property> {
        Self::property_table().lookup(name)
    }
}

/// Property identifier across every bound event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Event(EventProperty),
    IntersectionChange(IntersectionChangeEventProperty),
    Custom(CustomEventProperty),
}

/// Combined (inherited + own) table for one event kind
struct KindTable {
    names: Vec<&'static str>,
    map: HashMap<&'static str, PropertyId>,
}

impl KindTable {
    fn base() -> Self {
        let table = PropertyTable::new(
            EventProperty::ALL
                .iter()
                .map(|property| (property.name(), PropertyId::Event(*property))),
        );
        Self::from_table(table)
    }

    fn with_record<R, F>(wrap: F) -> Self
    where
        R: HostProperties,
        F: Fn(R::Property) -> PropertyId,
    {
        let base = Self::base();
        let own = R::property_table();
        let entries = base
            .names
            .iter()
            .filter_map(|name| Some((*name, *base.map.get(name)?)))
            .chain(
                own.names()
                    .iter()
                    .filter_map(|name| Some((*name, wrap(own.lookup(name)?)))),
            );
        Self::from_table(PropertyTable::new(entries))
    }

    fn from_table(table: PropertyTable<PropertyId>) -> Self {
        Self {
            names: table.names,
            map: table.map,
        }
    }
}

fn kind_table(kind: EventKind) -> &'static KindTable {
    static EVENT: OnceLock<KindTable> = OnceLock::new();
    static INTERSECTION_CHANGE: OnceLock<KindTable> = OnceLock::new();
    static CUSTOM: OnceLock<KindTable> = OnceLock::new();

    match kind {
        EventKind::Event => EVENT.get_or_init(KindTable::base),
        EventKind::IntersectionChange => INTERSECTION_CHANGE.get_or_init(|| {
            KindTable::with_record::<NativeIntersectionChangeEvent, _>(PropertyId::IntersectionChange)
        }),
        EventKind::Custom => {
            CUSTOM.get_or_init(|| KindTable::with_record::<NativeCustomEvent, _>(PropertyId::Custom))
        }
    }
}

/// Every property name of an event kind, inherited names first
///
/// Used for enumeration. Computed once per process.
pub fn names_of(kind: EventKind) -> &'static [&'static str] {
    &kind_table(kind).names
}

/// Name -> property id mapping of an event kind, inherited names included
pub fn map_of(kind: EventKind) -> &'static HashMap<&'static str, PropertyId> {
    &kind_table(kind).map
}
