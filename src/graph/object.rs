//! ObjectRef - A shared object node with named properties.
//!
//! A property is either plain data or an `Accessor` (getter plus optional
//! setter). Reads and writes through `ObjectRef::get`/`ObjectRef::set` go
//! through the accessor when one is installed, which is how converted
//! properties stay backed by their reactive cell.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::types::{NodeId, Value};

// =============================================================================
// Accessor
// =============================================================================

pub type Getter = Rc<dyn Fn() -> Value>;
pub type Setter = Rc<dyn Fn(Value)>;

/// A computed property slot: reads call `get`, writes call `set` if present.
#[derive(Clone)]
pub struct Accessor {
    get: Getter,
    set: Option<Setter>,
}

impl Accessor {
    /// Read-only accessor.
    pub fn new(get: impl Fn() -> Value + 'static) -> Self {
        Self {
            get: Rc::new(get),
            set: None,
        }
    }

    pub fn with_setter(mut self, set: impl Fn(Value) + 'static) -> Self {
        self.set = Some(Rc::new(set));
        self
    }

    pub fn get(&self) -> Value {
        (self.get)()
    }

    /// Write through the setter. Returns false (and drops the value) when read-only.
    pub fn set(&self, value: Value) -> bool {
        match &self.set {
            Some(set) => {
                set(value);
                true
            }
            None => false,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// How a property is stored on its object.
#[derive(Debug, Clone)]
pub enum Property {
    Data(Value),
    Accessor(Accessor),
}

// =============================================================================
// ObjectRef
// =============================================================================

#[derive(Default)]
pub(crate) struct ObjectData {
    properties: IndexMap<String, Property>,
}

/// Shared handle to an object node. Cloning shares the node.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

/// Weak handle to an object node.
#[derive(Clone)]
pub struct WeakObject(Weak<RefCell<ObjectData>>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an object from `(name, value)` pairs, keeping their order.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let properties = entries
            .into_iter()
            .map(|(k, v)| (k.into(), Property::Data(v.into())))
            .collect();
        Self(Rc::new(RefCell::new(ObjectData { properties })))
    }

    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().properties.is_empty()
    }

    /// Property names in insertion order (a snapshot).
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.borrow().properties.contains_key(name)
    }

    /// The raw property slot, without invoking any accessor.
    pub fn property(&self, name: &str) -> Option<Property> {
        self.0.borrow().properties.get(name).cloned()
    }

    /// Read a property, going through its accessor if it has one.
    pub fn get(&self, name: &str) -> Value {
        match self.property(name) {
            None => Value::Undefined,
            Some(Property::Data(value)) => value,
            Some(Property::Accessor(accessor)) => accessor.get(),
        }
    }

    /// Write a property, going through its accessor if it has one.
    ///
    /// Writes to a read-only accessor are ignored.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let accessor = match self.0.borrow().properties.get(name) {
            Some(Property::Accessor(accessor)) => Some(accessor.clone()),
            _ => None,
        };
        match accessor {
            Some(accessor) => {
                accessor.set(value);
            }
            None => {
                self.0
                    .borrow_mut()
                    .properties
                    .insert(name.to_string(), Property::Data(value));
            }
        }
    }

    /// Install an accessor, replacing whatever the property held.
    pub fn define_accessor(&self, name: &str, accessor: Accessor) {
        let previous = self
            .0
            .borrow_mut()
            .properties
            .insert(name.to_string(), Property::Accessor(accessor));
        drop(previous);
    }

    /// Store plain data, replacing any accessor without calling it.
    pub fn define_value(&self, name: &str, value: impl Into<Value>) {
        let previous = self
            .0
            .borrow_mut()
            .properties
            .insert(name.to_string(), Property::Data(value.into()));
        drop(previous);
    }

    pub fn remove(&self, name: &str) -> Option<Property> {
        self.0.borrow_mut().properties.shift_remove(name)
    }

    pub fn is_accessor(&self, name: &str) -> bool {
        matches!(
            self.0.borrow().properties.get(name),
            Some(Property::Accessor(_))
        )
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object{} {:?}", self.id(), self.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_data_properties_keep_order() {
        let obj = ObjectRef::from_entries([("b", Value::from(1)), ("a", Value::from(2))]);
        obj.set("c", 3);
        assert_eq!(obj.keys(), vec!["b", "a", "c"]);
        assert_eq!(obj.get("a"), Value::from(2));
        assert_eq!(obj.get("missing"), Value::Undefined);
    }

    #[test]
    fn test_accessor_routes_reads_and_writes() {
        let store = Rc::new(RefCell::new(Value::from(1)));
        let read = store.clone();
        let write = store.clone();
        let obj = ObjectRef::new();
        obj.define_accessor(
            "x",
            Accessor::new(move || read.borrow().clone())
                .with_setter(move |v| *write.borrow_mut() = v),
        );

        assert_eq!(obj.get("x"), Value::from(1));
        obj.set("x", 5);
        assert_eq!(*store.borrow(), Value::from(5));
        assert!(obj.is_accessor("x"));
    }

    #[test]
    fn test_read_only_accessor_ignores_writes() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let obj = ObjectRef::new();
        obj.define_accessor(
            "total",
            Accessor::new(move || {
                counter.set(counter.get() + 1);
                Value::from(10)
            }),
        );

        obj.set("total", 99);
        assert_eq!(obj.get("total"), Value::from(10));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_define_value_replaces_accessor_position() {
        let obj = ObjectRef::from_entries([("a", 1), ("b", 2)]);
        obj.define_accessor("a", Accessor::new(|| Value::Null));
        obj.define_value("a", 7);
        assert!(!obj.is_accessor("a"));
        assert_eq!(obj.keys(), vec!["a", "b"]);
        assert_eq!(obj.get("a"), Value::from(7));
    }

    #[test]
    fn test_identity() {
        let a = ObjectRef::new();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), ObjectRef::new().id());

        let weak = a.downgrade();
        assert!(weak.is_alive());
        drop(a);
        drop(b);
        assert!(!weak.is_alive());
    }
}
