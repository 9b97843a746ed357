//! Reactive cells - The primitive every converted property is backed by.
//!
//! The engine never creates cells directly. It asks the current
//! [`CellProvider`] for one and talks to it through [`ReactiveCell`]:
//!
//! - `get` reads and registers a dependency, `peek` reads without one
//! - `set` writes (ignored by read-only cells)
//! - `value_will_mutate` / `value_has_mutated` bracket in-place array changes
//! - bulk operations (`remove`, `remove_all`, `destroy`, `destroy_all`,
//!   `replace`) each emit exactly one will/has pair
//!
//! Providers:
//! - [`SignalProvider`] (default) - backed by spark-signals
//! - [`PlainProvider`] - untracked cells that count notifications

pub mod plain;
pub mod signals;

pub use plain::{CellStats, PlainProvider};
pub use signals::SignalProvider;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::graph::bulk::{self, Phase};
use crate::graph::ArrayRef;
use crate::types::{Function, Value};

// =============================================================================
// ReactiveCell
// =============================================================================

/// A value holder that notifies subscribers when it changes.
pub trait ReactiveCell {
    /// Read the value, registering a dependency in the current reactive scope.
    fn get(&self) -> Value;

    /// Read the value without registering a dependency.
    fn peek(&self) -> Value;

    /// Write a new value. Read-only cells ignore writes.
    fn set(&self, value: Value);

    fn is_writable(&self) -> bool {
        true
    }

    fn value_will_mutate(&self) {}

    fn value_has_mutated(&self) {}

    fn notify(&self, phase: Phase) {
        match phase {
            Phase::WillMutate => self.value_will_mutate(),
            Phase::HasMutated => self.value_has_mutated(),
        }
    }

    // -------------------------------------------------------------------------
    // Bulk array operations (on the array this cell currently holds)
    //
    // Must emit at most one will/has pair. The array binding suppresses its
    // own notifications while these run.
    // -------------------------------------------------------------------------

    fn remove(&self, predicate: &dyn Fn(&Value) -> bool) -> Vec<Value> {
        match self.peek() {
            Value::Array(array) => bulk::remove(&array, predicate, &|p| self.notify(p)),
            _ => Vec::new(),
        }
    }

    fn remove_all(&self, values: Option<&[Value]>) -> Vec<Value> {
        match self.peek() {
            Value::Array(array) => bulk::remove_all(&array, values, &|p| self.notify(p)),
            _ => Vec::new(),
        }
    }

    fn destroy(&self, predicate: &dyn Fn(&Value) -> bool) {
        if let Value::Array(array) = self.peek() {
            bulk::destroy(&array, predicate, &|p| self.notify(p));
        }
    }

    fn destroy_all(&self, values: Option<&[Value]>) {
        if let Value::Array(array) = self.peek() {
            bulk::destroy_all(&array, values, &|p| self.notify(p));
        }
    }

    fn replace(&self, old: &Value, new: Value) {
        if let Value::Array(array) = self.peek() {
            bulk::replace(&array, old, new, &|p| self.notify(p));
        }
    }
}

// =============================================================================
// Observable
// =============================================================================

/// Shared handle to a reactive cell. Equality is identity.
#[derive(Clone)]
pub struct Observable(Rc<dyn ReactiveCell>);

/// Weak handle to a reactive cell.
#[derive(Clone)]
pub struct WeakObservable(Weak<dyn ReactiveCell>);

impl WeakObservable {
    pub fn upgrade(&self) -> Option<Observable> {
        self.0.upgrade().map(Observable)
    }
}

impl Observable {
    pub fn new(cell: impl ReactiveCell + 'static) -> Self {
        Self(Rc::new(cell))
    }

    pub fn from_rc(cell: Rc<dyn ReactiveCell>) -> Self {
        Self(cell)
    }

    pub fn get(&self) -> Value {
        self.0.get()
    }

    pub fn peek(&self) -> Value {
        self.0.peek()
    }

    pub fn set(&self, value: impl Into<Value>) {
        self.0.set(value.into());
    }

    pub fn is_writable(&self) -> bool {
        self.0.is_writable()
    }

    pub fn value_will_mutate(&self) {
        self.0.value_will_mutate();
    }

    pub fn value_has_mutated(&self) {
        self.0.value_has_mutated();
    }

    /// The underlying cell, for bulk operations.
    pub fn cell(&self) -> &dyn ReactiveCell {
        &*self.0
    }

    pub fn downgrade(&self) -> WeakObservable {
        WeakObservable(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Observable) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for Observable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observable({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// CellProvider
// =============================================================================

/// Read/write functions of a computed cell.
#[derive(Clone)]
pub struct ComputedOptions {
    pub read: Function,
    pub write: Option<Function>,
}

/// Creates the cells the engine binds properties to.
pub trait CellProvider {
    /// A scalar cell seeded with `initial`.
    fn observable(&self, initial: Value) -> Observable;

    /// A cell over `array`, supporting will/has-mutate and bulk operations.
    fn observable_array(&self, array: ArrayRef) -> Observable;

    /// A computed cell. Evaluation is deferred until the first read.
    fn computed(&self, options: ComputedOptions) -> Observable;
}

thread_local! {
    static PROVIDER: RefCell<Rc<dyn CellProvider>> = RefCell::new(Rc::new(SignalProvider));
}

/// The provider new cells come from.
pub fn cell_provider() -> Rc<dyn CellProvider> {
    PROVIDER.with(|p| p.borrow().clone())
}

/// Replace the provider for this thread. Existing cells are unaffected.
pub fn set_cell_provider(provider: impl CellProvider + 'static) {
    PROVIDER.with(|p| *p.borrow_mut() = Rc::new(provider));
    tracing::trace!("cell provider replaced");
}

/// Restore the spark-signals provider.
pub fn reset_cell_provider() {
    PROVIDER.with(|p| *p.borrow_mut() = Rc::new(SignalProvider));
}
