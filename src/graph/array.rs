//! ArrayRef - A shared array node whose mutators can be intercepted.
//!
//! Every mutating call is described as a [`Mutation`] and handed to
//! [`ArrayRef::mutate`]. When an [`ArrayInterceptor`] is installed the
//! mutation goes to it; otherwise it is applied natively. Index reads and
//! index assignment are never intercepted.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use super::bulk::{self, Phase};
use crate::types::{NodeId, Value};

pub type Predicate = Box<dyn Fn(&Value) -> bool>;
pub type Comparator = Box<dyn FnMut(&Value, &Value) -> Ordering>;

// =============================================================================
// Mutation Vocabulary
// =============================================================================

/// A mutating array operation.
pub enum Mutation {
    // Additive
    Push(Vec<Value>),
    Unshift(Vec<Value>),
    /// Removal and/or insertion at `start`.
    Splice {
        start: usize,
        delete_count: usize,
        items: Vec<Value>,
    },

    // Structural
    Pop,
    Shift,
    Reverse,
    Sort(Comparator),

    // Delegated to the cell's bulk operations
    Remove(Predicate),
    /// `None` removes everything.
    RemoveAll(Option<Vec<Value>>),
    Destroy(Predicate),
    /// `None` destroys everything.
    DestroyAll(Option<Vec<Value>>),
    Replace { old: Value, new: Value },
}

/// Notification category of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Handed to the cell's bulk operation, which notifies once on its own.
    Delegated,
    /// Native operation bracketed by will/has-mutate.
    Structural,
    /// Like structural, but inserted values are converted first.
    Additive,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Push(_) | Mutation::Unshift(_) | Mutation::Splice { .. } => {
                MutationKind::Additive
            }
            Mutation::Pop | Mutation::Shift | Mutation::Reverse | Mutation::Sort(_) => {
                MutationKind::Structural
            }
            Mutation::Remove(_)
            | Mutation::RemoveAll(_)
            | Mutation::Destroy(_)
            | Mutation::DestroyAll(_)
            | Mutation::Replace { .. } => MutationKind::Delegated,
        }
    }

    /// Values this mutation inserts. A splice's start and delete count are not data.
    pub fn inserted(&self) -> &[Value] {
        match self {
            Mutation::Push(items) | Mutation::Unshift(items) => items,
            Mutation::Splice { items, .. } => items,
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Push(_) => "push",
            Mutation::Unshift(_) => "unshift",
            Mutation::Splice { .. } => "splice",
            Mutation::Pop => "pop",
            Mutation::Shift => "shift",
            Mutation::Reverse => "reverse",
            Mutation::Sort(_) => "sort",
            Mutation::Remove(_) => "remove",
            Mutation::RemoveAll(_) => "remove_all",
            Mutation::Destroy(_) => "destroy",
            Mutation::DestroyAll(_) => "destroy_all",
            Mutation::Replace { .. } => "replace",
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Splice {
                start,
                delete_count,
                items,
            } => f
                .debug_struct("Splice")
                .field("start", start)
                .field("delete_count", delete_count)
                .field("items", items)
                .finish(),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// What a mutation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    /// New length (push, unshift).
    Length(usize),
    /// Removed element (pop, shift).
    Taken(Option<Value>),
    /// Removed elements (splice, remove, remove_all).
    Removed(Vec<Value>),
}

impl Outcome {
    fn into_removed(self) -> Vec<Value> {
        match self {
            Outcome::Removed(items) => items,
            Outcome::Taken(item) => item.into_iter().collect(),
            Outcome::Done | Outcome::Length(_) => Vec::new(),
        }
    }
}

/// Receives every mutation of an array it is installed on.
pub trait ArrayInterceptor {
    fn intercept(&self, array: &ArrayRef, mutation: Mutation) -> Outcome;
}

// =============================================================================
// ArrayRef
// =============================================================================

#[derive(Default)]
pub(crate) struct ArrayData {
    items: Vec<Value>,
    interceptor: Option<Rc<dyn ArrayInterceptor>>,
}

/// Shared handle to an array node. Cloning shares the node.
#[derive(Clone, Default)]
pub struct ArrayRef(Rc<RefCell<ArrayData>>);

/// Weak handle to an array node.
#[derive(Clone)]
pub struct WeakArray(Weak<RefCell<ArrayData>>);

impl WeakArray {
    pub fn upgrade(&self) -> Option<ArrayRef> {
        self.0.upgrade().map(ArrayRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl FromIterator<Value> for ArrayRef {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(ArrayData {
            items,
            interceptor: None,
        })))
    }

    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakArray {
        WeakArray(Rc::downgrade(&self.0))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    /// Element at `index`, or `Undefined` past the end.
    pub fn get(&self, index: usize) -> Value {
        self.0
            .borrow()
            .items
            .get(index)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.0.borrow().items.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.index_of(value).is_some()
    }

    /// Index assignment. Not intercepted; past-the-end indices pad with `Undefined`.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        if index >= data.items.len() {
            data.items.resize(index + 1, Value::Undefined);
        }
        let previous = std::mem::replace(&mut data.items[index], value);
        drop(data);
        drop(previous);
    }

    // -------------------------------------------------------------------------
    // Interception
    // -------------------------------------------------------------------------

    /// Whether an interceptor has been installed (the array was instrumented).
    pub fn is_instrumented(&self) -> bool {
        self.0.borrow().interceptor.is_some()
    }

    pub(crate) fn install_interceptor(&self, interceptor: Rc<dyn ArrayInterceptor>) {
        self.0.borrow_mut().interceptor = Some(interceptor);
    }

    /// Route a mutation through the installed interceptor, or apply it natively.
    pub fn mutate(&self, mutation: Mutation) -> Outcome {
        let interceptor = self.0.borrow().interceptor.clone();
        match interceptor {
            Some(interceptor) => interceptor.intercept(self, mutation),
            None => self.apply(mutation),
        }
    }

    /// Apply a mutation without interception or notification.
    ///
    /// Delegated mutations are carried out with the bulk helpers, whose
    /// element removals still go through [`ArrayRef::mutate`].
    pub fn apply(&self, mutation: Mutation) -> Outcome {
        let silent = |_: Phase| {};
        match mutation {
            Mutation::Push(items) => {
                let mut data = self.0.borrow_mut();
                data.items.extend(items);
                Outcome::Length(data.items.len())
            }
            Mutation::Unshift(items) => {
                let mut data = self.0.borrow_mut();
                data.items.splice(0..0, items);
                Outcome::Length(data.items.len())
            }
            Mutation::Splice {
                start,
                delete_count,
                items,
            } => {
                let mut data = self.0.borrow_mut();
                let len = data.items.len();
                let start = start.min(len);
                let end = start.saturating_add(delete_count).min(len);
                let removed: Vec<Value> = data.items.splice(start..end, items).collect();
                Outcome::Removed(removed)
            }
            Mutation::Pop => Outcome::Taken(self.0.borrow_mut().items.pop()),
            Mutation::Shift => {
                let mut data = self.0.borrow_mut();
                if data.items.is_empty() {
                    Outcome::Taken(None)
                } else {
                    Outcome::Taken(Some(data.items.remove(0)))
                }
            }
            Mutation::Reverse => {
                self.0.borrow_mut().items.reverse();
                Outcome::Done
            }
            Mutation::Sort(mut compare) => {
                // The comparator is user code: sort a snapshot, never the borrowed vec.
                let mut items = self.to_vec();
                items.sort_by(|a, b| compare(a, b));
                let previous = std::mem::replace(&mut self.0.borrow_mut().items, items);
                drop(previous);
                Outcome::Done
            }
            Mutation::Remove(predicate) => {
                Outcome::Removed(bulk::remove(self, &*predicate, &silent))
            }
            Mutation::RemoveAll(values) => {
                Outcome::Removed(bulk::remove_all(self, values.as_deref(), &silent))
            }
            Mutation::Destroy(predicate) => {
                bulk::destroy(self, &*predicate, &silent);
                Outcome::Done
            }
            Mutation::DestroyAll(values) => {
                bulk::destroy_all(self, values.as_deref(), &silent);
                Outcome::Done
            }
            Mutation::Replace { old, new } => {
                bulk::replace(self, &old, new, &silent);
                Outcome::Done
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Append one value; returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        self.push_all([value.into()])
    }

    /// Append several values in one operation; returns the new length.
    pub fn push_all(&self, values: impl IntoIterator<Item = Value>) -> usize {
        match self.mutate(Mutation::Push(values.into_iter().collect())) {
            Outcome::Length(len) => len,
            _ => self.len(),
        }
    }

    pub fn unshift(&self, value: impl Into<Value>) -> usize {
        self.unshift_all([value.into()])
    }

    pub fn unshift_all(&self, values: impl IntoIterator<Item = Value>) -> usize {
        match self.mutate(Mutation::Unshift(values.into_iter().collect())) {
            Outcome::Length(len) => len,
            _ => self.len(),
        }
    }

    pub fn pop(&self) -> Option<Value> {
        match self.mutate(Mutation::Pop) {
            Outcome::Taken(item) => item,
            _ => None,
        }
    }

    pub fn shift(&self) -> Option<Value> {
        match self.mutate(Mutation::Shift) {
            Outcome::Taken(item) => item,
            _ => None,
        }
    }

    pub fn reverse(&self) {
        self.mutate(Mutation::Reverse);
    }

    /// Sort by string form, like the default dynamic-language sort.
    pub fn sort(&self) {
        self.sort_by(|a, b| a.to_display_string().cmp(&b.to_display_string()));
    }

    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering + 'static) {
        self.mutate(Mutation::Sort(Box::new(compare)));
    }

    /// Remove `delete_count` elements at `start` and insert `items` there.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        self.mutate(Mutation::Splice {
            start,
            delete_count,
            items: items.into_iter().collect(),
        })
        .into_removed()
    }

    /// Remove every element equal to `value`.
    pub fn remove(&self, value: &Value) -> Vec<Value> {
        let value = value.clone();
        self.remove_where(move |v| *v == value)
    }

    pub fn remove_where(&self, predicate: impl Fn(&Value) -> bool + 'static) -> Vec<Value> {
        self.mutate(Mutation::Remove(Box::new(predicate)))
            .into_removed()
    }

    /// Remove every element.
    pub fn remove_all(&self) -> Vec<Value> {
        self.mutate(Mutation::RemoveAll(None)).into_removed()
    }

    /// Remove every element contained in `values`.
    pub fn remove_values(&self, values: Vec<Value>) -> Vec<Value> {
        self.mutate(Mutation::RemoveAll(Some(values)))
            .into_removed()
    }

    /// Flag every object equal to `value` with `_destroy = true`.
    pub fn destroy(&self, value: &Value) {
        let value = value.clone();
        self.destroy_where(move |v| *v == value);
    }

    pub fn destroy_where(&self, predicate: impl Fn(&Value) -> bool + 'static) {
        self.mutate(Mutation::Destroy(Box::new(predicate)));
    }

    pub fn destroy_all(&self) {
        self.mutate(Mutation::DestroyAll(None));
    }

    pub fn destroy_values(&self, values: Vec<Value>) {
        self.mutate(Mutation::DestroyAll(Some(values)));
    }

    /// Replace the first element equal to `old` with `new`.
    pub fn replace(&self, old: &Value, new: impl Into<Value>) {
        self.mutate(Mutation::Replace {
            old: old.clone(),
            new: new.into(),
        });
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(f, "Array{}(len={}", self.id(), data.items.len())?;
        if data.interceptor.is_some() {
            write!(f, ", instrumented")?;
        }
        write!(f, ")")
    }
}
