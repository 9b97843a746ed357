//! Array Instrumenter - Route an array's mutations through its cell.
//!
//! Instrumenting installs an [`ArrayBinding`] on the array itself, so every
//! holder of the array handle gets the reactive behavior:
//!
//! ```text
//! Delegated  (remove, remove_all, destroy, destroy_all, replace)
//!     mode = Suppressed → cell bulk op (one will/has pair) → mode restored
//! Structural (pop, shift, reverse, sort, splice)
//!     [will] → native op → [has]          (only while Notifying)
//! Additive   (push, unshift, splice)
//!     convert inserted values → same as structural
//! ```
//!
//! The binding holds its cell weakly: the cell owns the array, never the
//! other way round. With the cell gone, mutations still convert inserted
//! values and apply natively.

use std::cell::Cell;
use std::rc::Rc;

use crate::cell::{Observable, WeakObservable};
use crate::graph::{ArrayInterceptor, ArrayRef, Mutation, MutationKind, Outcome};
use crate::types::Value;

use super::marker::begin_conversion;
use super::walker::{convert_object, report_converted};

/// Whether structural mutations currently emit will/has notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    Notifying,
    /// A bulk operation is running and emits its own single notification.
    Suppressed,
}

/// Interceptor tying one array to one cell.
pub struct ArrayBinding {
    cell: WeakObservable,
    mode: Cell<NotifyMode>,
}

/// Restores the previous mode when dropped, including on unwind.
struct ModeGuard<'a> {
    mode: &'a Cell<NotifyMode>,
    previous: NotifyMode,
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        self.mode.set(self.previous);
    }
}

impl ArrayBinding {
    pub fn new(cell: &Observable) -> Self {
        Self {
            cell: cell.downgrade(),
            mode: Cell::new(NotifyMode::Notifying),
        }
    }

    pub fn mode(&self) -> NotifyMode {
        self.mode.get()
    }

    fn suppress(&self) -> ModeGuard<'_> {
        ModeGuard {
            mode: &self.mode,
            previous: self.mode.replace(NotifyMode::Suppressed),
        }
    }

    /// The cell, if notifications are on and it is still alive.
    fn notifying_cell(&self) -> Option<Observable> {
        match self.mode.get() {
            NotifyMode::Notifying => self.cell.upgrade(),
            NotifyMode::Suppressed => None,
        }
    }

    fn structural(&self, array: &ArrayRef, mutation: Mutation) -> Outcome {
        if let Some(cell) = self.notifying_cell() {
            cell.value_will_mutate();
        }
        let outcome = array.apply(mutation);
        if let Some(cell) = self.notifying_cell() {
            cell.value_has_mutated();
        }
        outcome
    }

    fn delegated(&self, array: &ArrayRef, mutation: Mutation) -> Outcome {
        let Some(cell) = self.cell.upgrade() else {
            return array.apply(mutation);
        };
        let _guard = self.suppress();
        let bulk = cell.cell();
        match mutation {
            Mutation::Remove(predicate) => Outcome::Removed(bulk.remove(&*predicate)),
            Mutation::RemoveAll(values) => Outcome::Removed(bulk.remove_all(values.as_deref())),
            Mutation::Destroy(predicate) => {
                bulk.destroy(&*predicate);
                Outcome::Done
            }
            Mutation::DestroyAll(values) => {
                bulk.destroy_all(values.as_deref());
                Outcome::Done
            }
            Mutation::Replace { old, new } => {
                bulk.replace(&old, new);
                Outcome::Done
            }
            other => array.apply(other),
        }
    }
}

impl ArrayInterceptor for ArrayBinding {
    fn intercept(&self, array: &ArrayRef, mutation: Mutation) -> Outcome {
        match mutation.kind() {
            MutationKind::Delegated => self.delegated(array, mutation),
            MutationKind::Structural => self.structural(array, mutation),
            MutationKind::Additive => {
                for value in mutation.inserted() {
                    convert_object(value);
                }
                self.structural(array, mutation)
            }
        }
    }
}

/// Instrument `array` against `cell` and convert its current elements.
///
/// Returns false if the array was already instrumented; the array is never
/// replaced either way.
pub fn make_observable_array(array: &ArrayRef, cell: &Observable) -> bool {
    if !begin_conversion(array) {
        return false;
    }
    array.install_interceptor(Rc::new(ArrayBinding::new(cell)));
    for item in array.to_vec() {
        convert_object(&item);
    }
    tracing::trace!(array = ?array, "array instrumented");
    report_converted(&Value::Array(array.clone()));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{
        reset_cell_provider, set_cell_provider, CellProvider, PlainProvider, ReactiveCell,
    };
    use crate::engine::marker::{is_converted, reset_markers};
    use crate::graph::ObjectRef;
    use std::cell::RefCell;

    fn setup() -> PlainProvider {
        reset_markers();
        let provider = PlainProvider::new();
        set_cell_provider(provider.clone());
        provider
    }

    fn numbers(values: &[i32]) -> ArrayRef {
        values.iter().map(|&n| Value::from(n)).collect()
    }

    #[test]
    fn test_instrument_is_idempotent_and_keeps_identity() {
        let provider = setup();
        let array = numbers(&[1, 2]);
        let original = array.clone();
        let cell = provider.observable_array(array.clone());

        assert!(make_observable_array(&array, &cell));
        assert!(!make_observable_array(&array, &cell));
        assert!(array.ptr_eq(&original));
        assert!(array.is_instrumented());
        reset_cell_provider();
    }

    #[test]
    fn test_structural_ops_notify_once_each() {
        let provider = setup();
        let array = numbers(&[3, 1, 2]);
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        array.pop();
        array.reverse();
        array.sort();
        array.shift();
        let stats = provider.stats(&cell).expect("stats");
        assert_eq!(stats.will_mutate(), 4);
        assert_eq!(stats.has_mutated(), 4);
        reset_cell_provider();
    }

    #[test]
    fn test_additive_ops_convert_inserted_values() {
        let provider = setup();
        let array = ArrayRef::new();
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        let pushed = ObjectRef::from_entries([("x", 1)]);
        let unshifted = ObjectRef::from_entries([("y", 2)]);
        array.push(pushed.clone());
        array.unshift(unshifted.clone());

        assert!(is_converted(&Value::Object(pushed.clone())));
        assert!(is_converted(&Value::Object(unshifted)));
        assert!(pushed.is_accessor("x"));
        assert_eq!(provider.stats(&cell).map(|s| s.has_mutated()), Some(2));
        reset_cell_provider();
    }

    #[test]
    fn test_splice_converts_only_inserted_items() {
        let provider = setup();
        let array = numbers(&[1, 2]);
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        let inserted = ObjectRef::from_entries([("x", 1)]);
        let removed = array.splice(1, 0, [Value::Object(inserted.clone())]);

        assert!(removed.is_empty());
        assert_eq!(array.len(), 3);
        assert!(array.get(1) == Value::Object(inserted.clone()));
        assert!(is_converted(&Value::Object(inserted)));
        reset_cell_provider();
    }

    #[test]
    fn test_initial_pass_converts_existing_elements() {
        let provider = setup();
        let nested = ObjectRef::from_entries([("name", "a")]);
        let inner = numbers(&[1]);
        let array = ArrayRef::from_values(vec![nested.clone().into(), inner.clone().into()]);
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        assert!(is_converted(&Value::Object(nested)));
        assert!(inner.is_instrumented());
        reset_cell_provider();
    }

    #[test]
    fn test_delegated_ops_emit_single_notification() {
        let provider = setup();
        let array = numbers(&[1, 2, 3, 4, 5]);
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        let removed = array.remove_where(|v| v.as_number().is_some_and(|n| n > 1.0));
        assert_eq!(removed.len(), 4);
        let stats = provider.stats(&cell).expect("stats");
        assert_eq!(stats.will_mutate(), 1);
        assert_eq!(stats.has_mutated(), 1);

        array.push_all([Value::from(7), Value::from(8)]);
        array.remove_all();
        assert!(array.is_empty());
        assert_eq!(stats.has_mutated(), 3);
        reset_cell_provider();
    }

    #[test]
    fn test_replace_notifies_once() {
        let provider = setup();
        let array = numbers(&[1, 2, 3]);
        let cell = provider.observable_array(array.clone());
        make_observable_array(&array, &cell);

        array.replace(&Value::from(2), 20);
        assert_eq!(array.get(1), Value::from(20));
        assert_eq!(provider.stats(&cell).map(|s| s.has_mutated()), Some(1));
        reset_cell_provider();
    }

    /// A cell whose bulk removal calls back into the array's public mutators.
    struct ReentrantCell {
        array: ArrayRef,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ReactiveCell for ReentrantCell {
        fn get(&self) -> Value {
            Value::Array(self.array.clone())
        }

        fn peek(&self) -> Value {
            Value::Array(self.array.clone())
        }

        fn set(&self, _value: Value) {}

        fn value_will_mutate(&self) {
            self.log.borrow_mut().push("will");
        }

        fn value_has_mutated(&self) {
            self.log.borrow_mut().push("has");
        }

        fn remove_all(&self, _values: Option<&[Value]>) -> Vec<Value> {
            self.value_will_mutate();
            let mut removed = Vec::new();
            while let Some(v) = self.array.pop() {
                removed.push(v);
            }
            self.value_has_mutated();
            removed
        }
    }

    #[test]
    fn test_suppressed_mode_blocks_reentrant_notifications() {
        reset_markers();
        let log = Rc::new(RefCell::new(Vec::new()));
        let array = numbers(&[1, 2, 3]);
        let cell = Observable::new(ReentrantCell {
            array: array.clone(),
            log: log.clone(),
        });
        make_observable_array(&array, &cell);

        array.remove_all();
        assert!(array.is_empty());
        assert_eq!(*log.borrow(), vec!["will", "has"]);
    }

    #[test]
    fn test_mode_restored_after_delegation() {
        let provider = PlainProvider::new();
        let array = numbers(&[1, 2]);
        let cell = provider.observable_array(array.clone());
        let binding = ArrayBinding::new(&cell);

        assert_eq!(binding.mode(), NotifyMode::Notifying);
        binding.intercept(&array, Mutation::RemoveAll(None));
        assert_eq!(binding.mode(), NotifyMode::Notifying);

        {
            let _guard = binding.suppress();
            assert_eq!(binding.mode(), NotifyMode::Suppressed);
            binding.intercept(&array, Mutation::Push(vec![Value::from(1)]));
        }
        assert_eq!(binding.mode(), NotifyMode::Notifying);

        // remove_all: one pair; push while suppressed: none
        let stats = provider.stats(&cell).expect("stats");
        assert_eq!(stats.has_mutated(), 1);
    }

    #[test]
    fn test_dropped_cell_falls_back_to_native() {
        reset_markers();
        let array = numbers(&[1, 2, 3]);
        let cell = crate::cell::SignalProvider.observable_array(array.clone());
        make_observable_array(&array, &cell);
        drop(cell);

        let obj = ObjectRef::from_entries([("k", 1)]);
        array.push(obj.clone());
        assert_eq!(array.remove(&Value::from(2)), vec![Value::from(2)]);
        assert_eq!(array.len(), 3);
        assert!(is_converted(&Value::Object(obj)));
    }
}
