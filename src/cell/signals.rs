//! spark-signals backed cells.
//!
//! - Scalars are a `Signal<Value>`.
//! - Arrays hold the array in a `Signal<Value>` plus a version `Signal<u64>`.
//!   In-place mutation keeps the same array handle (equal to itself), so
//!   `value_has_mutated` bumps the version to wake dependents.
//! - Computed cells are a lazy `Derived<Value>` with an optional write function.

use spark_signals::{derived, signal, untrack, Derived, Signal};

use super::{CellProvider, ComputedOptions, Observable, ReactiveCell};
use crate::graph::ArrayRef;
use crate::types::{Function, Value};

/// Default provider: cells are spark-signals signals and deriveds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProvider;

impl CellProvider for SignalProvider {
    fn observable(&self, initial: Value) -> Observable {
        Observable::new(SignalCell {
            value: signal(initial),
        })
    }

    fn observable_array(&self, array: ArrayRef) -> Observable {
        Observable::new(SignalArrayCell {
            value: signal(Value::Array(array)),
            version: signal(0u64),
        })
    }

    fn computed(&self, options: ComputedOptions) -> Observable {
        let read = options.read;
        Observable::new(ComputedCell {
            derived: derived(move || read.call(&[])),
            write: options.write,
        })
    }
}

// =============================================================================
// Scalar
// =============================================================================

struct SignalCell {
    value: Signal<Value>,
}

impl ReactiveCell for SignalCell {
    fn get(&self) -> Value {
        self.value.get()
    }

    fn peek(&self) -> Value {
        untrack(|| self.value.get())
    }

    fn set(&self, value: Value) {
        self.value.set(value);
    }
}

// =============================================================================
// Array
// =============================================================================

struct SignalArrayCell {
    value: Signal<Value>,
    version: Signal<u64>,
}

impl ReactiveCell for SignalArrayCell {
    fn get(&self) -> Value {
        // Track the version too so in-place mutations reach dependents
        let _ = self.version.get();
        self.value.get()
    }

    fn peek(&self) -> Value {
        untrack(|| self.value.get())
    }

    fn set(&self, value: Value) {
        self.value.set(value);
    }

    fn value_has_mutated(&self) {
        let next = untrack(|| self.version.get()).wrapping_add(1);
        self.version.set(next);
    }
}

// =============================================================================
// Computed
// =============================================================================

struct ComputedCell {
    derived: Derived<Value>,
    write: Option<Function>,
}

impl ReactiveCell for ComputedCell {
    fn get(&self) -> Value {
        self.derived.get()
    }

    fn peek(&self) -> Value {
        untrack(|| self.derived.get())
    }

    fn set(&self, value: Value) {
        if let Some(write) = &self.write {
            write.call(&[value]);
        }
    }

    fn is_writable(&self) -> bool {
        self.write.is_some()
    }
}
