//! Plain cells - No dependency tracking, just values and counters.
//!
//! Useful headless and in tests: every cell created by a `PlainProvider` is
//! retained by it and carries a [`CellStats`] recording writes, mutation
//! notifications and computed evaluations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{CellProvider, ComputedOptions, Observable, ReactiveCell};
use crate::graph::ArrayRef;
use crate::types::{Function, Value};

/// Counters for one plain cell.
#[derive(Debug, Default)]
pub struct CellStats {
    writes: Cell<usize>,
    will_mutate: Cell<usize>,
    has_mutated: Cell<usize>,
    evaluations: Cell<usize>,
}

impl CellStats {
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn will_mutate(&self) -> usize {
        self.will_mutate.get()
    }

    pub fn has_mutated(&self) -> usize {
        self.has_mutated.get()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }
}

enum Source {
    Stored(RefCell<Value>),
    Computed {
        read: Function,
        write: Option<Function>,
    },
}

struct PlainCell {
    source: Source,
    stats: Rc<CellStats>,
}

impl ReactiveCell for PlainCell {
    fn get(&self) -> Value {
        self.peek()
    }

    /// Computed cells re-evaluate on every read: nothing tracks their inputs.
    fn peek(&self) -> Value {
        match &self.source {
            Source::Stored(value) => value.borrow().clone(),
            Source::Computed { read, .. } => {
                CellStats::bump(&self.stats.evaluations);
                read.call(&[])
            }
        }
    }

    fn set(&self, value: Value) {
        match &self.source {
            Source::Stored(slot) => {
                CellStats::bump(&self.stats.writes);
                let previous = slot.replace(value);
                drop(previous);
            }
            Source::Computed { write: Some(write), .. } => {
                CellStats::bump(&self.stats.writes);
                write.call(&[value]);
            }
            Source::Computed { write: None, .. } => {}
        }
    }

    fn is_writable(&self) -> bool {
        !matches!(self.source, Source::Computed { write: None, .. })
    }

    fn value_will_mutate(&self) {
        CellStats::bump(&self.stats.will_mutate);
    }

    fn value_has_mutated(&self) {
        CellStats::bump(&self.stats.has_mutated);
    }
}

/// Provider of untracked, counting cells. Clones share the same cell log.
#[derive(Clone, Default)]
pub struct PlainProvider {
    created: Rc<RefCell<Vec<(Observable, Rc<CellStats>)>>>,
}

impl PlainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&self, source: Source) -> Observable {
        let stats = Rc::new(CellStats::default());
        let cell = Observable::new(PlainCell {
            source,
            stats: stats.clone(),
        });
        self.created.borrow_mut().push((cell.clone(), stats));
        cell
    }

    /// Counters of a cell this provider created.
    pub fn stats(&self, cell: &Observable) -> Option<Rc<CellStats>> {
        self.created
            .borrow()
            .iter()
            .find(|(c, _)| c.ptr_eq(cell))
            .map(|(_, stats)| stats.clone())
    }

    pub fn cells_created(&self) -> usize {
        self.created.borrow().len()
    }

    /// Sum of `value_has_mutated` calls across every cell.
    pub fn total_mutations(&self) -> usize {
        self.created
            .borrow()
            .iter()
            .map(|(_, stats)| stats.has_mutated())
            .sum()
    }
}

impl CellProvider for PlainProvider {
    fn observable(&self, initial: Value) -> Observable {
        self.create(Source::Stored(RefCell::new(initial)))
    }

    fn observable_array(&self, array: ArrayRef) -> Observable {
        self.create(Source::Stored(RefCell::new(Value::Array(array))))
    }

    fn computed(&self, options: ComputedOptions) -> Observable {
        self.create(Source::Computed {
            read: options.read,
            write: options.write,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_cell_counts_writes() {
        let provider = PlainProvider::new();
        let cell = provider.observable(Value::from(1));
        cell.set(2);
        cell.set(3);
        assert_eq!(cell.get(), Value::from(3));
        assert_eq!(provider.stats(&cell).map(|s| s.writes()), Some(2));
        assert_eq!(provider.cells_created(), 1);
    }

    #[test]
    fn test_computed_without_writer_is_read_only() {
        let provider = PlainProvider::new();
        let cell = provider.computed(ComputedOptions {
            read: Function::getter(|| Value::from("x")),
            write: None,
        });
        assert!(!cell.is_writable());
        cell.set(Value::from("ignored"));
        assert_eq!(cell.peek(), Value::from("x"));

        let stats = provider.stats(&cell).expect("stats");
        assert_eq!(stats.writes(), 0);
        assert_eq!(stats.evaluations(), 1);
    }

    #[test]
    fn test_computed_writer_receives_value() {
        let target = Rc::new(RefCell::new(Value::Undefined));
        let sink = target.clone();
        let provider = PlainProvider::new();
        let cell = provider.computed(ComputedOptions {
            read: Function::getter(|| Value::Null),
            write: Some(Function::setter(move |v| *sink.borrow_mut() = v)),
        });
        assert!(cell.is_writable());
        cell.set(5);
        assert_eq!(*target.borrow(), Value::from(5));
    }
}
