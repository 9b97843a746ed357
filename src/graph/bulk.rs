//! Bulk array operations.
//!
//! Each operation emits at most one `WillMutate`/`HasMutated` pair through
//! `notify`, however many elements it touches. Element removals go through
//! `ArrayRef::mutate`, so an instrumented array sees them as splices.

use super::array::{ArrayRef, Mutation};
use crate::types::Value;

/// Property set on destroyed items instead of removing them.
pub const DESTROY_FLAG: &str = "_destroy";

/// Half of a mutation notification pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WillMutate,
    HasMutated,
}

/// Remove every element matching `predicate`. Notifies only if something was removed.
pub fn remove(
    array: &ArrayRef,
    predicate: &dyn Fn(&Value) -> bool,
    notify: &dyn Fn(Phase),
) -> Vec<Value> {
    let mut removed = Vec::new();
    let mut index = 0;
    while index < array.len() {
        let value = array.get(index);
        if predicate(&value) {
            if removed.is_empty() {
                notify(Phase::WillMutate);
            }
            array.mutate(Mutation::Splice {
                start: index,
                delete_count: 1,
                items: Vec::new(),
            });
            removed.push(value);
        } else {
            index += 1;
        }
    }
    if !removed.is_empty() {
        notify(Phase::HasMutated);
    }
    removed
}

/// Remove everything (`None`, always notifies) or every element found in `values`.
pub fn remove_all(
    array: &ArrayRef,
    values: Option<&[Value]>,
    notify: &dyn Fn(Phase),
) -> Vec<Value> {
    match values {
        None => {
            let all = array.to_vec();
            notify(Phase::WillMutate);
            array.mutate(Mutation::Splice {
                start: 0,
                delete_count: all.len(),
                items: Vec::new(),
            });
            notify(Phase::HasMutated);
            all
        }
        Some(values) => remove(array, &|v| values.contains(v), notify),
    }
}

/// Flag matching objects with `_destroy = true`. Always notifies once.
pub fn destroy(array: &ArrayRef, predicate: &dyn Fn(&Value) -> bool, notify: &dyn Fn(Phase)) {
    notify(Phase::WillMutate);
    for value in array.to_vec().iter().rev() {
        if !predicate(value) {
            continue;
        }
        if let Value::Object(object) = value {
            object.set(DESTROY_FLAG, true);
        }
    }
    notify(Phase::HasMutated);
}

pub fn destroy_all(array: &ArrayRef, values: Option<&[Value]>, notify: &dyn Fn(Phase)) {
    match values {
        None => destroy(array, &|_| true, notify),
        Some(values) => destroy(array, &|v| values.contains(v), notify),
    }
}

/// Replace the first element equal to `old`. Notifies only when found.
pub fn replace(array: &ArrayRef, old: &Value, new: Value, notify: &dyn Fn(Phase)) {
    let Some(index) = array.index_of(old) else {
        return;
    };
    notify(Phase::WillMutate);
    array.set(index, new);
    notify(Phase::HasMutated);
}
