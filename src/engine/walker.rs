//! Graph Walker - Convert every reachable object and array into reactive form.
//!
//! ```text
//! convert_object(value)
//!     │
//!     ├── not convertible ──────────► return
//!     ├── Array ── new array cell ──► make_observable_array (checks `full` itself)
//!     └── Object
//!           ├── `full` already set ─► return        (idempotence + cycle guard)
//!           └── for each own name:
//!                 ignored prefix / already bound / Function ─► skip
//!                 otherwise ─► convert_property(node, name, value)
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::cell_provider;
use crate::classify::is_convertible;
use crate::config::config;
use crate::types::Value;

use super::array::make_observable_array;
use super::binder::convert_property;
use super::marker::{begin_conversion, has_cell, is_full};

/// Called with each node right after it has been converted.
pub type ConvertedHook = Rc<dyn Fn(&Value)>;

thread_local! {
    static CONVERTED_HOOKS: RefCell<Vec<ConvertedHook>> = const { RefCell::new(Vec::new()) };
}

/// Register a hook that sees every newly converted object and array.
pub fn on_converted(hook: impl Fn(&Value) + 'static) {
    CONVERTED_HOOKS.with(|hooks| hooks.borrow_mut().push(Rc::new(hook)));
}

/// Remove all conversion hooks on this thread.
pub fn clear_converted_hooks() {
    let hooks = CONVERTED_HOOKS.with(|hooks| std::mem::take(&mut *hooks.borrow_mut()));
    drop(hooks);
}

pub(super) fn report_converted(value: &Value) {
    if config().log_conversions {
        tracing::debug!(node = ?value, "converted");
    }
    // Snapshot so a hook may register further hooks.
    let hooks = CONVERTED_HOOKS.with(|hooks| hooks.borrow().clone());
    for hook in hooks {
        hook(value);
    }
}

/// Make `value` and everything reachable from it reactive, in place.
///
/// Non-convertible values are ignored. Converting an already converted node
/// does nothing.
pub fn convert_object(value: &Value) {
    if !is_convertible(value) {
        return;
    }

    match value {
        Value::Array(array) => {
            if is_full(array) {
                return;
            }
            let cell = cell_provider().observable_array(array.clone());
            make_observable_array(array, &cell);
        }
        Value::Object(object) => {
            if !begin_conversion(object) {
                return;
            }
            let settings = config();
            for name in object.keys() {
                if settings.ignores(&name) || has_cell(object, &name) {
                    continue;
                }
                let current = object.get(&name);
                if matches!(current, Value::Function(_)) {
                    continue;
                }
                convert_property(object, &name, Some(current));
            }
            report_converted(value);
        }
        _ => {}
    }
}
