//! Lifecycle integration - Convert view models right before they are bound.
//!
//! ```ignore
//! let mut binder = ViewModelBinder::new();
//! install(&mut binder);
//! binder.before_bind(&model, &view); // model is now reactive
//! ```

use std::fmt;
use std::rc::Rc;

use crate::types::Value;

use super::walker::convert_object;

/// Hook run with `(model, view)` before a view model is bound to its view.
pub type BeforeBind<V> = Rc<dyn Fn(&Value, &V)>;

/// The binding step of a view lifecycle, with an optional pre-bind hook.
pub struct ViewModelBinder<V> {
    before_bind: Option<BeforeBind<V>>,
}

impl<V> Default for ViewModelBinder<V> {
    fn default() -> Self {
        Self { before_bind: None }
    }
}

impl<V> fmt::Debug for ViewModelBinder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelBinder")
            .field("has_before_bind", &self.before_bind.is_some())
            .finish()
    }
}

impl<V: 'static> ViewModelBinder<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before_bind(hook: impl Fn(&Value, &V) + 'static) -> Self {
        Self {
            before_bind: Some(Rc::new(hook)),
        }
    }

    pub fn has_before_bind(&self) -> bool {
        self.before_bind.is_some()
    }

    /// Run the pre-bind hook, if any.
    pub fn before_bind(&self, model: &Value, view: &V) {
        if let Some(hook) = &self.before_bind {
            hook(model, view);
        }
    }
}

/// Make `binder` convert every model before binding.
///
/// An existing hook is kept and runs after conversion.
pub fn install<V: 'static>(binder: &mut ViewModelBinder<V>) {
    let hook: BeforeBind<V> = match binder.before_bind.take() {
        None => Rc::new(|model: &Value, _view: &V| convert_object(model)),
        Some(original) => Rc::new(move |model: &Value, view: &V| {
            convert_object(model);
            original(model, view);
        }),
    };
    binder.before_bind = Some(hook);
    tracing::trace!("view model conversion installed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{reset_cell_provider, set_cell_provider, PlainProvider};
    use crate::engine::marker::{is_converted, reset_markers};
    use crate::graph::ObjectRef;
    use std::cell::RefCell;

    #[test]
    fn test_install_without_existing_hook() {
        reset_markers();
        set_cell_provider(PlainProvider::new());
        let mut binder: ViewModelBinder<String> = ViewModelBinder::new();
        assert!(!binder.has_before_bind());

        install(&mut binder);
        assert!(binder.has_before_bind());

        let model: Value = ObjectRef::from_entries([("a", 1)]).into();
        binder.before_bind(&model, &"view".to_string());
        assert!(is_converted(&model));
        reset_cell_provider();
    }

    #[test]
    fn test_install_chains_conversion_before_existing_hook() {
        reset_markers();
        set_cell_provider(PlainProvider::new());
        let observed = Rc::new(RefCell::new(Vec::new()));
        let log = observed.clone();
        let mut binder = ViewModelBinder::with_before_bind(move |model: &Value, view: &String| {
            log.borrow_mut().push((is_converted(model), view.clone()));
        });

        install(&mut binder);
        let model: Value = ObjectRef::new().into();
        binder.before_bind(&model, &"shell".to_string());

        assert_eq!(*observed.borrow(), vec![(true, "shell".to_string())]);
        reset_cell_provider();
    }
}
