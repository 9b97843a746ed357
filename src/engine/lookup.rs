//! Lookup - Fetch the cell behind a property, binding it on demand.

use crate::cell::Observable;
use crate::graph::ObjectRef;
use crate::types::Value;

use super::binder::convert_property;
use super::marker::cell_for;

/// The cell behind `name` on `node`.
///
/// `None` when `node` is not an object (including null and undefined) or the
/// property holds a plain function.
pub fn observable(node: &Value, name: &str) -> Option<Observable> {
    match node {
        Value::Object(object) => observable_of(object, name),
        _ => None,
    }
}

/// [`observable`] for a node already known to be an object.
pub fn observable_of(object: &ObjectRef, name: &str) -> Option<Observable> {
    if let Some(cell) = cell_for(object, name) {
        return Some(cell);
    }
    match object.get(name) {
        Value::Cell(cell) => Some(cell),
        current => convert_property(object, name, Some(current)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{reset_cell_provider, set_cell_provider, CellProvider, PlainProvider};
    use crate::engine::marker::{has_cell, reset_markers};
    use crate::engine::walker::convert_object;
    use crate::types::Function;

    fn setup() -> PlainProvider {
        reset_markers();
        let provider = PlainProvider::new();
        set_cell_provider(provider.clone());
        provider
    }

    #[test]
    fn test_non_objects_yield_none() {
        setup();
        assert!(observable(&Value::Null, "a").is_none());
        assert!(observable(&Value::Undefined, "a").is_none());
        assert!(observable(&Value::from(1), "a").is_none());
        reset_cell_provider();
    }

    #[test]
    fn test_returns_marker_cell_after_conversion() {
        let provider = setup();
        let obj = ObjectRef::from_entries([("a", 1)]);
        convert_object(&obj.clone().into());
        let created = provider.cells_created();

        let first = observable(&obj.clone().into(), "a").expect("cell");
        let second = observable(&obj.clone().into(), "a").expect("cell");
        assert!(first.ptr_eq(&second));
        assert_eq!(provider.cells_created(), created);
        reset_cell_provider();
    }

    #[test]
    fn test_raw_cell_is_returned_unbound() {
        let provider = setup();
        let cell = provider.observable(Value::from(3));
        let obj = ObjectRef::from_entries([("c", Value::Cell(cell.clone()))]);

        let found = observable_of(&obj, "c").expect("cell");
        assert!(found.ptr_eq(&cell));
        assert!(!has_cell(&obj, "c"));
        reset_cell_provider();
    }

    #[test]
    fn test_unconverted_property_is_bound_on_demand() {
        setup();
        let obj = ObjectRef::from_entries([("late", "v")]);
        let cell = observable_of(&obj, "late").expect("cell");

        assert!(has_cell(&obj, "late"));
        assert!(obj.is_accessor("late"));
        assert_eq!(cell.peek(), Value::from("v"));

        let missing = observable_of(&obj, "missing").expect("cell");
        assert_eq!(missing.peek(), Value::Undefined);
        reset_cell_provider();
    }

    #[test]
    fn test_function_property_yields_none() {
        setup();
        let obj = ObjectRef::from_entries([("f", Function::getter(|| Value::Null))]);
        assert!(observable_of(&obj, "f").is_none());
        reset_cell_provider();
    }
}
