//! Property Binder - Back one property with a cell and expose it through an accessor.
//!
//! ```text
//! value            cell                         setter write-through
//! ---------------  ---------------------------  ---------------------------------
//! Array            provider array cell          instrument new arrays,
//!                  + array instrumented         null/undefined → fresh empty array
//! Cell             reused as-is                 convert the committed value
//! Function         (not bound)
//! anything else    provider scalar cell         convert the committed value
//! ```

use crate::cell::{cell_provider, Observable};
use crate::graph::{Accessor, ArrayRef, ObjectRef};
use crate::types::Value;

use super::array::make_observable_array;
use super::marker::record_cell;
use super::walker::convert_object;

/// Bind `name` on `node` to a cell and return it.
///
/// `current` is the value to bind; `None` reads the property's present value.
/// Plain functions are never bound and yield `None`.
pub fn convert_property(node: &ObjectRef, name: &str, current: Option<Value>) -> Option<Observable> {
    let value = current.unwrap_or_else(|| node.get(name));

    let (cell, is_array) = match value {
        Value::Function(_) => return None,
        Value::Array(array) => {
            let cell = cell_provider().observable_array(array.clone());
            make_observable_array(&array, &cell);
            (cell, true)
        }
        Value::Cell(cell) => (cell, false),
        other => {
            let cell = cell_provider().observable(other.clone());
            convert_object(&other);
            (cell, false)
        }
    };

    let reader = cell.clone();
    let mut accessor = Accessor::new(move || reader.get());
    if cell.is_writable() {
        let writer = cell.clone();
        accessor = accessor.with_setter(move |value| write_through(&writer, value, is_array));
    }
    node.define_accessor(name, accessor);
    record_cell(node, name, cell.clone());

    tracing::trace!(node = %node.id(), property = name, is_array, "property bound");
    Some(cell)
}

/// Write `value` into `cell`, then make whatever it committed reactive.
fn write_through(cell: &Observable, value: Value, is_array: bool) {
    cell.set(value);
    let committed = cell.peek();

    if !is_array {
        convert_object(&committed);
        return;
    }

    match committed {
        Value::Array(array) => {
            if !array.is_instrumented() {
                make_observable_array(&array, cell);
            }
        }
        Value::Null | Value::Undefined => {
            let fresh = ArrayRef::new();
            cell.set(fresh.clone());
            make_observable_array(&fresh, cell);
        }
        other => {
            tracing::warn!(value = ?other, "non-array value written to an array property");
        }
    }
}
