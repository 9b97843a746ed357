//! Derived Properties - Define a property backed by a lazily evaluated computed cell.
//!
//! A definition is either a bare evaluator (read-only) or a descriptor object
//! with a `get` function and an optional `set` function:
//!
//! ```ignore
//! define_property(&cart, "total", Definition::evaluator(move || sum(&items)))?;
//!
//! let descriptor = ObjectRef::from_entries([
//!     ("get", Function::getter(read_name)),
//!     ("set", Function::setter(write_name)),
//! ]);
//! define_property(&person, "full_name", descriptor)?;
//! ```

use crate::cell::{cell_provider, ComputedOptions, Observable};
use crate::error::{ObservableError, Result};
use crate::graph::ObjectRef;
use crate::types::{Function, Value};

use super::binder::convert_property;

/// How a derived property computes its value.
#[derive(Debug, Clone)]
pub enum Definition {
    /// Read-only: the function is the evaluator.
    Evaluator(Function),
    /// An object with `get` and optionally `set`. A `value` entry is rejected.
    Descriptor(ObjectRef),
}

impl Definition {
    pub fn evaluator(f: impl Fn() -> Value + 'static) -> Self {
        Definition::Evaluator(Function::getter(f))
    }

    /// Validate and split into read/write functions.
    fn into_options(self, property: &str) -> Result<ComputedOptions> {
        match self {
            Definition::Evaluator(read) => Ok(ComputedOptions { read, write: None }),
            Definition::Descriptor(descriptor) => {
                if descriptor.contains_key("value") {
                    return Err(ObservableError::ValueNotAllowed {
                        property: property.to_string(),
                    });
                }
                let Value::Function(read) = descriptor.get("get") else {
                    return Err(ObservableError::MissingGetter {
                        property: property.to_string(),
                    });
                };
                let write = match descriptor.get("set") {
                    Value::Function(write) => Some(write),
                    _ => None,
                };
                Ok(ComputedOptions { read, write })
            }
        }
    }
}

impl From<Function> for Definition {
    fn from(f: Function) -> Self {
        Definition::Evaluator(f)
    }
}

impl From<ObjectRef> for Definition {
    fn from(descriptor: ObjectRef) -> Self {
        Definition::Descriptor(descriptor)
    }
}

/// Define `name` on `node` as a derived property and return its computed cell.
///
/// Nothing is created when the definition is invalid. The computed value is
/// not evaluated until first read.
pub fn define_property(
    node: &ObjectRef,
    name: &str,
    definition: impl Into<Definition>,
) -> Result<Observable> {
    let options = definition.into().into_options(name)?;
    let computed = cell_provider().computed(options);

    node.define_value(name, Value::Cell(computed.clone()));
    Ok(convert_property(node, name, None).unwrap_or(computed))
}
