//! Value classification - Which values the engine may convert.
//!
//! Only plain objects and arrays are convertible. Everything else (scalars,
//! dates, patterns, callables, existing cells, host objects) is left as-is.

use crate::types::{HostKind, Value};

bitflags::bitflags! {
    /// Structural kinds of a value. `kind_of` always returns a single bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValueKinds: u16 {
        const UNDEFINED = 1 << 0;
        const NULL = 1 << 1;
        const BOOLEAN = 1 << 2;
        const NUMBER = 1 << 3;
        const STRING = 1 << 4;
        const DATE = 1 << 5;
        const REGEXP = 1 << 6;
        const FUNCTION = 1 << 7;
        const CELL = 1 << 8;
        const ELEMENT = 1 << 9;
        const FOREIGN = 1 << 10;
        const NAMESPACE = 1 << 11;
        const OBJECT = 1 << 12;
        const ARRAY = 1 << 13;

        const CONVERTIBLE = Self::OBJECT.bits() | Self::ARRAY.bits();
        const HOST = Self::ELEMENT.bits() | Self::FOREIGN.bits() | Self::NAMESPACE.bits();
    }
}

pub fn kind_of(value: &Value) -> ValueKinds {
    match value {
        Value::Undefined => ValueKinds::UNDEFINED,
        Value::Null => ValueKinds::NULL,
        Value::Bool(_) => ValueKinds::BOOLEAN,
        Value::Number(_) => ValueKinds::NUMBER,
        Value::String(_) => ValueKinds::STRING,
        Value::Date(_) => ValueKinds::DATE,
        Value::RegExp(_) => ValueKinds::REGEXP,
        Value::Function(_) => ValueKinds::FUNCTION,
        Value::Cell(_) => ValueKinds::CELL,
        Value::Host(host) => match host.kind() {
            HostKind::Element => ValueKinds::ELEMENT,
            HostKind::Foreign => ValueKinds::FOREIGN,
            HostKind::Namespace => ValueKinds::NAMESPACE,
        },
        Value::Object(_) => ValueKinds::OBJECT,
        Value::Array(_) => ValueKinds::ARRAY,
    }
}

/// Whether `value` may be converted into reactive form.
pub fn is_convertible(value: &Value) -> bool {
    !value.is_falsy() && ValueKinds::CONVERTIBLE.contains(kind_of(value))
}
