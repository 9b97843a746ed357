//! Conversion Engine - Turn a plain object graph into a reactive one, in place.
//!
//! The engine manages:
//! - Marker: per-node conversion state in an identity-keyed side table
//! - Binder: one property → one cell, exposed through an accessor
//! - Array: mutation interception routed through the array's cell
//! - Walker: recursive, idempotent, cycle-safe graph conversion
//! - Derived: computed properties defined on a node
//! - Lookup: the cell behind a property, bound on demand
//! - Install: conversion hooked into the view-model binding step
//!
//! # Architecture
//!
//! Nodes are never replaced. Objects get accessors, arrays get an interceptor:
//!
//! ```text
//! { a: 1, b: [1, 2] }                      { a: ⟨get/set → cell₁⟩, b: ⟨get/set → cell₂⟩ }
//!          │               convert_object           │
//!          └─────────────────────────────►          └── [1, 2]  (interceptor → cell₂)
//! ```
//!
//! Conversion state lives beside the graph, so a node's fields are exactly
//! what the caller put there.

mod array;
mod binder;
mod derived;
mod install;
mod lookup;
mod marker;
mod walker;

pub use array::{make_observable_array, ArrayBinding, NotifyMode};
pub use binder::convert_property;
pub use derived::{define_property, Definition};
pub use install::{install, BeforeBind, ViewModelBinder};
pub use lookup::{observable, observable_of};
pub use marker::{bound_properties, is_converted, marker_count, reset_markers};
pub use walker::{clear_converted_hooks, convert_object, on_converted, ConvertedHook};
