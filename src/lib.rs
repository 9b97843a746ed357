//! # spark-observable
//!
//! Make a plain object graph reactive, in place.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Every eligible property of every reachable object is backed by a reactive
//! cell and exposed through an accessor, so plain reads and writes register
//! dependencies and notify dependents. Arrays keep their identity; their
//! mutators are intercepted and routed through the array's cell.
//!
//! ```text
//! plain graph → convert_object → accessors + instrumented arrays → cells (spark-signals)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Value` and the scalar/host types it carries
//! - [`graph`] - Object and array nodes, mutation interception, bulk operations
//! - [`cell`] - The reactive cell contract and its providers
//! - [`classify`] - Which values are convertible
//! - [`engine`] - Walker, property binder, array instrumenter, derived properties
//! - [`config`] - Per-thread conversion settings
//! - [`error`] - Errors raised by derived property definitions

pub mod cell;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use cell::{
    cell_provider, reset_cell_provider, set_cell_provider, CellProvider, CellStats,
    ComputedOptions, Observable, PlainProvider, ReactiveCell, SignalProvider, WeakObservable,
};

pub use classify::{is_convertible, kind_of, ValueKinds};

pub use config::{config, configure, reset_config, ObservableConfig};

pub use engine::{
    bound_properties, clear_converted_hooks, convert_object, convert_property, define_property,
    install, is_converted, make_observable_array, observable, observable_of, on_converted,
    reset_markers, ArrayBinding, Definition, NotifyMode, ViewModelBinder,
};

pub use error::{ObservableError, Result};

pub use graph::{
    Accessor, ArrayInterceptor, ArrayRef, Mutation, MutationKind, ObjectRef, Outcome, Phase,
    Property,
};

/// Reset all per-thread state: markers, provider, configuration and hooks.
pub fn reset_observable_state() {
    engine::reset_markers();
    engine::clear_converted_hooks();
    cell::reset_cell_provider();
    config::reset_config();
}
