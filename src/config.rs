//! Conversion settings (per thread).
//!
//! ```ignore
//! use spark_observable::config::{configure, reset_config};
//!
//! configure(|c| c.log_conversions = true);
//! // ...
//! reset_config();
//! ```

use std::cell::RefCell;

/// Settings read by the graph walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableConfig {
    /// Property names starting with one of these are private and never converted.
    pub ignored_prefixes: Vec<char>,
    /// Emit a `tracing` debug event for every converted node.
    pub log_conversions: bool,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            ignored_prefixes: vec!['_', '$'],
            log_conversions: false,
        }
    }
}

impl ObservableConfig {
    pub fn ignores(&self, property: &str) -> bool {
        property
            .chars()
            .next()
            .is_some_and(|first| self.ignored_prefixes.contains(&first))
    }
}

thread_local! {
    static CONFIG: RefCell<ObservableConfig> = RefCell::new(ObservableConfig::default());
}

/// Current settings (a copy).
pub fn config() -> ObservableConfig {
    CONFIG.with(|c| c.borrow().clone())
}

pub fn configure(f: impl FnOnce(&mut ObservableConfig)) {
    CONFIG.with(|c| f(&mut c.borrow_mut()));
}

pub fn reset_config() {
    CONFIG.with(|c| *c.borrow_mut() = ObservableConfig::default());
}
