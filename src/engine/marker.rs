//! Marker Table - Per-node conversion state, kept beside the graph.
//!
//! Each converted node gets a marker:
//! - `full`: the node was walked (objects) or instrumented (arrays). Never unset.
//! - `cells`: property name → the cell bound to it.
//!
//! Markers are keyed by node identity and hold the node weakly, so domain
//! objects carry no hidden fields and a dead node's marker is never reused
//! for a new node that lands at the same address.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::cell::Observable;
use crate::graph::{GraphNode, ObjectRef, WeakNode};
use crate::types::{NodeId, Value};

/// Dead entries are swept when the table reaches this size, then at twice its live size.
const PRUNE_FLOOR: usize = 64;

#[derive(Default)]
struct Marker {
    full: bool,
    cells: HashMap<String, Observable>,
}

struct Entry {
    node: WeakNode,
    marker: Marker,
}

struct MarkerTable {
    entries: HashMap<NodeId, Entry>,
    prune_at: usize,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }
}

impl MarkerTable {
    fn live(&self, id: NodeId) -> Option<&Marker> {
        self.entries
            .get(&id)
            .filter(|entry| entry.node.is_alive())
            .map(|entry| &entry.marker)
    }

    /// Fetch or create the marker for `node`.
    fn marker_mut(&mut self, node: &impl GraphNode) -> &mut Marker {
        let id = node.node_id();
        let live = self.entries.get(&id).is_some_and(|e| e.node.is_alive());
        if !live {
            self.entries.remove(&id);
            self.prune();
        }
        &mut self
            .entries
            .entry(id)
            .or_insert_with(|| Entry {
                node: node.downgrade_node(),
                marker: Marker::default(),
            })
            .marker
    }

    fn prune(&mut self) {
        if self.entries.len() < self.prune_at {
            return;
        }
        self.entries.retain(|_, entry| entry.node.is_alive());
        self.prune_at = (self.entries.len() * 2).max(PRUNE_FLOOR);
    }
}

thread_local! {
    static MARKERS: RefCell<MarkerTable> = RefCell::new(MarkerTable::default());
}

// =============================================================================
// Full Flag
// =============================================================================

/// Set `full` on `node`. Returns false if it was already set.
///
/// This is the one guard against re-walking a node, including on cycles.
pub(crate) fn begin_conversion(node: &impl GraphNode) -> bool {
    MARKERS.with(|table| {
        let mut table = table.borrow_mut();
        let marker = table.marker_mut(node);
        !std::mem::replace(&mut marker.full, true)
    })
}

pub(crate) fn is_full(node: &impl GraphNode) -> bool {
    MARKERS.with(|table| {
        table
            .borrow()
            .live(node.node_id())
            .is_some_and(|marker| marker.full)
    })
}

/// Whether `value` is an object or array that has been fully converted.
pub fn is_converted(value: &Value) -> bool {
    match value {
        Value::Object(object) => is_full(object),
        Value::Array(array) => is_full(array),
        _ => false,
    }
}

// =============================================================================
// Property Cells
// =============================================================================

/// The cell bound to `name` on `node`, if any.
pub(crate) fn cell_for(node: &ObjectRef, name: &str) -> Option<Observable> {
    MARKERS.with(|table| {
        table
            .borrow()
            .live(node.node_id())
            .and_then(|marker| marker.cells.get(name).cloned())
    })
}

pub(crate) fn has_cell(node: &ObjectRef, name: &str) -> bool {
    MARKERS.with(|table| {
        table
            .borrow()
            .live(node.node_id())
            .is_some_and(|marker| marker.cells.contains_key(name))
    })
}

pub(crate) fn record_cell(node: &ObjectRef, name: &str, cell: Observable) {
    let previous = MARKERS.with(|table| {
        table
            .borrow_mut()
            .marker_mut(node)
            .cells
            .insert(name.to_string(), cell)
    });
    // Dropped outside the borrow: a cell may own the last handle to other nodes.
    drop(previous);
}

/// Names of the properties of `node` that are bound to cells.
pub fn bound_properties(node: &ObjectRef) -> Vec<String> {
    MARKERS.with(|table| {
        let table = table.borrow();
        let mut names: Vec<String> = table
            .live(node.node_id())
            .map(|marker| marker.cells.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    })
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Number of markers currently held, live or not yet swept.
pub fn marker_count() -> usize {
    MARKERS.with(|table| table.borrow().entries.len())
}

/// Forget every marker on this thread.
pub fn reset_markers() {
    let table = MARKERS.with(|table| std::mem::take(&mut *table.borrow_mut()));
    drop(table);
}
