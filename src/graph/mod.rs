//! Object graph nodes.
//!
//! Objects and arrays are shared, identity-bearing handles that are mutated in
//! place. Conversion never replaces a node; it installs accessors on object
//! properties and an interceptor on arrays, so every holder of a handle sees
//! the same reactive behavior.
//!
//! - [`object`] - `ObjectRef`, data and accessor properties
//! - [`array`] - `ArrayRef`, the `Mutation` vocabulary and `ArrayInterceptor`
//! - [`bulk`] - Bulk removal/destroy/replace shared by arrays and cells

pub mod array;
pub mod bulk;
pub mod object;

pub use array::{
    ArrayInterceptor, ArrayRef, Comparator, Mutation, MutationKind, Outcome, Predicate, WeakArray,
};
pub use bulk::Phase;
pub use object::{Accessor, ObjectRef, Property, WeakObject};

use crate::types::NodeId;

/// Weak handle to either node kind, held by the marker table.
#[derive(Clone)]
pub enum WeakNode {
    Object(WeakObject),
    Array(WeakArray),
}

impl WeakNode {
    pub fn is_alive(&self) -> bool {
        match self {
            WeakNode::Object(w) => w.is_alive(),
            WeakNode::Array(w) => w.is_alive(),
        }
    }
}

/// Something the marker table can track: an object or an array.
pub trait GraphNode {
    fn node_id(&self) -> NodeId;
    fn downgrade_node(&self) -> WeakNode;
}

impl GraphNode for ObjectRef {
    fn node_id(&self) -> NodeId {
        self.id()
    }

    fn downgrade_node(&self) -> WeakNode {
        WeakNode::Object(self.downgrade())
    }
}

impl GraphNode for ArrayRef {
    fn node_id(&self) -> NodeId {
        self.id()
    }

    fn downgrade_node(&self) -> WeakNode {
        WeakNode::Array(self.downgrade())
    }
}
