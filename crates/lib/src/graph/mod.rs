//! Build graph construction and validation.
//!
//! Resolves parsed declarations into an immutable [`Graph`] value: paths are
//! interned as nodes, build statements become edges linked to their rule and
//! input/output nodes. Structural errors (unknown rules, multiple producers,
//! missing source inputs, cycles) are detected here, before any command runs.

mod dag;
mod resolve;
mod types;

pub use dag::ExecutionDag;
pub use types::{Edge, EdgeId, Graph, GraphError, Node, NodeId, Rule};
