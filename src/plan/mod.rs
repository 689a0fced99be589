//! Immutable test-plan tree model.
//!
//! A plan is an arena of nodes: controllers (inner nodes with ordered
//! children) and samplers (leaves, opaque to the traversal engine). The
//! structure never changes after [`PlanTreeBuilder::build`]; all traversal
//! state lives in the engine, one private copy per driver task.
mod node;


pub use node::{ControllerKind, NodeKind, PlanNode, PlanTree, PlanTreeBuilder};

/// Index of a node within its [`PlanTree`] arena.
pub type NodeId = usize;
