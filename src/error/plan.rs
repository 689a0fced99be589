use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Node {node} does not exist in the plan tree.")]
    UnknownNode { node: usize },
    #[error("Node {parent} is a sampler and cannot take children.")]
    ParentNotController { parent: usize },
}
