use std::sync::Arc;

use crate::error::PlanError;
use crate::sample::Sampler;

use super::NodeId;

/// Flow-control behavior of an inner node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// Visits children in order, loops whenever re-driven by its parent.
    Generic,
    /// Like [`ControllerKind::Generic`], but permanently done after `loops`
    /// full passes. `None` loops forever.
    Loop { loops: Option<u64> },
    /// Re-permutes its children before every pass; each child executes at
    /// most once per pass.
    RandomOrder,
    /// Emits one synthetic aggregate sample per completed pass over its
    /// subtree.
    Transaction,
}

pub enum NodeKind {
    Controller(ControllerKind),
    Sampler(Arc<dyn Sampler>),
}

impl std::fmt::Debug for NodeKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Controller(kind) => formatter.debug_tuple("Controller").field(kind).finish(),
            NodeKind::Sampler(sampler) => formatter
                .debug_tuple("Sampler")
                .field(&sampler.label())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct PlanNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
}

/// Finite, immutable plan tree. Root is always node 0.
#[derive(Debug)]
pub struct PlanTree {
    nodes: Vec<PlanNode>,
}

impl PlanTree {
    pub const ROOT: NodeId = 0;

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&PlanNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn sampler(&self, id: NodeId) -> Option<&Arc<dyn Sampler>> {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Sampler(sampler)) => Some(sampler),
            Some(NodeKind::Controller(_)) | None => None,
        }
    }

    #[must_use]
    pub fn is_controller(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id).map(|node| &node.kind),
            Some(NodeKind::Controller(_))
        )
    }

    #[must_use]
    pub fn controller_kind(&self, id: NodeId) -> Option<ControllerKind> {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Controller(kind)) => Some(*kind),
            Some(NodeKind::Sampler(_)) | None => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a [`PlanTree`] top-down, starting from a root controller.
pub struct PlanTreeBuilder {
    nodes: Vec<PlanNode>,
}

impl PlanTreeBuilder {
    #[must_use]
    pub fn new(root_name: impl Into<String>, kind: ControllerKind) -> Self {
        Self {
            nodes: vec![PlanNode {
                name: root_name.into(),
                kind: NodeKind::Controller(kind),
                children: Vec::new(),
            }],
        }
    }

    /// Add a controller under `parent` and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` does not exist or is a sampler.
    pub fn add_controller(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: ControllerKind,
    ) -> Result<NodeId, PlanError> {
        self.attach(
            parent,
            PlanNode {
                name: name.into(),
                kind: NodeKind::Controller(kind),
                children: Vec::new(),
            },
        )
    }

    /// Add a sampler leaf under `parent` and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` does not exist or is a sampler.
    pub fn add_sampler(
        &mut self,
        parent: NodeId,
        sampler: Arc<dyn Sampler>,
    ) -> Result<NodeId, PlanError> {
        let name = sampler.label().to_owned();
        self.attach(
            parent,
            PlanNode {
                name,
                kind: NodeKind::Sampler(sampler),
                children: Vec::new(),
            },
        )
    }

    fn attach(&mut self, parent: NodeId, node: PlanNode) -> Result<NodeId, PlanError> {
        match self.nodes.get(parent).map(|existing| &existing.kind) {
            Some(NodeKind::Controller(_)) => {}
            Some(NodeKind::Sampler(_)) => {
                return Err(PlanError::ParentNotController { parent });
            }
            None => return Err(PlanError::UnknownNode { node: parent }),
        }
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    #[must_use]
    pub fn build(self) -> PlanTree {
        PlanTree { nodes: self.nodes }
    }
}
