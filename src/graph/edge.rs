//! Directed edges between named nodes

use super::node::NodeName;
use serde::{Deserialize, Serialize};

/// A directed dependency edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeName,
    pub to: NodeName,
}

impl Edge {
    /// Create a new edge
    pub fn new(from: impl Into<NodeName>, to: impl Into<NodeName>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// One declared target or a list of targets
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FanOut {
    One(NodeName),
    Many(Vec<NodeName>),
}

impl FanOut {
    /// The declared targets as a slice
    pub fn targets(&self) -> &[NodeName] {
        match self {
            FanOut::One(target) => std::slice::from_ref(target),
            FanOut::Many(targets) => targets,
        }
    }
}

/// An edge as declared in a source document
///
/// A single record may fan out to several targets; each target becomes an
/// independent directed edge.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeDecl {
    pub from: NodeName,
    pub to: FanOut,
}

impl EdgeDecl {
    /// Expand the declaration into independent directed edges
    pub fn expand(&self) -> impl Iterator<Item = Edge> + '_ {
        self.to
            .targets()
            .iter()
            .map(|target| Edge::new(self.from.clone(), target.clone()))
    }
}
