//! Query types and result structures

use crate::graph::{Edge, NodeAttrs, NodeName};
use serde::Serialize;

/// An ordered walk of distinct nodes, consecutive entries joined by an edge
pub type Path = Vec<NodeName>;

/// A node surviving a query, carrying its original attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultNode {
    pub name: NodeName,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}

/// The induced subgraph produced by a query
///
/// Nodes and edges are sorted by name so identical queries over the same
/// store serialize identically. An empty result is a valid outcome, not an
/// error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub nodes: Vec<ResultNode>,
    pub edges: Vec<Edge>,
}

impl QueryResult {
    /// True when no path survived filtering
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Look up a surviving node by name
    pub fn node(&self, name: &NodeName) -> Option<&ResultNode> {
        self.nodes.iter().find(|node| &node.name == name)
    }

    /// Check whether an edge survived
    pub fn has_edge(&self, from: &NodeName, to: &NodeName) -> bool {
        self.edges
            .iter()
            .any(|edge| &edge.from == from && &edge.to == to)
    }
}
