//! The immutable graph substrate loaded from a source document

use super::edge::{Edge, EdgeDecl};
use super::node::{NodeAttrs, NodeDecl, NodeName};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while loading a graph source
///
/// Loading is all-or-nothing: any failure aborts the load, there is no
/// partial graph.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read graph source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed graph document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// A graph source document: declared nodes plus declared edges
///
/// This is exactly the JSON shape consumed from disk. Node declarations
/// require a `name`; edge declarations require `from` and a one-or-many
/// `to`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeDecl>,
    pub edges: Vec<EdgeDecl>,
}

/// Immutable, indexed dependency graph
///
/// Constructed once from a [`GraphDocument`] and read-only afterwards, so
/// it can be shared across concurrent queries without synchronization.
/// Node iteration order is sorted by name.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: BTreeMap<NodeName, NodeAttrs>,
    /// Distinct directed edges in insertion order
    edges: Vec<Edge>,
    /// Successor index: distinct targets per source, in insertion order
    successors: BTreeMap<NodeName, Vec<NodeName>>,
}

impl GraphStore {
    /// Load a graph from a JSON file
    pub fn load(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let store = Self::from_json(&raw)?;
        info!(
            source = %path.display(),
            nodes = store.node_count(),
            edges = store.edge_count(),
            "graph loaded"
        );
        Ok(store)
    }

    /// Parse a graph from a JSON string
    pub fn from_json(raw: &str) -> LoadResult<Self> {
        let document: GraphDocument = serde_json::from_str(raw)?;
        Ok(Self::from_document(document))
    }

    /// Normalize a document into an indexed store
    ///
    /// Every name referenced by an edge endpoint is materialized with
    /// default attributes here, in one pass before indexing, so later
    /// lookups never miss. Duplicate `(from, to)` pairs collapse to a
    /// single edge.
    pub fn from_document(document: GraphDocument) -> Self {
        let mut store = Self::default();

        for declaration in document.nodes {
            store.nodes.insert(declaration.name, declaration.attrs);
        }

        let mut seen: HashSet<Edge> = HashSet::new();
        for declaration in &document.edges {
            for edge in declaration.expand() {
                store.nodes.entry(edge.from.clone()).or_default();
                store.nodes.entry(edge.to.clone()).or_default();
                if seen.insert(edge.clone()) {
                    store
                        .successors
                        .entry(edge.from.clone())
                        .or_default()
                        .push(edge.to.clone());
                    store.edges.push(edge);
                }
            }
        }

        store
    }

    /// Attributes of the named node, or the default record when unknown
    ///
    /// Never fails: an unknown node simply has no special attributes.
    pub fn attrs(&self, name: &NodeName) -> &NodeAttrs {
        static DEFAULT: OnceLock<NodeAttrs> = OnceLock::new();
        self.nodes
            .get(name)
            .unwrap_or_else(|| DEFAULT.get_or_init(NodeAttrs::default))
    }

    /// Check whether a node exists
    pub fn contains(&self, name: &NodeName) -> bool {
        self.nodes.contains_key(name)
    }

    /// All node names, in sorted order
    pub fn node_names(&self) -> impl Iterator<Item = &NodeName> {
        self.nodes.keys()
    }

    /// All nodes with their attributes, in sorted order
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeName, &NodeAttrs)> {
        self.nodes.iter()
    }

    /// Direct successors of a node
    pub fn successors(&self, name: &NodeName) -> &[NodeName] {
        self.successors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All distinct edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(raw: &str) -> GraphStore {
        GraphStore::from_json(raw).unwrap()
    }

    #[test]
    fn test_load_declared_nodes_and_edges() {
        let store = store(
            r#"{"nodes": [{"name": "a", "publicExposed": true}, {"name": "b", "kind": "rds"}],
                "edges": [{"from": "a", "to": "b"}]}"#,
        );
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
        assert!(store.attrs(&"a".into()).public_exposed);
        assert_eq!(store.attrs(&"b".into()).kind, "rds");
    }

    #[test]
    fn test_undeclared_endpoints_materialized_with_defaults() {
        let store = store(r#"{"nodes": [], "edges": [{"from": "a", "to": "b"}]}"#);
        assert_eq!(store.node_count(), 2);
        let attrs = store.attrs(&"b".into());
        assert_eq!(attrs.kind, "service");
        assert!(!attrs.public_exposed);
        assert!(attrs.vulnerabilities.is_none());
    }

    #[test]
    fn test_fan_out_becomes_independent_edges() {
        let store = store(r#"{"nodes": [], "edges": [{"from": "a", "to": ["b", "c", "d"]}]}"#);
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.successors(&"a".into()).len(), 3);
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let store = store(
            r#"{"nodes": [],
                "edges": [{"from": "a", "to": "b"}, {"from": "a", "to": ["b", "c"]}]}"#,
        );
        assert_eq!(store.edge_count(), 2);
        let successors: Vec<&str> = store
            .successors(&"a".into())
            .iter()
            .map(NodeName::as_str)
            .collect();
        assert_eq!(successors, ["b", "c"]);
    }

    #[test]
    fn test_unknown_node_gets_default_attrs() {
        let store = store(r#"{"nodes": [], "edges": []}"#);
        let attrs = store.attrs(&"ghost".into());
        assert_eq!(attrs.kind, "service");
        assert!(!attrs.has_vulnerability());
        assert!(!store.contains(&"ghost".into()));
    }

    #[test]
    fn test_node_names_sorted() {
        let store = store(r#"{"nodes": [{"name": "c"}, {"name": "a"}, {"name": "b"}], "edges": []}"#);
        let names: Vec<&str> = store.node_names().map(NodeName::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_missing_required_field_is_load_error() {
        assert!(matches!(
            GraphStore::from_json(r#"{"nodes": [{"kind": "rds"}], "edges": []}"#),
            Err(LoadError::Json(_))
        ));
        assert!(matches!(
            GraphStore::from_json(r#"{"nodes": [], "edges": [{"from": "a"}]}"#),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            GraphStore::load("/nonexistent/graph.json"),
            Err(LoadError::Io(_))
        ));
    }
}
