//! Reachmap: Reachability Queries over Service-Dependency Graphs
//!
//! Loads an immutable directed graph of services and answers questions of
//! the form "which routes exist from these starts to these ends?", narrowed
//! by composable filters (publicly exposed starts, sink ends, paths touching
//! a vulnerable node). Surviving paths are reduced to an induced subgraph.
//!
//! # Core Concepts
//!
//! - **GraphStore**: the read-only node/edge substrate, built once at load
//! - **PathQuery**: bounded enumeration of simple paths between two nodes
//! - **Filter**: a predicate over start sets, end sets, and path sets;
//!   filters compose as a sequential intersection
//! - **QueryEngine**: orchestrates filters and enumeration into a result
//!
//! # Example
//!
//! ```
//! use reachmap::{FilterSelection, GraphStore, QueryEngine};
//! use std::sync::Arc;
//!
//! let store = GraphStore::from_json(
//!     r#"{"nodes": [{"name": "web", "publicExposed": true}],
//!         "edges": [{"from": "web", "to": "db"}]}"#,
//! ).unwrap();
//! let engine = QueryEngine::new(Arc::new(store));
//! let result = engine.query(&FilterSelection::none().build());
//! assert_eq!(result.nodes.len(), 2);
//! ```

mod graph;
pub mod query;
pub mod render;
pub mod server;

pub use graph::{
    Edge, EdgeDecl, FanOut, GraphDocument, GraphStore, LoadError, LoadResult, NodeAttrs, NodeDecl,
    NodeName,
};
pub use query::{
    ContainsVulnerability, Filter, FilterSelection, Path, PathQuery, PubliclyExposedStart,
    QueryBudget, QueryConfig, QueryEngine, QueryResult, ResultNode, SinkEnd,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
