//! Query system for dependency graphs
//!
//! Provides bounded simple-path enumeration, the composable filter
//! pipeline, and the engine that reduces surviving paths to an induced
//! subgraph.

mod engine;
mod filter;
mod path;
mod types;

pub use engine::{QueryConfig, QueryEngine};
pub use filter::{
    ContainsVulnerability, Filter, FilterSelection, PubliclyExposedStart, SinkEnd, SINK_KINDS,
};
pub use path::{PathQuery, QueryBudget, SimplePaths, DEFAULT_CUTOFF};
pub use types::{Path, QueryResult, ResultNode};
