//! Query orchestration: narrow endpoints, enumerate pairs, reduce

use super::filter::{Filter, FilterSelection};
use super::path::{PathQuery, QueryBudget, DEFAULT_CUTOFF};
use super::types::{Path, QueryResult, ResultNode};
use crate::graph::{Edge, GraphStore, NodeName};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Tuning knobs for query execution
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Maximum number of edges in any enumerated path
    pub cutoff: usize,
    /// Worker threads for pair enumeration; defaults to available cores
    pub workers: Option<usize>,
    /// Global bound on enumerated paths per query
    pub max_paths: Option<usize>,
    /// Wall-clock budget per query
    pub deadline: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            workers: None,
            max_paths: None,
            deadline: None,
        }
    }
}

impl QueryConfig {
    /// Set the path cutoff
    pub fn cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Bound the number of enumerated paths per query
    pub fn max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    /// Bound the wall-clock time per query
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Executes filtered reachability queries against a shared graph
///
/// The store is read-only, so one engine serves any number of concurrent
/// queries without locking.
pub struct QueryEngine {
    store: Arc<GraphStore>,
    config: QueryConfig,
}

impl QueryEngine {
    /// Create an engine with the default configuration
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(store: Arc<GraphStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// The underlying graph
    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    /// Run one query through a filter pipeline
    ///
    /// An empty pipeline is the identity query: the whole graph comes back
    /// and pair enumeration is skipped entirely.
    pub fn query(&self, filters: &[Box<dyn Filter>]) -> QueryResult {
        if filters.is_empty() {
            return self.whole_graph();
        }

        let all: Vec<NodeName> = self.store.node_names().cloned().collect();

        // Starts and ends are narrowed independently from the full node set,
        // each by a sequential pass over the pipeline.
        let mut starts = all.clone();
        for filter in filters {
            starts = filter.filter_starts(&self.store, starts);
        }
        let mut ends = all;
        for filter in filters {
            ends = filter.filter_ends(&self.store, ends);
        }
        debug!(starts = starts.len(), ends = ends.len(), "endpoint sets narrowed");

        let mut paths = self.enumerate_pairs(&starts, &ends);
        debug!(candidates = paths.len(), "paths enumerated");
        for filter in filters {
            paths = filter.filter_paths(&self.store, paths);
        }

        self.induce(&paths)
    }

    /// Run the query described by a flag selection
    pub fn query_selection(&self, selection: FilterSelection) -> QueryResult {
        self.query(&selection.build())
    }

    fn whole_graph(&self) -> QueryResult {
        QueryResult {
            nodes: self
                .store
                .nodes()
                .map(|(name, attrs)| ResultNode {
                    name: name.clone(),
                    attrs: attrs.clone(),
                })
                .collect(),
            edges: self.store.edges().cloned().collect(),
        }
    }

    /// Enumerate simple paths for every ordered `(start, end)` pair
    ///
    /// Workers pull pair indices off a shared counter and publish per-pair
    /// path vectors into a concurrent map; results are merged back in pair
    /// order, so the output matches a sequential run exactly.
    fn enumerate_pairs(&self, starts: &[NodeName], ends: &[NodeName]) -> Vec<Path> {
        let pairs: Vec<(&NodeName, &NodeName)> = starts
            .iter()
            .flat_map(|start| ends.iter().map(move |end| (start, end)))
            .filter(|(start, end)| start != end)
            .collect();
        if pairs.is_empty() {
            return Vec::new();
        }

        let budget = self.budget();
        let workers = self
            .config
            .workers
            .unwrap_or_else(|| {
                thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1)
            })
            .clamp(1, pairs.len());

        let next = AtomicUsize::new(0);
        let found: DashMap<usize, Vec<Path>> = DashMap::new();

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= pairs.len() {
                        break;
                    }
                    let (start, end) = pairs[index];
                    let query = PathQuery::between(start.clone(), end.clone())
                        .cutoff(self.config.cutoff);
                    let paths: Vec<Path> = match &budget {
                        Some(budget) => query.execute_with_budget(&self.store, budget).collect(),
                        None => query.execute(&self.store).collect(),
                    };
                    if !paths.is_empty() {
                        found.insert(index, paths);
                    }
                });
            }
        });

        if let Some(budget) = &budget {
            if budget.exhausted() {
                warn!(
                    paths = budget.paths_emitted(),
                    "enumeration budget exhausted, result truncated"
                );
            }
        }

        let mut merged = Vec::new();
        for index in 0..pairs.len() {
            if let Some((_, paths)) = found.remove(&index) {
                merged.extend(paths);
            }
        }
        merged
    }

    fn budget(&self) -> Option<QueryBudget> {
        if self.config.max_paths.is_none() && self.config.deadline.is_none() {
            return None;
        }
        let mut budget = QueryBudget::unlimited();
        if let Some(max_paths) = self.config.max_paths {
            budget = budget.with_max_paths(max_paths);
        }
        if let Some(deadline) = self.config.deadline {
            budget = budget.with_deadline(Instant::now() + deadline);
        }
        Some(budget)
    }

    /// Reduce surviving paths to their induced subgraph
    ///
    /// Nodes keep their original attributes from the store; edges are the
    /// consecutive pairs of each path, deduplicated and sorted.
    fn induce(&self, paths: &[Path]) -> QueryResult {
        let mut names: BTreeSet<&NodeName> = BTreeSet::new();
        let mut edges: BTreeSet<(&NodeName, &NodeName)> = BTreeSet::new();
        for path in paths {
            names.extend(path.iter());
            for pair in path.windows(2) {
                edges.insert((&pair[0], &pair[1]));
            }
        }
        QueryResult {
            nodes: names
                .into_iter()
                .map(|name| ResultNode {
                    name: name.clone(),
                    attrs: self.store.attrs(name).clone(),
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|(from, to)| Edge::new(from.clone(), to.clone()))
                .collect(),
        }
    }
}
