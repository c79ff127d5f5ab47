//! Bounded simple-path enumeration
//!
//! This is the complexity-bearing operation of the crate: the number of
//! simple paths is exponential in branching factor and cutoff, so
//! enumeration is lazy and strictly pruned at the cutoff.

use super::types::Path;
use crate::graph::{GraphStore, NodeName};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Default bound on enumerated path length, counted in edges
pub const DEFAULT_CUTOFF: usize = 10;

/// Shared budget that lets a caller stop enumeration early
///
/// Checked between emitted paths; once the path count or deadline is
/// exhausted, every iterator carrying this budget terminates. Exhaustion
/// truncates results, it is not an error.
#[derive(Debug, Default)]
pub struct QueryBudget {
    deadline: Option<Instant>,
    max_paths: Option<usize>,
    emitted: AtomicUsize,
}

impl QueryBudget {
    /// Create a budget with no limits
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Bound the total number of emitted paths
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    /// Stop enumeration at the given instant
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Number of paths emitted against this budget so far
    pub fn paths_emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    /// True once the path count or the deadline is spent
    pub fn exhausted(&self) -> bool {
        if let Some(max) = self.max_paths {
            if self.emitted.load(Ordering::Relaxed) >= max {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        false
    }

    fn record(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }
}

/// Query for all simple paths between two nodes, bounded by a cutoff
#[derive(Debug, Clone)]
pub struct PathQuery {
    /// Start node name
    pub start: NodeName,
    /// End node name
    pub end: NodeName,
    /// Maximum number of edges in any emitted path
    pub cutoff: usize,
}

impl PathQuery {
    /// Create a query between two nodes with the default cutoff
    pub fn between(start: impl Into<NodeName>, end: impl Into<NodeName>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// Set the cutoff
    pub fn cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Execute lazily against a graph
    pub fn execute<'g>(&self, graph: &'g GraphStore) -> SimplePaths<'g> {
        SimplePaths::new(graph, self.start.clone(), self.end.clone(), self.cutoff, None)
    }

    /// Execute lazily, stopping early once `budget` is exhausted
    pub fn execute_with_budget<'g>(
        &self,
        graph: &'g GraphStore,
        budget: &'g QueryBudget,
    ) -> SimplePaths<'g> {
        SimplePaths::new(
            graph,
            self.start.clone(),
            self.end.clone(),
            self.cutoff,
            Some(budget),
        )
    }

    /// Collect every path eagerly
    pub fn collect(&self, graph: &GraphStore) -> Vec<Path> {
        self.execute(graph).collect()
    }
}

/// Lazy depth-first enumeration of simple paths
///
/// Maintains the current walk, a visited set enforcing simplicity, and a
/// per-level cursor into each node's successor list. A path is emitted when
/// a successor equals the end node; a branch is descended only while one
/// more edge can still reach the end within the cutoff. Paths longer than
/// the cutoff are never constructed.
pub struct SimplePaths<'g> {
    graph: &'g GraphStore,
    end: NodeName,
    cutoff: usize,
    /// Current walk, parallel to `cursors`
    walk: Vec<NodeName>,
    /// Next successor index to try at each walk level
    cursors: Vec<usize>,
    visited: HashSet<NodeName>,
    budget: Option<&'g QueryBudget>,
    done: bool,
}

impl<'g> SimplePaths<'g> {
    fn new(
        graph: &'g GraphStore,
        start: NodeName,
        end: NodeName,
        cutoff: usize,
        budget: Option<&'g QueryBudget>,
    ) -> Self {
        // A node never pairs with itself, an absent endpoint has no routes,
        // and a zero cutoff admits no edge at all.
        let done = start == end || cutoff == 0 || !graph.contains(&start) || !graph.contains(&end);
        Self {
            graph,
            end,
            cutoff,
            visited: HashSet::from([start.clone()]),
            walk: vec![start],
            cursors: vec![0],
            budget,
            done,
        }
    }

    fn backtrack(&mut self) {
        if let Some(popped) = self.walk.pop() {
            self.visited.remove(&popped);
            self.cursors.pop();
        }
        if self.walk.is_empty() {
            self.done = true;
        }
    }
}

impl Iterator for SimplePaths<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        loop {
            if self.done {
                return None;
            }
            if self.budget.is_some_and(QueryBudget::exhausted) {
                self.done = true;
                return None;
            }

            let depth = self.walk.len() - 1;
            let current = self.walk[depth].clone();
            let successors = self.graph.successors(&current);

            let mut descended = false;
            while self.cursors[depth] < successors.len() {
                let next = &successors[self.cursors[depth]];
                self.cursors[depth] += 1;

                if *next == self.end {
                    let mut path = self.walk.clone();
                    path.push(self.end.clone());
                    if let Some(budget) = self.budget {
                        budget.record();
                    }
                    return Some(path);
                }
                if self.visited.contains(next) {
                    continue;
                }
                // Descend only while one more edge can still reach the end
                // inside the cutoff.
                if depth + 1 < self.cutoff {
                    self.walk.push(next.clone());
                    self.cursors.push(0);
                    self.visited.insert(next.clone());
                    descended = true;
                    break;
                }
            }

            if !descended {
                self.backtrack();
            }
        }
    }
}
