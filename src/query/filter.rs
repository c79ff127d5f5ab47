//! The filter pipeline: composable predicates over starts, ends, and paths

use super::types::Path;
use crate::graph::{GraphStore, NodeName};
use serde::Deserialize;

/// Node kinds treated as terminal sinks (data stores and queues)
pub const SINK_KINDS: [&str; 2] = ["rds", "sqs"];

/// A named predicate over the three axes of a query
///
/// Filters compose sequentially: each one narrows the previous filter's
/// output for a given axis, so the net effect per axis is the intersection
/// of every filter's predicate. An operation a filter has no opinion on
/// must return its input unchanged, which is exactly what the default
/// methods do.
pub trait Filter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Narrow the candidate start set
    fn filter_starts(&self, _graph: &GraphStore, starts: Vec<NodeName>) -> Vec<NodeName> {
        starts
    }

    /// Narrow the candidate end set
    fn filter_ends(&self, _graph: &GraphStore, ends: Vec<NodeName>) -> Vec<NodeName> {
        ends
    }

    /// Narrow the candidate path set
    fn filter_paths(&self, _graph: &GraphStore, paths: Vec<Path>) -> Vec<Path> {
        paths
    }
}

/// Keeps only start candidates that are publicly exposed
#[derive(Debug, Clone, Copy, Default)]
pub struct PubliclyExposedStart;

impl Filter for PubliclyExposedStart {
    fn name(&self) -> &'static str {
        "publicly-exposed-start"
    }

    fn filter_starts(&self, graph: &GraphStore, starts: Vec<NodeName>) -> Vec<NodeName> {
        starts
            .into_iter()
            .filter(|name| graph.attrs(name).public_exposed)
            .collect()
    }
}

/// Keeps only end candidates whose kind marks them as a data sink
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkEnd;

impl Filter for SinkEnd {
    fn name(&self) -> &'static str {
        "sink-end"
    }

    fn filter_ends(&self, graph: &GraphStore, ends: Vec<NodeName>) -> Vec<NodeName> {
        ends.into_iter()
            .filter(|name| SINK_KINDS.contains(&graph.attrs(name).kind.as_str()))
            .collect()
    }
}

/// Keeps only paths that touch at least one node with a known vulnerability
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsVulnerability;

impl Filter for ContainsVulnerability {
    fn name(&self) -> &'static str {
        "contains-vulnerability"
    }

    fn filter_paths(&self, graph: &GraphStore, paths: Vec<Path>) -> Vec<Path> {
        paths
            .into_iter()
            .filter(|path| path.iter().any(|name| graph.attrs(name).has_vulnerability()))
            .collect()
    }
}

/// Boolean flag surface used by the transport and the CLI
///
/// Each set flag appends its filter to the pipeline in a fixed order:
/// publicly-exposed start, then sink end, then contains-vulnerability.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub start_public: bool,
    #[serde(default)]
    pub end_sink: bool,
    #[serde(default, rename = "has_vuln_filter")]
    pub has_vulnerability: bool,
}

impl FilterSelection {
    /// No filters selected: queries return the whole graph
    pub fn none() -> Self {
        Self::default()
    }

    /// Select the publicly-exposed-start filter
    pub fn start_public(mut self) -> Self {
        self.start_public = true;
        self
    }

    /// Select the sink-end filter
    pub fn end_sink(mut self) -> Self {
        self.end_sink = true;
        self
    }

    /// Select the contains-vulnerability filter
    pub fn has_vulnerability(mut self) -> Self {
        self.has_vulnerability = true;
        self
    }

    /// True when no flag is set
    pub fn is_empty(&self) -> bool {
        !(self.start_public || self.end_sink || self.has_vulnerability)
    }

    /// Build the filter pipeline in the documented order
    pub fn build(&self) -> Vec<Box<dyn Filter>> {
        let mut pipeline: Vec<Box<dyn Filter>> = Vec::new();
        if self.start_public {
            pipeline.push(Box::new(PubliclyExposedStart));
        }
        if self.end_sink {
            pipeline.push(Box::new(SinkEnd));
        }
        if self.has_vulnerability {
            pipeline.push(Box::new(ContainsVulnerability));
        }
        pipeline
    }
}
