//! End-to-end query pipeline tests

mod common;

use common::{scenario_json, scenario_store};
use reachmap::{
    ContainsVulnerability, Filter, FilterSelection, GraphStore, NodeName, PubliclyExposedStart,
    QueryConfig, QueryEngine, SinkEnd,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

fn engine(store: GraphStore) -> QueryEngine {
    QueryEngine::new(Arc::new(store))
}

fn node_names(result: &reachmap::QueryResult) -> Vec<&str> {
    result.nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn empty_pipeline_returns_graph_exactly() {
    let store = scenario_store();
    let expected_nodes: Vec<String> = store.node_names().map(|n| n.as_str().into()).collect();
    let expected_edges: Vec<String> = store.edges().map(|e| e.to_string()).collect();

    let result = engine(scenario_store()).query(&[]);
    let got_nodes: Vec<String> = result.nodes.iter().map(|n| n.name.as_str().into()).collect();
    let got_edges: Vec<String> = result.edges.iter().map(|e| e.to_string()).collect();

    assert_eq!(got_nodes, expected_nodes);
    assert_eq!(got_edges.len(), expected_edges.len());
    for edge in expected_edges {
        assert!(got_edges.contains(&edge), "missing edge {edge}");
    }
}

#[test]
fn endpoint_filters_select_the_connecting_route() {
    let result =
        engine(scenario_store()).query_selection(FilterSelection::none().start_public().end_sink());
    // The single qualifying pair is (A, C); the route runs through B.
    assert_eq!(node_names(&result), ["A", "B", "C"]);
    assert!(result.has_edge(&"A".into(), &"B".into()));
    assert!(result.has_edge(&"B".into(), &"C".into()));
    assert_eq!(result.edges.len(), 2);
}

#[test]
fn vulnerability_filter_keeps_routes_reaching_d() {
    let result =
        engine(scenario_store()).query_selection(FilterSelection::none().has_vulnerability());
    // Every surviving path funnels into D; the dead-end branch to E never
    // touches a vulnerable node and is excluded.
    assert_eq!(node_names(&result), ["A", "B", "C", "D"]);
    assert!(result.has_edge(&"C".into(), &"D".into()));
    assert!(result.node(&"E".into()).is_none());
    assert!(!result.has_edge(&"B".into(), &"E".into()));
}

#[test]
fn intersection_law_holds_per_axis() {
    let store = scenario_store();
    let filters: Vec<Box<dyn Filter>> = vec![
        Box::new(PubliclyExposedStart),
        Box::new(SinkEnd),
        Box::new(ContainsVulnerability),
    ];
    let all: Vec<NodeName> = store.node_names().cloned().collect();

    // Sequential composition over the pipeline...
    let mut sequential = all.clone();
    for filter in &filters {
        sequential = filter.filter_starts(&store, sequential);
    }

    // ...equals the intersection of each filter applied independently.
    let mut intersection: BTreeSet<NodeName> = all.iter().cloned().collect();
    for filter in &filters {
        let independent: BTreeSet<NodeName> =
            filter.filter_starts(&store, all.clone()).into_iter().collect();
        intersection = intersection.intersection(&independent).cloned().collect();
    }

    let sequential: BTreeSet<NodeName> = sequential.into_iter().collect();
    assert_eq!(sequential, intersection);

    // Same law for ends.
    let mut sequential_ends = all.clone();
    for filter in &filters {
        sequential_ends = filter.filter_ends(&store, sequential_ends);
    }
    let mut end_intersection: BTreeSet<NodeName> = all.iter().cloned().collect();
    for filter in &filters {
        let independent: BTreeSet<NodeName> =
            filter.filter_ends(&store, all.clone()).into_iter().collect();
        end_intersection = end_intersection.intersection(&independent).cloned().collect();
    }
    let sequential_ends: BTreeSet<NodeName> = sequential_ends.into_iter().collect();
    assert_eq!(sequential_ends, end_intersection);

    // Same law for paths.
    let candidates: Vec<reachmap::Path> = vec![
        vec!["A".into(), "B".into()],
        vec!["B".into(), "C".into(), "D".into()],
        vec!["C".into(), "D".into()],
    ];
    let mut sequential_paths = candidates.clone();
    for filter in &filters {
        sequential_paths = filter.filter_paths(&store, sequential_paths);
    }
    let mut path_intersection: BTreeSet<reachmap::Path> = candidates.iter().cloned().collect();
    for filter in &filters {
        let independent: BTreeSet<reachmap::Path> = filter
            .filter_paths(&store, candidates.clone())
            .into_iter()
            .collect();
        path_intersection = path_intersection.intersection(&independent).cloned().collect();
    }
    let sequential_paths: BTreeSet<reachmap::Path> = sequential_paths.into_iter().collect();
    assert_eq!(sequential_paths, path_intersection);
}

#[test]
fn cutoff_bounds_engine_queries() {
    // A -> B -> C needs two edges; a cutoff of one prunes the route.
    let short = QueryEngine::with_config(
        Arc::new(scenario_store()),
        QueryConfig::default().cutoff(1),
    );
    assert!(short
        .query_selection(FilterSelection::none().start_public().end_sink())
        .is_empty());

    let wide = QueryEngine::with_config(
        Arc::new(scenario_store()),
        QueryConfig::default().cutoff(2),
    );
    let result = wide.query_selection(FilterSelection::none().start_public().end_sink());
    assert_eq!(node_names(&result), ["A", "B", "C"]);
}

#[test]
fn no_path_ever_starts_and_ends_on_the_same_node() {
    // Every node qualifies for both axes under an empty predicate set, so
    // drive the engine with the vulnerability filter over a cyclic graph.
    let store = GraphStore::from_json(
        r#"{"nodes": [{"name": "A", "vulnerabilities": ["CVE-1"]}],
            "edges": [{"from": "A", "to": "B"}, {"from": "B", "to": "A"}]}"#,
    )
    .unwrap();
    let result = engine(store).query_selection(FilterSelection::none().has_vulnerability());
    for edge in &result.edges {
        assert_ne!(edge.from, edge.to, "self-loop {edge} in result");
    }
}

#[test]
fn every_result_edge_connects_result_nodes() {
    let result =
        engine(scenario_store()).query_selection(FilterSelection::none().has_vulnerability());
    for edge in &result.edges {
        assert!(result.node(&edge.from).is_some(), "orphan edge {edge}");
        assert!(result.node(&edge.to).is_some(), "orphan edge {edge}");
    }
}

#[test]
fn identical_queries_serialize_identically() {
    let engine = engine(scenario_store());
    let selection = FilterSelection::none().start_public().has_vulnerability();
    let first = serde_json::to_string(&engine.query_selection(selection)).unwrap();
    let second = serde_json::to_string(&engine.query_selection(selection)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn load_from_disk_round_trips() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", scenario_json()).unwrap();

    let store = GraphStore::load(file.path()).unwrap();
    // E exists only as an edge target and is materialized with defaults
    assert_eq!(store.node_count(), 5);
    assert_eq!(store.attrs(&"E".into()).kind, "service");

    let result = engine(store).query_selection(FilterSelection::none().start_public().end_sink());
    assert_eq!(node_names(&result), ["A", "B", "C"]);
}
