//! Shared fixtures for integration tests

use reachmap::GraphStore;
use serde_json::json;

/// The canonical scenario graph:
/// A (publicly exposed) -> B (plain service) -> C (rds sink) -> D (vulnerable)
/// with a dead-end branch B -> E.
pub fn scenario_json() -> serde_json::Value {
    json!({
        "nodes": [
            {"name": "A", "publicExposed": true},
            {"name": "B", "kind": "service"},
            {"name": "C", "kind": "rds"},
            {"name": "D", "vulnerabilities": ["CVE-1"]}
        ],
        "edges": [
            {"from": "A", "to": "B"},
            {"from": "B", "to": ["C", "E"]},
            {"from": "C", "to": "D"}
        ]
    })
}

pub fn scenario_store() -> GraphStore {
    GraphStore::from_json(&scenario_json().to_string()).expect("scenario fixture parses")
}
