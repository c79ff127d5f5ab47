//! Mermaid rendering of query results

use crate::graph::{GraphStore, NodeAttrs, NodeName, DEFAULT_KIND};
use crate::query::QueryResult;
use std::fmt::Write;

/// Style class for a node, by first-match priority: publicly exposed, then
/// vulnerable, then non-default kind, then plain service. Evaluated against
/// the node's original attributes, never a filtered view.
fn style_class(attrs: &NodeAttrs) -> &'static str {
    if attrs.public_exposed {
        "publicExposed"
    } else if attrs.has_listed_vulnerability() {
        "vulnerable"
    } else if attrs.kind != DEFAULT_KIND {
        "nonService"
    } else {
        "service"
    }
}

/// Mermaid identifiers cannot contain dashes
fn ident(name: &NodeName) -> String {
    name.as_str().replace('-', "_")
}

/// Render a query result as a Mermaid `graph TD` document
pub fn mermaid(store: &GraphStore, result: &QueryResult) -> String {
    let mut out = String::from("graph TD\n");

    for node in &result.nodes {
        let _ = writeln!(out, "{}[{}]", ident(&node.name), node.name);
    }
    for edge in &result.edges {
        let _ = writeln!(out, "{} --> {}", ident(&edge.from), ident(&edge.to));
    }

    out.push_str("classDef publicExposed fill:#00ff00\n");
    out.push_str("classDef vulnerable fill:#ff0000\n");
    out.push_str("classDef nonService fill:#ffff00\n");
    out.push_str("classDef service fill:#add8e6\n");

    for node in &result.nodes {
        let _ = writeln!(
            out,
            "class {} {}",
            ident(&node.name),
            style_class(store.attrs(&node.name))
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::query::{FilterSelection, QueryEngine};
    use std::sync::Arc;

    fn rendered() -> String {
        let store = GraphStore::from_json(
            r#"{"nodes": [
                    {"name": "edge-lb", "publicExposed": true},
                    {"name": "api"},
                    {"name": "user-db", "kind": "rds"},
                    {"name": "legacy", "publicExposed": true,
                     "vulnerabilities": ["CVE-2023-9999"]}
                ],
                "edges": [{"from": "edge-lb", "to": "api"},
                          {"from": "api", "to": ["user-db", "legacy"]}]}"#,
        )
        .unwrap();
        let store = Arc::new(store);
        let engine = QueryEngine::new(store.clone());
        let result = engine.query_selection(FilterSelection::none());
        mermaid(&store, &result)
    }

    #[test]
    fn test_header_and_class_defs_present() {
        let out = rendered();
        assert!(out.starts_with("graph TD\n"));
        assert!(out.contains("classDef publicExposed fill:#00ff00\n"));
        assert!(out.contains("classDef vulnerable fill:#ff0000\n"));
        assert!(out.contains("classDef nonService fill:#ffff00\n"));
        assert!(out.contains("classDef service fill:#add8e6\n"));
    }

    #[test]
    fn test_dashes_sanitized_in_idents_not_labels() {
        let out = rendered();
        assert!(out.contains("edge_lb[edge-lb]\n"));
        assert!(out.contains("edge_lb --> api\n"));
        assert!(out.contains("api --> user_db\n"));
    }

    #[test]
    fn test_class_priority_first_match_wins() {
        let out = rendered();
        // Publicly exposed wins even when the node is also vulnerable
        assert!(out.contains("class legacy publicExposed\n"));
        assert!(out.contains("class user_db nonService\n"));
        assert!(out.contains("class api service\n"));
    }

    #[test]
    fn test_styles_follow_original_attrs_after_filtering() {
        let store = Arc::new(
            GraphStore::from_json(
                r#"{"nodes": [{"name": "web", "publicExposed": true},
                              {"name": "db", "kind": "rds"}],
                    "edges": [{"from": "web", "to": "db"}]}"#,
            )
            .unwrap(),
        );
        let engine = QueryEngine::new(store.clone());
        let result = engine.query_selection(FilterSelection::none().start_public().end_sink());
        let out = mermaid(&store, &result);
        assert!(out.contains("class web publicExposed\n"));
        assert!(out.contains("class db nonService\n"));
    }
}
