//! HTTP transport exposing the query engine
//!
//! Two endpoints, both parameterized by the boolean filter flags:
//! `/graph` returns the filtered subgraph as JSON (with the Mermaid text
//! inline), `/graph/html` returns a page that renders the diagram.

use crate::query::{FilterSelection, QueryEngine, QueryResult};
use crate::render;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

/// Wire shape of the `/graph` response
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    pub mermaid: String,
}

/// Build the application router
pub fn router(engine: Arc<QueryEngine>) -> Router {
    Router::new()
        .route("/graph", get(get_graph))
        .route("/graph/html", get(get_graph_html))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(AppState { engine })
}

/// Serve the API on the given address
pub async fn serve(engine: Arc<QueryEngine>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(engine)).await
}

/// Enumeration is CPU-bound, so queries run off the async workers
async fn run_query(
    engine: Arc<QueryEngine>,
    selection: FilterSelection,
) -> Result<GraphResponse, StatusCode> {
    tokio::task::spawn_blocking(move || {
        let result = engine.query_selection(selection);
        let mermaid = render::mermaid(engine.graph(), &result);
        GraphResponse { result, mermaid }
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_graph(
    State(state): State<AppState>,
    Query(selection): Query<FilterSelection>,
) -> Result<Json<GraphResponse>, StatusCode> {
    let response = run_query(state.engine, selection).await?;
    Ok(Json(response))
}

async fn get_graph_html(
    State(state): State<AppState>,
    Query(selection): Query<FilterSelection>,
) -> Result<Html<String>, StatusCode> {
    let response = run_query(state.engine, selection).await?;
    Ok(Html(html_page(&response.mermaid)))
}

fn html_page(mermaid: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Service Dependency Graph</title>
    <script type="module">
        import mermaid from 'https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs';
        mermaid.initialize({{ startOnLoad: true }});
    </script>
</head>
<body>
    <h1>Filtered Graph</h1>
    <div class="mermaid">
{mermaid}
    </div>
</body>
</html>
"#
    )
}
