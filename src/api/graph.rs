use crate::api::AppState;
use crate::core::graph::{build_graph, GraphQuery};
use crate::utils::error::{FakeupError, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;

/// `GET /v1/graph`: the client's current OS pointing at the latest release of its stream.
#[tracing::instrument(skip(state, query))]
pub async fn serve_graph(
    State(state): State<AppState>,
    query: std::result::Result<Query<GraphQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    state.scraper.metrics().graph_requests.inc();

    let Query(query) = query.map_err(|rejection| FakeupError::InvalidQuery {
        reason: rejection.body_text(),
    })?;
    let request = query.into_request(&state.default_basearch)?;
    tracing::trace!("client OS checksum: {}", request.os);
    tracing::trace!("client stream: {}", request.stream);

    let latest = state
        .scraper
        .get_latest(&request.basearch, &request.stream)
        .await?;
    let graph = build_graph(request.client_node(), latest);

    let json = serde_json::to_string_pretty(&graph)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}
