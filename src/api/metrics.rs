use crate::api::AppState;
use crate::utils::error::Result;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

/// Prometheus text exposition.
pub async fn serve_metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state.scraper.metrics().render()?;
    Ok((
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        body,
    ))
}
