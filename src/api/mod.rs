use crate::core::scraper::Scraper;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod graph;
mod health;
mod metrics;

/// Shared state of the HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub scraper: Scraper,
    pub default_basearch: Arc<str>,
}

impl AppState {
    pub fn new(scraper: Scraper, default_basearch: impl Into<Arc<str>>) -> Self {
        Self {
            scraper,
            default_basearch: default_basearch.into(),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/v1/graph", get(graph::serve_graph))
        .route("/metrics", get(metrics::serve_metrics))
        .with_state(app_state)
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}
