use crate::utils::error::Result;
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Service metrics, registered on a registry owned by the service.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub last_refresh: IntGauge,
    pub upstream_scrapes: IntCounter,
    pub graph_requests: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let last_refresh = IntGauge::with_opts(Opts::new(
            "fakeup_scraper_last_refresh_timestamp",
            "UTC timestamp of last refresh",
        ))?;
        let upstream_scrapes = IntCounter::with_opts(Opts::new(
            "fakeup_scraper_upstream_scrapes_total",
            "Total number of upstream scrapes",
        ))?;
        let graph_requests = IntCounter::with_opts(Opts::new(
            "fakeup_graph_requests_total",
            "Total number of graph requests",
        ))?;

        registry.register(Box::new(last_refresh.clone()))?;
        registry.register(Box::new(upstream_scrapes.clone()))?;
        registry.register(Box::new(graph_requests.clone()))?;

        Ok(Self {
            registry,
            last_refresh,
            upstream_scrapes,
            graph_requests,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("last_refresh", &self.last_refresh.get())
            .field("upstream_scrapes", &self.upstream_scrapes.get())
            .field("graph_requests", &self.graph_requests.get())
            .finish()
    }
}
