use anyhow::Context;
use clap::Parser;
use fakeup::core::ConfigProvider;
use fakeup::utils::metrics::Metrics;
use fakeup::utils::{logger, validation::Validate};
use fakeup::{AppState, CliConfig, HttpReleaseSource, Scraper};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_logger(cli.verbose);
    }

    let config = cli.load().context("failed to load configuration")?;
    tracing::debug!("starting with config: {:#?}", config);
    config.validate().context("invalid configuration")?;

    let metrics = Metrics::new().context("failed to register metrics")?;
    let source = HttpReleaseSource::new(config.releases_url(), config.request_timeout())
        .context("failed to build upstream client")?;
    let scraper = Scraper::from_config(Arc::new(source), &config, metrics);
    let scraper_task = scraper.spawn();

    let app = fakeup::router(AppState::new(
        scraper,
        config.default_basearch().to_string(),
    ));

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .context("failed to bind to port")?;

    tracing::info!("fakeup is up and running on {}", config.bind_addr());

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error starting service")?;

    scraper_task.abort();
    tracing::info!("fakeup stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
