use std::sync::Arc;

use anyhow::Context;
use courier_infra::config::WorkerConfig;
use courier_worker::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_observability::init("courier-worker");

    let config = WorkerConfig::from_env()?;
    let services = app::services::build_services(&config)
        .await
        .context("failed to open store")?;
    let router = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        processing_delay_ms = config.processing_delay.as_millis() as u64,
        "worker listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(courier_worker::shutdown_signal())
        .await?;
    Ok(())
}
