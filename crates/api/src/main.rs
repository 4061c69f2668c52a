use std::sync::Arc;

use anyhow::Context;
use courier_infra::config::ApiConfig;
use courier_infra::store;
use courier_worker::app::services::WorkerServices;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_observability::init("courier-api");

    let config = ApiConfig::from_env()?;
    let store = store::connect(&config.store)
        .await
        .context("failed to open store")?;

    if let Some(worker) = &config.embedded_worker {
        let services = Arc::new(WorkerServices::from_store(store.clone(), worker));
        let worker_app = courier_worker::app::build_app(services);
        let listener = tokio::net::TcpListener::bind(worker.bind_addr)
            .await
            .with_context(|| format!("failed to bind embedded worker on {}", worker.bind_addr))?;

        tracing::info!(
            addr = %listener.local_addr()?,
            worker_base_url = %config.worker_base_url,
            "embedded worker listening"
        );
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, worker_app).await {
                tracing::error!(error = %e, "embedded worker stopped");
            }
        });
    }

    let services = courier_api::app::services::AppServices::from_config(store, &config)
        .context("failed to build worker client")?;
    let app = courier_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        worker_base_url = %config.worker_base_url,
        dispatch_timeout_ms = config.dispatch_timeout.as_millis() as u64,
        unreachable_policy = ?config.unreachable_policy,
        "api listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(courier_worker::shutdown_signal())
        .await?;
    Ok(())
}
