use std::sync::Arc;
use std::time::Duration;

use courier_core::{JobId, WriteIntent};
use courier_infra::config::ApiConfig;
use courier_infra::dispatch::{Dispatcher, HttpWorkerClient, UnreachablePolicy, WorkerClient};
use courier_infra::jobs::{JobError, JobRegistry};
use courier_infra::read_model::MessageReader;
use courier_infra::store::SharedStore;

/// API-side components, built once at start-up and shared by handlers.
pub struct AppServices {
    pub registry: JobRegistry,
    pub dispatcher: Arc<Dispatcher>,
    pub reader: MessageReader,
}

impl AppServices {
    pub fn new(
        store: SharedStore,
        client: Arc<dyn WorkerClient>,
        policy: UnreachablePolicy,
        job_ttl: Option<Duration>,
    ) -> Self {
        let registry = JobRegistry::new(store.clone()).with_ttl(job_ttl);
        let dispatcher = Arc::new(Dispatcher::new(client, registry.clone(), policy));

        Self {
            registry,
            dispatcher,
            reader: MessageReader::new(store),
        }
    }

    pub fn from_config(store: SharedStore, config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let client =
            HttpWorkerClient::new(config.worker_base_url.clone(), config.dispatch_timeout)?;
        Ok(Self::new(
            store,
            Arc::new(client),
            config.unreachable_policy,
            config.job_ttl,
        ))
    }

    /// Record a pending job and hand `intent` to the worker in the background.
    ///
    /// Returns as soon as the pending status is stored; nothing is
    /// dispatched when that write fails.
    pub async fn submit(&self, intent: WriteIntent) -> Result<JobId, JobError> {
        let job_id = self.registry.submit(&intent).await?;
        // Detached: the outcome is logged by the dispatcher.
        drop(self.dispatcher.spawn(job_id, intent));
        Ok(job_id)
    }
}
