use courier_infra::config::WorkerConfig;
use courier_infra::jobs::{ProcessingDelay, WorkerExecutor};
use courier_infra::read_model::MessageReader;
use courier_infra::store::{self, SharedStore, StoreResult};

/// Everything the worker handlers need; shared through an `Extension`.
#[derive(Clone)]
pub struct WorkerServices {
    pub executor: WorkerExecutor,
    pub reader: MessageReader,
}

impl WorkerServices {
    pub fn from_store(store: SharedStore, config: &WorkerConfig) -> Self {
        let delay = ProcessingDelay::fixed(config.processing_delay);
        let executor = WorkerExecutor::new(store.clone(), delay).with_job_ttl(config.job_ttl);

        Self {
            executor,
            reader: MessageReader::new(store),
        }
    }
}

pub async fn build_services(config: &WorkerConfig) -> StoreResult<WorkerServices> {
    let store = store::connect(&config.store).await?;
    Ok(WorkerServices::from_store(store, config))
}
