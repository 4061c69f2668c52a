//! Dispatcher: one delivery attempt per job.

use std::str::FromStr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use courier_core::{JobId, JobStatus, WriteIntent};

use super::worker_client::{DispatchOutcome, WorkerClient};
use crate::jobs::JobRegistry;

/// What to do with a job whose intent never reached the worker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UnreachablePolicy {
    /// Leave the job `pending` (nobody will finalize it).
    #[default]
    KeepPending,
    /// Record `failed:dispatch_unreachable`.
    MarkFailed,
}

impl FromStr for UnreachablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep_pending" => Ok(UnreachablePolicy::KeepPending),
            "mark_failed" => Ok(UnreachablePolicy::MarkFailed),
            other => Err(format!("expected 'keep_pending' or 'mark_failed', got '{other}'")),
        }
    }
}

pub struct Dispatcher {
    client: Arc<dyn WorkerClient>,
    registry: JobRegistry,
    policy: UnreachablePolicy,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn WorkerClient>,
        registry: JobRegistry,
        policy: UnreachablePolicy,
    ) -> Self {
        Self {
            client,
            registry,
            policy,
        }
    }

    /// Deliver `intent` for `job_id` once and apply the unreachable policy.
    pub async fn dispatch(&self, job_id: JobId, intent: WriteIntent) -> DispatchOutcome {
        let operation = intent.operation();
        let outcome = self.client.send(job_id, &intent).await;

        match &outcome {
            DispatchOutcome::Accepted => {
                info!(job_id = %job_id, operation = %operation, "intent delivered to worker");
            }
            DispatchOutcome::TimedOut => {
                // The worker may still complete the job.
                warn!(
                    job_id = %job_id,
                    operation = %operation,
                    "worker did not answer before timeout"
                );
            }
            DispatchOutcome::Interrupted(reason) => {
                // Delivered; the worker owns the terminal status.
                warn!(
                    job_id = %job_id,
                    operation = %operation,
                    reason = %reason,
                    "worker closed the connection before answering"
                );
            }
            DispatchOutcome::Unreachable(reason) => {
                error!(
                    job_id = %job_id,
                    operation = %operation,
                    reason = %reason,
                    policy = ?self.policy,
                    "worker unreachable"
                );
                if self.policy == UnreachablePolicy::MarkFailed {
                    let status = JobStatus::failed(courier_core::job::REASON_DISPATCH_UNREACHABLE);
                    if let Err(e) = self.registry.finalize(job_id, status).await {
                        error!(job_id = %job_id, error = %e, "failed to record dispatch failure");
                    }
                }
            }
        }

        outcome
    }

    /// Run [`Dispatcher::dispatch`] in the background.
    pub fn spawn(
        self: &Arc<Self>,
        job_id: JobId,
        intent: WriteIntent,
    ) -> JoinHandle<DispatchOutcome> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.dispatch(job_id, intent).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use courier_core::{Content, MessageId};

    use super::*;
    use crate::store::InMemoryStore;

    struct FakeClient {
        outcome: DispatchOutcome,
        sent: Mutex<Vec<(JobId, WriteIntent)>>,
    }

    impl FakeClient {
        fn new(outcome: DispatchOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl WorkerClient for FakeClient {
        async fn send(&self, job_id: JobId, intent: &WriteIntent) -> DispatchOutcome {
            self.sent.lock().unwrap().push((job_id, intent.clone()));
            self.outcome.clone()
        }
    }

    fn intent() -> WriteIntent {
        WriteIntent::Update {
            id: MessageId::new(7).unwrap(),
            content: Content::new("x").unwrap(),
        }
    }

    async fn setup(
        outcome: DispatchOutcome,
        policy: UnreachablePolicy,
    ) -> (Arc<FakeClient>, JobRegistry, Arc<Dispatcher>, JobId) {
        let registry = JobRegistry::new(Arc::new(InMemoryStore::new()));
        let client = FakeClient::new(outcome);
        let dispatcher = Arc::new(Dispatcher::new(client.clone(), registry.clone(), policy));
        let job_id = registry.submit(&intent()).await.unwrap();
        (client, registry, dispatcher, job_id)
    }

    #[tokio::test]
    async fn accepted_leaves_status_to_worker() {
        let (client, registry, dispatcher, job_id) =
            setup(DispatchOutcome::Accepted, UnreachablePolicy::MarkFailed).await;

        let outcome = dispatcher.spawn(job_id, intent()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Accepted);
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Pending);
        assert_eq!(client.sent.lock().unwrap().as_slice(), &[(job_id, intent())]);
    }

    #[tokio::test]
    async fn timeout_is_not_a_failure() {
        let (_client, registry, dispatcher, job_id) =
            setup(DispatchOutcome::TimedOut, UnreachablePolicy::MarkFailed).await;

        dispatcher.dispatch(job_id, intent()).await;
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Pending);
    }

    #[tokio::test]
    async fn interrupted_delivery_never_fails_the_job() {
        let (_client, registry, dispatcher, job_id) = setup(
            DispatchOutcome::Interrupted("connection closed before message completed".into()),
            UnreachablePolicy::MarkFailed,
        )
        .await;

        dispatcher.dispatch(job_id, intent()).await;
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Pending);

        // The worker's own result still lands.
        registry.finalize(job_id, JobStatus::Completed).await.unwrap();
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Completed);
    }

    #[tokio::test]
    async fn unreachable_keeps_pending_by_default() {
        let (client, registry, dispatcher, job_id) = setup(
            DispatchOutcome::Unreachable("refused".into()),
            UnreachablePolicy::default(),
        )
        .await;

        dispatcher.dispatch(job_id, intent()).await;
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Pending);
        // single attempt
        assert_eq!(client.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_can_mark_failed() {
        let (_client, registry, dispatcher, job_id) = setup(
            DispatchOutcome::Unreachable("refused".into()),
            UnreachablePolicy::MarkFailed,
        )
        .await;

        dispatcher.dispatch(job_id, intent()).await;
        assert_eq!(
            registry.status(job_id).await.unwrap(),
            JobStatus::failed("dispatch_unreachable")
        );
    }

    #[tokio::test]
    async fn mark_failed_does_not_overwrite_a_terminal_status() {
        let (_client, registry, dispatcher, job_id) = setup(
            DispatchOutcome::Unreachable("reset".into()),
            UnreachablePolicy::MarkFailed,
        )
        .await;
        registry.finalize(job_id, JobStatus::Completed).await.unwrap();

        dispatcher.dispatch(job_id, intent()).await;
        assert_eq!(registry.status(job_id).await.unwrap(), JobStatus::Completed);
    }

    #[test]
    fn policy_parses() {
        assert_eq!(
            "keep_pending".parse::<UnreachablePolicy>(),
            Ok(UnreachablePolicy::KeepPending)
        );
        assert_eq!(
            "MARK_FAILED".parse::<UnreachablePolicy>(),
            Ok(UnreachablePolicy::MarkFailed)
        );
        assert!("retry".parse::<UnreachablePolicy>().is_err());
    }
}
