//! Worker executor: applies message mutations and finalizes their jobs.

use thiserror::Error;
use tracing::{error, info, warn};

use courier_core::{Content, DomainError, JobId, JobStatus, Message, MessageId, Operation};

use super::delay::ProcessingDelay;
use super::registry::{JobError, JobRegistry};
use crate::store::{keys, SharedStore, StoreError};
use crate::wire::Deleted;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("{0}")]
    Validation(String),

    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// Store returned something the domain cannot represent (e.g. a
    /// non-positive counter value).
    #[error("corrupt store data: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExecError {
    /// Text recorded in the job's `failed:<reason>` status.
    pub fn failure_reason(&self) -> String {
        match self {
            ExecError::NotFound(_) => courier_core::job::REASON_NOT_FOUND.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for ExecError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ExecError::Validation(msg),
            DomainError::InvalidId(msg) => ExecError::Corrupt(msg),
            DomainError::NotFound => ExecError::Corrupt("unexpected not found".to_string()),
        }
    }
}

/// Performs the actual mutation for a job.
///
/// Each operation:
/// 1. validates and applies the mutation against the store
/// 2. pauses for the configured processing delay
/// 3. writes the job's single terminal status (when a job id is given)
///
/// Direct callers pass `job_id: None` and only get the synchronous result.
#[derive(Clone)]
pub struct WorkerExecutor {
    store: SharedStore,
    registry: JobRegistry,
    delay: ProcessingDelay,
}

impl WorkerExecutor {
    pub fn new(store: SharedStore, delay: ProcessingDelay) -> Self {
        Self {
            registry: JobRegistry::new(store.clone()),
            store,
            delay,
        }
    }

    pub fn with_job_ttl(mut self, ttl: Option<std::time::Duration>) -> Self {
        self.registry = self.registry.with_ttl(ttl);
        self
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Create a message with the next counter value as its id.
    ///
    /// If the record write fails after the increment, that id is skipped
    /// for good; no partial record is left behind.
    pub async fn create(
        &self,
        content: Option<String>,
        job_id: Option<JobId>,
    ) -> Result<Message, ExecError> {
        let result = self.apply_create(content).await;
        self.settle(job_id, Operation::Create, result).await
    }

    /// Overwrite the content of an existing message.
    pub async fn update(
        &self,
        id: MessageId,
        content: Option<String>,
        job_id: Option<JobId>,
    ) -> Result<Message, ExecError> {
        let result = self.apply_update(id, content).await;
        self.settle(job_id, Operation::Update, result).await
    }

    /// Remove a message. Deleting a missing id reports `NotFound`.
    pub async fn delete(&self, id: MessageId, job_id: Option<JobId>) -> Result<Deleted, ExecError> {
        let result = self.apply_delete(id).await;
        self.settle(job_id, Operation::Delete, result).await
    }

    async fn apply_create(&self, content: Option<String>) -> Result<Message, ExecError> {
        let content = Content::from_field(content)?;

        let raw = self.store.incr(keys::MESSAGE_COUNTER).await?;
        let id = MessageId::try_from(raw)?;
        let id_field = id.to_string();

        self.store
            .hset(
                &keys::message(id),
                &[(keys::FIELD_ID, id_field.as_str()), (keys::FIELD_CONTENT, content.as_str())],
            )
            .await?;

        self.delay.pause().await;
        info!(message_id = %id, "message created");
        Ok(Message::new(id, content))
    }

    async fn apply_update(
        &self,
        id: MessageId,
        content: Option<String>,
    ) -> Result<Message, ExecError> {
        let key = keys::message(id);
        if !self.store.exists(&key).await? {
            return Err(ExecError::NotFound(id));
        }
        let content = Content::from_field(content)?;

        self.store
            .hset(&key, &[(keys::FIELD_CONTENT, content.as_str())])
            .await?;

        self.delay.pause().await;
        info!(message_id = %id, "message updated");
        Ok(Message::new(id, content))
    }

    async fn apply_delete(&self, id: MessageId) -> Result<Deleted, ExecError> {
        if self.store.del(&keys::message(id)).await? == 0 {
            return Err(ExecError::NotFound(id));
        }

        self.delay.pause().await;
        info!(message_id = %id, "message deleted");
        Ok(Deleted::new(id))
    }

    async fn settle<T>(
        &self,
        job_id: Option<JobId>,
        operation: Operation,
        result: Result<T, ExecError>,
    ) -> Result<T, ExecError> {
        if let Err(err) = &result {
            match err {
                ExecError::Store(_) | ExecError::Corrupt(_) => error!(
                    job_id = ?job_id,
                    operation = %operation,
                    error = %err,
                    "mutation failed"
                ),
                _ => warn!(
                    job_id = ?job_id,
                    operation = %operation,
                    error = %err,
                    "mutation rejected"
                ),
            }
        }

        let Some(job_id) = job_id else {
            return result;
        };

        let status = match &result {
            Ok(_) => JobStatus::Completed,
            Err(err) => JobStatus::failed(err.failure_reason()),
        };

        match self.registry.finalize(job_id, status.clone()).await {
            Ok(()) => info!(
                job_id = %job_id,
                operation = %operation,
                status = %status,
                "job finalized"
            ),
            // Already logged by the registry.
            Err(JobError::AlreadyTerminal { .. }) => {}
            Err(e) => error!(
                job_id = %job_id,
                operation = %operation,
                error = %e,
                "failed to record job status"
            ),
        }

        result
    }
}
