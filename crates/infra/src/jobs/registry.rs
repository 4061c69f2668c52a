//! Job registry: issues job ids and tracks their status in the store.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use courier_core::{JobId, JobStatus, WriteIntent};

use crate::store::{keys, SharedStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Never issued, or expired from the store.
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// A terminal status is already recorded; later writes are refused.
    #[error("job {job_id} already finalized as {current}")]
    AlreadyTerminal { job_id: JobId, current: JobStatus },

    #[error("job {0} can only be finalized with a terminal status")]
    NotTerminal(JobId),

    #[error("job {job_id} has unreadable status: {raw}")]
    Corrupt { job_id: JobId, raw: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Creates job identities and reads/writes their status cells.
///
/// Stateless apart from the store handle; every `status` call re-reads the
/// store since the worker may finalize the job at any moment.
#[derive(Clone)]
pub struct JobRegistry {
    store: SharedStore,
    ttl: Option<Duration>,
}

impl JobRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store, ttl: None }
    }

    /// Expire status records `ttl` after each write.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issue a fresh job id and record it as `pending`.
    ///
    /// Returns before any mutation has run. Store failures propagate.
    pub async fn submit(&self, intent: &WriteIntent) -> Result<JobId, JobError> {
        let job_id = JobId::new();
        self.write(job_id, &JobStatus::Pending).await?;

        info!(
            job_id = %job_id,
            operation = %intent.operation(),
            message_id = ?intent.target().map(|id| id.get()),
            "job submitted"
        );
        Ok(job_id)
    }

    /// Current status of a job.
    pub async fn status(&self, job_id: JobId) -> Result<JobStatus, JobError> {
        let raw = self
            .store
            .get(&keys::job(job_id))
            .await?
            .ok_or(JobError::NotFound(job_id))?;

        raw.parse()
            .map_err(|_| JobError::Corrupt { job_id, raw })
    }

    /// Record the single terminal status of a job.
    ///
    /// Refuses to overwrite an existing terminal status. A job whose record
    /// has expired (or was never issued here) is still written, so late
    /// pollers see the outcome.
    ///
    /// The write is a compare-and-set against the value just read; when a
    /// concurrent writer gets in between, the record is re-read and the
    /// guard applied again.
    pub async fn finalize(&self, job_id: JobId, status: JobStatus) -> Result<(), JobError> {
        if !status.is_terminal() {
            return Err(JobError::NotTerminal(job_id));
        }

        let key = keys::job(job_id);
        let rendered = status.to_string();

        loop {
            let raw = self.store.get(&key).await?;
            let current = raw
                .as_deref()
                .and_then(|r| r.parse::<JobStatus>().ok())
                .filter(JobStatus::is_terminal);

            if let Some(current) = current {
                warn!(
                    job_id = %job_id,
                    current = %current,
                    attempted = %status,
                    "refusing second terminal write"
                );
                return Err(JobError::AlreadyTerminal { job_id, current });
            }

            if self
                .store
                .compare_and_set(&key, raw.as_deref(), &rendered, self.ttl)
                .await?
            {
                return Ok(());
            }
            debug!(job_id = %job_id, "job status changed during finalize; retrying guard");
        }
    }

    async fn write(&self, job_id: JobId, status: &JobStatus) -> Result<(), JobError> {
        self.store
            .set(&keys::job(job_id), &status.to_string(), self.ttl)
            .await?;
        Ok(())
    }
}
