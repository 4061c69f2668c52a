//! Transport to the worker service.

use std::time::Duration;

use async_trait::async_trait;

use courier_core::{JobId, WriteIntent};

use crate::wire::{self, DeleteRequest, WriteRequest};

/// Result of a single dispatch attempt.
///
/// Only `Unreachable` means the worker never saw the request. Any HTTP
/// response (including 4xx/5xx) counts as `Accepted`; the worker owns the
/// job's terminal status from that point on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted,
    TimedOut,
    /// The connection was established but closed before a response
    /// arrived. The worker may still finish the job.
    Interrupted(String),
    /// No connection could be established.
    Unreachable(String),
}

#[async_trait]
pub trait WorkerClient: Send + Sync {
    async fn send(&self, job_id: JobId, intent: &WriteIntent) -> DispatchOutcome;
}

pub struct HttpWorkerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWorkerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, job_id: JobId, intent: &WriteIntent) -> reqwest::RequestBuilder {
        let job_id = Some(job_id);
        match intent {
            WriteIntent::Create { content } => {
                self.client.post(self.url(wire::CREATE_PATH)).json(&WriteRequest {
                    content: Some(content.as_str().to_string()),
                    job_id,
                })
            }
            WriteIntent::Update { id, content } => {
                self.client.put(self.url(&wire::update_path(*id))).json(&WriteRequest {
                    content: Some(content.as_str().to_string()),
                    job_id,
                })
            }
            WriteIntent::Delete { id } => self
                .client
                .delete(self.url(&wire::delete_path(*id)))
                .json(&DeleteRequest { job_id }),
        }
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn send(&self, job_id: JobId, intent: &WriteIntent) -> DispatchOutcome {
        match self.request(job_id, intent).send().await {
            Ok(_) => DispatchOutcome::Accepted,
            Err(e) if e.is_timeout() => DispatchOutcome::TimedOut,
            Err(e) if e.is_connect() || e.is_builder() => {
                DispatchOutcome::Unreachable(e.to_string())
            }
            Err(e) => DispatchOutcome::Interrupted(e.to_string()),
        }
    }
}
