use serde::{Deserialize, Serialize};

use courier_core::{JobId, JobStatus};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /messages` and `PUT /messages/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct WriteMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// 202 body for every accepted write.
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: JobId,
    pub status_url: String,
}

impl JobAccepted {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            status_url: status_url(job_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

pub fn status_url(job_id: JobId) -> String {
    format!("/jobs/{job_id}/status")
}
