//! Job status cell.
//!
//! A job is created `pending` and receives exactly one terminal write
//! (`completed` or `failed:<reason>`). The wire form is the plain string
//! stored under the job's key.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

const PENDING: &str = "pending";
const COMPLETED: &str = "completed";
const FAILED_PREFIX: &str = "failed:";

/// Failure reason for a missing update/delete target.
pub const REASON_NOT_FOUND: &str = "not_found";

/// Failure reason written when the worker could not be reached (opt-in policy).
pub const REASON_DISPATCH_UNREACHABLE: &str = "dispatch_unreachable";

/// Job execution status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted, not yet finalized by the worker.
    Pending,
    /// Mutation applied.
    Completed,
    /// Mutation did not apply; `reason` is reported to pollers.
    Failed { reason: String },
}

impl JobStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::failed(REASON_NOT_FOUND)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JobStatus::Pending => f.write_str(PENDING),
            JobStatus::Completed => f.write_str(COMPLETED),
            JobStatus::Failed { reason } => write!(f, "{FAILED_PREFIX}{reason}"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PENDING => Ok(JobStatus::Pending),
            COMPLETED => Ok(JobStatus::Completed),
            other => match other.strip_prefix(FAILED_PREFIX) {
                // Also accept the spaced form "failed: <reason>".
                Some(reason) => Ok(JobStatus::failed(reason.trim_start())),
                None => Err(DomainError::validation(format!("unknown job status: {other}"))),
            },
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
