//! Strongly-typed identifiers for messages and jobs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Identifier of a message record.
///
/// Positive and assigned from the store's shared counter; never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Wrap a raw counter value. Zero is not a valid message id.
    pub fn new(raw: u64) -> DomainResult<Self> {
        if raw == 0 {
            return Err(DomainError::invalid_id("MessageId: must be positive"));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for MessageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MessageId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("MessageId: {e}")))?;
        Self::new(raw)
    }
}

impl TryFrom<i64> for MessageId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let raw = u64::try_from(value)
            .map_err(|_| DomainError::invalid_id(format!("MessageId: negative value {value}")))?;
        Self::new(raw)
    }
}

/// Identifier of an asynchronous job.
///
/// A random (v4) UUID: 122 random bits, unguessable by callers and
/// collision-free for the lifetime of the system in practice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for JobId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for JobId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("JobId: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_rejects_zero_and_negative() {
        assert!(MessageId::new(0).is_err());
        assert!(MessageId::try_from(-3_i64).is_err());
        assert_eq!(MessageId::try_from(7_i64).unwrap().get(), 7);
    }

    #[test]
    fn message_id_parses_from_path_segment() {
        let id: MessageId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert!("abc".parse::<MessageId>().is_err());
        assert!("0".parse::<MessageId>().is_err());
    }

    #[test]
    fn job_ids_are_distinct_and_round_trip_through_display() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);

        let parsed: JobId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn job_id_rejects_garbage() {
        assert!(matches!(
            "not-a-job".parse::<JobId>(),
            Err(DomainError::InvalidId(_))
        ));
    }
}
