//! Message records and their content.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::MessageId;

/// Validated message body (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Content(String);

impl Content {
    pub fn new(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::validation("missing 'content'"));
        }
        Ok(Self(raw))
    }

    /// Validate an optional request field, treating absence like emptiness.
    pub fn from_field(raw: Option<String>) -> DomainResult<Self> {
        Self::new(raw.unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Content {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Content> for String {
    fn from(value: Content) -> Self {
        value.0
    }
}

impl core::fmt::Display for Content {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored message: `{id, content}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: Content,
}

impl Message {
    pub fn new(id: MessageId, content: Content) -> Self {
        Self { id, content }
    }
}
