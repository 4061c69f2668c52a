//! Write intents: what a job asks the worker to do.

use serde::{Deserialize, Serialize};

use crate::id::MessageId;
use crate::message::Content;

/// Kind of mutation carried by a job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated write accepted from a client, addressed by value to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteIntent {
    Create { content: Content },
    Update { id: MessageId, content: Content },
    Delete { id: MessageId },
}

impl WriteIntent {
    pub fn operation(&self) -> Operation {
        match self {
            WriteIntent::Create { .. } => Operation::Create,
            WriteIntent::Update { .. } => Operation::Update,
            WriteIntent::Delete { .. } => Operation::Delete,
        }
    }

    /// Target message, if the intent addresses an existing one.
    pub fn target(&self) -> Option<MessageId> {
        match self {
            WriteIntent::Create { .. } => None,
            WriteIntent::Update { id, .. } | WriteIntent::Delete { id } => Some(*id),
        }
    }

    pub fn content(&self) -> Option<&Content> {
        match self {
            WriteIntent::Create { content } | WriteIntent::Update { content, .. } => Some(content),
            WriteIntent::Delete { .. } => None,
        }
    }
}
