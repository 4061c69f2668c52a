//! JSON bodies and paths of the API → worker boundary.

use serde::{Deserialize, Serialize};

use courier_core::{JobId, MessageId};

pub const CREATE_PATH: &str = "/create_message";
pub const UPDATE_ROUTE: &str = "/update_message/:id";
pub const DELETE_ROUTE: &str = "/delete_message/:id";

pub fn update_path(id: MessageId) -> String {
    format!("/update_message/{id}")
}

pub fn delete_path(id: MessageId) -> String {
    format!("/delete_message/{id}")
}

/// Body of create/update calls. `content` stays optional so the worker can
/// report a missing field itself; `job_id` is absent for direct callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

/// Delete confirmation: `{"status": "deleted", "id": <id>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub status: String,
    pub id: MessageId,
}

impl Deleted {
    pub fn new(id: MessageId) -> Self {
        Self {
            status: "deleted".to_string(),
            id,
        }
    }
}
