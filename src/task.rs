use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Server-owned task snapshot as returned by `GET /tasks`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }
}
