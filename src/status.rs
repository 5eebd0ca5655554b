use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lifecycle stage of a task.
///
/// The backend speaks human-readable labels ("To Do", "In Progress", "Done"),
/// the board speaks short keys ("todo", "inprogress", "done"). Both directions
/// are total: anything unrecognised lands in [`Status::Todo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn from_backend_label(label: &str) -> Self {
        match label {
            "To Do" => Status::Todo,
            "In Progress" => Status::InProgress,
            "Done" => Status::Done,
            other => {
                warn!(label = other, "unknown backend status, defaulting to 'To Do'");
                Status::Todo
            }
        }
    }

    pub fn from_internal_key(key: &str) -> Self {
        match key {
            "todo" => Status::Todo,
            "inprogress" => Status::InProgress,
            "done" => Status::Done,
            other => {
                warn!(key = other, "unknown status key, defaulting to 'todo'");
                Status::Todo
            }
        }
    }

    pub fn backend_label(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn internal_key(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "inprogress",
            Status::Done => "done",
        }
    }

    /// The only stage a card in this stage may be advanced to.
    pub fn next(self) -> Option<Status> {
        match self {
            Status::Todo => Some(Status::InProgress),
            Status::InProgress => Some(Status::Done),
            Status::Done => None,
        }
    }

    /// Column position on the board, left to right.
    pub fn index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Status::Todo => "No tasks yet",
            Status::InProgress => "No tasks in progress",
            Status::Done => "No completed tasks",
        }
    }
}

impl From<serde_json::Value> for Status {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(label) => Status::from_backend_label(&label),
            other => {
                warn!(value = %other, "non-string backend status, defaulting to 'To Do'");
                Status::Todo
            }
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.backend_label().to_string()
    }
}

/// String-level codec between the two status vocabularies.
pub mod codec {
    use super::Status;

    pub fn to_internal(backend_label: &str) -> &'static str {
        Status::from_backend_label(backend_label).internal_key()
    }

    pub fn to_backend(internal_key: &str) -> &'static str {
        Status::from_internal_key(internal_key).backend_label()
    }
}
