use serde::{Deserialize, Serialize};

use crate::models::TaskId;

#[derive(Debug, Serialize)]
pub struct CreateTaskRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RenameTaskRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CompleteRequest {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct FootnoteRequest {
    pub date: String,
    pub footnote: String,
}

#[derive(Debug, Serialize)]
pub struct ReorderRequest {
    #[serde(rename = "taskIds")]
    pub task_ids: Vec<TaskId>,
}

/// Body of every non-2xx response. `error` may be absent when the failure
/// did not come from the application layer.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Acknowledgment body for mutations that return no entity.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
