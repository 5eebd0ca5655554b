use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    status::Status,
    task::{NewTask, Task},
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response: connection refused, DNS, timeout.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("server rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

/// Backend task store. Every call is a single attempt.
#[async_trait]
pub trait TaskApi {
    async fn health(&self) -> Result<String, ApiError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError>;
    async fn delete_task(&self, id: u64) -> Result<(), ApiError>;
    async fn update_status(&self, id: u64, status: Status) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct HealthResponse {
    message: String,
}

pub struct HttpTaskApi {
    http: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: u64) -> String {
        format!("{}/tasks/{id}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn health(&self) -> Result<String, ApiError> {
        let response = Self::send(self.http.get(format!("{}/", self.base_url))).await?;
        let body: HealthResponse = serde_json::from_str(&response.text().await?)?;
        Ok(body.message)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = Self::send(self.http.get(self.tasks_url())).await?;
        let raw = response.text().await?;
        debug!(bytes = raw.len(), "received task list");
        Ok(serde_json::from_str(&raw)?)
    }

    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        Self::send(self.http.post(self.tasks_url()).json(task)).await?;
        Ok(())
    }

    async fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        Self::send(self.http.delete(self.task_url(id))).await?;
        Ok(())
    }

    async fn update_status(&self, id: u64, status: Status) -> Result<(), ApiError> {
        let url = format!("{}/status", self.task_url(id));
        Self::send(
            self.http
                .patch(url)
                .query(&[("status", status.backend_label())]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
