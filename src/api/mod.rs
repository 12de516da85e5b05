pub mod dto;
pub mod memory;

use std::env;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use tracing::warn;

use crate::error::AppError;
use crate::models::{DailyStars, RollingAverage, Task, TaskId, WeeklyBreakdown};

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("DAILYLOG_URL")
            .map_err(|_| AppError::Config("DAILYLOG_URL is not set".to_string()))?;
        Ok(Self::new(base_url))
    }
}

/// One method per capability of the remote task service. No retries, no
/// caching; server error messages pass through to the caller verbatim.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, AppError>;
    async fn create_task(&self, name: &str) -> Result<Task, AppError>;
    async fn rename_task(&self, id: TaskId, name: &str) -> Result<Task, AppError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), AppError>;
    async fn complete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError>;
    async fn uncomplete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError>;
    async fn set_footnote(
        &self,
        id: TaskId,
        date: NaiveDate,
        footnote: &str,
    ) -> Result<(), AppError>;
    async fn reorder_tasks(&self, ids: &[TaskId]) -> Result<(), AppError>;
    async fn daily_star_counts(&self, days: u32) -> Result<Vec<DailyStars>, AppError>;
    async fn weekly_breakdown(&self, date: Option<NaiveDate>)
    -> Result<WeeklyBreakdown, AppError>;
    async fn rolling_average(
        &self,
        date: Option<NaiveDate>,
        days: u32,
    ) -> Result<RollingAverage, AppError>;
}

pub struct HttpTaskService {
    client: Client,
    config: ApiConfig,
}

impl HttpTaskService {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Non-2xx responses carry `{"error": "..."}`; surface that text as-is,
    /// or a generic message when the body has no error field.
    async fn expect_success(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<dto::ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        warn!("api error {}: {}", status, message);
        Err(AppError::Service { message })
    }
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, AppError> {
        let mut request = self.client.get(self.url("/api/tasks"));
        if let Some(date) = date {
            request = request.query(&[("date", date_param(date))]);
        }
        let response = Self::expect_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create_task(&self, name: &str) -> Result<Task, AppError> {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(&dto::CreateTaskRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn rename_task(&self, id: TaskId, name: &str) -> Result<Task, AppError> {
        let response = self
            .client
            .put(self.url(&format!("/api/tasks/{}", id)))
            .json(&dto::RenameTaskRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn complete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tasks/{}/complete", id)))
            .json(&dto::CompleteRequest {
                date: date_param(date),
            })
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn uncomplete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{}/complete", id)))
            .query(&[("date", date_param(date))])
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn set_footnote(
        &self,
        id: TaskId,
        date: NaiveDate,
        footnote: &str,
    ) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tasks/{}/footnote", id)))
            .json(&dto::FootnoteRequest {
                date: date_param(date),
                footnote: footnote.to_string(),
            })
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn reorder_tasks(&self, ids: &[TaskId]) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url("/api/tasks/reorder"))
            .json(&dto::ReorderRequest {
                task_ids: ids.to_vec(),
            })
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn daily_star_counts(&self, days: u32) -> Result<Vec<DailyStars>, AppError> {
        let response = self
            .client
            .get(self.url("/api/stats/daily"))
            .query(&[("days", days)])
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn weekly_breakdown(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<WeeklyBreakdown, AppError> {
        let mut request = self.client.get(self.url("/api/stats/weekly"));
        if let Some(date) = date {
            request = request.query(&[("date", date_param(date))]);
        }
        let response = Self::expect_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn rolling_average(
        &self,
        date: Option<NaiveDate>,
        days: u32,
    ) -> Result<RollingAverage, AppError> {
        let mut request = self
            .client
            .get(self.url("/api/stats/average"))
            .query(&[("days", days)]);
        if let Some(date) = date {
            request = request.query(&[("date", date_param(date))]);
        }
        let response = Self::expect_success(request.send().await?).await?;
        Ok(response.json().await?)
    }
}
