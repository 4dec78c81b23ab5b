//! HTTP client for the time-record and task endpoints of the life API

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::recorder::{
    NewTimeRecord, RecordError, TaskDirectory, TaskSummary, TimeRecord, TimeRecordApi,
};

/// REST client used for creating time records and listing tasks
#[derive(Debug, Clone)]
pub struct LifeApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl LifeApiClient {
    /// Every request, including reading the body, is bounded by `timeout`
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RecordError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, RecordError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RecordError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn create_time_record(&self, record: &NewTimeRecord) -> Result<TimeRecord, RecordError> {
        let url = self.url("time-records/");
        debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .json(record)
            .send()
            .await?;
        let response = Self::check(response).await?;

        // The body is informational only; an empty or odd body still counts as created
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    pub async fn tasks(&self) -> Result<Vec<TaskSummary>, RecordError> {
        let url = self.url("tasks/");
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

impl TimeRecordApi for LifeApiClient {
    fn create<'a>(
        &'a self,
        record: &'a NewTimeRecord,
    ) -> BoxFuture<'a, Result<TimeRecord, RecordError>> {
        Box::pin(self.create_time_record(record))
    }
}

impl TaskDirectory for LifeApiClient {
    fn list_tasks(&self) -> BoxFuture<'_, Result<Vec<TaskSummary>, RecordError>> {
        Box::pin(self.tasks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client =
            LifeApiClient::new("http://localhost:8000/api/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("time-records/"), "http://localhost:8000/api/time-records/");
        assert_eq!(client.url("/tasks/"), "http://localhost:8000/api/tasks/");
    }
}
