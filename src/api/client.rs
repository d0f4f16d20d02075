//! HTTP client for the challenge service.
//!
//! Exactly one round-trip per operation: no automatic retry, callers see
//! failures immediately. The upstream service computes solutions inline, so
//! no request timeout is configured either; a slow remote call blocks only
//! the operation that issued it. The client is cheap to clone and is handed
//! to spawned tasks that report completions back over the event channel.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::api::error::{self, ApiError};
use crate::api::types::{
    CustomTaskRequest, Solution, Task, TaskId, UserInfo, VerificationResult, VerifyRequest,
};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Cookie store carries the Django session cookie across calls.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ApiError> {
        let response = response.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(error::from_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Network(format!("Malformed response: {}", e)))
    }

    /// GET /api/generate/: a new random task.
    pub async fn generate(&self) -> Result<Task, ApiError> {
        Self::read(self.http.get(self.url("/api/generate/")).send().await).await
    }

    /// POST /api/create_custom/: author a task from coerced form values.
    pub async fn create_custom(&self, request: &CustomTaskRequest) -> Result<Task, ApiError> {
        Self::read(
            self.http
                .post(self.url("/api/create_custom/"))
                .json(request)
                .send()
                .await,
        )
        .await
    }

    /// GET /api/task/{id}/solution/: computed solution and derivation.
    pub async fn solution(&self, task_id: TaskId) -> Result<Solution, ApiError> {
        Self::read(
            self.http
                .get(self.url(&format!("/api/task/{}/solution/", task_id)))
                .send()
                .await,
        )
        .await
    }

    /// POST /api/verify/: compare a submitted integer to the ground truth.
    pub async fn verify(
        &self,
        task_id: TaskId,
        solution: i64,
    ) -> Result<VerificationResult, ApiError> {
        Self::read(
            self.http
                .post(self.url("/api/verify/"))
                .json(&VerifyRequest { task_id, solution })
                .send()
                .await,
        )
        .await
    }

    /// GET /api/user/: consulted only as an "is authenticated" probe.
    pub async fn user(&self) -> Result<UserInfo, ApiError> {
        Self::read(self.http.get(self.url("/api/user/")).send().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/generate/"), "http://localhost:8000/api/generate/");
    }
}
