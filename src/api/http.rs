//! reqwest-backed implementation of [`ContestApi`]

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::logging::{log_failure, log_response};
use crate::api::request::CreateSubmissionRequest;
use crate::api::response::{BackendErrorBody, CreateSubmissionResponse};
use crate::api::ContestApi;
use crate::config::ApiConfig;
use crate::constants::paths;
use crate::error::{AppError, AppResult};
use crate::models::{Contest, LeaderboardEntry, Submission};

/// HTTP client for the contest backend
#[derive(Debug, Clone)]
pub struct HttpContestApi {
    client: Client,
    base_url: Url,
}

impl HttpContestApi {
    /// Build a client from configuration
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Configuration(format!("invalid API URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "API URL cannot be used as a base: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Resolve `/api/<segments...>` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(paths::API)
            .extend(segments);
        Ok(url)
    }

    /// Send a request and log its outcome
    async fn send(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> AppResult<Response> {
        let path = url.path().to_string();
        let start = Instant::now();

        match build(self.client.request(method.clone(), url)).send().await {
            Ok(response) => {
                log_response(&method, &path, response.status(), start.elapsed());
                Ok(response)
            }
            Err(err) => {
                let err = AppError::from(err);
                log_failure(&method, &path, &err, start.elapsed());
                Err(err)
            }
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        Ok(response.json::<T>().await?)
    }
}

/// Pull the backend's `{"error": "..."}` message out of a rejected response
async fn backend_error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<BackendErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
}

#[async_trait]
impl ContestApi for HttpContestApi {
    async fn get_contest(&self, contest_id: &str) -> AppResult<Contest> {
        let url = self.endpoint(&[paths::CONTESTS, contest_id])?;
        let response = self.send(Method::GET, url, |r| r).await?;

        if !response.status().is_success() {
            return Err(AppError::NotFound(format!(
                "Contest not found with ID: {contest_id}"
            )));
        }

        Self::json(response).await
    }

    async fn get_leaderboard(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>> {
        let url = self.endpoint(&[paths::CONTESTS, contest_id, paths::LEADERBOARD])?;
        let response = self.send(Method::GET, url, |r| r).await?;

        match response.status() {
            status if status.is_success() => Self::json(response).await,
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!(
                "Contest not found with ID: {contest_id}"
            ))),
            status => Err(AppError::TransientFetch(format!(
                "Failed to fetch leaderboard (status {})",
                status.as_u16()
            ))),
        }
    }

    async fn create_submission(
        &self,
        request: &CreateSubmissionRequest,
    ) -> AppResult<CreateSubmissionResponse> {
        let url = self.endpoint(&[paths::SUBMISSIONS])?;
        let response = self.send(Method::POST, url, |r| r.json(request)).await?;

        let status = response.status();
        if !status.is_success() {
            let message = backend_error_message(response)
                .await
                .unwrap_or_else(|| format!("Failed to submit code (status {})", status.as_u16()));
            return Err(AppError::TransientFetch(message));
        }

        Self::json(response).await
    }

    async fn get_submission(&self, submission_id: &str) -> AppResult<Submission> {
        let url = self.endpoint(&[paths::SUBMISSIONS, submission_id])?;
        let response = self.send(Method::GET, url, |r| r).await?;

        match response.status() {
            status if status.is_success() => Self::json(response).await,
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!(
                "Submission not found with ID: {submission_id}"
            ))),
            status => Err(AppError::TransientFetch(format!(
                "Failed to fetch submission status (status {})",
                status.as_u16()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn api(base_url: &str) -> HttpContestApi {
        HttpContestApi::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let api = api("http://localhost:8080");
        let url = api.endpoint(&[paths::CONTESTS, "CONTEST001", paths::LEADERBOARD]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/contests/CONTEST001/leaderboard");
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let api = api("http://proxy.local/judge/");
        let url = api.endpoint(&[paths::SUBMISSIONS]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/judge/api/submissions");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = api("http://localhost:8080");
        let url = api.endpoint(&[paths::CONTESTS, "weekly 1?x"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/contests/weekly%201%3Fx");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = HttpContestApi::new(&ApiConfig {
            base_url: "mailto:judge@example.com".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
