//! Contest backend API
//!
//! [`ContestApi`] is the seam between the client components and the
//! backend's HTTP/JSON contract. [`HttpContestApi`] talks to a real
//! backend; tests substitute a mock.

pub mod http;
pub mod logging;
pub mod request;
pub mod response;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Contest, LeaderboardEntry, Submission};

pub use http::HttpContestApi;
pub use request::CreateSubmissionRequest;
pub use response::CreateSubmissionResponse;

/// Operations the client needs from the contest backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContestApi: Send + Sync {
    /// `GET /api/contests/{contestId}`
    async fn get_contest(&self, contest_id: &str) -> AppResult<Contest>;

    /// `GET /api/contests/{contestId}/leaderboard`
    async fn get_leaderboard(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>>;

    /// `POST /api/submissions`
    async fn create_submission(
        &self,
        request: &CreateSubmissionRequest,
    ) -> AppResult<CreateSubmissionResponse>;

    /// `GET /api/submissions/{submissionId}`
    async fn get_submission(&self, submission_id: &str) -> AppResult<Submission>;
}
