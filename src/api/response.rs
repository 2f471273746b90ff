//! Response DTOs returned by the contest backend

use serde::{Deserialize, Serialize};

use crate::models::{SubmissionId, SubmissionStatus};

/// Create submission response (`{submissionId, status}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionResponse {
    pub submission_id: SubmissionId,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
}

/// Error body the backend attaches to rejected requests
#[derive(Debug, Default, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
