//! Submission model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{statuses, verdicts};
use crate::models::SubmissionId;
use crate::utils::time::backend_datetime;

/// Submission snapshot as returned by `GET /api/submissions/{id}`.
///
/// A snapshot is always replaced as a whole by the next poll response;
/// fields are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: SubmissionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub result: Option<Verdict>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Execution time in milliseconds
    #[serde(default)]
    pub execution_time: Option<i64>,
    /// Memory used in megabytes
    #[serde(default)]
    pub memory_used: Option<i64>,
    #[serde(with = "backend_datetime")]
    pub submitted_at: NaiveDateTime,
    pub username: String,
    pub problem_title: String,
}

/// Grading outcome, only available once a submission is completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMetrics<'a> {
    pub verdict: Option<&'a Verdict>,
    pub execution_time_ms: Option<i64>,
    pub memory_used_mb: Option<i64>,
}

impl Submission {
    /// Check if polling can stop for this snapshot
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Verdict and resource usage, hidden until the submission is completed.
    ///
    /// A backend that reports a result early does not leak it through here.
    pub fn metrics(&self) -> Option<SubmissionMetrics<'_>> {
        if !self.is_terminal() {
            return None;
        }

        Some(SubmissionMetrics {
            verdict: self.result.as_ref(),
            execution_time_ms: self.execution_time,
            memory_used_mb: self.memory_used,
        })
    }

    /// Check if the submission finished with an accepted verdict
    pub fn is_accepted(&self) -> bool {
        self.metrics()
            .and_then(|m| m.verdict)
            .map(Verdict::is_accepted)
            .unwrap_or(false)
    }
}

/// Submission lifecycle stage.
///
/// Unrecognized values are kept verbatim and treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubmissionStatus {
    Pending,
    Running,
    Completed,
    Unknown(String),
}

impl SubmissionStatus {
    /// Get status as the wire string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => statuses::PENDING,
            Self::Running => statuses::RUNNING,
            Self::Completed => statuses::COMPLETED,
            Self::Unknown(raw) => raw,
        }
    }

    /// Only `COMPLETED` ends polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<String> for SubmissionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            statuses::PENDING => Self::Pending,
            statuses::RUNNING => Self::Running,
            statuses::COMPLETED => Self::Completed,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<SubmissionStatus> for String {
    fn from(status: SubmissionStatus) -> Self {
        match status {
            SubmissionStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Submission verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompilationError,
    Unknown(String),
}

impl Verdict {
    /// Get verdict as the wire string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => verdicts::ACCEPTED,
            Self::WrongAnswer => verdicts::WRONG_ANSWER,
            Self::TimeLimitExceeded => verdicts::TIME_LIMIT_EXCEEDED,
            Self::MemoryLimitExceeded => verdicts::MEMORY_LIMIT_EXCEEDED,
            Self::RuntimeError => verdicts::RUNTIME_ERROR,
            Self::CompilationError => verdicts::COMPILATION_ERROR,
            Self::Unknown(raw) => raw,
        }
    }

    /// Check if this verdict means the solution was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl From<String> for Verdict {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            verdicts::ACCEPTED => Self::Accepted,
            verdicts::WRONG_ANSWER => Self::WrongAnswer,
            verdicts::TIME_LIMIT_EXCEEDED => Self::TimeLimitExceeded,
            verdicts::MEMORY_LIMIT_EXCEEDED => Self::MemoryLimitExceeded,
            verdicts::RUNTIME_ERROR => Self::RuntimeError,
            verdicts::COMPILATION_ERROR => Self::CompilationError,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Submission {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserialize_pending() {
        let submission = snapshot(json!({
            "submissionId": "S1",
            "code": "class Main {}",
            "status": "PENDING",
            "result": null,
            "errorMessage": null,
            "executionTime": null,
            "memoryUsed": null,
            "submittedAt": "2024-01-15T12:00:00",
            "username": "alice",
            "problemTitle": "Sum of Two Numbers"
        }));

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert!(!submission.is_terminal());
        assert!(submission.metrics().is_none());
    }

    #[test]
    fn test_deserialize_completed() {
        let submission = snapshot(json!({
            "submissionId": "S1",
            "status": "COMPLETED",
            "result": "ACCEPTED",
            "executionTime": 120,
            "memoryUsed": 32,
            "submittedAt": "2024-01-15T12:00:00.123",
            "username": "alice",
            "problemTitle": "Sum of Two Numbers"
        }));

        let metrics = submission.metrics().unwrap();
        assert_eq!(metrics.verdict, Some(&Verdict::Accepted));
        assert_eq!(metrics.execution_time_ms, Some(120));
        assert_eq!(metrics.memory_used_mb, Some(32));
        assert!(submission.is_accepted());
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let submission = snapshot(json!({
            "submissionId": "S1",
            "status": "QUEUED",
            "result": "ACCEPTED",
            "executionTime": 5,
            "submittedAt": "2024-01-15T12:00:00",
            "username": "alice",
            "problemTitle": "P"
        }));

        assert_eq!(
            submission.status,
            SubmissionStatus::Unknown("QUEUED".to_string())
        );
        assert!(!submission.is_terminal());
        // Result reported early must stay hidden
        assert!(submission.metrics().is_none());
        assert!(!submission.is_accepted());
    }

    #[test]
    fn test_verdict_wire_strings() {
        let verdict: Verdict = serde_json::from_value(json!("TIME_LIMIT_EXCEEDED")).unwrap();
        assert_eq!(verdict, Verdict::TimeLimitExceeded);
        assert_eq!(serde_json::to_value(&verdict).unwrap(), json!("TIME_LIMIT_EXCEEDED"));

        let odd: Verdict = serde_json::from_value(json!("PRESENTATION_ERROR")).unwrap();
        assert_eq!(odd.as_str(), "PRESENTATION_ERROR");
        assert!(!odd.is_accepted());
    }
}
