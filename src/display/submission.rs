//! Submission rendering

use std::fmt::Write;

use crate::models::{Submission, SubmissionStatus, Verdict};
use crate::services::TrackerPhase;
use crate::utils::time::format_datetime;

/// Human label for a verdict
pub fn verdict_label(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Accepted => "Accepted",
        Verdict::WrongAnswer => "Wrong Answer",
        Verdict::TimeLimitExceeded => "Time Limit Exceeded",
        Verdict::MemoryLimitExceeded => "Memory Limit Exceeded",
        Verdict::RuntimeError => "Runtime Error",
        Verdict::CompilationError => "Compilation Error",
        Verdict::Unknown(_) => "Unknown",
    }
}

/// Human label for the state of a submission.
///
/// The verdict only shows once the submission is completed.
pub fn status_label(submission: &Submission) -> &'static str {
    match &submission.status {
        SubmissionStatus::Pending => "Pending",
        SubmissionStatus::Running => "Running",
        SubmissionStatus::Completed => submission
            .metrics()
            .and_then(|m| m.verdict)
            .map(verdict_label)
            .unwrap_or("Unknown"),
        SubmissionStatus::Unknown(_) => "Unknown",
    }
}

/// Render a submission card
pub fn render_submission(submission: &Submission) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Submission {}", submission.submission_id);
    let _ = writeln!(out, "  Status:    {}", status_label(submission));
    let _ = writeln!(out, "  Problem:   {}", submission.problem_title);
    let _ = writeln!(out, "  User:      {}", submission.username);
    let _ = writeln!(out, "  Submitted: {}", format_datetime(&submission.submitted_at));

    if let Some(metrics) = submission.metrics() {
        if let Some(ms) = metrics.execution_time_ms {
            let _ = writeln!(out, "  Time:      {ms} ms");
        }
        if let Some(mb) = metrics.memory_used_mb {
            let _ = writeln!(out, "  Memory:    {mb} MB");
        }
    }

    if let Some(details) = submission
        .error_message
        .as_deref()
        .filter(|msg| !msg.trim().is_empty())
    {
        let _ = writeln!(out, "  Details:");
        for line in details.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }

    out
}

/// Render whatever the tracker last produced
pub fn render_tracker_phase(phase: &TrackerPhase) -> String {
    match phase {
        TrackerPhase::Idle => "No submission yet\n".to_string(),
        TrackerPhase::Creating => "Submitting...\n".to_string(),
        TrackerPhase::Polling {
            latest: Some(submission),
            ..
        }
        | TrackerPhase::Done { submission, .. } => render_submission(submission),
        TrackerPhase::Polling {
            handle,
            latest: None,
        } => format!(
            "Submission {} queued, waiting for the judge...\n",
            handle.submission_id()
        ),
        TrackerPhase::Failed { error, .. } => format!("Submission failed: {}\n", error.message),
        TrackerPhase::Cancelled { .. } => "Stopped tracking the submission\n".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime;

    fn submission(status: SubmissionStatus, result: Option<Verdict>) -> Submission {
        Submission {
            submission_id: "S1".to_string(),
            code: None,
            status,
            result,
            error_message: None,
            execution_time: Some(120),
            memory_used: Some(32),
            submitted_at: parse_datetime("2024-01-15T12:00:00").unwrap(),
            username: "alice".to_string(),
            problem_title: "Sum of Two Numbers".to_string(),
        }
    }

    #[test]
    fn test_completed_shows_verdict_and_metrics() {
        let card = render_submission(&submission(
            SubmissionStatus::Completed,
            Some(Verdict::Accepted),
        ));

        assert!(card.contains("Status:    Accepted"));
        assert!(card.contains("120 ms"));
        assert!(card.contains("32 MB"));
    }

    #[test]
    fn test_metrics_hidden_until_completed() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Running,
            SubmissionStatus::Unknown("QUEUED".to_string()),
        ] {
            // The backend leaking a verdict early must not show it
            let card = render_submission(&submission(status, Some(Verdict::Accepted)));

            assert!(!card.contains("Accepted"), "{card}");
            assert!(!card.contains(" ms"), "{card}");
            assert!(!card.contains(" MB"), "{card}");
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(&submission(SubmissionStatus::Pending, None)), "Pending");
        assert_eq!(status_label(&submission(SubmissionStatus::Running, None)), "Running");
        assert_eq!(
            status_label(&submission(
                SubmissionStatus::Completed,
                Some(Verdict::TimeLimitExceeded)
            )),
            "Time Limit Exceeded"
        );
        assert_eq!(
            status_label(&submission(SubmissionStatus::Completed, None)),
            "Unknown"
        );
    }

    #[test]
    fn test_error_details_rendered() {
        let mut failed = submission(
            SubmissionStatus::Completed,
            Some(Verdict::CompilationError),
        );
        failed.error_message = Some("Main.java:3: error: ';' expected\n1 error".to_string());

        let card = render_submission(&failed);
        assert!(card.contains("Compilation Error"));
        assert!(card.contains("    Main.java:3: error: ';' expected"));
        assert!(card.contains("    1 error"));
    }
}
