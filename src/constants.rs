//! Application-wide constants
//!
//! This module contains all constant values used throughout the client.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// BACKEND DEFAULTS
// =============================================================================

/// Default base URL of the contest backend
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default per-request timeout in milliseconds
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Path segments of the backend API
pub mod paths {
    /// Common prefix of every endpoint
    pub const API: &str = "api";

    /// Contest collection
    pub const CONTESTS: &str = "contests";

    /// Submission collection
    pub const SUBMISSIONS: &str = "submissions";

    /// Leaderboard suffix under a contest
    pub const LEADERBOARD: &str = "leaderboard";
}

// =============================================================================
// SUBMISSION POLLING
// =============================================================================

/// Delay before the first status poll and base delay between polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Growth factor applied to the poll delay after every non-terminal answer
pub const DEFAULT_POLL_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Upper bound for the poll delay
pub const DEFAULT_POLL_MAX_INTERVAL_MS: u64 = 10_000;

/// Hard ceiling for tracking a single submission (seconds, 0 disables)
pub const DEFAULT_POLL_MAX_DURATION_SECS: u64 = 300;

/// Maximum number of status polls (0 = unlimited)
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 0;

// =============================================================================
// LEADERBOARD
// =============================================================================

/// Leaderboard refresh period in seconds
pub const DEFAULT_LEADERBOARD_REFRESH_SECS: u64 = 30;

// =============================================================================
// SESSION
// =============================================================================

/// File the joined-contest session is persisted to
pub const DEFAULT_SESSION_FILE: &str = ".contest-session.json";

/// Session lifetime in hours (0 = never expires)
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

// =============================================================================
// SUBMISSION STATUSES
// =============================================================================

/// Lifecycle stages reported by the backend
pub mod statuses {
    pub const PENDING: &str = "PENDING";
    pub const RUNNING: &str = "RUNNING";
    pub const COMPLETED: &str = "COMPLETED";
}

/// Verdicts reported once a submission is completed
pub mod verdicts {
    pub const ACCEPTED: &str = "ACCEPTED";
    pub const WRONG_ANSWER: &str = "WRONG_ANSWER";
    pub const TIME_LIMIT_EXCEEDED: &str = "TIME_LIMIT_EXCEEDED";
    pub const MEMORY_LIMIT_EXCEEDED: &str = "MEMORY_LIMIT_EXCEEDED";
    pub const RUNTIME_ERROR: &str = "RUNTIME_ERROR";
    pub const COMPILATION_ERROR: &str = "COMPILATION_ERROR";
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Username minimum length
pub const MIN_USERNAME_LENGTH: usize = 1;

/// Username maximum length
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum contest identifier length
pub const MAX_CONTEST_ID_LENGTH: usize = 64;

/// Maximum source code size in bytes (64 KB)
pub const MAX_SOURCE_CODE_SIZE: usize = 64 * 1024;

// =============================================================================
// EDITOR
// =============================================================================

/// Language accepted by the judge
pub const SUBMISSION_LANGUAGE: &str = "Java";

/// Starter solution offered for a freshly selected problem
pub const DEFAULT_CODE_TEMPLATE: &str = r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner scanner = new Scanner(System.in);

        // Your code here

    }
}"#;

/// Contest id suggested on the join screen
pub const SAMPLE_CONTEST_ID: &str = "CONTEST001";
