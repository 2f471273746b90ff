//! Domain models mirroring the backend's JSON contract

pub mod contest;
pub mod leaderboard;
pub mod submission;

pub use contest::{Contest, ContestPhase, Problem};
pub use leaderboard::LeaderboardEntry;
pub use submission::{Submission, SubmissionMetrics, SubmissionStatus, Verdict};

/// Numeric problem id assigned by the backend
pub type ProblemId = i64;

/// Opaque submission id assigned by the backend on creation
pub type SubmissionId = String;
