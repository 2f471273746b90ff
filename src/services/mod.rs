//! Business logic services
//!
//! This module contains the client-side components that drive the
//! contest backend: joining contests, tracking submissions and
//! refreshing leaderboards.

pub mod contest_service;
pub mod leaderboard_refresher;
pub mod submission_tracker;

pub use contest_service::ContestService;
pub use leaderboard_refresher::{LeaderboardRefresher, LeaderboardSnapshot, RefresherHandle};
pub use submission_tracker::{
    PollPolicy, SubmissionHandle, SubmissionTracker, TrackerFailure, TrackerPhase,
    TrackerSnapshot,
};
