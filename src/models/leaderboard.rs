//! Leaderboard model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::time::backend_datetime;

/// One ranked participant row of `GET /api/contests/{id}/leaderboard`.
///
/// Rank is computed by the backend and never recomputed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub problems_solved: u32,
    pub total_submissions: u32,
    #[serde(default, with = "backend_datetime::option")]
    pub last_submission_time: Option<NaiveDateTime>,
    pub rank: u32,
}
