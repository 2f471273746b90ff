//! Contest and problem models

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ProblemId;
use crate::utils::time::{self, backend_datetime};

/// Contest as returned by `GET /api/contests/{contestId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i64,
    /// Human-chosen identifier (e.g. `CONTEST001`)
    pub contest_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(with = "backend_datetime")]
    pub start_time: NaiveDateTime,
    #[serde(with = "backend_datetime")]
    pub end_time: NaiveDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub problems: Vec<Problem>,
}

/// Contest problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sample_input: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sample_output: String,
    /// Time limit in seconds
    pub time_limit: i32,
    /// Memory limit in megabytes
    pub memory_limit: i32,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a contest stands relative to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestPhase {
    Upcoming,
    Ongoing,
    Ended,
}

impl ContestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
        }
    }
}

impl std::fmt::Display for ContestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Contest {
    /// Phase of the contest at `now`
    pub fn phase(&self, now: NaiveDateTime) -> ContestPhase {
        if now < self.start_time {
            ContestPhase::Upcoming
        } else if time::is_between(self.start_time, self.end_time, now) {
            ContestPhase::Ongoing
        } else {
            ContestPhase::Ended
        }
    }

    /// Time left until the next boundary (start if upcoming, end if ongoing)
    pub fn time_remaining(&self, now: NaiveDateTime) -> Option<Duration> {
        match self.phase(now) {
            ContestPhase::Upcoming => time::time_until(self.start_time, now),
            ContestPhase::Ongoing => time::time_until(self.end_time, now),
            ContestPhase::Ended => None,
        }
    }

    /// Find a problem of this contest by id
    pub fn problem(&self, id: ProblemId) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }
}
