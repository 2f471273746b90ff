//! Leaderboard rendering

use std::fmt::Write;
use std::time::Duration;

use crate::models::LeaderboardEntry;
use crate::services::LeaderboardSnapshot;
use crate::utils::time::format_datetime;

/// Medal for the podium, `#n` for everyone else
pub fn rank_mark(rank: u32) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{n}"),
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Render one standings row
pub fn render_entry(entry: &LeaderboardEntry) -> String {
    let mut row = format!(
        "{:>4}  {:<24} {} solved, {}",
        rank_mark(entry.rank),
        entry.username,
        plural(entry.problems_solved, "problem"),
        plural(entry.total_submissions, "submission"),
    );
    if let Some(last) = &entry.last_submission_time {
        let _ = write!(row, ", last at {}", format_datetime(last));
    }
    row
}

/// Render the standings panel
pub fn render_leaderboard(snapshot: &LeaderboardSnapshot, period: Duration) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Leaderboard (Updates every {}s)", period.as_secs());

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! Failed to load leaderboard: {error}");
        if !snapshot.entries.is_empty() {
            let _ = writeln!(out, "! Showing last known standings");
        }
        let _ = writeln!(out, "! Try again to refresh");
    }

    if snapshot.entries.is_empty() {
        let message = if snapshot.loading {
            "Loading leaderboard..."
        } else if snapshot.error.is_some() {
            "No standings available"
        } else {
            "No submissions yet"
        };
        let _ = writeln!(out, "{message}");
        return out;
    }

    for entry in &snapshot.entries {
        let _ = writeln!(out, "{}", render_entry(entry));
    }

    out
}
