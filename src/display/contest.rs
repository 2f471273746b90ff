//! Contest and problem rendering

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::constants::{DEFAULT_CODE_TEMPLATE, SUBMISSION_LANGUAGE};
use crate::models::{Contest, ContestPhase, Problem};
use crate::utils::format_duration;
use crate::utils::time::format_datetime;

/// One-line phase summary, e.g. `Ongoing, ends in 1h 30m`
pub fn phase_line(contest: &Contest, now: NaiveDateTime) -> String {
    let remaining = contest.time_remaining(now).map(format_duration);
    match (contest.phase(now), remaining) {
        (ContestPhase::Upcoming, Some(left)) => format!("Upcoming, starts in {left}"),
        (ContestPhase::Ongoing, Some(left)) => format!("Ongoing, ends in {left}"),
        (ContestPhase::Upcoming, None) => "Upcoming".to_string(),
        (ContestPhase::Ongoing, None) => "Ongoing".to_string(),
        (ContestPhase::Ended, _) => "Ended".to_string(),
    }
}

/// Render the contest header and its problem list
pub fn render_contest(contest: &Contest, now: NaiveDateTime) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", contest.name, contest.contest_id);
    if !contest.description.trim().is_empty() {
        let _ = writeln!(out, "{}", contest.description.trim());
    }
    let _ = writeln!(
        out,
        "{} to {}",
        format_datetime(&contest.start_time),
        format_datetime(&contest.end_time)
    );
    let _ = writeln!(out, "{}", phase_line(contest, now));
    let _ = writeln!(out);

    if contest.problems.is_empty() {
        let _ = writeln!(out, "No problems published yet");
        return out;
    }

    let _ = writeln!(out, "Problems:");
    for problem in &contest.problems {
        let _ = writeln!(
            out,
            "  [{}] {} ({}s, {} MB)",
            problem.id, problem.title, problem.time_limit, problem.memory_limit
        );
    }

    out
}

/// Render a full problem statement
pub fn render_problem(problem: &Problem) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", problem.title);
    let _ = writeln!(out, "{}", "=".repeat(problem.title.chars().count()));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", problem.description.trim_end());

    for (heading, body) in [
        ("Sample Input", &problem.sample_input),
        ("Sample Output", &problem.sample_output),
    ] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{heading}:");
        for line in body.trim_end().lines() {
            let _ = writeln!(out, "    {line}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Time Limit: {} seconds", problem.time_limit);
    let _ = writeln!(out, "Memory Limit: {} MB", problem.memory_limit);
    let _ = writeln!(out, "Language: {SUBMISSION_LANGUAGE}");

    out
}

/// Starter solution offered before the participant writes any code
pub fn code_template() -> &'static str {
    DEFAULT_CODE_TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime;

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn contest() -> Contest {
        Contest {
            id: 1,
            contest_id: "CONTEST001".to_string(),
            name: "Sample Programming Contest".to_string(),
            description: "Warm-up round".to_string(),
            start_time: at("2024-01-15T10:00:00"),
            end_time: at("2024-01-15T12:00:00"),
            problems: vec![Problem {
                id: 1,
                title: "Sum of Two Numbers".to_string(),
                description: "Read two integers and print their sum.".to_string(),
                sample_input: "3 5\n".to_string(),
                sample_output: "8\n".to_string(),
                time_limit: 2,
                memory_limit: 256,
            }],
        }
    }

    #[test]
    fn test_phase_line() {
        let contest = contest();
        assert_eq!(
            phase_line(&contest, at("2024-01-15T09:00:00")),
            "Upcoming, starts in 1h"
        );
        assert_eq!(
            phase_line(&contest, at("2024-01-15T10:30:00")),
            "Ongoing, ends in 1h 30m"
        );
        assert_eq!(phase_line(&contest, at("2024-01-15T13:00:00")), "Ended");
    }

    #[test]
    fn test_render_contest_lists_problems() {
        let header = render_contest(&contest(), at("2024-01-15T10:30:00"));
        assert!(header.starts_with("Sample Programming Contest (CONTEST001)"));
        assert!(header.contains("[1] Sum of Two Numbers (2s, 256 MB)"));
    }

    #[test]
    fn test_render_problem() {
        let contest = contest();
        let statement = render_problem(contest.problem(1).unwrap());

        assert!(statement.contains("Sample Input:\n    3 5\n"));
        assert!(statement.contains("Sample Output:\n    8\n"));
        assert!(statement.contains("Time Limit: 2 seconds"));
        assert!(statement.contains("Memory Limit: 256 MB"));
    }

    #[test]
    fn test_code_template_is_java_main() {
        assert!(code_template().contains("public class Main"));
        assert!(code_template().contains("Scanner"));
    }
}
