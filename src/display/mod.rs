//! Plain-text rendering for the command-line host
//!
//! Renderers only read state produced by the services; they never fetch.

pub mod contest;
pub mod leaderboard;
pub mod submission;

pub use contest::{code_template, render_contest, render_problem};
pub use leaderboard::render_leaderboard;
pub use submission::{render_submission, render_tracker_phase, status_label};
