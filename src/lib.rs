//! Contest Client - command-line participant client for a coding-contest backend
//!
//! This library provides the client side of the contest platform: joining a
//! contest, reading problems, submitting solutions and following the
//! standings. Grading, ranking and persistence live in the backend, which is
//! reached over its HTTP/JSON API.
//!
//! # Features
//!
//! - Submission tracking from creation to verdict with bounded polling
//! - Periodic leaderboard refresh that keeps stale standings on failure
//! - File-backed participant session gating contest access
//! - Plain-text rendering of contests, problems, verdicts and standings
//!
//! # Architecture
//!
//! The crate follows a layered architecture:
//! - **API**: backend HTTP client behind the [`api::ContestApi`] trait
//! - **Services**: submission tracker, leaderboard refresher, contest join
//! - **Display**: text rendering of service state
//! - **Models**: domain models mirroring the backend contract

pub mod api;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
