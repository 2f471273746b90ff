//! Utility functions

pub mod time;
pub mod validation;

pub use time::{format_duration, now_local, now_utc, parse_datetime};
pub use validation::{validate_contest_id, validate_source_code, validate_username};
