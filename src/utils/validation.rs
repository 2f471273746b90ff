//! Input validation utilities

use crate::constants::{
    MAX_CONTEST_ID_LENGTH, MAX_SOURCE_CODE_SIZE, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH,
};

/// Validate username format
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err("Username is required");
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err("Username must be at most 50 characters");
    }
    if username.chars().any(|c| c.is_control()) {
        return Err("Username cannot contain control characters");
    }
    Ok(())
}

/// Validate a human-chosen contest identifier
pub fn validate_contest_id(contest_id: &str) -> Result<(), &'static str> {
    let contest_id = contest_id.trim();
    if contest_id.is_empty() {
        return Err("Contest ID is required");
    }
    if contest_id.len() > MAX_CONTEST_ID_LENGTH {
        return Err("Contest ID must be at most 64 characters");
    }
    if contest_id.contains('/') || contest_id.chars().any(|c| c.is_control()) {
        return Err("Contest ID contains invalid characters");
    }
    Ok(())
}

/// Validate source code size
pub fn validate_source_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Source code cannot be empty");
    }
    if code.len() > MAX_SOURCE_CODE_SIZE {
        return Err("Source code exceeds maximum size of 64KB");
    }
    Ok(())
}
