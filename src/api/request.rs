//! Request DTOs sent to the contest backend

use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::ProblemId;
use crate::utils::validation;

/// Create submission request (`POST /api/submissions`)
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    /// Participant submitting the code
    #[validate(custom(function = "not_blank_username"))]
    pub username: String,

    /// Problem being attempted
    #[validate(range(min = 1, message = "Problem ID is required"))]
    pub problem_id: ProblemId,

    /// Source code, sent verbatim
    #[validate(custom(function = "source_code"))]
    pub code: String,
}

impl CreateSubmissionRequest {
    pub fn new(problem_id: ProblemId, username: &str, code: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            problem_id,
            code: code.to_string(),
        }
    }
}

fn not_blank_username(username: &str) -> Result<(), ValidationError> {
    validation::validate_username(username).map_err(|msg| error("username", msg))
}

fn source_code(code: &str) -> Result<(), ValidationError> {
    validation::validate_source_code(code).map_err(|msg| error("code", msg))
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
