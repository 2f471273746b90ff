//! Backend call logging

use std::time::Duration;

use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::error::AppError;

/// Log a completed backend round-trip
pub fn log_response(method: &Method, path: &str, status: StatusCode, duration: Duration) {
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Backend answered with server error"
        );
    } else if status.is_client_error() && status != StatusCode::NOT_FOUND {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Backend answered with client error"
        );
    } else {
        debug!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %format!("{:.2}", duration_ms),
            "Backend request completed"
        );
    }
}

/// Log a round-trip that never produced a response
pub fn log_failure(method: &Method, path: &str, error: &AppError, duration: Duration) {
    warn!(
        method = %method,
        path = %path,
        code = error.error_code(),
        error = %error,
        duration_ms = %format!("{:.2}", duration.as_secs_f64() * 1000.0),
        "Backend request failed"
    );
}
