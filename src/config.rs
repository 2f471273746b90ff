//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the client runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_TIMEOUT_MS, DEFAULT_API_URL, DEFAULT_LEADERBOARD_REFRESH_SECS,
    DEFAULT_POLL_BACKOFF_MULTIPLIER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_ATTEMPTS,
    DEFAULT_POLL_MAX_DURATION_SECS, DEFAULT_POLL_MAX_INTERVAL_MS, DEFAULT_SESSION_FILE,
    DEFAULT_SESSION_TTL_HOURS,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub leaderboard: LeaderboardConfig,
    pub session: SessionConfig,
    pub logging: LogConfig,
}

/// Contest backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Submission status polling configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay before the first poll
    pub interval: Duration,
    /// Growth factor of the delay between polls (1.0 keeps it fixed)
    pub backoff_multiplier: f64,
    /// Upper bound for the delay
    pub max_interval: Duration,
    /// Give up after this long
    pub max_duration: Option<Duration>,
    /// Give up after this many polls
    pub max_attempts: Option<u32>,
}

/// Leaderboard refresh configuration
#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    pub refresh_interval: Duration,
}

/// Persisted session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
    /// Sessions older than this are treated as absent
    pub ttl: Option<chrono::Duration>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub rust_log: String,
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api: ApiConfig::load(&lookup)?,
            polling: PollingConfig::load(&lookup)?,
            leaderboard: LeaderboardConfig::load(&lookup)?,
            session: SessionConfig::load(&lookup)?,
            logging: LogConfig::load(&lookup)?,
        })
    }
}

impl ApiConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let base_url = lookup("CONTEST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&base_url)
            .map_err(|_| ConfigError::InvalidValue("CONTEST_API_URL".to_string()))?;

        let timeout_ms: u64 = parse_or(lookup, "API_TIMEOUT_MS", DEFAULT_API_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("API_TIMEOUT_MS".to_string()));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

impl PollingConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let interval_ms: u64 = parse_or(lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if interval_ms == 0 {
            return Err(ConfigError::InvalidValue("POLL_INTERVAL_MS".to_string()));
        }

        let backoff_multiplier: f64 = parse_or(
            lookup,
            "POLL_BACKOFF_MULTIPLIER",
            DEFAULT_POLL_BACKOFF_MULTIPLIER,
        )?;
        if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue("POLL_BACKOFF_MULTIPLIER".to_string()));
        }

        let max_interval_ms: u64 =
            parse_or(lookup, "POLL_MAX_INTERVAL_MS", DEFAULT_POLL_MAX_INTERVAL_MS)?;
        let max_duration_secs: u64 =
            parse_or(lookup, "POLL_MAX_DURATION_SECS", DEFAULT_POLL_MAX_DURATION_SECS)?;
        let max_attempts: u32 = parse_or(lookup, "POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS)?;

        Ok(Self {
            interval: Duration::from_millis(interval_ms),
            backoff_multiplier,
            max_interval: Duration::from_millis(max_interval_ms.max(interval_ms)),
            max_duration: (max_duration_secs > 0).then(|| Duration::from_secs(max_duration_secs)),
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        })
    }
}

impl LeaderboardConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let secs: u64 = parse_or(
            lookup,
            "LEADERBOARD_REFRESH_SECS",
            DEFAULT_LEADERBOARD_REFRESH_SECS,
        )?;
        if secs == 0 {
            return Err(ConfigError::InvalidValue("LEADERBOARD_REFRESH_SECS".to_string()));
        }

        Ok(Self {
            refresh_interval: Duration::from_secs(secs),
        })
    }
}

impl SessionConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let ttl_hours: i64 = parse_or(lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours < 0 {
            return Err(ConfigError::InvalidValue("SESSION_TTL_HOURS".to_string()));
        }

        Ok(Self {
            path: PathBuf::from(
                lookup("SESSION_FILE").unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string()),
            ),
            ttl: (ttl_hours > 0).then(|| chrono::Duration::hours(ttl_hours)),
        })
    }
}

impl LogConfig {
    fn load<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self, ConfigError> {
        let format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        };

        Ok(Self {
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "contest_client=info".to_string()),
            format,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
