//! Participant session
//!
//! A [`SessionContext`] records who joined which contest. It is created on
//! join, checked before every contest view and removed on logout. The
//! [`SessionStore`] keeps it in a small JSON file between CLI invocations.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};
use crate::utils::now_utc;

/// Identity of a participant inside one contest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub username: String,
    pub contest_id: String,
    pub joined_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(contest_id: &str, username: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            contest_id: contest_id.trim().to_string(),
            joined_at: now_utc(),
        }
    }

    /// Check whether the session is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        ttl.is_some_and(|ttl| now - self.joined_at > ttl)
    }

    /// Allow access to `contest_id` only for a live session of that contest
    pub fn authorize(&self, contest_id: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.authorize_at(contest_id, ttl, now_utc())
    }

    pub fn authorize_at(
        &self,
        contest_id: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.contest_id != contest_id.trim() {
            return Err(AppError::SessionRequired(format!(
                "joined contest {} but requested {}; join {} first",
                self.contest_id,
                contest_id.trim(),
                contest_id.trim()
            )));
        }
        if self.is_expired(ttl, now) {
            return Err(AppError::SessionRequired(
                "session expired, join the contest again".to_string(),
            ));
        }
        Ok(())
    }
}

/// File-backed session persistence
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session; a missing or unreadable file means none
    pub async fn load(&self) -> AppResult<Option<SessionContext>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &SessionContext) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        debug!(path = %self.path.display(), contest_id = %session.contest_id, "Session saved");
        Ok(())
    }

    /// Remove the saved session. Returns false if there was none.
    pub async fn clear(&self) -> AppResult<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Load the session and gate access to `contest_id` with it
    pub async fn require(&self, contest_id: &str, ttl: Option<Duration>) -> AppResult<SessionContext> {
        let session = self.load().await?.ok_or_else(|| {
            AppError::SessionRequired(format!("join contest {} first", contest_id.trim()))
        })?;
        session.authorize(contest_id, ttl)?;
        Ok(session)
    }

    /// Saved session without a contest gate, for commands that only need identity
    pub async fn current(&self, ttl: Option<Duration>) -> AppResult<SessionContext> {
        let session = self
            .load()
            .await?
            .ok_or_else(|| AppError::SessionRequired("join a contest first".to_string()))?;
        let contest_id = session.contest_id.clone();
        session.authorize(&contest_id, ttl)?;
        Ok(session)
    }
}
