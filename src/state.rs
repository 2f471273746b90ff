//! Application state management
//!
//! This module contains the shared state the command-line host hands to
//! the services: configuration, the backend client and the session store.

use std::sync::Arc;

use crate::api::{ContestApi, HttpContestApi};
use crate::config::Config;
use crate::error::AppResult;
use crate::services::{LeaderboardRefresher, PollPolicy, SubmissionTracker};
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Contest backend client
    api: Arc<dyn ContestApi>,

    /// Persisted participant session
    sessions: SessionStore,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(api: Arc<dyn ContestApi>, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                api,
                sessions: SessionStore::from_config(&config.session),
                config,
            }),
        }
    }

    /// Create state backed by the real HTTP client
    pub fn connect(config: Config) -> AppResult<Self> {
        let api = HttpContestApi::new(&config.api)?;
        Ok(Self::new(Arc::new(api), config))
    }

    /// Get a handle to the backend client
    pub fn api(&self) -> Arc<dyn ContestApi> {
        self.inner.api.clone()
    }

    /// Get a reference to the session store
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Session lifetime from configuration
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        self.inner.config.session.ttl
    }

    /// New tracker using the configured polling policy
    pub fn submission_tracker(&self) -> SubmissionTracker {
        SubmissionTracker::new(self.api(), PollPolicy::from(&self.inner.config.polling))
    }

    /// New refresher using the configured refresh period
    pub fn leaderboard_refresher(&self) -> LeaderboardRefresher {
        LeaderboardRefresher::from_config(self.api(), &self.inner.config.leaderboard)
    }
}
