//! Periodic leaderboard refresh
//!
//! One fetch runs immediately on [`LeaderboardRefresher::start`], then one per
//! refresh period until stopped. The loop is single-flight: a tick that comes
//! due while a fetch is outstanding is skipped, and a manual retry requested
//! during a fetch is rejected.
//!
//! A failed refresh keeps the last good list and raises an error flag so the
//! host can offer a retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::ContestApi;
use crate::config::LeaderboardConfig;
use crate::error::AppResult;
use crate::models::LeaderboardEntry;
use crate::utils::now_utc;

/// Identifies one refresh schedule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefresherHandle {
    contest_id: String,
    generation: u64,
}

impl RefresherHandle {
    pub fn contest_id(&self) -> &str {
        &self.contest_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Host-visible leaderboard state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardSnapshot {
    pub generation: u64,
    pub contest_id: Option<String>,
    /// Last successfully fetched standings, in backend order
    pub entries: Vec<LeaderboardEntry>,
    pub loading: bool,
    /// Set when the latest refresh failed; `entries` is then stale
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl LeaderboardSnapshot {
    pub fn is_stale(&self) -> bool {
        self.error.is_some()
    }
}

struct RefresherShared {
    api: Arc<dyn ContestApi>,
    state: watch::Sender<LeaderboardSnapshot>,
}

impl RefresherShared {
    /// Apply `update` only while `generation` is current
    fn publish<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut LeaderboardSnapshot),
    {
        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            update(snapshot);
            true
        })
    }

    fn advance<F>(&self, update: F) -> u64
    where
        F: FnOnce(&mut LeaderboardSnapshot),
    {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            update(snapshot);
            generation = snapshot.generation;
        });
        generation
    }

    async fn refresh(&self, handle: &RefresherHandle) {
        self.publish(handle.generation, |s| s.loading = true);

        match self.api.get_leaderboard(&handle.contest_id).await {
            Ok(entries) => {
                debug!(
                    contest_id = %handle.contest_id,
                    entries = entries.len(),
                    "Leaderboard refreshed"
                );
                self.publish(handle.generation, |s| {
                    s.entries = entries;
                    s.loading = false;
                    s.error = None;
                    s.last_updated = Some(now_utc());
                });
            }
            Err(err) => {
                warn!(contest_id = %handle.contest_id, error = %err, "Leaderboard refresh failed");
                self.publish(handle.generation, |s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
            }
        }
    }
}

/// Take the single fetch slot; false if someone else holds it
fn claim(in_flight: &AtomicBool) -> bool {
    in_flight
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

async fn refresh_loop(
    shared: Arc<RefresherShared>,
    handle: RefresherHandle,
    period: Duration,
    retry: Arc<Notify>,
    in_flight: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        // `retry` claims the slot before notifying
        tokio::select! {
            biased;
            _ = ticker.tick() => {
                if !claim(&in_flight) {
                    // A retry got in first; fold its wakeup into this fetch
                    retry.notified().await;
                }
            }
            _ = retry.notified() => {
                debug!(contest_id = %handle.contest_id, "Manual leaderboard refresh");
            }
        }

        shared.refresh(&handle).await;
        in_flight.store(false, Ordering::SeqCst);
    }
}

struct ActiveRefresh {
    generation: u64,
    task: JoinHandle<()>,
    retry: Arc<Notify>,
    in_flight: Arc<AtomicBool>,
}

/// Keeps the standings of one contest up to date
pub struct LeaderboardRefresher {
    shared: Arc<RefresherShared>,
    period: Duration,
    active: Mutex<Option<ActiveRefresh>>,
}

impl LeaderboardRefresher {
    pub fn new(api: Arc<dyn ContestApi>, period: Duration) -> Self {
        let (state, _) = watch::channel(LeaderboardSnapshot::default());

        Self {
            shared: Arc::new(RefresherShared { api, state }),
            period,
            active: Mutex::new(None),
        }
    }

    pub fn from_config(api: Arc<dyn ContestApi>, config: &LeaderboardConfig) -> Self {
        Self::new(api, config.refresh_interval)
    }

    /// Refresh period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fetch now and then on every period, replacing any running schedule
    pub fn start(&self, contest_id: &str) -> RefresherHandle {
        let mut active = self.lock_active();
        if let Some(previous) = active.take() {
            previous.task.abort();
        }

        let generation = self.shared.advance(|s| {
            *s = LeaderboardSnapshot {
                generation: s.generation,
                contest_id: Some(contest_id.to_string()),
                loading: true,
                ..LeaderboardSnapshot::default()
            };
        });
        let handle = RefresherHandle {
            contest_id: contest_id.to_string(),
            generation,
        };

        let retry = Arc::new(Notify::new());
        let in_flight = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(refresh_loop(
            self.shared.clone(),
            handle.clone(),
            self.period,
            retry.clone(),
            in_flight.clone(),
        ));

        info!(contest_id, generation, period_secs = self.period.as_secs(), "Leaderboard refresh started");
        *active = Some(ActiveRefresh {
            generation,
            task,
            retry,
            in_flight,
        });

        handle
    }

    /// Cancel the schedule; results still in flight are discarded
    pub fn stop(&self, handle: &RefresherHandle) -> bool {
        let mut active = self.lock_active();
        match active.as_ref() {
            Some(current) if current.generation == handle.generation => {}
            _ => return false,
        }

        if let Some(current) = active.take() {
            current.task.abort();
        }
        self.shared.advance(|s| s.loading = false);
        info!(contest_id = %handle.contest_id, "Leaderboard refresh stopped");
        true
    }

    /// Ask for an immediate refresh.
    ///
    /// Returns false if `handle` is not the running schedule or a fetch is
    /// already in flight.
    pub fn retry(&self, handle: &RefresherHandle) -> bool {
        let active = self.lock_active();
        match active.as_ref() {
            Some(current)
                if current.generation == handle.generation && claim(&current.in_flight) =>
            {
                current.retry.notify_one();
                true
            }
            _ => false,
        }
    }

    /// One-off fetch that leaves the shared snapshot alone
    pub async fn fetch(&self, contest_id: &str) -> AppResult<Vec<LeaderboardEntry>> {
        self.shared.api.get_leaderboard(contest_id).await
    }

    /// Latest state
    pub fn snapshot(&self) -> LeaderboardSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<LeaderboardSnapshot> {
        self.shared.state.subscribe()
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRefresh>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LeaderboardRefresher {
    fn drop(&mut self) {
        if let Some(active) = self.lock_active().take() {
            active.task.abort();
        }
    }
}
