//! Submission lifecycle tracking
//!
//! A [`SubmissionTracker`] drives one submission at a time from creation to
//! a terminal phase:
//!
//! ```text
//! IDLE --submit--> CREATING --ok--> POLLING --COMPLETED--> DONE
//!                      |               |
//!                      +----error------+--error/ceiling--> FAILED
//! CREATING | POLLING --cancel--> CANCELLED
//! ```
//!
//! The host-visible state lives in a `watch` channel stamped with a
//! generation counter. Every submit or cancel starts a new generation, and
//! writers from an older generation are rejected, so a superseded poll loop
//! can never overwrite a newer submission's state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::{ContestApi, CreateSubmissionRequest};
use crate::config::PollingConfig;
use crate::constants::{
    DEFAULT_POLL_BACKOFF_MULTIPLIER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_DURATION_SECS,
    DEFAULT_POLL_MAX_INTERVAL_MS,
};
use crate::error::{AppError, AppResult};
use crate::models::{ProblemId, Submission, SubmissionId};

/// Timing rules for status polling
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first poll
    pub interval: Duration,
    /// Delay growth factor after every non-terminal answer
    pub backoff_multiplier: f64,
    /// Upper bound for the delay
    pub max_interval: Duration,
    /// Hard ceiling for the whole tracking run
    pub max_duration: Option<Duration>,
    /// Maximum number of polls
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    /// Fixed-period polling without a ceiling
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff_multiplier: 1.0,
            max_interval: interval,
            max_duration: None,
            max_attempts: None,
        }
    }

    /// Delay to use after a poll that waited `current`
    pub fn next_delay(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.backoff_multiplier.max(1.0))
            .min(self.max_interval.max(self.interval))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            backoff_multiplier: DEFAULT_POLL_BACKOFF_MULTIPLIER,
            max_interval: Duration::from_millis(DEFAULT_POLL_MAX_INTERVAL_MS),
            max_duration: Some(Duration::from_secs(DEFAULT_POLL_MAX_DURATION_SECS)),
            max_attempts: None,
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval,
            backoff_multiplier: config.backoff_multiplier,
            max_interval: config.max_interval,
            max_duration: config.max_duration,
            max_attempts: config.max_attempts,
        }
    }
}

/// Identifies one tracked submission
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionHandle {
    submission_id: SubmissionId,
    generation: u64,
}

impl SubmissionHandle {
    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Error surfaced to the host when tracking fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerFailure {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&AppError> for TrackerFailure {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Lifecycle phase of the tracker
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerPhase {
    Idle,
    Creating,
    Polling {
        handle: SubmissionHandle,
        latest: Option<Submission>,
    },
    Done {
        handle: SubmissionHandle,
        submission: Submission,
    },
    Failed {
        handle: Option<SubmissionHandle>,
        error: TrackerFailure,
    },
    Cancelled {
        handle: Option<SubmissionHandle>,
    },
}

impl TrackerPhase {
    /// Done, failed and cancelled phases never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }

    /// Submission this phase refers to, if one was created
    pub fn handle(&self) -> Option<&SubmissionHandle> {
        match self {
            Self::Polling { handle, .. } | Self::Done { handle, .. } => Some(handle),
            Self::Failed { handle, .. } | Self::Cancelled { handle } => handle.as_ref(),
            Self::Idle | Self::Creating => None,
        }
    }

    /// Most recent snapshot received from the backend
    pub fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Polling { latest, .. } => latest.as_ref(),
            Self::Done { submission, .. } => Some(submission),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Creating => "creating",
            Self::Polling { .. } => "polling",
            Self::Done { .. } => "done",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

/// Host-visible tracker state
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    pub generation: u64,
    pub phase: TrackerPhase,
}

struct TrackerShared {
    api: Arc<dyn ContestApi>,
    policy: PollPolicy,
    state: watch::Sender<TrackerSnapshot>,
}

impl TrackerShared {
    /// Replace the phase if `generation` is still current and not yet terminal
    fn publish(&self, generation: u64, phase: TrackerPhase) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation || snapshot.phase.is_terminal() {
                return false;
            }
            snapshot.phase = phase;
            true
        })
    }

    /// Start a new generation; every older writer becomes stale
    fn advance(&self, phase: TrackerPhase) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.phase = phase;
            generation = snapshot.generation;
        });
        generation
    }

    fn current_generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Whether the poll loop for `handle` should keep going
    fn is_polling(&self, handle: &SubmissionHandle) -> bool {
        let snapshot = self.state.borrow();
        snapshot.generation == handle.generation
            && matches!(snapshot.phase, TrackerPhase::Polling { .. })
    }

    /// Frozen snapshot for `handle`, if it already reached DONE
    fn frozen(&self, handle: &SubmissionHandle) -> Option<Submission> {
        let snapshot = self.state.borrow();
        match &snapshot.phase {
            TrackerPhase::Done {
                handle: done,
                submission,
            } if snapshot.generation == handle.generation && done == handle => {
                Some(submission.clone())
            }
            _ => None,
        }
    }

    /// Fetch one snapshot and publish the resulting phase
    async fn poll_once(&self, handle: &SubmissionHandle, deadline: Option<Instant>) -> AppResult<Submission> {
        let fetch = self.api.get_submission(&handle.submission_id);
        let outcome = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fetch)
                .await
                .unwrap_or_else(|_| {
                    Err(AppError::Timeout(format!(
                        "no verdict for submission {} before the polling deadline",
                        handle.submission_id
                    )))
                }),
            None => fetch.await,
        };

        match outcome {
            Ok(submission) if submission.is_terminal() => {
                info!(
                    submission_id = %handle.submission_id,
                    result = ?submission.result.as_ref().map(|v| v.as_str()),
                    "Submission completed"
                );
                self.publish(
                    handle.generation,
                    TrackerPhase::Done {
                        handle: handle.clone(),
                        submission: submission.clone(),
                    },
                );
                Ok(submission)
            }
            Ok(submission) => {
                debug!(
                    submission_id = %handle.submission_id,
                    status = %submission.status,
                    "Submission still in progress"
                );
                self.publish(
                    handle.generation,
                    TrackerPhase::Polling {
                        handle: handle.clone(),
                        latest: Some(submission.clone()),
                    },
                );
                Ok(submission)
            }
            Err(err) => {
                warn!(
                    submission_id = %handle.submission_id,
                    error = %err,
                    "Polling submission status failed"
                );
                self.fail(handle, &err);
                Err(err)
            }
        }
    }

    fn fail(&self, handle: &SubmissionHandle, err: &AppError) {
        self.publish(
            handle.generation,
            TrackerPhase::Failed {
                handle: Some(handle.clone()),
                error: err.into(),
            },
        );
    }
}

/// Poll `handle` until it reaches a terminal status, fails, or goes stale
async fn poll_loop(shared: Arc<TrackerShared>, handle: SubmissionHandle) {
    let policy = shared.policy.clone();
    let deadline = policy.max_duration.map(|max| Instant::now() + max);
    let mut delay = policy.interval;
    let mut attempts: u32 = 0;

    loop {
        // The poll that lands on the deadline is the last one
        let mut last_call = false;
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(submission_id = %handle.submission_id, attempts, "Polling deadline reached");
                shared.fail(&handle, &deadline_error(&handle, &policy));
                return;
            }
            if delay >= remaining {
                delay = remaining;
                last_call = true;
            }
        }

        tokio::time::sleep(delay).await;

        if !shared.is_polling(&handle) {
            debug!(submission_id = %handle.submission_id, "Poll loop no longer current, stopping");
            return;
        }

        attempts += 1;
        // Only the client timeout bounds the poll made at the deadline
        let bound = if last_call { None } else { deadline };
        match shared.poll_once(&handle, bound).await {
            Ok(submission) if submission.is_terminal() => return,
            Ok(_) => {}
            Err(_) => return,
        }

        if last_call {
            warn!(submission_id = %handle.submission_id, attempts, "Polling deadline reached");
            shared.fail(&handle, &deadline_error(&handle, &policy));
            return;
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            let err = AppError::Timeout(format!(
                "no verdict for submission {} after {} polls",
                handle.submission_id, attempts
            ));
            warn!(submission_id = %handle.submission_id, attempts, "Polling attempt limit reached");
            shared.fail(&handle, &err);
            return;
        }

        delay = policy.next_delay(delay);
    }
}

fn deadline_error(handle: &SubmissionHandle, policy: &PollPolicy) -> AppError {
    AppError::Timeout(format!(
        "no verdict for submission {} within {:?}",
        handle.submission_id,
        policy.max_duration.unwrap_or_default()
    ))
}

/// Drives one in-flight submission and exposes its latest state
pub struct SubmissionTracker {
    shared: Arc<TrackerShared>,
    active: Mutex<Option<JoinHandle<()>>>,
}

impl SubmissionTracker {
    /// Create an idle tracker
    pub fn new(api: Arc<dyn ContestApi>, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(TrackerSnapshot {
            generation: 0,
            phase: TrackerPhase::Idle,
        });

        Self {
            shared: Arc::new(TrackerShared { api, policy, state }),
            active: Mutex::new(None),
        }
    }

    /// Validate, create and start polling a submission.
    ///
    /// Invalid input fails before any request is made and leaves the current
    /// state untouched. A valid submit supersedes whatever was being tracked.
    /// A `cancel` that lands while the backend is creating the submission
    /// makes this return [`AppError::Cancelled`].
    pub async fn submit(
        &self,
        problem_id: ProblemId,
        username: &str,
        code: &str,
    ) -> AppResult<SubmissionHandle> {
        let request = CreateSubmissionRequest::new(problem_id, username, code);
        request.validate()?;

        let generation = self.supersede(TrackerPhase::Creating);
        info!(problem_id, username = %request.username, generation, "Creating submission");

        let created = match self.shared.api.create_submission(&request).await {
            Ok(created) => created,
            Err(err) => {
                warn!(problem_id, error = %err, "Submission creation failed");
                self.shared.publish(
                    generation,
                    TrackerPhase::Failed {
                        handle: None,
                        error: (&err).into(),
                    },
                );
                return Err(err);
            }
        };

        let handle = SubmissionHandle {
            submission_id: created.submission_id,
            generation,
        };

        let polling = TrackerPhase::Polling {
            handle: handle.clone(),
            latest: None,
        };
        if !self.shared.publish(generation, polling) {
            let cancelled = {
                let snapshot = self.shared.state.borrow();
                snapshot.generation == generation + 1
                    && matches!(snapshot.phase, TrackerPhase::Cancelled { .. })
            };
            if cancelled {
                debug!(submission_id = %handle.submission_id, "Submission cancelled while being created");
                return Err(AppError::Cancelled);
            }
            debug!(submission_id = %handle.submission_id, "Submission superseded while being created");
            return Err(AppError::Superseded);
        }

        info!(submission_id = %handle.submission_id, "Submission created, polling for verdict");
        let task = tokio::spawn(poll_loop(self.shared.clone(), handle.clone()));
        self.install(generation, task);

        Ok(handle)
    }

    /// Fetch the current state of `handle` once.
    ///
    /// Once the submission is DONE the frozen snapshot is returned without
    /// any request.
    pub async fn poll(&self, handle: &SubmissionHandle) -> AppResult<Submission> {
        if let Some(frozen) = self.shared.frozen(handle) {
            return Ok(frozen);
        }

        self.shared.poll_once(handle, None).await
    }

    /// Stop tracking. Returns false when there was nothing in flight.
    pub fn cancel(&self) -> bool {
        let mut active = self.lock_active();

        let handle = {
            let snapshot = self.shared.state.borrow();
            match &snapshot.phase {
                TrackerPhase::Creating => None,
                TrackerPhase::Polling { handle, .. } => Some(handle.clone()),
                _ => return false,
            }
        };

        if let Some(task) = active.take() {
            task.abort();
        }
        let generation = self.shared.advance(TrackerPhase::Cancelled {
            handle: handle.clone(),
        });
        info!(
            submission_id = ?handle.as_ref().map(|h| h.submission_id.as_str()),
            generation,
            "Submission tracking cancelled"
        );
        true
    }

    /// Latest state
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.shared.state.subscribe()
    }

    /// Wait until the tracker is idle or terminal
    pub async fn wait(&self) -> TrackerSnapshot {
        let mut rx = self.subscribe();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if matches!(snapshot.phase, TrackerPhase::Idle) || snapshot.phase.is_terminal() {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Abort the running loop and move to a fresh generation
    fn supersede(&self, phase: TrackerPhase) -> u64 {
        let mut active = self.lock_active();
        if let Some(task) = active.take() {
            task.abort();
        }
        self.shared.advance(phase)
    }

    /// Keep `task` as the active loop unless its generation is already stale
    fn install(&self, generation: u64, task: JoinHandle<()>) {
        let mut active = self.lock_active();
        if self.shared.current_generation() != generation {
            task.abort();
            return;
        }
        if let Some(previous) = active.replace(task) {
            previous.abort();
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SubmissionTracker {
    fn drop(&mut self) {
        if let Some(task) = self.lock_active().take() {
            task.abort();
        }
    }
}
