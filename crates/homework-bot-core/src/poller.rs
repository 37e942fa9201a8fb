//! The fetch → validate → translate → notify loop.
//!
//! [`Poller`] owns all mutable state ([`PollState`]): the polling cursor and
//! the last reported error used to suppress repeated notifications.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::api::HomeworkSource;
use crate::error::Result;
use crate::notifier::{ChatTransport, Notifier};
use crate::status::parse_status;
use crate::validate::check_response;

/// Prefix of every error notification.
pub const ERROR_PREFIX: &str = "Program failure";

/// Default pause between iterations.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(600);

// ============================================================================
// PollStatus
// ============================================================================

/// Lifecycle of the poller.
///
/// `Starting` -> `Polling`; there is no terminal state, the loop ends only
/// when the process does (or the shutdown future passed to
/// [`Poller::run_until`] resolves).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollStatus {
    /// Constructed, no iteration run yet.
    #[default]
    Starting,
    /// Inside the polling loop.
    Polling,
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Polling => write!(f, "polling"),
        }
    }
}

// ============================================================================
// IterationOutcome
// ============================================================================

/// What a single polling iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The API reported no status changes.
    NoUpdates,
    /// One message per changed homework was sent.
    Notified {
        /// Messages handed to the notifier.
        sent: usize,
        /// Messages the transport accepted.
        delivered: usize,
    },
    /// Fetching, validating or translating failed.
    Failed {
        /// The formatted error text.
        message: String,
        /// Whether the error was sent to the chat (false when repeated).
        reported: bool,
    },
}

// ============================================================================
// PollState
// ============================================================================

/// Mutable state carried from one iteration to the next.
///
/// Lives only in memory; a restart begins again from "now".
#[derive(Debug, Clone)]
pub struct PollState {
    /// Current lifecycle status.
    pub status: PollStatus,

    /// Lower bound (Unix seconds) for the next fetch.
    pub cursor: i64,

    /// Last error text sent to the chat.
    pub last_error: Option<String>,

    /// Number of iterations started so far.
    pub iteration: u64,

    /// When the poller was created.
    pub started_at: DateTime<Utc>,

    /// When the last iteration finished.
    pub last_poll_at: Option<DateTime<Utc>>,
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

impl PollState {
    /// Creates a state whose cursor is the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use homework_bot_core::{PollState, PollStatus};
    ///
    /// let state = PollState::new();
    /// assert_eq!(state.status, PollStatus::Starting);
    /// assert_eq!(state.iteration, 0);
    /// assert!(state.last_error.is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self::with_cursor(now.timestamp())
    }

    /// Creates a state starting from an explicit cursor.
    #[must_use]
    pub fn with_cursor(cursor: i64) -> Self {
        Self {
            status: PollStatus::Starting,
            cursor,
            last_error: None,
            iteration: 0,
            started_at: Utc::now(),
            last_poll_at: None,
        }
    }

    /// Moves the cursor forward after a successful poll.
    pub fn advance(&mut self, cursor: i64) {
        debug!(from = self.cursor, to = cursor, "Advancing cursor");
        self.cursor = cursor;
    }

    /// Decides whether `message` should go to the chat.
    ///
    /// Returns `false` when it equals the last reported error; otherwise
    /// remembers it and returns `true`. Successful iterations do not clear
    /// the remembered error.
    ///
    /// # Examples
    ///
    /// ```
    /// use homework_bot_core::PollState;
    ///
    /// let mut state = PollState::new();
    /// assert!(state.should_report("boom"));
    /// assert!(!state.should_report("boom"));
    /// assert!(state.should_report("bang"));
    /// ```
    pub fn should_report(&mut self, message: &str) -> bool {
        if self.last_error.as_deref() == Some(message) {
            return false;
        }
        self.last_error = Some(message.to_string());
        true
    }

    /// Returns the time since the poller was created.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Drives the polling loop.
#[derive(Debug)]
pub struct Poller<S, T> {
    source: S,
    notifier: Notifier<T>,
    state: PollState,
    retry_interval: Duration,
}

impl<S, T> Poller<S, T>
where
    S: HomeworkSource,
    T: ChatTransport,
{
    /// Creates a poller whose cursor starts at the current time.
    pub fn new(source: S, notifier: Notifier<T>, retry_interval: Duration) -> Self {
        Self::with_state(source, notifier, retry_interval, PollState::new())
    }

    /// Creates a poller resuming from `state`.
    pub const fn with_state(
        source: S,
        notifier: Notifier<T>,
        retry_interval: Duration,
        state: PollState,
    ) -> Self {
        Self {
            source,
            notifier,
            state,
            retry_interval,
        }
    }

    /// Current loop state.
    pub const fn state(&self) -> &PollState {
        &self.state
    }

    /// The notifier used for both status and error messages.
    pub const fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    /// Pause between iterations.
    pub const fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Runs fetch, validation and translation, then sends one message per
    /// changed homework and advances the cursor.
    ///
    /// Every record is translated before anything is sent, so one bad record
    /// fails the whole batch without partial delivery and without moving the
    /// cursor.
    pub async fn poll(&mut self) -> Result<IterationOutcome> {
        let raw = self.source.fetch(self.state.cursor).await?;
        let response = check_response(&raw)?;

        let messages = response
            .homeworks
            .iter()
            .map(parse_status)
            .collect::<Result<Vec<_>>>()?;

        let outcome = if messages.is_empty() {
            debug!("No new homework statuses");
            IterationOutcome::NoUpdates
        } else {
            info!(count = messages.len(), "Homework statuses changed");
            let mut delivered = 0;
            for message in &messages {
                if self.notifier.notify(message).await {
                    delivered += 1;
                }
            }
            IterationOutcome::Notified {
                sent: messages.len(),
                delivered,
            }
        };

        self.state.advance(response.current_date);
        Ok(outcome)
    }

    /// Runs one iteration, turning any failure into a (deduplicated) chat
    /// notification. Never returns an error.
    pub async fn run_iteration(&mut self) -> IterationOutcome {
        if self.state.status == PollStatus::Starting {
            info!(cursor = self.state.cursor, "Polling started");
            self.state.status = PollStatus::Polling;
        }
        self.state.iteration += 1;
        debug!(iteration = self.state.iteration, "Starting iteration");

        let outcome = match self.poll().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("{ERROR_PREFIX}: {e}");
                error!(iteration = self.state.iteration, error = %e, "Polling iteration failed");
                let reported = self.state.should_report(&message);
                if reported {
                    self.notifier.notify(&message).await;
                } else {
                    debug!("Same error as last time, not notifying");
                }
                IterationOutcome::Failed { message, reported }
            }
        };

        self.state.last_poll_at = Some(Utc::now());
        outcome
    }

    /// Polls forever, sleeping the retry interval after every iteration.
    ///
    /// Stops cleanly on Ctrl+C.
    pub async fn run(&mut self) {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl+C; relying on process termination");
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down");
        };
        self.run_until(shutdown).await;
    }

    /// Polls until `shutdown` resolves.
    ///
    /// `shutdown` is only observed between iterations; an iteration in
    /// progress always runs to completion.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let outcome = self.run_iteration().await;
            debug!(?outcome, "Iteration finished");

            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = tokio::time::sleep(self.retry_interval) => {}
            }
        }

        info!(
            iterations = self.state.iteration,
            cursor = self.state.cursor,
            uptime_secs = self.state.elapsed().num_seconds(),
            "Polling stopped"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
