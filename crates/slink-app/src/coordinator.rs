//! SDK initialization reconciliation
//!
//! Two paths race to conclude an initialization attempt:
//! - the SDK's `configure` completion, delivered through [`InitSyncCoordinator::report_result`]
//! - a deadline-driven poll of the SDK's last known status, through
//!   [`InitSyncCoordinator::poll_if_unresolved`]
//!
//! Observers may attach after the completion already fired, so the poll is a
//! backstop rather than the primary path. Whichever path arrives first moves
//! the attempt from `Pending` to a terminal state; every later call for that
//! attempt is discarded. Each attempt has a generation number, and results or
//! polls tagged with an older generation are dropped.
//!
//! The poll only trusts a status produced by a `configure` call issued after
//! the attempt began. An SDK that can't attribute its status to a call leaves
//! the attempt to the completion.
//!
//! Publishing is serialized with [`InitSyncCoordinator::begin_attempt`]: an
//! observer reading [`InitSyncCoordinator::auth_state`] while it is notified
//! sees the state it was notified about. Observers must not start an attempt
//! or report a result from inside `notify`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use slink_core::prelude::*;
use slink_core::AuthState;
use slink_sdk::StatusProbe;
use tokio::task::JoinHandle;

use crate::event_bus::EventBus;

/// Generation of one initialization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempt(u64);

impl Attempt {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// When the poll fallback fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Delay between `begin_attempt()` and the first poll
    pub initial_delay: Duration,
    /// Delay between polls while unresolved
    pub interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(1),
        }
    }
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll belongs to a superseded attempt
    Stale,
    /// The attempt had already concluded; nothing changed
    AlreadyResolved(AuthState),
    /// This poll concluded the attempt
    Resolved(AuthState),
    /// The SDK is still working; poll again later
    StillPending,
}

struct SyncState {
    attempt: Attempt,
    auth: AuthState,
    /// Last `configure` call the SDK had reported when the attempt began
    baseline_call: u64,
}

/// Owns the current [`AuthState`] and is its only writer
pub struct InitSyncCoordinator<P> {
    state: Mutex<SyncState>,
    /// Held across a conclusion and its publish, and across `begin_attempt`
    publishing: Mutex<()>,
    probe: Arc<P>,
    bus: Arc<EventBus<AuthState>>,
    timing: PollTiming,
}

impl<P: StatusProbe> InitSyncCoordinator<P> {
    pub fn new(probe: Arc<P>, bus: Arc<EventBus<AuthState>>, timing: PollTiming) -> Self {
        Self {
            state: Mutex::new(SyncState {
                attempt: Attempt(0),
                auth: AuthState::Pending,
                baseline_call: 0,
            }),
            publishing: Mutex::new(()),
            probe,
            bus,
            timing,
        }
    }

    pub fn timing(&self) -> PollTiming {
        self.timing
    }

    /// Start a fresh attempt at `Pending`, superseding any earlier one.
    ///
    /// Call this before issuing the attempt's `configure`. Waits for an
    /// in-flight publish to finish.
    pub fn begin_attempt(&self) -> Attempt {
        let _publishing = self.publish_lock();
        let baseline_call = self.probe.last_configure_status().call.unwrap_or(0);

        let mut state = self.lock();
        state.attempt = Attempt(state.attempt.0 + 1);
        state.auth = AuthState::Pending;
        state.baseline_call = baseline_call;
        info!(
            "Initialization attempt {} started (after configure call {})",
            state.attempt, baseline_call
        );
        state.attempt
    }

    pub fn current_attempt(&self) -> Attempt {
        self.lock().attempt
    }

    pub fn auth_state(&self) -> AuthState {
        self.lock().auth
    }

    /// Apply a `configure` result to the current attempt.
    ///
    /// Returns true if this call concluded the attempt.
    pub fn report_result(&self, success: bool, status_code: i32) -> bool {
        self.conclude(None, success, status_code).is_some()
    }

    /// Apply a `configure` result tagged with the attempt that issued it
    pub fn report_result_for(&self, attempt: Attempt, success: bool, status_code: i32) -> bool {
        self.conclude(Some(attempt), success, status_code).is_some()
    }

    /// Poll the current attempt
    pub fn poll_if_unresolved(&self) -> PollOutcome {
        let attempt = self.current_attempt();
        self.poll_for(attempt)
    }

    /// Poll on behalf of `attempt`; stale attempts are left untouched
    pub fn poll_for(&self, attempt: Attempt) -> PollOutcome {
        let baseline_call = match self.settled(attempt) {
            Ok(baseline_call) => baseline_call,
            Err(outcome) => return outcome,
        };

        // Cached SDK state; no network call happens here
        let report = self.probe.last_configure_status();
        let Some((success, status_code)) = report.conclusion_after(baseline_call) else {
            trace!(
                "Attempt {} still in progress: {:?} (baseline call {})",
                attempt,
                report,
                baseline_call
            );
            return PollOutcome::StillPending;
        };

        match self.conclude(Some(attempt), success, status_code) {
            Some(state) => PollOutcome::Resolved(state),
            // Lost a race with a report or a new attempt between the checks
            None => self.settled(attempt).err().unwrap_or(PollOutcome::StillPending),
        }
    }

    /// `Err` when polling `attempt` has nothing left to do, otherwise the
    /// attempt's baseline call
    fn settled(&self, attempt: Attempt) -> std::result::Result<u64, PollOutcome> {
        let state = self.lock();
        if state.attempt != attempt {
            Err(PollOutcome::Stale)
        } else if state.auth.is_terminal() {
            Err(PollOutcome::AlreadyResolved(state.auth))
        } else {
            Ok(state.baseline_call)
        }
    }

    /// The single place `Pending` becomes terminal. Publishes before returning.
    fn conclude(
        &self,
        attempt: Option<Attempt>,
        success: bool,
        status_code: i32,
    ) -> Option<AuthState> {
        let _publishing = self.publish_lock();
        let (concluded, next) = {
            let mut state = self.lock();
            if let Some(attempt) = attempt {
                if attempt != state.attempt {
                    debug!(
                        "Discarding result for superseded attempt {} (current {})",
                        attempt, state.attempt
                    );
                    return None;
                }
            }
            if state.auth.is_terminal() {
                debug!(
                    "Attempt {} already {}; ignoring success={} status={}",
                    state.attempt, state.auth, success, status_code
                );
                return None;
            }
            state.auth = AuthState::resolved(success, status_code);
            (state.attempt, state.auth)
        };

        info!("Initialization attempt {} concluded: {}", concluded, next);
        self.bus.publish(&next);
        Some(next)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish_lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.publishing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<P: StatusProbe + 'static> InitSyncCoordinator<P> {
    /// Poll `attempt` after the initial delay, then every interval until it
    /// concludes or is superseded. There is no upper bound on the number of
    /// polls.
    pub fn spawn_poll_timer(self: &Arc<Self>, attempt: Attempt) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(coordinator.timing.initial_delay).await;
            loop {
                match coordinator.poll_for(attempt) {
                    PollOutcome::StillPending => {
                        tokio::time::sleep(coordinator.timing.interval).await;
                    }
                    outcome => {
                        debug!("Poll timer for attempt {} finished: {:?}", attempt, outcome);
                        break;
                    }
                }
            }
        })
    }
}
