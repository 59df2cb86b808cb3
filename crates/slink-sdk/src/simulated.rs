//! In-process stand-in for the attribution SDK
//!
//! Used by the CLI and by tests. `configure` waits for a configurable
//! latency and then concludes with a configured result; attribution updates
//! are recorded so callers can assert on them. The reported status is tagged
//! with the `configure` call that produced it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};

use crate::client::{
    AttributionSdk, AttributionSink, ConfigureError, ConfigureStatus, StatusProbe, StatusReport,
};
use crate::credentials::Credentials;

/// Default simulated network latency for `configure`
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// One recorded `update_attribution` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionUpdate {
    pub code: Option<String>,
    pub expiry: Option<String>,
}

impl AttributionUpdate {
    pub fn new(code: Option<&str>, expiry: Option<&str>) -> Self {
        Self {
            code: code.map(str::to_string),
            expiry: expiry.map(str::to_string),
        }
    }
}

/// How the simulated `configure` call behaves
#[derive(Debug, Clone)]
pub struct SimulatedBehavior {
    pub latency: Duration,
    pub result: Result<(), ConfigureError>,
    /// When false, `configure` records its outcome but never completes,
    /// as if the completion callback were lost
    pub deliver_callback: bool,
}

impl Default for SimulatedBehavior {
    fn default() -> Self {
        Self::succeed(DEFAULT_LATENCY)
    }
}

impl SimulatedBehavior {
    pub fn succeed(latency: Duration) -> Self {
        Self {
            latency,
            result: Ok(()),
            deliver_callback: true,
        }
    }

    pub fn fail(status_code: Option<i32>, latency: Duration) -> Self {
        Self {
            latency,
            result: Err(ConfigureError::new(status_code, "simulated authentication failure")),
            deliver_callback: true,
        }
    }

    pub fn without_callback(mut self) -> Self {
        self.deliver_callback = false;
        self
    }
}

/// Simulated SDK
pub struct SimulatedSdk {
    behavior: SimulatedBehavior,
    status: Mutex<StatusReport>,
    updates: Mutex<Vec<AttributionUpdate>>,
    configure_calls: AtomicUsize,
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new(SimulatedBehavior::default())
    }
}

impl SimulatedSdk {
    pub fn new(behavior: SimulatedBehavior) -> Self {
        Self {
            behavior,
            status: Mutex::new(StatusReport::new(0, ConfigureStatus::NotStarted)),
            updates: Mutex::new(Vec::new()),
            configure_calls: AtomicUsize::new(0),
        }
    }

    /// All attribution updates received so far, oldest first
    pub fn updates(&self) -> Vec<AttributionUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_update(&self) -> Option<AttributionUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn configure_calls(&self) -> usize {
        self.configure_calls.load(Ordering::SeqCst)
    }

    /// Overwrite the status of the latest call
    pub fn set_status(&self, status: ConfigureStatus) {
        self.status_slot().status = status;
    }

    /// Record `status` as produced by a new call without running `configure`.
    /// Returns the call's sequence number.
    pub fn simulate_call(&self, status: ConfigureStatus) -> u64 {
        let mut report = self.status_slot();
        let call = report.call.unwrap_or(0) + 1;
        *report = StatusReport::new(call, status);
        call
    }

    fn status_slot(&self) -> std::sync::MutexGuard<'_, StatusReport> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AttributionSdk for SimulatedSdk {
    async fn configure(&self, credentials: &Credentials) -> Result<(), ConfigureError> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        info!(
            "Simulated configure: partner '{}', environment {}",
            credentials.partner_id,
            credentials.environment.display_name()
        );

        let call = self.simulate_call(ConfigureStatus::InProgress);
        tokio::time::sleep(self.behavior.latency).await;

        let result = self.behavior.result.clone();
        *self.status_slot() = StatusReport::new(call, ConfigureStatus::from(&result));

        if !self.behavior.deliver_callback {
            debug!("Simulated configure concluded; withholding completion");
            std::future::pending::<()>().await;
        }

        result
    }
}

impl AttributionSink for SimulatedSdk {
    fn update_attribution(&self, code: Option<String>, expiry: Option<String>) {
        debug!("Simulated update_attribution: code={:?}, expiry={:?}", code, expiry);
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(AttributionUpdate { code, expiry });
    }
}

impl StatusProbe for SimulatedSdk {
    fn last_configure_status(&self) -> StatusReport {
        *self.status_slot()
    }
}
