//! Entry points the attribution SDK exposes to the app
//!
//! The SDK itself is an external collaborator; these traits are the seams
//! the router and the initialization coordinator depend on:
//! - [`AttributionSink`] - fire-and-forget attribution updates
//! - [`StatusProbe`] - last known `configure` outcome and the call it came from
//! - [`AttributionSdk`] - the async `configure` call

use thiserror::Error;

use slink_core::{STATUS_OK, UNKNOWN_STATUS_CODE};

use crate::credentials::Credentials;

/// Failure surfaced by the SDK's `configure` completion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SDK configure failed{}: {message}", .status_code.map(|c| format!(" ({c})")).unwrap_or_default())]
pub struct ConfigureError {
    /// Numeric code from the SDK error, when it provides one
    pub status_code: Option<i32>,
    pub message: String,
}

impl ConfigureError {
    pub fn new(status_code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Status code to report, falling back to [`UNKNOWN_STATUS_CODE`]
    pub fn reported_status(&self) -> i32 {
        self.status_code.unwrap_or(UNKNOWN_STATUS_CODE)
    }
}

/// What the SDK currently knows about its last `configure` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigureStatus {
    #[default]
    NotStarted,
    InProgress,
    Succeeded,
    Failed { status_code: Option<i32> },
}

impl ConfigureStatus {
    /// `(success, status_code)` once the SDK has reached a conclusion
    pub fn conclusion(&self) -> Option<(bool, i32)> {
        match self {
            ConfigureStatus::NotStarted | ConfigureStatus::InProgress => None,
            ConfigureStatus::Succeeded => Some((true, STATUS_OK)),
            ConfigureStatus::Failed { status_code } => {
                Some((false, status_code.unwrap_or(UNKNOWN_STATUS_CODE)))
            }
        }
    }
}

/// The SDK's last known status and the `configure` call it belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Sequence number of the `configure` call that produced `status`,
    /// counting from 1 (0 before the first call). `None` when the SDK can't
    /// attribute its status to a call.
    pub call: Option<u64>,
    pub status: ConfigureStatus,
}

impl StatusReport {
    pub fn new(call: u64, status: ConfigureStatus) -> Self {
        Self {
            call: Some(call),
            status,
        }
    }

    /// A status with no call attribution
    pub fn unattributed(status: ConfigureStatus) -> Self {
        Self { call: None, status }
    }

    /// The conclusion, if it came from a call issued after `baseline`
    pub fn conclusion_after(&self, baseline: u64) -> Option<(bool, i32)> {
        match self.call {
            Some(call) if call > baseline => self.status.conclusion(),
            _ => None,
        }
    }
}

impl From<&Result<(), ConfigureError>> for ConfigureStatus {
    fn from(result: &Result<(), ConfigureError>) -> Self {
        match result {
            Ok(()) => ConfigureStatus::Succeeded,
            Err(e) => ConfigureStatus::Failed {
                status_code: e.status_code,
            },
        }
    }
}

/// Receives attribution updates. Absent values mean "clear attribution".
///
/// Implementations must be idempotent: the same link may be routed more
/// than once.
pub trait AttributionSink: Send + Sync {
    fn update_attribution(&self, code: Option<String>, expiry: Option<String>);
}

/// Reports the SDK's currently known `configure` status without a new call
pub trait StatusProbe: Send + Sync {
    fn last_configure_status(&self) -> StatusReport;
}

/// Async SDK authentication
#[trait_variant::make(AttributionSdk: Send)]
pub trait LocalAttributionSdk {
    /// Authenticate with the partner credentials. Completes exactly once.
    async fn configure(&self, credentials: &Credentials) -> Result<(), ConfigureError>;
}
