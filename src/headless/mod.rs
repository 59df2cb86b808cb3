//! Headless mode - JSON event output for scripted runs
//!
//! Drives one SDK initialization attempt against the simulated SDK, routes
//! any links passed on the command line while the attempt is in flight, and
//! prints what happened as structured events on stdout.
//!
//! # Event Format
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type, along with event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"attempt_started","attempt":1,"partner_id":"demo","environment":"stage","timestamp":1704700001000}
//! {"event":"link_routed","link":"saucelinktest://saucelink/native?slink=abc","route":{"decision":"open_native","product_id":null},"timestamp":1704700001002}
//! {"event":"auth_resolved","attempt":1,"success":true,"status_code":200,"timestamp":1704700001301}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use slink_core::{AuthState, RouteDecision};

pub use runner::{run_headless, run_headless_to, HeadlessOptions};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// An initialization attempt began
    AttemptStarted {
        attempt: u64,
        partner_id: String,
        environment: String,
        timestamp: i64,
    },

    /// An inbound link was parsed and routed
    LinkRouted {
        link: String,
        route: RouteDecision,
        timestamp: i64,
    },

    /// The attempt reached its terminal state
    AuthResolved {
        attempt: u64,
        success: bool,
        status_code: i32,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Write this event as one NDJSON line and flush
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let json = serde_json::to_string(self).map_err(io::Error::other)?;
        writeln!(out, "{}", json)?;
        out.flush()
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn attempt_started(attempt: u64, partner_id: &str, environment: &str) -> Self {
        Self::AttemptStarted {
            attempt,
            partner_id: partner_id.to_string(),
            environment: environment.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn link_routed(link: &str, route: RouteDecision) -> Self {
        Self::LinkRouted {
            link: link.to_string(),
            route,
            timestamp: Self::now(),
        }
    }

    /// `None` while `state` is still pending
    pub fn auth_resolved(attempt: u64, state: &AuthState) -> Option<Self> {
        state.payload().map(|payload| Self::AuthResolved {
            attempt,
            success: payload.success,
            status_code: payload.status_code,
            timestamp: Self::now(),
        })
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_value(event: &HeadlessEvent) -> serde_json::Value {
        let mut buf = Vec::new();
        event.write_to(&mut buf).expect("write failed");
        assert_eq!(buf.last(), Some(&b'\n'));
        serde_json::from_slice(&buf).expect("invalid JSON")
    }

    #[test]
    fn test_attempt_started_serialization() {
        let value = to_value(&HeadlessEvent::attempt_started(3, "partner", "prod"));

        assert_eq!(value["event"], "attempt_started");
        assert_eq!(value["attempt"], 3);
        assert_eq!(value["partner_id"], "partner");
        assert_eq!(value["environment"], "prod");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_link_routed_serialization() {
        let value = to_value(&HeadlessEvent::link_routed(
            "saucelinktest://saucelink/native?productId=p1",
            RouteDecision::OpenNative {
                product_id: Some("p1".into()),
            },
        ));

        assert_eq!(value["event"], "link_routed");
        assert_eq!(value["route"]["decision"], "open_native");
        assert_eq!(value["route"]["product_id"], "p1");
    }

    #[test]
    fn test_auth_resolved_serialization() {
        let event = HeadlessEvent::auth_resolved(1, &AuthState::Failed { status_code: -1 })
            .expect("terminal state");
        let value = to_value(&event);

        assert_eq!(value["event"], "auth_resolved");
        assert_eq!(value["success"], false);
        assert_eq!(value["status_code"], -1);
    }

    #[test]
    fn test_auth_resolved_skips_pending() {
        assert!(HeadlessEvent::auth_resolved(1, &AuthState::Pending).is_none());
    }

    #[test]
    fn test_error_serialization() {
        let value = to_value(&HeadlessEvent::error("boom".to_string(), true));

        assert_eq!(value["event"], "error");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["fatal"], true);
    }
}
