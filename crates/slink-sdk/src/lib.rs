//! slink-sdk - Attribution SDK collaborator interface
//!
//! The attribution SDK is a closed, externally owned component. This crate
//! describes the parts of it the app consumes (`configure`,
//! `update_attribution`, and the last-known configure status) as traits, and
//! provides [`SimulatedSdk`] for running the app without the real SDK.

pub mod client;
pub mod credentials;
pub mod simulated;

pub use client::{
    AttributionSdk, AttributionSink, ConfigureError, ConfigureStatus, LocalAttributionSdk,
    StatusProbe, StatusReport,
};
pub use credentials::{Credentials, Environment};
pub use simulated::{AttributionUpdate, SimulatedBehavior, SimulatedSdk, DEFAULT_LATENCY};
