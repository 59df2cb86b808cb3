//! slink Library
//!
//! Command-line front end for the slink deep-link resolver and SDK
//! initialization sync.

// Module declarations
pub mod commands;
pub mod headless;

// Re-export main entry points
pub use commands::{parse_to_json, route_to_json};
pub use headless::{run_headless, run_headless_to, HeadlessEvent, HeadlessOptions};
