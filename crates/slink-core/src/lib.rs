//! # slink-core - Core Domain Types
//!
//! Foundation crate for slink. Provides domain types, error handling,
//! logging setup, and the inbound deep-link parser.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing, url, percent-encoding).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`ResolvedLink`] - Parsed inbound link (surface, target, attribution)
//! - [`Surface`] - Web view, native screen, or unknown
//! - [`RouteDecision`] - What the caller should open after routing
//! - [`AttributionToken`] - Last known attribution code and expiry
//! - [`AuthState`], [`AuthPhase`] - Reconciled SDK initialization outcome
//!
//! ### Link Parsing (`link`)
//! - [`LinkParser`] - Scheme/host-bound parser producing [`ResolvedLink`]
//! - [`parse_link()`] - Parse with the default scheme and host
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Infrastructure, config, and persistence errors
//! - [`ParseError`] - Why a link was not addressed to us
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use slink_core::prelude::*;
//! ```

pub mod error;
pub mod link;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, ParseError, Result, ResultExt};
pub use link::{parse_link, LinkParser, DEFAULT_HOST, DEFAULT_SCHEME};
pub use types::{
    AttributionToken, AuthPayload, AuthPhase, AuthState, ResolvedLink, RouteDecision, Surface,
    STATUS_OK, UNKNOWN_STATUS_CODE,
};
