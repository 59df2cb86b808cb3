//! Configuration types for slink
//!
//! Defines:
//! - `Settings` - Root of `.slink/config.toml`
//! - `LinkSettings` - Accepted scheme, host, and universal-link hosts
//! - `SyncSettings` - Poll fallback timing

use std::time::Duration;

use serde::{Deserialize, Serialize};
use slink_core::{LinkParser, DEFAULT_HOST, DEFAULT_SCHEME};
use slink_sdk::Credentials;

use crate::coordinator::PollTiming;

/// Lower bound for the poll interval so a bad config cannot spin
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Application settings (.slink/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub link: LinkSettings,

    /// Partner credentials handed to the SDK's `configure`
    #[serde(default)]
    pub sdk: Credentials,

    #[serde(default)]
    pub sync: SyncSettings,
}

/// Which inbound links are addressed to this app
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkSettings {
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_host")]
    pub host: String,

    /// Hosts whose `https://` links are accepted as universal links
    #[serde(default)]
    pub universal_hosts: Vec<String>,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            universal_hosts: Vec::new(),
        }
    }
}

impl LinkSettings {
    pub fn parser(&self) -> LinkParser {
        LinkParser::new(&self.scheme, &self.host)
            .with_universal_hosts(self.universal_hosts.iter().cloned())
    }
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

/// Poll fallback timing for SDK initialization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Delay before the first poll after an attempt starts
    #[serde(default = "default_poll_ms")]
    pub poll_delay_ms: u64,

    /// Delay between polls while the attempt is unresolved
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_delay_ms: default_poll_ms(),
            poll_interval_ms: default_poll_ms(),
        }
    }
}

impl SyncSettings {
    pub fn timing(&self) -> PollTiming {
        PollTiming {
            initial_delay: Duration::from_millis(self.poll_delay_ms),
            interval: Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS)),
        }
    }
}

fn default_poll_ms() -> u64 {
    1000
}
