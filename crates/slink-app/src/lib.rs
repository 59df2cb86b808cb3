//! slink-app - Link routing and SDK initialization sync
//!
//! This crate holds the stateful parts of slink:
//! - [`LinkRouter`] maps resolved links to route decisions and forwards attribution
//! - [`AttributionStore`] keeps the last known attribution token
//! - [`InitSyncCoordinator`] reconciles SDK initialization into one terminal [`AuthState`]
//! - [`EventBus`] delivers state changes to observers
//! - [`Engine`] wires them together for the host app
//!
//! [`AuthState`]: slink_core::AuthState

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod event_bus;
pub mod router;
pub mod store;

pub use config::{
    init_config_dir, load_settings, save_settings, LinkSettings, Settings, SyncSettings,
    PARTNER_ID_ENV_VAR, SLINK_DIR, TOKEN_ENV_VAR,
};
pub use coordinator::{Attempt, InitSyncCoordinator, PollOutcome, PollTiming};
pub use engine::Engine;
pub use event_bus::{EventBus, Observer, SubscriptionId};
pub use router::LinkRouter;
pub use store::{AttributionPersistence, AttributionStore, FilePersistence};
