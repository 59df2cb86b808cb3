//! Engine - wires link routing and SDK initialization together
//!
//! The engine is the composition root the host app talks to. It owns the
//! parser, router, attribution store, initialization coordinator, and the
//! event bus observers subscribe to.

use std::path::Path;
use std::sync::{Arc, Mutex};

use slink_core::prelude::*;
use slink_core::{AttributionToken, AuthState, LinkParser, RouteDecision, STATUS_OK};
use slink_sdk::{AttributionSdk, AttributionSink, Credentials, StatusProbe};
use tokio::sync::mpsc;

use crate::config::{load_settings, Settings};
use crate::coordinator::{Attempt, InitSyncCoordinator};
use crate::event_bus::{EventBus, Observer, SubscriptionId};
use crate::router::LinkRouter;
use crate::store::{AttributionStore, FilePersistence};

pub struct Engine<S> {
    settings: Settings,
    credentials: Mutex<Credentials>,
    parser: LinkParser,
    sdk: Arc<S>,
    store: Arc<AttributionStore>,
    router: LinkRouter<S>,
    coordinator: Arc<InitSyncCoordinator<S>>,
    bus: Arc<EventBus<AuthState>>,
}

impl<S> Engine<S>
where
    S: AttributionSdk + AttributionSink + StatusProbe + 'static,
{
    pub fn new(settings: Settings, sdk: Arc<S>, store: Arc<AttributionStore>) -> Self {
        let bus = Arc::new(EventBus::new());
        let coordinator = Arc::new(InitSyncCoordinator::new(
            sdk.clone(),
            bus.clone(),
            settings.sync.timing(),
        ));

        Self {
            credentials: Mutex::new(settings.sdk.clone()),
            parser: settings.link.parser(),
            router: LinkRouter::new(sdk.clone(), store.clone()),
            settings,
            sdk,
            store,
            coordinator,
            bus,
        }
    }

    /// Engine for a project directory: settings from `.slink/config.toml`,
    /// attribution persisted to `.slink/attribution.toml` and restored now
    pub fn from_project(project_path: &Path, sdk: Arc<S>) -> Self {
        let settings = load_settings(project_path);
        let store = Arc::new(AttributionStore::with_persistence(Arc::new(
            FilePersistence::in_project(project_path),
        )));

        match store.restore_persisted() {
            Ok(true) => info!("Restored attribution token: '{}'", store.get().code),
            Ok(false) => debug!("No persisted attribution token"),
            Err(e) => warn!("Failed to restore attribution token: {}", e),
        }

        Self::new(settings, sdk, store)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn coordinator(&self) -> &Arc<InitSyncCoordinator<S>> {
        &self.coordinator
    }

    /// Credentials the next attempt will use
    pub fn credentials(&self) -> Credentials {
        self.credentials
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    // ─────────────────────────────────────────────────────────
    // SDK Initialization
    // ─────────────────────────────────────────────────────────

    /// Start an initialization attempt with the current credentials.
    ///
    /// Spawns the SDK `configure` call and the poll fallback for the new
    /// attempt, so it must be called inside a tokio runtime. Fails with
    /// [`Error::NotConfigured`] without starting an attempt when credentials
    /// are missing.
    pub fn initialize(&self) -> Result<Attempt> {
        let credentials = self.credentials();
        if !credentials.is_configured() {
            warn!("SDK credentials missing; skipping initialization");
            return Err(Error::NotConfigured);
        }

        let attempt = self.coordinator.begin_attempt();
        info!(
            "Configuring SDK for attempt {}: partner '{}', environment {}",
            attempt,
            credentials.partner_id,
            credentials.environment.display_name()
        );

        let sdk = self.sdk.clone();
        let store = self.store.clone();
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            match sdk.configure(&credentials).await {
                Ok(()) => {
                    let token = store.get();
                    if token.is_set() {
                        info!("Applying stored attribution token '{}'", token.code);
                        sdk.update_attribution(
                            Some(token.code.clone()),
                            token.expiry().map(str::to_string),
                        );
                    }
                    coordinator.report_result_for(attempt, true, STATUS_OK);
                }
                Err(e) => {
                    warn!("{}", e);
                    coordinator.report_result_for(attempt, false, e.reported_status());
                }
            }
        });

        self.coordinator.spawn_poll_timer(attempt);
        Ok(attempt)
    }

    /// Replace credentials and start a new attempt
    pub fn reconfigure(&self, credentials: Credentials) -> Result<Attempt> {
        debug!("Reconfiguring with {:?}", credentials);
        *self.credentials.lock().unwrap_or_else(|e| e.into_inner()) = credentials;
        self.initialize()
    }

    pub fn auth_state(&self) -> AuthState {
        self.coordinator.auth_state()
    }

    pub fn subscribe(&self, observer: impl Observer<AuthState> + 'static) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<AuthState>) {
        self.bus.subscribe_channel()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ─────────────────────────────────────────────────────────
    // Links & Attribution
    // ─────────────────────────────────────────────────────────

    /// Parse and route an inbound link. Links not addressed to us are ignored.
    pub fn handle_link(&self, raw: &str) -> RouteDecision {
        match self.parser.parse(raw) {
            Ok(link) => self.router.route(&link),
            Err(e) => {
                info!("Dropping link '{}': {}", raw, e);
                RouteDecision::Ignore
            }
        }
    }

    pub fn attribution(&self) -> AttributionToken {
        self.store.get()
    }

    /// Explicit reset from the configuration surface
    pub fn reset_attribution(&self) {
        self.store.reset();
    }
}
