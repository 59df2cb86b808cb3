//! Headless mode runner
//!
//! Runs one initialization attempt to its terminal state and emits NDJSON
//! events along the way. Logging goes to the log file only.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use slink_app::Engine;
use slink_core::prelude::*;
use slink_core::AuthState;
use slink_sdk::{Credentials, SimulatedBehavior, SimulatedSdk};

use super::HeadlessEvent;

/// What the headless run should simulate
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub behavior: SimulatedBehavior,
    /// Replaces the configured credentials when set
    pub credentials: Option<Credentials>,
    /// Routed in order right after the attempt starts
    pub links: Vec<String>,
}

/// Run in headless mode, writing events to stdout
pub async fn run_headless(project_path: &Path, options: HeadlessOptions) -> Result<AuthState> {
    let mut stdout = io::stdout();
    run_headless_to(project_path, options, &mut stdout).await
}

/// Run in headless mode, writing events to `out`. Returns the terminal state.
pub async fn run_headless_to<W: Write>(
    project_path: &Path,
    options: HeadlessOptions,
    out: &mut W,
) -> Result<AuthState> {
    info!("═══════════════════════════════════════════════════════");
    info!("slink starting in HEADLESS mode");
    info!("Project: {}", project_path.display());
    info!("═══════════════════════════════════════════════════════");

    let sdk = Arc::new(SimulatedSdk::new(options.behavior));
    let engine = Engine::from_project(project_path, sdk);

    // Subscribe before the attempt starts so the terminal event can't be missed
    let (_subscription, mut rx) = engine.subscribe_channel();

    let started = match options.credentials {
        Some(credentials) => engine.reconfigure(credentials),
        None => engine.initialize(),
    };
    let attempt = match started {
        Ok(attempt) => attempt,
        Err(e) => {
            HeadlessEvent::error(e.to_string(), true).write_to(out)?;
            return Err(e);
        }
    };

    let credentials = engine.credentials();
    HeadlessEvent::attempt_started(
        attempt.generation(),
        &credentials.partner_id,
        &credentials.environment.to_string(),
    )
    .write_to(out)?;

    for link in &options.links {
        let route = engine.handle_link(link);
        HeadlessEvent::link_routed(link, route).write_to(out)?;
    }

    let state = rx.recv().await.ok_or(Error::ChannelClosed)?;
    if let Some(event) = HeadlessEvent::auth_resolved(attempt.generation(), &state) {
        event.write_to(out)?;
    }

    info!("slink headless mode exiting: {}", state);
    Ok(state)
}
