//! Last-known attribution token
//!
//! The store keeps the token in memory and writes it through to an injected
//! [`AttributionPersistence`]. Persistence problems are logged and never
//! interrupt routing.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use fs2::FileExt;
use slink_core::prelude::*;
use slink_core::AttributionToken;

use crate::config::SLINK_DIR;

/// Attribution file name inside `.slink/`
pub const ATTRIBUTION_FILENAME: &str = "attribution.toml";

/// Durable storage for the attribution token, owned by the caller
pub trait AttributionPersistence: Send + Sync {
    /// `None` when nothing has been stored
    fn load(&self) -> Result<Option<AttributionToken>>;

    fn save(&self, token: &AttributionToken) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────
// File Persistence
// ─────────────────────────────────────────────────────────────────

/// Stores the token as TOML, by default in `.slink/attribution.toml`
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_project(project_path: &Path) -> Self {
        Self::new(project_path.join(SLINK_DIR).join(ATTRIBUTION_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttributionPersistence for FilePersistence {
    fn load(&self) -> Result<Option<AttributionToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        let token = toml::from_str(&content).map_err(|e| {
            Error::persistence(format!("Failed to parse {:?}: {}", self.path, e))
        })?;
        Ok(Some(token))
    }

    fn save(&self, token: &AttributionToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::persistence(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        let content = toml::to_string_pretty(token)
            .map_err(|e| Error::persistence(format!("Failed to serialize token: {}", e)))?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::persistence(format!("Failed to open {:?}: {}", self.path, e)))?;

        // Lock is released when file is dropped
        file.lock_exclusive()
            .map_err(|e| Error::persistence(format!("Failed to lock {:?}: {}", self.path, e)))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        debug!("Saved attribution token to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Attribution Store
// ─────────────────────────────────────────────────────────────────

/// Holds the last known attribution code and expiry
#[derive(Default)]
pub struct AttributionStore {
    token: RwLock<AttributionToken>,
    persistence: Option<Arc<dyn AttributionPersistence>>,
}

impl AttributionStore {
    /// In-memory store with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persistence(persistence: Arc<dyn AttributionPersistence>) -> Self {
        Self {
            token: RwLock::new(AttributionToken::default()),
            persistence: Some(persistence),
        }
    }

    pub fn get(&self) -> AttributionToken {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Overwrite the token and write it through
    pub fn set(&self, code: impl Into<String>, expiry: impl Into<String>) {
        let token = AttributionToken::new(code, expiry);
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token.clone();
        info!("Attribution token set: code='{}'", token.code);

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&token) {
                warn!("Failed to persist attribution token: {}", e);
            }
        }
    }

    /// Replace the in-memory token with a previously persisted value
    pub fn restore(&self, token: AttributionToken) {
        debug!("Restoring attribution token: code='{}'", token.code);
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    /// Load the token from persistence. Returns true if one was found.
    pub fn restore_persisted(&self) -> Result<bool> {
        let Some(persistence) = &self.persistence else {
            return Ok(false);
        };

        match persistence.load()? {
            Some(token) => {
                self.restore(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clear memory and persistence
    pub fn reset(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = AttributionToken::default();
        info!("Attribution token reset");

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.clear() {
                warn!("Failed to clear persisted attribution token: {}", e);
            }
        }
    }
}
