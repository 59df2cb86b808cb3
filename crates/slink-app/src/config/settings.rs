//! Settings loading and saving for `.slink/config.toml`

use std::path::Path;

use slink_core::prelude::*;

use super::types::Settings;

/// Per-project configuration directory
pub const SLINK_DIR: &str = ".slink";

pub const CONFIG_FILENAME: &str = "config.toml";

/// Overrides `[sdk] partner_id` when set and non-empty
pub const PARTNER_ID_ENV_VAR: &str = "SLINK_PARTNER_ID";

/// Overrides `[sdk] token` when set and non-empty
pub const TOKEN_ENV_VAR: &str = "SLINK_TOKEN";

// ─────────────────────────────────────────────────────────────────────────────
// Settings Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from .slink/config.toml, then apply environment overrides
///
/// Falls back to default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> Settings {
    let mut settings = load_settings_file(project_path);
    apply_env_overrides(&mut settings);
    settings
}

fn load_settings_file(project_path: &Path) -> Settings {
    let config_path = project_path.join(SLINK_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Replace credentials from `SLINK_PARTNER_ID` / `SLINK_TOKEN` when set
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(partner_id) = non_empty_env(PARTNER_ID_ENV_VAR) {
        debug!("Partner id overridden from {}", PARTNER_ID_ENV_VAR);
        settings.sdk.partner_id = partner_id;
    }
    if let Some(token) = non_empty_env(TOKEN_ENV_VAR) {
        debug!("Token overridden from {}", TOKEN_ENV_VAR);
        settings.sdk.token = token;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Create default config file in .slink/ directory
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let slink_dir = project_path.join(SLINK_DIR);

    if !slink_dir.exists() {
        std::fs::create_dir_all(&slink_dir)
            .map_err(|e| Error::config(format!("Failed to create .slink dir: {}", e)))?;
    }

    let config_path = slink_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# slink Configuration

[link]
scheme = "saucelinktest"   # Custom URL scheme
host = "saucelink"         # Fixed authority after the scheme
universal_hosts = []       # https hosts accepted as universal links

[sdk]
# Credentials can also come from SLINK_PARTNER_ID / SLINK_TOKEN
partner_id = ""
token = ""
environment = "stage"      # stage | prod

[sync]
poll_delay_ms = 1000       # First status poll after initialization starts
poll_interval_ms = 1000    # Repeat while still unresolved
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(())
}

/// Save settings to .slink/config.toml
///
/// Uses atomic write (temp file + rename) for safety.
pub fn save_settings(project_path: &Path, settings: &Settings) -> Result<()> {
    let slink_dir = project_path.join(SLINK_DIR);

    if !slink_dir.exists() {
        std::fs::create_dir_all(&slink_dir)
            .map_err(|e| Error::config(format!("Failed to create .slink dir: {}", e)))?;
    }

    let config_path = slink_dir.join(CONFIG_FILENAME);
    let temp_path = slink_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("# slink Configuration\n\n{}", content);

    // Atomic write: write to temp, then rename
    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}
