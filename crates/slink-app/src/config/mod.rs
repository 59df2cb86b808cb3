//! Configuration file parsing for slink
//!
//! Supports:
//! - `.slink/config.toml` - Link scheme, SDK credentials, and poll timing
//! - `SLINK_PARTNER_ID` / `SLINK_TOKEN` - Credential overrides from the environment

pub mod settings;
pub mod types;

pub use settings::{
    apply_env_overrides, init_config_dir, load_settings, save_settings, CONFIG_FILENAME,
    PARTNER_ID_ENV_VAR, SLINK_DIR, TOKEN_ENV_VAR,
};
pub use types::*;
