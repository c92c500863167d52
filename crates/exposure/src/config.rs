//! CLI configuration: thin wrapper around `exposure_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--config,
//! --timeout and the per-service URL flags).

use std::path::PathBuf;

use exposure_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use exposure_config::{Config, config_path, load_config_from, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: --config, else the platform default.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load file + environment, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&active_path(global))?;

    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    let endpoints = &mut cfg.endpoints;
    for (flag, slot) in [
        (&global.settings_url, &mut endpoints.settings),
        (&global.keys_url, &mut endpoints.keys),
        (&global.upload_url, &mut endpoints.upload),
        (&global.analytics_url, &mut endpoints.analytics),
    ] {
        if flag.is_some() {
            slot.clone_from(flag);
        }
    }

    Ok(cfg)
}

/// Translate the effective config into the core's runtime config.
pub fn client_config(cfg: &Config) -> Result<ClientConfig, CliError> {
    Ok(cfg.to_client_config()?)
}
