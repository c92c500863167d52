//! Configuration for the exposure CLI.
//!
//! A TOML file in the platform config directory, overlaid with `EXPOSURE_*`
//! environment variables, translated to `exposure_core::ClientConfig`.
//! Nested keys use a double underscore: `EXPOSURE_ENDPOINTS__KEYS`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use exposure_core::models::UserLanguage;
use exposure_core::{ClientConfig, Endpoints, TlsVerification};

pub const ENV_PREFIX: &str = "EXPOSURE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Build number reported to the settings endpoint.
    #[serde(default = "default_build_number")]
    pub build_number: u32,

    /// Language code used to pick the FAQ URL.
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Per-service base URL overrides.
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_number: default_build_number(),
            language: default_language(),
            timeout: default_timeout(),
            ca_cert: None,
            endpoints: EndpointOverrides::default(),
        }
    }
}

fn default_build_number() -> u32 {
    1
}
fn default_language() -> String {
    "en".into()
}
fn default_timeout() -> u64 {
    30
}

/// Base URLs to use instead of the production hosts. Unset entries keep
/// the production value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<String>,
}

impl EndpointOverrides {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, base: Endpoints) -> Result<Endpoints, ConfigError> {
        Ok(Endpoints {
            settings: parse_override("endpoints.settings", self.settings.as_deref(), base.settings)?,
            keys: parse_override("endpoints.keys", self.keys.as_deref(), base.keys)?,
            upload: parse_override("endpoints.upload", self.upload.as_deref(), base.upload)?,
            analytics: parse_override(
                "endpoints.analytics",
                self.analytics.as_deref(),
                base.analytics,
            )?,
        })
    }
}

fn parse_override(field: &str, raw: Option<&str>, fallback: Url) -> Result<Url, ConfigError> {
    let Some(raw) = raw else {
        return Ok(fallback);
    };
    Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("{e}: {raw}"),
    })
}

impl Config {
    pub fn language(&self) -> Result<UserLanguage, ConfigError> {
        self.language.parse().map_err(|_| ConfigError::Validation {
            field: "language".into(),
            reason: format!("expected 'en', 'it', or 'de', got '{}'", self.language),
        })
    }

    /// Build the runtime client configuration.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }

        let tls = match &self.ca_cert {
            Some(path) => TlsVerification::CustomCa(path.clone()),
            None => TlsVerification::SystemDefaults,
        };

        Ok(ClientConfig {
            endpoints: self.endpoints.apply(Endpoints::default())?,
            tls,
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "exposure", "exposure").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("exposure");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
