// ── Runtime client configuration ──
//
// These types describe *where* the backend lives and *how* to reach it.
// They never touch disk: the CLI (or any embedding app) builds a
// `ClientConfig` and hands it to `Dependencies::http`.

use std::path::PathBuf;
use std::time::Duration;

use exposure_api::{TlsMode, TransportConfig};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_SETTINGS_URL: &str = "https://get.immuni.gov.it";
pub const DEFAULT_KEYS_URL: &str = "https://get.immuni.gov.it";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.immuni.gov.it";
pub const DEFAULT_ANALYTICS_URL: &str = "https://analytics.immuni.gov.it";

fn production(url: &str) -> Url {
    Url::parse(url).expect("production base URLs are valid")
}

/// Base URL for each backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Serves `/v1/settings`.
    pub settings: Url,
    /// Serves the key index and key chunks.
    pub keys: Url,
    /// Serves OTP validation and diagnosis upload.
    pub upload: Url,
    /// Serves operational-info reports.
    pub analytics: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            settings: production(DEFAULT_SETTINGS_URL),
            keys: production(DEFAULT_KEYS_URL),
            upload: production(DEFAULT_UPLOAD_URL),
            analytics: production(DEFAULT_ANALYTICS_URL),
        }
    }
}

impl Endpoints {
    /// Every service behind one host. Handy for local stacks and tests.
    pub fn single(base: &Url) -> Self {
        Self {
            settings: base.clone(),
            keys: base.clone(),
            upload: base.clone(),
            analytics: base.clone(),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additionally trust the CA certificate in this PEM file.
    CustomCa(PathBuf),
}

/// Everything needed to talk to one backend deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Translate into the api crate's transport settings.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
