// Collaborators injected into a `NetworkManager`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use exposure_api::{HttpExecutor, RequestExecutor};

use crate::config::{ClientConfig, Endpoints};

/// Source of the current time. OTP-authorised requests stamp it into a header.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Executor, clock, and the endpoints requests are addressed to.
///
/// Read-only once handed to `NetworkManager::start`; cloning shares the same
/// executor and clock.
#[derive(Clone)]
pub struct Dependencies {
    executor: Arc<dyn RequestExecutor>,
    now: Clock,
    endpoints: Endpoints,
}

impl Dependencies {
    /// Wire an arbitrary executor and clock against the production endpoints.
    pub fn new(executor: Arc<dyn RequestExecutor>, now: Clock) -> Self {
        Self {
            executor,
            now,
            endpoints: Endpoints::default(),
        }
    }

    /// reqwest executor and the system clock, configured from `config`.
    pub fn http(config: &ClientConfig) -> Result<Self, exposure_api::Error> {
        let executor = HttpExecutor::new(&config.transport())?;
        Ok(Self::new(Arc::new(executor), Arc::new(Utc::now)).with_endpoints(config.endpoints.clone()))
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn executor(&self) -> &dyn RequestExecutor {
        self.executor.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
