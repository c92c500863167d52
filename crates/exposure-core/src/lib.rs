//! Orchestration layer between `exposure-api` and its consumers.
//!
//! - **[`NetworkManager`]**: façade turning domain operations (configuration,
//!   FAQ, key index, chunk download, OTP validation, upload, analytics) into
//!   request descriptors and dispatching them through the injected executor.
//! - **[`Dependencies`]**: executor, clock and endpoints, injected once.
//! - **[`ErrorCode`]**: the closed failure taxonomy every operation reports.
//! - **[`DummyAnalyticsGenerator`]**: randomised analytics bodies that are
//!   indistinguishable from real ones on the wire.

pub mod batch;
pub mod config;
pub mod dependencies;
pub mod dummy;
pub mod error;
pub mod manager;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::join_ordered;
pub use config::{ClientConfig, Endpoints, TlsVerification};
pub use dependencies::{Clock, Dependencies};
pub use dummy::{DummyAnalyticsGenerator, next_dummy_delay};
pub use error::{ErrorCode, UnknownErrorCode};
pub use manager::NetworkManager;

// Wire types callers need to drive the manager.
pub use exposure_api::models;
pub use exposure_api::{RequestDescriptor, RequestExecutor};
