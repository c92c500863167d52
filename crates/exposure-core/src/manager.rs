// ── Network manager ──
//
// Façade over the request executor. Each operation builds its descriptor,
// dispatches it through the injected executor, and folds any failure into
// an `ErrorCode`. The manager keeps no cache and no per-request state.

use std::sync::OnceLock;

use bytes::Bytes;
use exposure_api::models::{
    AnalyticsBody, Configuration, DataUploadBody, Faq, KeysIndex, Otp, OtpValidationBody,
    PADDED_BODY_LEN,
};
use exposure_api::{RequestDescriptor, requests};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::batch::join_ordered;
use crate::dependencies::Dependencies;
use crate::error::ErrorCode;

/// Entry point for every backend operation.
///
/// Two-phase: build with [`new`](Self::new), then inject collaborators
/// exactly once with [`start`](Self::start). Calling an operation before
/// `start` is a wiring bug and panics. [`started`](Self::started) does both
/// steps at once.
#[derive(Debug, Default)]
pub struct NetworkManager {
    dependencies: OnceLock<Dependencies>,
}

impl NetworkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager that is usable right away.
    pub fn started(dependencies: Dependencies) -> Self {
        let manager = Self::new();
        manager.start(dependencies);
        manager
    }

    /// Inject the executor, clock and endpoints.
    ///
    /// # Panics
    ///
    /// If called more than once.
    pub fn start(&self, dependencies: Dependencies) {
        if self.dependencies.set(dependencies).is_err() {
            error!("NetworkManager::start called twice");
            panic!("NetworkManager::start called twice");
        }
    }

    pub fn is_started(&self) -> bool {
        self.dependencies.get().is_some()
    }

    fn dependencies(&self) -> &Dependencies {
        let Some(dependencies) = self.dependencies.get() else {
            error!("NetworkManager used before start(with:) was called");
            panic!("start(with:) not called");
        };
        dependencies
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Execute one descriptor and decode its response.
    pub async fn request<R>(&self, descriptor: RequestDescriptor<R>) -> Result<R, ErrorCode> {
        let dependencies = self.dependencies();
        let request = descriptor.request();
        debug!(method = %request.method(), base = %request.base_url(), path = request.path(), "dispatching request");

        let body = dependencies
            .executor()
            .execute(request)
            .await
            .map_err(|e| {
                let status = e.status();
                let code = ErrorCode::from(e);
                warn!(path = request.path(), ?status, code = code.code(), "request failed: {code}");
                code
            })?;
        trace!(path = request.path(), bytes = body.len(), "response received");

        descriptor.decode(body).map_err(|e| {
            warn!(path = request.path(), "undecodable response: {e}");
            ErrorCode::from(e)
        })
    }

    // ── Read-only operations ─────────────────────────────────────────

    /// Most current configuration for the app build `build_number`.
    pub async fn get_configuration(&self, build_number: u32) -> Result<Configuration, ErrorCode> {
        let base = &self.dependencies().endpoints().settings;
        self.request(requests::configuration(base, build_number)).await
    }

    /// FAQ list at a caller-chosen location, typically one per language.
    pub async fn get_faq(&self, base_url: &Url, path: &str) -> Result<Vec<Faq>, ErrorCode> {
        self.request(requests::faq(base_url, path)).await
    }

    pub async fn get_keys_index(&self) -> Result<KeysIndex, ErrorCode> {
        let base = &self.dependencies().endpoints().keys;
        self.request(requests::keys_index(base)).await
    }

    /// Download the chunks numbered `indexes` concurrently.
    ///
    /// `result[i]` is the chunk for `indexes[i]`. If any download fails the
    /// whole batch fails with that error.
    pub async fn download_chunks(&self, indexes: &[u64]) -> Result<Vec<Bytes>, ErrorCode> {
        let base = &self.dependencies().endpoints().keys;
        debug!(count = indexes.len(), "downloading key chunks");
        join_ordered(
            indexes
                .iter()
                .map(|&index| self.request(requests::key_chunk(base, index))),
        )
        .await
    }

    /// Fetch the index, then every chunk newer than `last_downloaded`,
    /// paired with its number, oldest first.
    pub async fn download_new_chunks(
        &self,
        last_downloaded: Option<u64>,
    ) -> Result<Vec<(u64, Bytes)>, ErrorCode> {
        let index = self.get_keys_index().await?;
        let pending = index.chunks_after(last_downloaded);
        if pending.is_empty() {
            debug!(?last_downloaded, newest = index.newest, "no new key chunks");
            return Ok(Vec::new());
        }

        let chunks = self.download_chunks(&pending).await?;
        Ok(pending.into_iter().zip(chunks).collect())
    }

    // ── OTP-authorised operations ────────────────────────────────────

    /// Ask the backend to authorise `otp`.
    pub async fn validate_otp(&self, otp: &Otp) -> Result<(), ErrorCode> {
        let dependencies = self.dependencies();
        let body = OtpValidationBody::padded(PADDED_BODY_LEN, &mut rand::rng())?;
        let descriptor = requests::otp_validation(
            &dependencies.endpoints().upload,
            otp,
            dependencies.now(),
            &body,
        )?;
        self.request(descriptor).await
    }

    /// Upload diagnosis data authorised by a previously validated `otp`.
    pub async fn upload_data(&self, body: DataUploadBody, otp: &Otp) -> Result<(), ErrorCode> {
        let dependencies = self.dependencies();
        let body = body.padded(PADDED_BODY_LEN, &mut rand::rng())?;
        debug!(keys = body.teks.len(), "uploading diagnosis data");
        let descriptor = requests::data_upload(
            &dependencies.endpoints().upload,
            &body,
            otp,
            dependencies.now(),
        )?;
        self.request(descriptor).await
    }

    // ── Analytics ────────────────────────────────────────────────────

    /// Post an operational-info report. `is_dummy` only flips the marker
    /// header.
    pub async fn send_analytics(&self, body: &AnalyticsBody, is_dummy: bool) -> Result<(), ErrorCode> {
        let base = &self.dependencies().endpoints().analytics;
        debug!(is_dummy, "sending analytics");
        self.request(requests::analytics(base, body, is_dummy)?).await
    }
}
