// Request execution.
//
// `RequestExecutor` is the seam between the typed request layer and actual
// network I/O. `HttpExecutor` is the production implementation on top of
// reqwest; tests substitute their own.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::request::HttpRequest;
use crate::transport::TransportConfig;

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

// ── Trait ────────────────────────────────────────────────────────────

/// Performs exactly one network call per invocation.
///
/// Implementations apply the request's headers in order, send its body
/// untouched, and return the raw success body. Any non-success outcome is
/// an [`Error`]; decoding into a typed response is the descriptor's job.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<Bytes, Error>;
}

// ── HttpExecutor ─────────────────────────────────────────────────────

/// reqwest-backed executor.
pub struct HttpExecutor {
    http: reqwest::Client,
    timeout_secs: u64,
}

impl HttpExecutor {
    /// Build from a transport config.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    fn builder(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, Error> {
        let url = request.url()?;
        let mut builder = self.http.request(request.method().clone(), url);

        for header in request.headers() {
            let mut value = reqwest::header::HeaderValue::from_str(header.value())
                .map_err(|e| Error::Serialization(format!("invalid header {}: {e}", header.name())))?;
            value.set_sensitive(header.is_sensitive());
            builder = builder.header(header.name(), value);
        }

        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        Ok(builder)
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let error = if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                code: err.error_code,
                message: err.message.unwrap_or_else(|| status.to_string()),
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                code: None,
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            }
        };

        warn!(status = status.as_u16(), code = ?error.backend_code(), "backend rejected request");
        error
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &HttpRequest) -> Result<Bytes, Error> {
        let builder = self.builder(request)?;
        debug!(method = %request.method(), path = request.path(), "sending request");

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.bytes().await?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(body)
    }
}
