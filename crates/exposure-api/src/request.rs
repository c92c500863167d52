// Typed request descriptors.
//
// A descriptor is pure data: method, base URL, path, query, ordered headers,
// an already-encoded body, and the rule that turns the response bytes into a
// typed value. Building one performs no I/O, so tests can assert on it
// directly without a network.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

pub use reqwest::Method;

/// `Content-Type` sent on every request.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

/// Marks analytics traffic as dummy (`1`) or real (`0`).
pub const DUMMY_DATA_HEADER: &str = "Immuni-Dummy-Data";

/// Client-side unix timestamp attached to OTP-authorised requests.
pub const CLIENT_CLOCK_HEADER: &str = "Immuni-Client-Clock";

// ── Header ───────────────────────────────────────────────────────────

/// One request header. Sensitive values are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
    sensitive: bool,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// A header whose value must never show up in logs.
    pub fn sensitive(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sensitive: true,
            ..Self::new(name, value)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.sensitive { "[REDACTED]" } else { &self.value };
        write!(f, "{}: {value}", self.name)
    }
}

// ── HttpRequest ──────────────────────────────────────────────────────

/// The untyped half of a descriptor: everything the executor needs to put
/// bytes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: Method,
    base_url: Url,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<Header>,
    body: Option<Bytes>,
}

impl HttpRequest {
    /// Start a request. The JSON content type is always the first header.
    pub fn new(method: Method, base_url: Url, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url,
            path: path.into(),
            query: Vec::new(),
            headers: vec![Header::new("Content-Type", CONTENT_TYPE_JSON)],
            body: None,
        }
    }

    pub fn get(base_url: Url, path: impl Into<String>) -> Self {
        Self::new(Method::GET, base_url, path)
    }

    pub fn post(base_url: Url, path: impl Into<String>) -> Self {
        Self::new(Method::POST, base_url, path)
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Encode `body` as JSON and attach it.
    pub fn with_json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        let encoded = serde_json::to_vec(body).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// First header matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(Header::value)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Full URL: `path` is appended to the base URL's own path, then the
    /// query pairs are added in insertion order. An empty `path` addresses
    /// the base URL itself, query string included.
    pub fn url(&self) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let path = self.path.trim_start_matches('/');
        if !path.is_empty() {
            let base_path = url.path().trim_end_matches('/').to_owned();
            url.set_path(&format!("{base_path}/{path}"));
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

// ── Decoders ─────────────────────────────────────────────────────────

/// Turns raw response bytes into the descriptor's response type.
pub type Decoder<R> = fn(Bytes) -> Result<R, Error>;

/// Stock decoders for the three response shapes the backend uses.
pub mod decode {
    use bytes::Bytes;
    use serde::de::DeserializeOwned;

    use crate::error::Error;

    /// Decode a JSON document.
    pub fn json<T: DeserializeOwned>(body: Bytes) -> Result<T, Error> {
        super::decode_json(&body)
    }

    /// Keep the body as an opaque blob.
    #[allow(clippy::unnecessary_wraps)]
    pub fn raw(body: Bytes) -> Result<Bytes, Error> {
        Ok(body)
    }

    /// Discard whatever the backend returned.
    #[allow(clippy::unnecessary_wraps, clippy::needless_pass_by_value)]
    pub fn empty(_body: Bytes) -> Result<(), Error> {
        Ok(())
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        let text = String::from_utf8_lossy(body).into_owned();
        let preview: String = text.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: text,
        }
    })
}

// ── RequestDescriptor ────────────────────────────────────────────────

/// A typed, immutable description of one HTTP call.
///
/// Each concrete request (configuration, FAQ, keys index, chunk, OTP
/// validation, upload, analytics) is a value of this shape with its own
/// response type `R`.
pub struct RequestDescriptor<R> {
    request: HttpRequest,
    decoder: Decoder<R>,
}

impl<R> RequestDescriptor<R> {
    pub fn new(request: HttpRequest, decoder: Decoder<R>) -> Self {
        Self { request, decoder }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Apply the response rule to a successful body.
    pub fn decode(&self, body: Bytes) -> Result<R, Error> {
        (self.decoder)(body)
    }
}

impl<R> Clone for RequestDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            decoder: self.decoder,
        }
    }
}

impl<R> fmt::Debug for RequestDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("request", &self.request)
            .field("response", &std::any::type_name::<R>())
            .finish()
    }
}
