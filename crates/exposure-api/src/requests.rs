// Concrete request descriptors, one constructor per backend endpoint.
//
// Every constructor takes the base URL explicitly so the caller decides
// which host serves what; paths, query, headers and body encoding are fixed
// here.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::Error;
use crate::models::faq::FaqList;
use crate::models::{
    AnalyticsBody, Configuration, DataUploadBody, Faq, KeysIndex, Otp, OtpValidationBody,
};
use crate::request::{
    CLIENT_CLOCK_HEADER, DUMMY_DATA_HEADER, Header, HttpRequest, RequestDescriptor, decode,
    decode_json,
};

pub const SETTINGS_PATH: &str = "/v1/settings";
pub const KEYS_INDEX_PATH: &str = "/v1/keys/index";
pub const KEYS_PATH: &str = "/v1/keys";
pub const OTP_VALIDATION_PATH: &str = "/v1/ingestion/check-otp";
pub const DATA_UPLOAD_PATH: &str = "/v1/ingestion/upload";
pub const ANALYTICS_PATH: &str = "/v1/operational-info";

/// Platform reported to the settings endpoint.
pub const PLATFORM: &str = "ios";

// ── Read-only endpoints ──────────────────────────────────────────────

/// Most current configuration for the app build `build_number`.
pub fn configuration(base_url: &Url, build_number: u32) -> RequestDescriptor<Configuration> {
    let request = HttpRequest::get(base_url.clone(), SETTINGS_PATH)
        .with_query("platform", PLATFORM)
        .with_query("build", build_number);
    RequestDescriptor::new(request, decode::json::<Configuration>)
}

/// FAQ list at an explicit location (the caller picks the locale). Pass the
/// full URL as `base_url` with an empty `path` to fetch it verbatim.
pub fn faq(base_url: &Url, path: &str) -> RequestDescriptor<Vec<Faq>> {
    fn unwrap_list(body: Bytes) -> Result<Vec<Faq>, Error> {
        decode_json::<FaqList>(&body).map(|list| list.faqs)
    }

    RequestDescriptor::new(HttpRequest::get(base_url.clone(), path), unwrap_list)
}

/// Manifest of the published key chunks.
pub fn keys_index(base_url: &Url) -> RequestDescriptor<KeysIndex> {
    RequestDescriptor::new(
        HttpRequest::get(base_url.clone(), KEYS_INDEX_PATH),
        decode::json::<KeysIndex>,
    )
}

/// One key chunk, returned as an opaque blob.
pub fn key_chunk(base_url: &Url, chunk_number: u64) -> RequestDescriptor<Bytes> {
    RequestDescriptor::new(
        HttpRequest::get(base_url.clone(), format!("{KEYS_PATH}/{chunk_number}")),
        decode::raw,
    )
}

// ── OTP-authorised endpoints ─────────────────────────────────────────

fn with_otp(request: HttpRequest, otp: &Otp, now: DateTime<Utc>) -> HttpRequest {
    request
        .with_header(Header::sensitive(
            "Authorization",
            format!("Bearer {}", otp.bearer_token()),
        ))
        .with_header(Header::new(CLIENT_CLOCK_HEADER, now.timestamp().to_string()))
}

/// Ask the backend whether `otp` is authorised. Success carries no payload.
pub fn otp_validation(
    base_url: &Url,
    otp: &Otp,
    now: DateTime<Utc>,
    body: &OtpValidationBody,
) -> Result<RequestDescriptor<()>, Error> {
    let request =
        with_otp(HttpRequest::post(base_url.clone(), OTP_VALIDATION_PATH), otp, now)
            .with_json_body(body)?;
    Ok(RequestDescriptor::new(request, decode::empty))
}

/// Upload diagnosis keys, authorised by a previously validated `otp`.
pub fn data_upload(
    base_url: &Url,
    body: &DataUploadBody,
    otp: &Otp,
    now: DateTime<Utc>,
) -> Result<RequestDescriptor<()>, Error> {
    let request = with_otp(HttpRequest::post(base_url.clone(), DATA_UPLOAD_PATH), otp, now)
        .with_json_body(body)?;
    Ok(RequestDescriptor::new(request, decode::empty))
}

// ── Analytics ────────────────────────────────────────────────────────

/// Operational-info report. `is_dummy` only sets the marker header; the
/// body is encoded identically either way.
pub fn analytics(
    base_url: &Url,
    body: &AnalyticsBody,
    is_dummy: bool,
) -> Result<RequestDescriptor<()>, Error> {
    let request = HttpRequest::post(base_url.clone(), ANALYTICS_PATH)
        .with_header(Header::new(DUMMY_DATA_HEADER, u8::from(is_dummy).to_string()))
        .with_json_body(body)?;
    Ok(RequestDescriptor::new(request, decode::empty))
}
