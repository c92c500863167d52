#![allow(clippy::unwrap_used)]
// Integration tests for `NetworkManager` against an in-memory executor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

use exposure_api::{Error, HttpRequest};
use exposure_core::models::{
    AnalyticsBody, Configuration, DataUploadBody, ExposureNotificationStatus, Otp, PADDED_BODY_LEN, Province,
    PushNotificationStatus, TemporaryExposureKey, UserLanguage,
};
use exposure_core::{Dependencies, Endpoints, ErrorCode, NetworkManager, RequestExecutor};

// ── Stub executor ───────────────────────────────────────────────────

#[derive(Clone)]
enum Reply {
    Body(Bytes),
    Backend { status: u16, code: Option<i64> },
    Timeout,
}

#[derive(Default)]
struct StubExecutor {
    routes: Mutex<HashMap<String, (Duration, Reply)>>,
    recorded: Mutex<Vec<HttpRequest>>,
}

impl StubExecutor {
    fn route(&self, path: &str, delay: Duration, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_owned(), (delay, reply));
    }

    fn ok(&self, path: &str, body: impl Into<Bytes>) {
        self.route(path, Duration::ZERO, Reply::Body(body.into()));
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestExecutor for StubExecutor {
    async fn execute(&self, request: &HttpRequest) -> Result<Bytes, Error> {
        self.recorded.lock().unwrap().push(request.clone());
        let scripted = self.routes.lock().unwrap().get(request.path()).cloned();
        let Some((delay, reply)) = scripted else {
            return Err(Error::Api {
                status: 404,
                code: None,
                message: format!("no route for {}", request.path()),
            });
        };

        tokio::time::sleep(delay).await;
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Backend { status, code } => Err(Error::Api {
                status,
                code,
                message: "scripted failure".into(),
            }),
            Reply::Timeout => Err(Error::Timeout { timeout_secs: 30 }),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn setup() -> (Arc<StubExecutor>, NetworkManager) {
    let stub = Arc::new(StubExecutor::default());
    let clock = Arc::new(|| Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap());
    let endpoints = Endpoints::single(&Url::parse("https://backend.test").unwrap());
    let deps = Dependencies::new(stub.clone(), clock).with_endpoints(endpoints);
    (stub, NetworkManager::started(deps))
}

fn analytics_body() -> AnalyticsBody {
    AnalyticsBody::new(
        Province::from_code("FI").unwrap(),
        ExposureNotificationStatus::AuthorizedAndBluetoothOff,
        PushNotificationStatus::Provisional,
        true,
        b"token",
    )
}

// ── Wiring ──────────────────────────────────────────────────────────

#[tokio::test]
#[should_panic(expected = "start(with:) not called")]
async fn test_operation_before_start_panics() {
    let manager = NetworkManager::new();
    let _ = manager.get_keys_index().await;
}

#[test]
#[should_panic(expected = "start called twice")]
fn test_double_start_panics() {
    let (stub, manager) = setup();
    manager.start(Dependencies::new(stub, Arc::new(Utc::now)));
}

#[test]
fn test_two_phase_start() {
    let manager = NetworkManager::new();
    assert!(!manager.is_started());
    manager.start(Dependencies::new(
        Arc::new(StubExecutor::default()),
        Arc::new(Utc::now),
    ));
    assert!(manager.is_started());
}

// ── Configuration / FAQ / index ─────────────────────────────────────

/// A complete settings payload: every key from the defaults, then `overrides`.
fn configuration_body(overrides: serde_json::Value) -> Vec<u8> {
    let mut value = serde_json::to_value(Configuration::default()).unwrap();
    for (key, field) in overrides.as_object().unwrap() {
        value[key] = field.clone();
    }
    serde_json::to_vec(&value).unwrap()
}

#[tokio::test]
async fn test_get_configuration_decodes_stub_body() {
    let (stub, manager) = setup();
    stub.ok(
        "/v1/settings",
        configuration_body(json!({
            "minimum_build_version": 17,
            "exposure_configuration": {
                "attenuation_bucket_scores": [0, 5, 5, 5, 5, 5, 5, 5],
                "attenuation_weight": 1.0,
                "days_since_last_exposure_bucket_scores": [1, 1, 1, 1, 1, 1, 1, 1],
                "days_since_last_exposure_weight": 1.0,
                "duration_bucket_scores": [0, 0, 0, 0, 5, 5, 5, 5],
                "duration_weight": 1.0,
                "transmission_risk_bucket_scores": [1, 1, 1, 1, 1, 1, 1, 1],
                "transmission_risk_weight": 1.0,
                "minimum_risk_score": 20
            },
            "faq_url": { "en": "https://assets.example.com/faq-en.json" }
        })),
    );

    let config = manager.get_configuration(42).await.unwrap();

    assert_eq!(config.minimum_build_version(), 17);
    assert_eq!(config.exposure_configuration().minimum_risk_score, 20);
    assert_eq!(
        config.faq_urls()["en"].as_str(),
        "https://assets.example.com/faq-en.json"
    );
    assert_eq!(
        config.faq_url(UserLanguage::German).unwrap().as_str(),
        "https://assets.example.com/faq-en.json"
    );

    let requests = stub.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url().unwrap().as_str(),
        "https://backend.test/v1/settings?platform=ios&build=42"
    );
}

#[tokio::test]
async fn test_undecodable_configuration_is_unknown_error() {
    let (stub, manager) = setup();
    stub.ok("/v1/settings", "not json");
    assert_eq!(manager.get_configuration(1).await.unwrap_err(), ErrorCode::UnknownError);
}

#[tokio::test]
async fn test_error_shaped_success_body_is_unknown_error() {
    let (stub, manager) = setup();
    stub.ok(
        "/v1/settings",
        serde_json::to_vec(&json!({ "error_code": 1000, "message": "maintenance" })).unwrap(),
    );
    assert_eq!(manager.get_configuration(42).await.unwrap_err(), ErrorCode::UnknownError);

    stub.ok("/v1/settings", "{}");
    assert_eq!(manager.get_configuration(42).await.unwrap_err(), ErrorCode::UnknownError);
}

#[tokio::test]
async fn test_get_faq_uses_caller_location() {
    let (stub, manager) = setup();
    stub.ok(
        "/faq-it.json",
        r#"{"faqs":[{"title":"Cos'è?","content":"Un'app."}]}"#,
    );

    let base = Url::parse("https://cdn.test").unwrap();
    let faqs = manager.get_faq(&base, "/faq-it.json").await.unwrap();

    assert_eq!(faqs.len(), 1);
    assert_eq!(faqs[0].title, "Cos'è?");
    assert_eq!(stub.recorded()[0].base_url().as_str(), "https://cdn.test/");
}

#[tokio::test]
async fn test_keys_index_timeout_is_connection_error() {
    let (stub, manager) = setup();
    stub.route("/v1/keys/index", Duration::ZERO, Reply::Timeout);
    assert_eq!(
        manager.get_keys_index().await.unwrap_err(),
        ErrorCode::ConnectionError
    );
}

#[tokio::test]
async fn test_no_batches_surfaces_its_code() {
    let (stub, manager) = setup();
    stub.route(
        "/v1/keys/index",
        Duration::ZERO,
        Reply::Backend {
            status: 404,
            code: Some(1302),
        },
    );
    assert_eq!(
        manager.get_keys_index().await.unwrap_err(),
        ErrorCode::NoBatchesFound
    );
}

// ── Chunk batches ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_download_chunks_preserves_input_order() {
    let (stub, manager) = setup();
    // Later indexes finish first.
    for (n, delay) in [(3, 10), (1, 50), (2, 30), (7, 5)] {
        stub.route(
            &format!("/v1/keys/{n}"),
            Duration::from_millis(delay),
            Reply::Body(Bytes::from(format!("chunk-{n}"))),
        );
    }

    let chunks = manager.download_chunks(&[1, 2, 3, 7]).await.unwrap();
    let chunks: Vec<&[u8]> = chunks.iter().map(AsRef::as_ref).collect();
    assert_eq!(
        chunks,
        vec![&b"chunk-1"[..], &b"chunk-2"[..], &b"chunk-3"[..], &b"chunk-7"[..]]
    );

    let chunks = manager.download_chunks(&[7, 3, 1]).await.unwrap();
    assert_eq!(chunks[0].as_ref(), b"chunk-7");
    assert_eq!(chunks[1].as_ref(), b"chunk-3");
    assert_eq!(chunks[2].as_ref(), b"chunk-1");
}

#[tokio::test(start_paused = true)]
async fn test_download_chunks_runs_concurrently() {
    let (stub, manager) = setup();
    for n in 1..=4 {
        stub.route(
            &format!("/v1/keys/{n}"),
            Duration::from_secs(1),
            Reply::Body(Bytes::from_static(b"x")),
        );
    }

    let started = tokio::time::Instant::now();
    manager.download_chunks(&[1, 2, 3, 4]).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_failing_chunk_fails_the_whole_batch() {
    let (stub, manager) = setup();
    stub.ok("/v1/keys/1", "one");
    stub.route(
        "/v1/keys/2",
        Duration::from_millis(20),
        Reply::Backend {
            status: 404,
            code: Some(1301),
        },
    );
    stub.ok("/v1/keys/3", "three");

    let result = manager.download_chunks(&[1, 2, 3]).await;
    assert_eq!(result, Err(ErrorCode::BatchNotFound));
}

#[tokio::test]
async fn test_empty_batch_sends_nothing() {
    let (stub, manager) = setup();
    assert!(manager.download_chunks(&[]).await.unwrap().is_empty());
    assert!(stub.recorded().is_empty());
}

#[tokio::test]
async fn test_download_new_chunks_skips_known_ones() {
    let (stub, manager) = setup();
    stub.ok("/v1/keys/index", r#"{"oldest":1,"newest":4}"#);
    for n in 1..=4 {
        stub.ok(&format!("/v1/keys/{n}"), format!("chunk-{n}"));
    }

    let fresh = manager.download_new_chunks(Some(2)).await.unwrap();
    assert_eq!(
        fresh,
        vec![
            (3, Bytes::from_static(b"chunk-3")),
            (4, Bytes::from_static(b"chunk-4")),
        ]
    );

    let paths: Vec<String> = stub.recorded().iter().map(|r| r.path().to_owned()).collect();
    assert_eq!(paths[0], "/v1/keys/index");
    assert!(!paths.contains(&"/v1/keys/1".to_owned()));
}

#[tokio::test]
async fn test_download_new_chunks_up_to_date() {
    let (stub, manager) = setup();
    stub.ok("/v1/keys/index", r#"{"oldest":1,"newest":4}"#);

    assert!(manager.download_new_chunks(Some(4)).await.unwrap().is_empty());
    assert_eq!(stub.recorded().len(), 1);
}

#[tokio::test]
async fn test_unbounded_keys_index_is_rejected() {
    let (stub, manager) = setup();
    stub.ok(
        "/v1/keys/index",
        r#"{"oldest":0,"newest":18446744073709551615}"#,
    );

    assert_eq!(
        manager.download_new_chunks(None).await.unwrap_err(),
        ErrorCode::UnknownError
    );
    assert_eq!(manager.get_keys_index().await.unwrap_err(), ErrorCode::UnknownError);
    // only the two index requests went out
    assert_eq!(stub.recorded().len(), 2);
}

// ── OTP ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_validate_otp_uses_injected_clock() {
    let (stub, manager) = setup();
    stub.ok("/v1/ingestion/check-otp", Bytes::new());

    manager.validate_otp(&Otp::new("ABC").unwrap()).await.unwrap();

    let request = &stub.recorded()[0];
    assert_eq!(request.header("Immuni-Client-Clock"), Some("1591012800"));
    assert_eq!(
        request.header("Authorization"),
        Some("Bearer b5d4045c3f466fa91fe2cc6abe79232a1a57cdf104f7a26e716e0a1e2789df78")
    );
    assert_eq!(request.body().unwrap().len(), PADDED_BODY_LEN);
}

#[tokio::test]
async fn test_validate_otp_failure_codes() {
    let (stub, manager) = setup();
    stub.route(
        "/v1/ingestion/check-otp",
        Duration::ZERO,
        Reply::Backend {
            status: 409,
            code: Some(1400),
        },
    );
    assert_eq!(
        manager.validate_otp(&Otp::new("ABC").unwrap()).await,
        Err(ErrorCode::OtpAlreadyAuthorized)
    );
}

#[tokio::test]
async fn test_upload_data_is_padded_and_authorised() {
    let (stub, manager) = setup();
    stub.ok("/v1/ingestion/upload", Bytes::new());

    let body = DataUploadBody::new(
        vec![TemporaryExposureKey::new(&[7; 16], 2_650_000, 144)],
        "RM",
        Vec::new(),
    );
    manager
        .upload_data(body, &Otp::new("XYZ123").unwrap())
        .await
        .unwrap();

    let request = &stub.recorded()[0];
    assert_eq!(request.path(), "/v1/ingestion/upload");
    assert_eq!(request.body().unwrap().len(), PADDED_BODY_LEN);
    assert_eq!(request.header("Immuni-Client-Clock"), Some("1591012800"));

    let sent: serde_json::Value = serde_json::from_slice(request.body().unwrap()).unwrap();
    assert_eq!(sent["province"], "RM");
    assert_eq!(sent["teks"][0]["rolling_period"], 144);
}

// ── Analytics ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_dummy_and_real_analytics_differ_only_in_marker() {
    let (stub, manager) = setup();
    stub.ok("/v1/operational-info", Bytes::new());
    let body = analytics_body();

    manager.send_analytics(&body, true).await.unwrap();
    manager.send_analytics(&body, false).await.unwrap();

    let requests = stub.recorded();
    let (dummy, real) = (&requests[0], &requests[1]);

    assert_eq!(dummy.body(), real.body());
    assert_eq!(dummy.url().unwrap(), real.url().unwrap());
    assert_eq!(dummy.header("Immuni-Dummy-Data"), Some("1"));
    assert_eq!(real.header("Immuni-Dummy-Data"), Some("0"));

    let others = |r: &HttpRequest| {
        r.headers()
            .iter()
            .filter(|h| h.name() != "Immuni-Dummy-Data")
            .cloned()
            .collect::<Vec<_>>()
    };
    assert_eq!(others(dummy), others(real));
}

#[tokio::test]
async fn test_analytics_backend_rejection() {
    let (stub, manager) = setup();
    stub.route(
        "/v1/operational-info",
        Duration::ZERO,
        Reply::Backend {
            status: 400,
            code: Some(1002),
        },
    );
    assert_eq!(
        manager.send_analytics(&analytics_body(), false).await,
        Err(ErrorCode::BodyNotCompliant)
    );
}
