//! Integration tests for the face recognition endpoint
//!
//! The router is driven in process with a recording fake provider, so no
//! network access or AWS credentials are needed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::error::{
    CONFIG_ERROR_MESSAGE, INVALID_IMAGE_MESSAGE, MISSING_IMAGE_MESSAGE, NO_MATCH_MESSAGE,
    PROCESSING_ERROR_MESSAGE,
};
use server::provider::FaceMatch;
use server::{
    build_router, FaceSearchProvider, ProviderConfig, ProviderSettings, SearchOutcome,
    SearchRequest, ServerConfig, ServerState,
};

// "hello" in base64; the fake provider never inspects the bytes.
const IMAGE_B64: &str = "aGVsbG8=";

struct FakeProvider {
    outcome: SearchOutcome,
    calls: Mutex<Vec<SearchRequest>>,
}

impl FakeProvider {
    fn returning(outcome: SearchOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<SearchRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaceSearchProvider for FakeProvider {
    async fn search_faces_by_image(
        &self,
        _settings: &ProviderSettings,
        request: SearchRequest,
    ) -> SearchOutcome {
        self.calls.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

fn complete_provider_config() -> ProviderConfig {
    ProviderConfig {
        region: Some("ap-northeast-1".into()),
        access_key_id: Some("AKIDEXAMPLE".into()),
        secret_access_key: Some("secret-value".into()),
        session_token: None,
        collection_id: Some("patient-faces".into()),
    }
}

fn app_with(provider: Arc<FakeProvider>, provider_config: ProviderConfig) -> Router {
    app_with_config(ServerConfig::default(), provider, provider_config)
}

fn app_with_config(
    config: ServerConfig,
    provider: Arc<FakeProvider>,
    provider_config: ProviderConfig,
) -> Router {
    let state = ServerState::new(config, provider_config, provider);
    build_router(Arc::new(state))
}

fn matched(face_id: &str) -> SearchOutcome {
    SearchOutcome::Matched(FaceMatch {
        face_id: face_id.into(),
        similarity: Some(99.5),
    })
}

async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/face-recognition")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

#[tokio::test]
async fn test_match_returns_face_id() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    let (status, body) = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "faceId": "abc123" }));
}

#[tokio::test]
async fn test_single_provider_call_with_fixed_limits() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].max_faces, 1);
    assert_eq!(calls[0].face_match_threshold, 95.0);
    assert_eq!(calls[0].collection_id, "patient-faces");
    assert_eq!(calls[0].image, b"hello".to_vec());
}

#[tokio::test]
async fn test_no_match_returns_404() {
    let provider = FakeProvider::returning(SearchOutcome::NoMatch);
    let app = app_with(provider.clone(), complete_provider_config());

    let (status, body) = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": NO_MATCH_MESSAGE }));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_invalid_payload_returns_400_without_provider_call() {
    let bodies = vec![
        json!({}),
        json!({ "base64Data": "" }),
        json!({ "base64Data": null }),
        json!({ "base64Data": 12345 }),
        json!({ "base64Data": ["aGVsbG8="] }),
        json!({ "imageSrc": IMAGE_B64 }),
    ];

    for body in bodies {
        let provider = FakeProvider::returning(matched("abc123"));
        let app = app_with(provider.clone(), complete_provider_config());

        let (status, response) = post_json(app, body.clone()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response["success"], json!(false));
        assert!(response["error"].is_string());
        assert!(provider.calls().is_empty(), "provider called for {body}");
    }
}

#[tokio::test]
async fn test_missing_field_message() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider, complete_provider_config());

    let (_, body) = post_json(app, json!({})).await;
    assert_eq!(body["error"], json!(MISSING_IMAGE_MESSAGE));
}

#[tokio::test]
async fn test_non_json_body_returns_400() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    let (status, body) = post_raw(app, "definitely not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_missing_config_returns_500_without_provider_call() {
    let strip: [fn(&mut ProviderConfig); 4] = [
        |c: &mut ProviderConfig| c.region = None,
        |c: &mut ProviderConfig| c.access_key_id = None,
        |c: &mut ProviderConfig| c.secret_access_key = None,
        |c: &mut ProviderConfig| c.collection_id = None,
    ];

    for remove in strip {
        let mut provider_config = complete_provider_config();
        remove(&mut provider_config);

        let provider = FakeProvider::returning(matched("abc123"));
        let app = app_with(provider.clone(), provider_config);

        let (status, body) = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": CONFIG_ERROR_MESSAGE }));
        assert!(!body.to_string().contains("secret-value"));
        assert!(provider.calls().is_empty());
    }
}

#[tokio::test]
async fn test_validation_runs_before_config_check() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider, ProviderConfig::default());

    let (status, _) = post_json(app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_invalid_format_returns_400() {
    let provider = FakeProvider::returning(SearchOutcome::InvalidImage(
        "InvalidImageFormatException: Request has invalid image format".into(),
    ));
    let app = app_with(provider, complete_provider_config());

    let (status, body) = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": INVALID_IMAGE_MESSAGE }));
}

#[tokio::test]
async fn test_undecodable_base64_returns_400_without_provider_call() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    let (status, body) = post_json(app, json!({ "base64Data": "%%%not-base64%%%" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!(INVALID_IMAGE_MESSAGE));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_zero_byte_image_returns_400_without_provider_call() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    let (status, body) =
        post_json(app, json!({ "base64Data": "data:image/png;base64," })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": INVALID_IMAGE_MESSAGE }));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_body_returns_413_json() {
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..ServerConfig::default()
    };
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with_config(config, provider.clone(), complete_provider_config());

    let image = "A".repeat(2 * 1024 * 1024);
    let (status, body) = post_json(app, json!({ "base64Data": image })).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("1MB"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_provider_failure_returns_generic_500() {
    let detail = "ResourceNotFoundException: collection patient-faces not found";
    let provider = FakeProvider::returning(SearchOutcome::Failed(detail.into()));
    let app = app_with(provider, complete_provider_config());

    let (status, body) = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "error": PROCESSING_ERROR_MESSAGE }));
    assert!(!body.to_string().contains("ResourceNotFoundException"));
    assert!(!body.to_string().contains("patient-faces"));
}

#[tokio::test]
async fn test_repeated_request_same_classification() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider.clone(), complete_provider_config());

    let first = post_json(app.clone(), json!({ "base64Data": IMAGE_B64 })).await;
    let second = post_json(app, json!({ "base64Data": IMAGE_B64 })).await;

    assert_eq!(first, second);
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn test_cors_preflight() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider, complete_provider_config());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/face-recognition")
        .header(header::ORIGIN, "https://clinic.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_ascii_uppercase();
    for method in ["GET", "POST", "PUT", "DELETE"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }

    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(allowed.contains("authorization"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider, complete_provider_config());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_unknown_route_returns_404_json() {
    let provider = FakeProvider::returning(matched("abc123"));
    let app = app_with(provider, complete_provider_config());

    let request = Request::builder()
        .uri("/does-not-exist")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
}
