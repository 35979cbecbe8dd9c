#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use predmaint_api::config::ServerConfig;
use predmaint_api::router::build_app_router;
use predmaint_api::state::AppState;
use predmaint_core::classifier::{ClassProbabilities, Classifier};
use predmaint_core::error::CoreError;
use predmaint_core::features::{CategoricalDefaults, FeatureRecord};
use predmaint_core::inference::InferenceService;
use predmaint_core::preprocessing::Preprocessor;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: fixture_path("best_model.json"),
        preprocessor_path: fixture_path("preprocessor.json"),
        cors_origins: vec!["http://localhost:5000".to_string()],
        request_timeout_secs: 30,
        categorical_defaults: CategoricalDefaults::default(),
    }
}

/// Path to a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Build the full application router around the given service, through the
/// same builder `main.rs` uses.
pub fn build_test_app(service: Arc<InferenceService>) -> Router {
    build_app_router(AppState { service }, &test_config())
}

/// A service with no artifacts installed.
pub fn unloaded_service() -> Arc<InferenceService> {
    Arc::new(InferenceService::default())
}

/// A service with an identity preprocessor and a classifier that always
/// returns `probability` for the failure class.
pub fn mock_service(probability: f64) -> Arc<InferenceService> {
    let service = InferenceService::default();
    service
        .install(IdentityPreprocessor, FixedClassifier(probability))
        .unwrap();
    Arc::new(service)
}

/// A service loaded from the artifacts in `tests/fixtures`.
pub async fn fixture_service() -> Arc<InferenceService> {
    let service = InferenceService::default();
    service
        .load(
            fixture_path("best_model.json"),
            fixture_path("preprocessor.json"),
        )
        .await
        .unwrap();
    Arc::new(service)
}

/// Passes the five numeric cells through unchanged.
pub struct IdentityPreprocessor;

impl Preprocessor for IdentityPreprocessor {
    fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, CoreError> {
        Ok(record.numeric_values().to_vec())
    }
}

/// Always returns the same failure probability.
pub struct FixedClassifier(pub f64);

impl Classifier for FixedClassifier {
    fn predict_proba(&self, _features: &[f64]) -> Result<ClassProbabilities, CoreError> {
        Ok([1.0 - self.0, self.0])
    }
}

/// The reference request body used throughout the tests.
pub fn sample_readings() -> serde_json::Value {
    serde_json::json!({
        "Air temperature [K]": 300.0,
        "Process temperature [K]": 310.0,
        "Rotational speed [rpm]": 1500.0,
        "Torque [Nm]": 40.0,
        "Tool wear [min]": 10.0
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
