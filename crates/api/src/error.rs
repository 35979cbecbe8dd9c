use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use predmaint_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and maps each kind to its own status code.
/// Implements [`IntoResponse`] to produce consistent `{error, code}` JSON
/// bodies; the `error` key is what the form page checks for.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `predmaint_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body could not be read (too large, aborted, ...).
    #[error(transparent)]
    Body(#[from] BytesRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::NotReady => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_NOT_READY",
                    core.to_string(),
                ),
                CoreError::Inference(msg) => {
                    tracing::error!(error = %msg, "Error in predict route");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INFERENCE_ERROR",
                        msg.clone(),
                    )
                }
                CoreError::Artifact { .. } => {
                    tracing::error!(error = %core, "Artifact error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ARTIFACT_ERROR",
                        "Model artifacts are unavailable".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Extractor rejections ---
            AppError::Body(rejection) => {
                let status = rejection.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, rejection.body_text())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
