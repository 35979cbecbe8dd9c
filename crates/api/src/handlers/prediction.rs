//! Handler for scoring sensor readings.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use predmaint_core::prediction::PredictionResult;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /predict
///
/// Takes the raw body rather than `Json<_>` so malformed JSON, missing
/// fields, and non-numeric values all produce the same `{error, code}` shape.
/// A body that cannot be buffered at all (over the size limit) keeps its
/// rejection status but is reported in that shape too.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<PredictionResult>> {
    let body = body?;
    let result = state.service.predict_json(&body)?;
    Ok(Json(result))
}
