use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(handlers::prediction::predict))
}
