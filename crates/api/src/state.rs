use std::sync::Arc;

use predmaint_core::inference::InferenceService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Loaded classifier and preprocessor; read-only once loaded.
    pub service: Arc<InferenceService>,
}
