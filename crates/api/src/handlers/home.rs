//! Handler for the form page.

use axum::response::Html;

/// The form page, served verbatim.
pub const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
