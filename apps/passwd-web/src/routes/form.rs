//! Self-service change form.
//!
//! GET / - Browser form that submits to `/api/password` and shows the result.

use axum::response::Html;

const INDEX_PAGE: &str = include_str!("../../static/index.html");

/// GET /
pub async fn form_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}
