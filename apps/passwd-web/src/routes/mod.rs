//! HTTP routes.

pub mod form;
pub mod health;
pub mod password;

use axum::{
    http::StatusCode,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the application router.
///
/// `/api/password` is not under the request timeout. A pass is bounded by
/// each backend's step timeouts and must be answered with its real result.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let bounded = Router::new()
        .route("/", get(form::form_handler))
        .route("/health", get(health::health_handler))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(map_response(render_timeout));

    Router::new()
        .route("/api/password", post(password::change_password_handler))
        .merge(bounded)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.max_body_size_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Give `TimeoutLayer`'s empty 408 the same JSON body as other failures.
async fn render_timeout(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(password::PasswordChangeResponse::error(
            "system_error",
            password::MSG_SYSTEM_ERROR,
        )),
    )
        .into_response()
}
