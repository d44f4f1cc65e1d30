//! Password change endpoint handler.
//!
//! POST /api/password - Change the caller's password on every configured directory.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use passwd_orchestrator::{ChangeRequest, ChangeResult, ChangeStatus, ResultCategory};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const MSG_CHANGED: &str = "Password has been changed";
pub const MSG_CONFIRMATION_MISMATCH: &str = "Password doesn't match the confirmation!";
pub const MSG_BAD_CREDENTIALS: &str = "Username or password is incorrect!";
pub const MSG_POLICY_VIOLATION: &str = "Password does not meet the password policy";
pub const MSG_SYSTEM_ERROR: &str = "Password change failed, try again or contact an administrator";

/// Password change form.
#[derive(Deserialize)]
pub struct PasswordChangeBody {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordChangeBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChangeBody")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Response body. Never carries backend names, DNs or directory messages.
#[derive(Debug, Serialize)]
pub struct PasswordChangeResponse {
    pub status: &'static str,
    pub category: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl PasswordChangeResponse {
    pub(crate) fn error(category: &'static str, message: &'static str) -> Self {
        Self {
            status: "error",
            category,
            message,
            violations: Vec::new(),
        }
    }
}

/// Map an orchestrator result to what the user is allowed to see.
pub fn render_result(result: &ChangeResult) -> (StatusCode, PasswordChangeResponse) {
    match result.category() {
        ResultCategory::Success => (
            StatusCode::OK,
            PasswordChangeResponse {
                status: "success",
                category: "success",
                message: MSG_CHANGED,
                violations: Vec::new(),
            },
        ),
        ResultCategory::PolicyViolation => (
            StatusCode::UNPROCESSABLE_ENTITY,
            PasswordChangeResponse {
                violations: result.violations.iter().map(ToString::to_string).collect(),
                ..PasswordChangeResponse::error("policy_violation", MSG_POLICY_VIOLATION)
            },
        ),
        ResultCategory::BadOldPassword => (
            StatusCode::UNAUTHORIZED,
            PasswordChangeResponse::error("bad_old_password", MSG_BAD_CREDENTIALS),
        ),
        ResultCategory::SystemError => {
            let status = if result.status == ChangeStatus::Inconsistent {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            (
                status,
                PasswordChangeResponse::error("system_error", MSG_SYSTEM_ERROR),
            )
        }
    }
}

/// Handle a password change request.
pub async fn change_password_handler(
    State(state): State<AppState>,
    payload: Result<Json<PasswordChangeBody>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PasswordChangeResponse>)> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest {
        message: rejection.body_text(),
    })?;
    let PasswordChangeBody {
        username,
        old_password,
        new_password,
        confirm_password,
    } = body;
    let confirm_password = Zeroizing::new(confirm_password);

    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest {
            message: "username is required".to_string(),
        });
    }

    if new_password != *confirm_password {
        debug!(uid = %username, "Password confirmation mismatch");
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(PasswordChangeResponse::error(
                "confirmation_mismatch",
                MSG_CONFIRMATION_MISMATCH,
            )),
        ));
    }

    let result = state
        .orchestrator
        .change_password(ChangeRequest::new(username, old_password, new_password))
        .await;

    let (status, response) = render_result(&result);
    Ok((status, Json(response)))
}
