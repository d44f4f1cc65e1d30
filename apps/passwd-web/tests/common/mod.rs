//! Shared helpers for the HTTP tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use passwd_directory::{BackendError, BackendId, BackendResult, PasswordBackend};
use passwd_orchestrator::ChangeOrchestrator;
use passwd_quality::QualityPolicy;
use passwd_web::{config::ServerConfig, router, AppState};

/// Directory stand-in holding one password per user.
pub struct TestDirectory {
    id: BackendId,
    passwords: Mutex<HashMap<String, String>>,
    fail_modify: bool,
    fail_revert: bool,
    delay: Option<Duration>,
    applies: AtomicUsize,
}

impl TestDirectory {
    pub fn new(index: usize) -> Self {
        Self {
            id: BackendId::new(index, format!("ldap:{index}")),
            passwords: Mutex::new(HashMap::new()),
            fail_modify: false,
            fail_revert: false,
            delay: None,
            applies: AtomicUsize::new(0),
        }
    }

    pub fn with_user(self, uid: &str, password: &str) -> Self {
        self.passwords
            .lock()
            .unwrap()
            .insert(uid.to_string(), password.to_string());
        self
    }

    pub fn failing_modify(mut self) -> Self {
        self.fail_modify = true;
        self
    }

    pub fn failing_revert(mut self) -> Self {
        self.fail_revert = true;
        self
    }

    /// Answer every apply only after `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn password_of(&self, uid: &str) -> Option<String> {
        self.passwords.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl PasswordBackend for TestDirectory {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn apply(&self, uid: &str, old: &str, new: &str) -> BackendResult<()> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut passwords = self.passwords.lock().unwrap();
        let current = passwords.get_mut(uid).ok_or(BackendError::UserNotFound)?;
        if current.as_str() != old {
            return Err(BackendError::InvalidCredentials);
        }
        if self.fail_modify {
            return Err(BackendError::Modify {
                code: 50,
                message: "insufficient access to uid=secret,ou=People,dc=example,dc=com"
                    .to_string(),
            });
        }
        *current = new.to_string();
        Ok(())
    }

    async fn revert(&self, uid: &str, new: &str, old: &str) -> BackendResult<()> {
        if self.fail_revert {
            return Err(BackendError::Modify {
                code: 19,
                message: "password in history".to_string(),
            });
        }
        self.apply(uid, new, old).await
    }
}

pub fn app(backends: Vec<Arc<TestDirectory>>, policy: Option<QualityPolicy>) -> Router {
    let backends = backends
        .into_iter()
        .map(|b| b as Arc<dyn PasswordBackend>)
        .collect();
    let orchestrator = ChangeOrchestrator::new(backends, policy.map(Arc::new)).unwrap();
    router(AppState::new(orchestrator), &ServerConfig::default())
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn change_body(username: &str, old: &str, new: &str, confirm: &str) -> Value {
    serde_json::json!({
        "username": username,
        "old_password": old,
        "new_password": new,
        "confirm_password": confirm,
    })
}
