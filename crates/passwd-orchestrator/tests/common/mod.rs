//! Scriptable backends for orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use passwd_directory::{
    BackendConfig, BackendError, BackendId, BackendResult, DirectoryConnector, DirectorySession,
    PasswordBackend,
};

/// A backend call, by backend index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Apply(usize),
    Revert(usize),
}

/// Call log shared by every backend in one test.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn applies(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Apply(_)))
            .count()
    }

    /// Indexes reverted, in call order.
    pub fn reverts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Revert(index) => Some(index),
                Event::Apply(_) => None,
            })
            .collect()
    }
}

pub fn backend_id(index: usize) -> BackendId {
    BackendId::new(index, format!("ldap:{index}"))
}

pub fn modify_rejected() -> BackendError {
    BackendError::Modify {
        code: 19,
        message: "constraint violation".to_string(),
    }
}

pub fn password_in_history() -> BackendError {
    BackendError::Modify {
        code: 19,
        message: "password is in history".to_string(),
    }
}

pub fn invalid_credentials() -> BackendError {
    BackendError::InvalidCredentials
}

/// Backend whose answers are scripted.
pub struct MockBackend {
    id: BackendId,
    log: EventLog,
    apply_error: Option<fn() -> BackendError>,
    revert_error: Option<fn() -> BackendError>,
    apply_delay: Option<Duration>,
    panic_on_apply: bool,
}

impl MockBackend {
    pub fn new(index: usize, log: &EventLog) -> Self {
        Self {
            id: backend_id(index),
            log: log.clone(),
            apply_error: None,
            revert_error: None,
            apply_delay: None,
            panic_on_apply: false,
        }
    }

    pub fn failing_apply(mut self, error: fn() -> BackendError) -> Self {
        self.apply_error = Some(error);
        self
    }

    pub fn failing_revert(mut self, error: fn() -> BackendError) -> Self {
        self.revert_error = Some(error);
        self
    }

    pub fn slow_apply(mut self, delay: Duration) -> Self {
        self.apply_delay = Some(delay);
        self
    }

    pub fn panicking_apply(mut self) -> Self {
        self.panic_on_apply = true;
        self
    }

    pub fn shared(self) -> Arc<dyn PasswordBackend> {
        Arc::new(self)
    }
}

#[async_trait]
impl PasswordBackend for MockBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn apply(&self, _uid: &str, _old: &str, _new: &str) -> BackendResult<()> {
        self.log.push(Event::Apply(self.id.index));
        if let Some(delay) = self.apply_delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on_apply {
            panic!("backend {} exploded", self.id);
        }
        match self.apply_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn revert(&self, _uid: &str, _new: &str, _old: &str) -> BackendResult<()> {
        self.log.push(Event::Revert(self.id.index));
        match self.revert_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

/// Backend holding real password state, checked like a directory bind.
pub struct InMemoryBackend {
    id: BackendId,
    passwords: Mutex<HashMap<String, String>>,
}

impl InMemoryBackend {
    pub fn new(index: usize) -> Self {
        Self {
            id: backend_id(index),
            passwords: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_user(self, uid: &str, password: &str) -> Self {
        self.passwords
            .lock()
            .unwrap()
            .insert(uid.to_string(), password.to_string());
        self
    }

    pub fn password_of(&self, uid: &str) -> Option<String> {
        self.passwords.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl PasswordBackend for InMemoryBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    async fn apply(&self, uid: &str, old: &str, new: &str) -> BackendResult<()> {
        let mut passwords = self.passwords.lock().unwrap();
        match passwords.get_mut(uid) {
            None => Err(BackendError::UserNotFound),
            Some(current) if !old.is_empty() && current.as_str() == old => {
                *current = new.to_string();
                Ok(())
            }
            Some(_) => Err(BackendError::InvalidCredentials),
        }
    }
}

/// Connector for hosts that never answer.
pub struct RefusingConnector;

#[async_trait]
impl DirectoryConnector for RefusingConnector {
    async fn connect(&self, config: &BackendConfig) -> BackendResult<Box<dyn DirectorySession>> {
        Err(BackendError::connect(format!(
            "connection to {} refused",
            config.url()
        )))
    }
}
