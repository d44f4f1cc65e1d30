//! In-memory directory used by the backend integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use passwd_directory::{
    BackendConfig, BackendError, BackendResult, DirectoryConnector, DirectorySession,
    PasswordModification,
};

/// One protocol call observed by the fake directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { url: String },
    Bind { dn: String },
    Search { base: String, filter: String },
    Modify { dn: String, modification: PasswordModification },
    Unbind,
}

#[derive(Default)]
struct State {
    /// Bind identity (DN or principal) -> password.
    credentials: HashMap<String, String>,
    /// Rendered filter -> matching DNs.
    entries: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    refuse_connect: bool,
    modify_error: Option<u32>,
    hang_on_search: bool,
}

/// Scriptable fake directory server.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<State>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bindable identity.
    pub fn with_credential(self, identity: &str, password: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .credentials
            .insert(identity.to_string(), password.to_string());
        self
    }

    /// Register the DNs a rendered filter resolves to.
    pub fn with_entries(self, filter: &str, dns: &[&str]) -> Self {
        self.state.lock().unwrap().entries.insert(
            filter.to_string(),
            dns.iter().map(|dn| dn.to_string()).collect(),
        );
        self
    }

    pub fn refusing_connections(self) -> Self {
        self.state.lock().unwrap().refuse_connect = true;
        self
    }

    pub fn rejecting_modify(self, code: u32) -> Self {
        self.state.lock().unwrap().modify_error = Some(code);
        self
    }

    pub fn hanging_on_search(self) -> Self {
        self.state.lock().unwrap().hang_on_search = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn modifications(&self) -> Vec<PasswordModification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Modify { modification, .. } => Some(modification),
                _ => None,
            })
            .collect()
    }

    pub fn password_of(&self, identity: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .credentials
            .get(identity)
            .cloned()
    }

    pub fn connector(&self) -> Arc<dyn DirectoryConnector> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(&self, config: &BackendConfig) -> BackendResult<Box<dyn DirectorySession>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Connect { url: config.url() });
        if state.refuse_connect {
            return Err(BackendError::connect("connection refused"));
        }
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeSession {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl DirectorySession for FakeSession {
    async fn bind(&mut self, dn: &str, password: &str) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Bind { dn: dn.to_string() });
        match state.credentials.get(dn) {
            Some(stored) if stored == password => Ok(()),
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn search_dns(&mut self, base_dn: &str, filter: &str) -> BackendResult<Vec<String>> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Search {
                base: base_dn.to_string(),
                filter: filter.to_string(),
            });
            state.hang_on_search
        };
        if hang {
            std::future::pending::<()>().await;
        }
        let state = self.state.lock().unwrap();
        Ok(state.entries.get(filter).cloned().unwrap_or_default())
    }

    async fn modify_password(
        &mut self,
        dn: &str,
        modification: &PasswordModification,
    ) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Modify {
            dn: dn.to_string(),
            modification: modification.clone(),
        });
        if let Some(code) = state.modify_error {
            return Err(BackendError::Modify {
                code,
                message: "rejected by fake directory".to_string(),
            });
        }
        let new_password = match modification {
            PasswordModification::Replace { attribute, value } if attribute == "userPassword" => {
                String::from_utf8(value.clone()).ok()
            }
            PasswordModification::ExtendedOperation { new_password, .. } => {
                Some(new_password.clone())
            }
            _ => None,
        };
        if let Some(password) = new_password {
            state.credentials.insert(dn.to_string(), password);
        }
        Ok(())
    }

    async fn unbind(&mut self) -> BackendResult<()> {
        self.state.lock().unwrap().calls.push(Call::Unbind);
        Ok(())
    }
}

/// UTF-16LE bytes of `s`.
pub fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
