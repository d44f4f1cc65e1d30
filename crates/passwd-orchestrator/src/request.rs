//! Password change request.

use zeroize::Zeroizing;

/// One user's request to change their password.
///
/// Passwords are wiped from memory when the request is dropped and never
/// appear in `Debug` output.
pub struct ChangeRequest {
    uid: String,
    old_password: Zeroizing<String>,
    new_password: Zeroizing<String>,
}

impl ChangeRequest {
    pub fn new(
        uid: impl Into<String>,
        old_password: impl Into<String>,
        new_password: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            old_password: Zeroizing::new(old_password.into()),
            new_password: Zeroizing::new(new_password.into()),
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn old_password(&self) -> &str {
        &self.old_password
    }

    #[must_use]
    pub fn new_password(&self) -> &str {
        &self.new_password
    }
}

impl std::fmt::Debug for ChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeRequest")
            .field("uid", &self.uid)
            .field("old_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}
