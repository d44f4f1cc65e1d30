//! Schema-specific password modifications.
//!
//! A [`PasswordModification`] is the exact payload an adapter submits to the
//! directory. Building it is a pure function of the schema and the two
//! passwords, so the encoding can be verified without a live server.

use zeroize::Zeroize;

/// The directory operation that carries a password change.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordModification {
    /// Replace all values of `attribute` with `value`.
    Replace { attribute: String, value: Vec<u8> },

    /// Delete `old_value` from `attribute` and add `new_value` in one modify.
    DeleteAdd {
        attribute: String,
        old_value: Vec<u8>,
        new_value: Vec<u8>,
    },

    /// RFC 3062 Password Modify extended operation.
    ExtendedOperation {
        old_password: String,
        new_password: String,
    },
}

impl PasswordModification {
    /// Attribute touched by the modification, if it is attribute-based.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Replace { attribute, .. } | Self::DeleteAdd { attribute, .. } => Some(attribute),
            Self::ExtendedOperation { .. } => None,
        }
    }

    /// Short operation name for logs.
    #[must_use]
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::DeleteAdd { .. } => "delete_add",
            Self::ExtendedOperation { .. } => "password_modify_exop",
        }
    }
}

impl std::fmt::Debug for PasswordModification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace { attribute, value } => f
                .debug_struct("Replace")
                .field("attribute", attribute)
                .field("value_len", &value.len())
                .finish(),
            Self::DeleteAdd {
                attribute,
                old_value,
                new_value,
            } => f
                .debug_struct("DeleteAdd")
                .field("attribute", attribute)
                .field("old_value_len", &old_value.len())
                .field("new_value_len", &new_value.len())
                .finish(),
            Self::ExtendedOperation { .. } => f.write_str("ExtendedOperation { .. }"),
        }
    }
}

impl Drop for PasswordModification {
    fn drop(&mut self) {
        match self {
            Self::Replace { value, .. } => value.zeroize(),
            Self::DeleteAdd {
                old_value,
                new_value,
                ..
            } => {
                old_value.zeroize();
                new_value.zeroize();
            }
            Self::ExtendedOperation {
                old_password,
                new_password,
            } => {
                old_password.zeroize();
                new_password.zeroize();
            }
        }
    }
}
