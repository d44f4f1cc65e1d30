//! AD password operations using unicodePwd attribute encoding.
//!
//! Active Directory requires passwords to be set via the `unicodePwd` attribute
//! using a specific encoding:
//! 1. Surround the password with double quotes: `"password"`
//! 2. Encode the quoted string as UTF-16LE bytes
//!
//! Submitting the raw UTF-8 text instead silently corrupts the account, so
//! every AD modification goes through [`encode_ad_password`].

use tracing::instrument;

use crate::config::AdPasswordChange;
use crate::error::{BackendError, BackendResult};
use crate::modification::PasswordModification;

/// Attribute holding the AD password.
pub const UNICODE_PWD_ATTRIBUTE: &str = "unicodePwd";

/// Encode a plaintext password for AD's unicodePwd attribute.
///
/// The password is surrounded with double quotes and then encoded as UTF-16LE.
///
/// # Errors
/// Returns an error if the password is empty.
#[instrument(skip(password))]
pub fn encode_ad_password(password: &str) -> BackendResult<Vec<u8>> {
    if password.is_empty() {
        return Err(BackendError::Encoding {
            message: "password cannot be empty".to_string(),
        });
    }

    let quoted = format!("\"{password}\"");
    let encoded: Vec<u8> = quoted.encode_utf16().flat_map(u16::to_le_bytes).collect();

    Ok(encoded)
}

/// Build the `uid@domain` principal AD users bind with.
#[must_use]
pub fn ad_principal(uid: &str, domain: &str) -> String {
    format!("{uid}@{}", domain.trim_start_matches('@'))
}

/// Build the modification that moves an AD account from `old_password` to `new_password`.
pub fn ad_modification(
    mode: AdPasswordChange,
    old_password: &str,
    new_password: &str,
) -> BackendResult<PasswordModification> {
    let new_value = encode_ad_password(new_password)?;
    match mode {
        AdPasswordChange::Replace => Ok(PasswordModification::Replace {
            attribute: UNICODE_PWD_ATTRIBUTE.to_string(),
            value: new_value,
        }),
        AdPasswordChange::Change => Ok(PasswordModification::DeleteAdd {
            attribute: UNICODE_PWD_ATTRIBUTE.to_string(),
            old_value: encode_ad_password(old_password)?,
            new_value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_encode_ad_password_basic() {
        let encoded = encode_ad_password("Test123!").unwrap();
        assert_eq!(encoded, utf16le("\"Test123!\""));
        assert_ne!(encoded, b"\"Test123!\"".to_vec());
    }

    #[test]
    fn test_encode_ad_password_starts_and_ends_with_quote() {
        let encoded = encode_ad_password("P@ssw0rd").unwrap();

        // UTF-16LE for '"' = 0x22 0x00
        assert_eq!(&encoded[..2], &[0x22, 0x00]);
        let len = encoded.len();
        assert_eq!(&encoded[len - 2..], &[0x22, 0x00]);
    }

    #[test]
    fn test_encode_ad_password_empty_rejected() {
        let result = encode_ad_password("");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_encode_ad_password_unicode_chars() {
        let encoded = encode_ad_password("Pässwörd!").unwrap();
        assert_eq!(encoded, utf16le("\"Pässwörd!\""));
        // ä = U+00E4
        assert_eq!(&encoded[4..6], &[0xE4, 0x00]);
    }

    #[test]
    fn test_encode_ad_password_length() {
        // "abc" -> 5 chars including quotes -> 10 bytes in UTF-16LE
        assert_eq!(encode_ad_password("abc").unwrap().len(), 10);
    }

    #[test]
    fn test_ad_principal() {
        assert_eq!(ad_principal("jdoe", "corp.example.com"), "jdoe@corp.example.com");
        assert_eq!(ad_principal("jdoe", "@corp.example.com"), "jdoe@corp.example.com");
    }

    #[test]
    fn test_ad_modification_replace() {
        let modification = ad_modification(AdPasswordChange::Replace, "Old1!", "New1!").unwrap();
        assert_eq!(
            modification,
            PasswordModification::Replace {
                attribute: "unicodePwd".to_string(),
                value: utf16le("\"New1!\""),
            }
        );
    }

    #[test]
    fn test_ad_modification_change_carries_both_values() {
        let modification = ad_modification(AdPasswordChange::Change, "Old1!", "New1!").unwrap();
        assert_eq!(
            modification,
            PasswordModification::DeleteAdd {
                attribute: "unicodePwd".to_string(),
                old_value: utf16le("\"Old1!\""),
                new_value: utf16le("\"New1!\""),
            }
        );
    }

    #[test]
    fn test_ad_modification_rejects_empty_new_password() {
        assert!(ad_modification(AdPasswordChange::Replace, "Old1!", "").is_err());
    }
}
