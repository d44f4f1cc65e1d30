//! Active Directory specific modules
//!
//! AD differs from standard LDAP in two places:
//! - users bind with a `uid@domain` principal instead of their DN
//! - the password lives in `unicodePwd` as a quoted UTF-16LE value

pub mod backend;
pub mod password;

pub use backend::ActiveDirectoryBackend;
pub use password::{ad_modification, ad_principal, encode_ad_password, UNICODE_PWD_ATTRIBUTE};
