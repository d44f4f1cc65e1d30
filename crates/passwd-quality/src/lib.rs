//! # Password quality
//!
//! Evaluates a candidate password against a configurable policy before any
//! directory is touched.
//!
//! ```
//! use passwd_quality::{check, PasswordViolation, QualityPolicy, QualityVerdict};
//!
//! let policy = QualityPolicy::default().require_digit();
//! assert_eq!(
//!     check("password", Some(&policy)),
//!     QualityVerdict::Fail(vec![PasswordViolation::MissingDigit])
//! );
//! ```

pub mod dictionary;
pub mod error;
pub mod policy;
pub mod validator;

pub use dictionary::Dictionary;
pub use error::{QualityError, QualityResult};
pub use policy::{QualityPolicy, QualityPolicyConfig};
pub use validator::{check, PasswordViolation, QualityVerdict};
