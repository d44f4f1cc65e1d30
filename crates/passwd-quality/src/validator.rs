//! Password quality checks.

use serde::Serialize;

use crate::policy::QualityPolicy;

/// A single quality rule a password failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PasswordViolation {
    /// Password is shorter than the policy minimum.
    TooShort { min: usize, actual: usize },
    /// Missing either an uppercase or a lowercase letter.
    MissingMixedCase,
    /// Missing digit.
    MissingDigit,
    /// Missing non-alphanumeric character.
    MissingSpecial,
    /// Contains a dictionary word.
    DictionaryWord,
}

impl std::fmt::Display for PasswordViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { min, actual } => {
                write!(
                    f,
                    "Password must be at least {min} characters (got {actual})"
                )
            }
            Self::MissingMixedCase => write!(
                f,
                "Password must contain both uppercase and lowercase letters"
            ),
            Self::MissingDigit => write!(f, "Password must contain at least one digit"),
            Self::MissingSpecial => {
                write!(f, "Password must contain at least one special character")
            }
            Self::DictionaryWord => {
                write!(f, "Password must not contain a common word")
            }
        }
    }
}

/// Outcome of [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityVerdict {
    Pass,
    /// Every violated rule, in rule order.
    Fail(Vec<PasswordViolation>),
}

impl QualityVerdict {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Violations, empty on [`QualityVerdict::Pass`].
    #[must_use]
    pub fn violations(&self) -> &[PasswordViolation] {
        match self {
            Self::Pass => &[],
            Self::Fail(violations) => violations,
        }
    }

    #[must_use]
    pub fn into_violations(self) -> Vec<PasswordViolation> {
        match self {
            Self::Pass => Vec::new(),
            Self::Fail(violations) => violations,
        }
    }
}

/// Check `password` against `policy`.
///
/// With no policy every password passes. Every rule is evaluated, so the
/// caller can report all violations at once.
#[must_use]
pub fn check(password: &str, policy: Option<&QualityPolicy>) -> QualityVerdict {
    let Some(policy) = policy else {
        return QualityVerdict::Pass;
    };

    let mut violations = Vec::new();
    let len = password.chars().count();

    if len < policy.min_length {
        violations.push(PasswordViolation::TooShort {
            min: policy.min_length,
            actual: len,
        });
    }

    if policy.mixed_case_required
        && !(password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase))
    {
        violations.push(PasswordViolation::MissingMixedCase);
    }

    if policy.digit_required && !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordViolation::MissingDigit);
    }

    if policy.special_required && !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push(PasswordViolation::MissingSpecial);
    }

    if let Some(dictionary) = &policy.dictionary {
        if dictionary.matches(password) {
            violations.push(PasswordViolation::DictionaryWord);
        }
    }

    if violations.is_empty() {
        QualityVerdict::Pass
    } else {
        QualityVerdict::Fail(violations)
    }
}
