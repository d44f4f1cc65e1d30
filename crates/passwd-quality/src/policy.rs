//! Quality policy configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dictionary::Dictionary;
use crate::error::{QualityError, QualityResult};

/// Default minimum password length.
pub const DEFAULT_MIN_LENGTH: usize = 8;

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

/// Quality policy as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityPolicyConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default)]
    pub mixed_case_required: bool,

    #[serde(default)]
    pub digit_required: bool,

    #[serde(default)]
    pub special_required: bool,

    #[serde(default)]
    pub dictionary_check_enabled: bool,

    /// Word list, one entry per line. Required when dictionary checks are enabled.
    #[serde(default)]
    pub dictionary_file: Option<PathBuf>,
}

impl Default for QualityPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            mixed_case_required: false,
            digit_required: false,
            special_required: false,
            dictionary_check_enabled: false,
            dictionary_file: None,
        }
    }
}

/// A loaded, immutable quality policy.
///
/// Shared read-only across concurrent requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityPolicy {
    pub min_length: usize,
    pub mixed_case_required: bool,
    pub digit_required: bool,
    pub special_required: bool,
    pub dictionary: Option<Dictionary>,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            mixed_case_required: false,
            digit_required: false,
            special_required: false,
            dictionary: None,
        }
    }
}

impl QualityPolicy {
    /// Build a policy from configuration, loading the dictionary if enabled.
    ///
    /// A `min_length` of 0 disables the length rule.
    pub fn from_config(config: &QualityPolicyConfig) -> QualityResult<Self> {
        let dictionary = if config.dictionary_check_enabled {
            let path = config
                .dictionary_file
                .as_ref()
                .ok_or(QualityError::DictionaryNotConfigured)?;
            Some(Dictionary::from_file(path)?)
        } else {
            None
        };

        Ok(Self {
            min_length: config.min_length,
            mixed_case_required: config.mixed_case_required,
            digit_required: config.digit_required,
            special_required: config.special_required,
            dictionary,
        })
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn require_mixed_case(mut self) -> Self {
        self.mixed_case_required = true;
        self
    }

    #[must_use]
    pub fn require_digit(mut self) -> Self {
        self.digit_required = true;
        self
    }

    #[must_use]
    pub fn require_special(mut self) -> Self {
        self.special_required = true;
        self
    }

    #[must_use]
    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }
}
