//! Weak-password word list.

use std::path::Path;
use tracing::info;

use crate::error::{QualityError, QualityResult};

/// Entries shorter than this are ignored; they would match almost anything.
pub const MIN_WORD_LENGTH: usize = 3;

/// Fold common leet substitutions back to letters.
///
/// The input is expected to be lower-cased already.
#[must_use]
pub fn leet_normalize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => 'o',
            '1' | '!' | '|' | 'l' => 'i',
            '3' => 'e',
            '4' | '@' => 'a',
            '5' | '$' => 's',
            '7' => 't',
            other => other,
        })
        .collect()
}

/// A loaded list of words a password must not contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    /// Lower-cased entries.
    words: Vec<String>,
    /// Leet-normalized form of each entry, same order as `words`.
    normalized: Vec<String>,
}

impl Dictionary {
    /// Build from an iterator of raw lines.
    ///
    /// Lines are trimmed and lower-cased; blank lines, `#` comments and
    /// entries shorter than [`MIN_WORD_LENGTH`] are skipped.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut words: Vec<String> = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .filter(|word| word.chars().count() >= MIN_WORD_LENGTH)
            .collect();
        words.sort();
        words.dedup();

        let normalized = words.iter().map(|w| leet_normalize(w)).collect();
        Self { words, normalized }
    }

    /// Load a word list from a file, one entry per line.
    pub fn from_file(path: impl AsRef<Path>) -> QualityResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| QualityError::DictionaryRead {
                path: path.to_path_buf(),
                source,
            })?;
        let dictionary = Self::from_lines(contents.lines());
        info!(
            path = %path.display(),
            words = dictionary.len(),
            "Loaded password dictionary"
        );
        Ok(dictionary)
    }

    /// Number of usable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `password` equals or contains any entry, ignoring case and
    /// common leet substitutions.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let lowered = password.to_lowercase();
        if self.words.iter().any(|w| lowered.contains(w.as_str())) {
            return true;
        }
        let folded = leet_normalize(&lowered);
        self.normalized.iter().any(|w| folded.contains(w.as_str()))
    }
}
