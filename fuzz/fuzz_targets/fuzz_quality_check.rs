//! Fuzz target for the password quality check.
//!
//! Arbitrary passwords and policy flags must never panic, and the verdict
//! must be the same every time.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_quality_check -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use passwd_quality::{check, Dictionary, PasswordViolation, QualityPolicy};

#[derive(Arbitrary, Debug)]
struct QualityInput {
    password: String,
    min_length: u8,
    mixed_case_required: bool,
    digit_required: bool,
    special_required: bool,
    words: Option<Vec<String>>,
}

fuzz_target!(|input: QualityInput| {
    if input.password.len() > 4096 {
        return;
    }

    let mut policy = QualityPolicy {
        min_length: usize::from(input.min_length),
        mixed_case_required: input.mixed_case_required,
        digit_required: input.digit_required,
        special_required: input.special_required,
        dictionary: None,
    };
    if let Some(words) = &input.words {
        policy.dictionary = Some(Dictionary::from_lines(words.iter().map(String::as_str)));
    }

    let first = check(&input.password, Some(&policy));
    let second = check(&input.password, Some(&policy));
    assert_eq!(first, second);

    let violations = first.violations();
    let too_short = violations
        .iter()
        .any(|v| matches!(v, PasswordViolation::TooShort { .. }));
    assert_eq!(
        too_short,
        input.password.chars().count() < usize::from(input.min_length)
    );
    if !input.digit_required {
        assert!(!violations.contains(&PasswordViolation::MissingDigit));
    }

    assert!(check(&input.password, None).is_pass());
});
