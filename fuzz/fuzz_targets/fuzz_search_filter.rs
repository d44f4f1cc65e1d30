//! Fuzz target for search filter rendering.
//!
//! Whatever the user id, its filter metacharacters must come out escaped.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_search_filter -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use passwd_directory::filter::escape_filter_value;
use passwd_directory::render_search_filter;

fuzz_target!(|uid: &str| {
    if uid.len() > 1024 {
        return;
    }

    let escaped = escape_filter_value(uid);
    assert!(!escaped.contains(['*', '(', ')', '\0']));
    // Every backslash in the output starts a two-digit hex escape.
    let bytes = escaped.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\\' {
            assert!(i + 2 < bytes.len());
            assert!(bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit());
        }
    }

    let rendered = render_search_filter("(uid={uid})", uid);
    assert_eq!(rendered, format!("(uid={escaped})"));
});
