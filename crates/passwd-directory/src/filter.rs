//! Search filter rendering.

use crate::config::UID_PLACEHOLDER;

/// Render a search filter template for one user id.
///
/// The uid is escaped per RFC 4515 before substitution so it can never
/// change the structure of the filter. The result is wrapped in
/// parentheses unless the template already is.
#[must_use]
pub fn render_search_filter(template: &str, uid: &str) -> String {
    let filter = template.replace(UID_PLACEHOLDER, &escape_filter_value(uid));
    let trimmed = filter.trim();
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        trimmed.to_string()
    } else {
        format!("({trimmed})")
    }
}

/// Escape special characters in LDAP filter values (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(c),
        }
    }
    escaped
}
