//! Email format check, run before record construction so a bad address gets
//! its own error message.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Local part, one `@`, and a domain ending in a dot plus a 2+ letter label.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Whether `email` looks like a standard address.
pub fn is_valid_email(email: &str) -> bool {
    match EMAIL_RE.as_ref() {
        Some(re) => re.is_match(email),
        None => false,
    }
}

/// Whether a candidate mapping carries a well-formed `email` string.
///
/// False for non-objects, a missing or non-string `email`, or a malformed
/// address.
pub fn validate_email_format(candidate: &Value) -> bool {
    candidate
        .get("email")
        .and_then(Value::as_str)
        .is_some_and(is_valid_email)
}
