//! Credential hygiene for messages that leave the transport.
//!
//! The QAPI endpoint takes its credentials as query parameters, so any error
//! text that echoes the request URL would leak the secret. Everything the
//! transport turns into an error message goes through
//! [`sanitize_error_message`] first.

use std::sync::LazyLock;

use regex_lite::Regex;

const MAX_LENGTH: usize = 500;

static SECRET_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&]secret=)[^&\s)]*").expect("secret pattern is valid")
});

/// Sanitize an error message to prevent exposing credentials.
///
/// - Replaces the value of any `secret=` query parameter with `[REDACTED]`
/// - Truncates messages longer than 500 characters
///
/// # Example
///
/// ```rust
/// use mplus_qapi_client::security::sanitize_error_message;
///
/// let msg = sanitize_error_message("error sending request for url (https://h:1/?ident=a&secret=xyz)");
/// assert_eq!(msg, "error sending request for url (https://h:1/?ident=a&secret=[REDACTED])");
/// ```
#[must_use]
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PARAM
        .replace_all(message, "${1}[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
