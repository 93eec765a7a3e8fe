//! Fault text from error responses.

use crate::xml;

/// Text of the first `faultstring` element in `body`.
///
/// Returns `None` when the body is not XML, has no `faultstring`, or the
/// element is empty. Never fails: a missing fault only means the caller
/// falls back to a generic message.
///
/// # Example
///
/// ```rust
/// use mplus_qapi_soap::extract_fault;
///
/// let body = b"<Envelope><Body><Fault><faultstring>Invalid credentials</faultstring></Fault></Body></Envelope>";
/// assert_eq!(extract_fault(body).as_deref(), Some("Invalid credentials"));
/// assert_eq!(extract_fault(b"Bad Gateway"), None);
/// ```
pub fn extract_fault(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let root = xml::parse(text).ok()?;
    let fault = root.find("faultstring")?;
    let message = fault.text.trim();

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
