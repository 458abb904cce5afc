use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const HTTP_VERSION: &str = "HTTP/1.0";

/// Reason phrases for the status codes the server knows by name.
static REASON_PHRASES: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (200, "OK"),
        (404, "Not Found"),
        (500, "Internal Server Error"),
        (503, "Service Unavailable"),
    ])
});

/// Unknown codes are legal and render with an empty reason phrase.
pub fn reason_phrase(code: u16) -> &'static str {
    REASON_PHRASES.get(&code).copied().unwrap_or("")
}

pub fn status_line(code: u16) -> String {
    format!("{} {} {}", HTTP_VERSION, code, reason_phrase(code))
}
