use crate::http::headers::{self, HeaderMap};
use crate::http::status;

/// Per-request mutable response state: a header map and a body,
/// accumulated by the init hook and handler code, serialized once by
/// [`build`](ResponseState::build). Created fresh for every connection so
/// nothing leaks between requests.
#[derive(Debug, Default)]
pub struct ResponseState {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ResponseState {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Serialize the response: status line, header lines, blank line, body.
    /// A `content-length` header computed from the body is injected first,
    /// overwriting whatever a handler may have set; masked headers are
    /// skipped.
    pub fn build(&mut self, code: u16) -> Vec<u8> {
        let content_length = self.body.len().to_string();
        self.headers.insert("content-length", content_length);

        let mut lines: Vec<String> = Vec::new();
        for (name, value) in self.headers.iter() {
            if let Some(value) = value {
                lines.push(format!("{}: {}", headers::display_name(name), value));
            }
        }

        let mut out = status::status_line(code).into_bytes();
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(lines.join("\r\n").as_bytes());
        out.extend_from_slice(b"\r\n\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_str(state: &mut ResponseState, code: u16) -> String {
        String::from_utf8(state.build(code)).unwrap()
    }

    #[test]
    fn minimal_response_layout() {
        let mut state = ResponseState::new();
        state.set_body("hi");

        let response = build_str(&mut state, 200);
        assert_eq!(response, "HTTP/1.0 200 OK\r\nContent-length: 2\r\n\r\nhi");
    }

    #[test]
    fn status_line_carries_reason_phrase() {
        let mut state = ResponseState::new();
        state.set_body("x");

        let response = build_str(&mut state, 404);
        assert!(response.starts_with("HTTP/1.0 404 Not Found\r\n"));
    }

    #[test]
    fn unknown_code_renders_empty_reason() {
        let mut state = ResponseState::new();
        let response = build_str(&mut state, 599);
        assert!(response.starts_with("HTTP/1.0 599 \r\n"));
    }

    #[test]
    fn header_names_use_wire_casing() {
        let mut state = ResponseState::new();
        state.headers.insert("content-type", "text/html");
        state.headers.insert("SERVER", "simplehttpd");

        let response = build_str(&mut state, 200);
        assert!(response.contains("\r\nContent-type: text/html\r\n"));
        assert!(response.contains("\r\nServer: simplehttpd\r\n"));
    }

    #[test]
    fn content_length_overwrites_handler_value() {
        let mut state = ResponseState::new();
        state.headers.insert("Content-Length", "999");
        state.set_body("abcde");

        let response = build_str(&mut state, 200);
        assert!(response.contains("Content-length: 5"));
        assert_eq!(response.matches("Content-length").count(), 1);
    }

    #[test]
    fn masked_headers_are_not_rendered() {
        let mut state = ResponseState::new();
        state.headers.insert("content-type", "text/html");
        state.headers.unset("content-type");

        let response = build_str(&mut state, 200);
        assert!(!response.contains("Content-type"));
    }

    #[test]
    fn body_length_matches_content_length_header() {
        let mut state = ResponseState::new();
        state.headers.insert("server", "simplehttpd");
        state.set_body("some body of text\n");

        let response = build_str(&mut state, 200);
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let announced: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("Content-length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(announced, body.len());
    }
}
