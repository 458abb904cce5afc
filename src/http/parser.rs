//! One-shot request parser: turns the raw bytes accumulated by the read
//! loop into an [`HttpRequest`]. Framing is the read loop's job; by the
//! time bytes land here the request is assumed complete.

use crate::http::request::{DEFAULT_PORT, HttpRequest};
use crate::http::{HttpMethod, http_method_from_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The byte stream ended before the header terminator was seen.
    Truncated,
    BadRequestLine,
    UnknownMethod,
    MalformedHeader,
}

pub fn parse_request(raw: &[u8]) -> Result<HttpRequest, ParseError> {
    let head_end = headers_end(raw).ok_or(ParseError::Truncated)?;

    let mut req = HttpRequest::new();
    req.body = raw[head_end + 4..].to_vec();

    let head = &raw[..head_end];
    let mut lines = head.split(|&b| b == b'\n');

    let request_line = lines.next().ok_or(ParseError::BadRequestLine)?;
    let request_line = request_line.strip_suffix(b"\r").unwrap_or(request_line);
    parse_request_line(request_line, &mut req)?;

    for line in lines {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        parse_header_line(line, &mut req)?;
    }

    if let Some(value) = req.headers.get("host") {
        let (host, port) = split_host_port(value);
        req.host = host;
        req.port = port;
    }

    Ok(req)
}

// Request line: METHOD TARGET HTTP/x.y
fn parse_request_line(line: &[u8], req: &mut HttpRequest) -> Result<(), ParseError> {
    let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::BadRequestLine);
    }

    let method = std::str::from_utf8(parts[0]).map_err(|_| ParseError::BadRequestLine)?;
    req.method = match http_method_from_str(&method.to_uppercase()) {
        HttpMethod::Unknown => return Err(ParseError::UnknownMethod),
        method => method,
    };

    let target = std::str::from_utf8(parts[1]).map_err(|_| ParseError::BadRequestLine)?;
    match target.split_once('?') {
        Some((path, query)) => {
            req.path = path.to_string();
            req.query = Some(query.to_string());
        }
        None => req.path = target.to_string(),
    }

    let version = std::str::from_utf8(parts[2]).map_err(|_| ParseError::BadRequestLine)?;
    if !version.starts_with("HTTP/") {
        return Err(ParseError::BadRequestLine);
    }

    Ok(())
}

fn parse_header_line(line: &[u8], req: &mut HttpRequest) -> Result<(), ParseError> {
    let mut it = line.splitn(2, |&b| b == b':');
    let name = it.next().ok_or(ParseError::MalformedHeader)?;
    let value = it.next().ok_or(ParseError::MalformedHeader)?;

    let name = std::str::from_utf8(name)
        .map_err(|_| ParseError::MalformedHeader)?
        .trim();
    let value = std::str::from_utf8(value)
        .map_err(|_| ParseError::MalformedHeader)?
        .trim();
    if name.is_empty() {
        return Err(ParseError::MalformedHeader);
    }

    req.headers.insert(name, value);
    Ok(())
}

fn split_host_port(value: &str) -> (String, u16) {
    match value.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (value.to_string(), DEFAULT_PORT),
        },
        None => (value.to_string(), DEFAULT_PORT),
    }
}

/// Offset of the `\r\n\r\n` header terminator, if it has arrived.
pub(crate) fn headers_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Content-length announced by the header block, 0 when absent or
/// unparsable.
pub(crate) fn declared_content_length(head: &[u8]) -> usize {
    for line in head.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let mut it = line.splitn(2, |&b| b == b':');
        let (Some(name), Some(value)) = (it.next(), it.next()) else {
            continue;
        };
        let Ok(name) = std::str::from_utf8(name) else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            return std::str::from_utf8(value)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_get() {
        let raw = b"GET /hello HTTP/1.0\r\nHost: localhost:8000\r\nAccept: */*\r\n\r\n";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/hello");
        assert_eq!(req.query, None);
        assert_eq!(req.headers.get("accept"), Some("*/*"));
        assert_eq!(req.schema, "http");
        assert_eq!(req.host, "localhost");
        assert_eq!(req.port, 8000);
        assert!(req.body.is_empty());
    }

    #[test]
    fn splits_query_from_path() {
        let raw = b"GET /search?q=rust&page=2 HTTP/1.0\r\nHost: h\r\n\r\n";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.path, "/search");
        assert_eq!(req.query, Some("q=rust&page=2".to_string()));
    }

    #[test]
    fn body_is_everything_after_the_terminator() {
        let raw = b"POST /submit HTTP/1.0\r\nHost: h\r\nContent-Length: 11\r\n\r\nhello=world";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body, b"hello=world");
        assert_eq!(req.headers.get("Content-Length"), Some("11"));
    }

    #[test]
    fn header_names_are_matched_case_insensitively() {
        let raw = b"GET / HTTP/1.0\r\nX-Custom: abc\r\n\r\n";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.headers.get("x-custom"), Some("abc"));
        assert_eq!(req.headers.get("X-CUSTOM"), Some("abc"));
    }

    #[test]
    fn host_without_port_defaults_to_80() {
        let raw = b"GET / HTTP/1.0\r\nHost: example.org\r\n\r\n";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.host, "example.org");
        assert_eq!(req.port, 80);
    }

    #[test]
    fn missing_host_leaves_defaults() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let req = parse_request(raw).unwrap();

        assert_eq!(req.host, "");
        assert_eq!(req.port, 80);
    }

    #[test]
    fn missing_terminator_is_truncated() {
        assert_eq!(
            parse_request(b"GET / HTTP/1.0\r\nHost: h\r\n").unwrap_err(),
            ParseError::Truncated
        );
        assert_eq!(parse_request(b"junk").unwrap_err(), ParseError::Truncated);
    }

    #[test]
    fn malformed_request_line_is_rejected() {
        assert_eq!(parse_request(b"GET /\r\n\r\n").unwrap_err(), ParseError::BadRequestLine);
        assert_eq!(
            parse_request(b"GET / NOTHTTP/1.0\r\n\r\n").unwrap_err(),
            ParseError::BadRequestLine
        );
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert_eq!(
            parse_request(b"BREW /coffee HTTP/1.0\r\n\r\n").unwrap_err(),
            ParseError::UnknownMethod
        );
    }

    #[test]
    fn header_without_colon_is_rejected() {
        assert_eq!(
            parse_request(b"GET / HTTP/1.0\r\nno-colon-here\r\n\r\n").unwrap_err(),
            ParseError::MalformedHeader
        );
    }

    #[test]
    fn headers_end_finds_the_terminator() {
        assert_eq!(headers_end(b"GET / HTTP/1.0\r\n\r\n"), Some(14));
        assert_eq!(headers_end(b"GET / HTTP/1.0\r\n"), None);
    }

    #[test]
    fn declared_content_length_reads_the_header() {
        let head = b"POST / HTTP/1.0\r\nContent-Length: 42\r\nHost: h";
        assert_eq!(declared_content_length(head), 42);
        assert_eq!(declared_content_length(b"GET / HTTP/1.0\r\nHost: h"), 0);
        assert_eq!(declared_content_length(b"POST / HTTP/1.0\r\nContent-Length: nope"), 0);
    }
}
