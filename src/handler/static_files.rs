use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;

use crate::http::request::HttpRequest;
use crate::http::response::ResponseState;

pub const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Read `filename` into the response body. A missing file maps to 404 with
/// the canned not-found body, any other I/O failure to 500; both error
/// paths mask `Content-Type` so a hook-set value does not describe a body
/// it no longer matches.
pub fn serve_file(
    req: &HttpRequest,
    state: &mut ResponseState,
    filename: &str,
    content_type: &str,
) -> Vec<u8> {
    match read_file(filename) {
        Ok(body) => {
            state.headers.insert("Content-Type", content_type);
            state.set_body(body);
            state.build(200)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            state.headers.unset("Content-Type");
            state.set_body(format!("Not Found on this server: {}\n", req.path));
            state.build(404)
        }
        Err(_) => {
            state.headers.unset("Content-Type");
            state.set_body("Internal Server Error\n");
            state.build(500)
        }
    }
}

// The handle lives only inside this scope, so it is released on success
// and on every failure alike.
fn read_file(filename: &str) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(filename)?;
    let mut body = Vec::new();
    file.read_to_end(&mut body)?;
    Ok(body)
}
