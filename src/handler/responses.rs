use crate::http::request::HttpRequest;
use crate::http::response::ResponseState;

/// Canned fallback for a GET that matched no route.
pub fn not_found(req: &HttpRequest, state: &mut ResponseState) -> Vec<u8> {
    state.set_body(format!("Not Found on this server: {}\n", req.path));
    state.build(404)
}

/// Canned fallback for any other method that matched no route.
pub fn service_unavailable(state: &mut ResponseState) -> Vec<u8> {
    state.set_body("Service Unavailable\n");
    state.build(503)
}
