pub mod responses;
pub mod router;
pub mod static_files;

use crate::http::request::HttpRequest;
use crate::http::response::ResponseState;

/// A route handler computes the complete wire response for a request,
/// accumulating headers and body in the per-request state and returning
/// the serialized bytes.
pub type Handler = Box<dyn Fn(&HttpRequest, &mut ResponseState) -> Vec<u8> + Send + Sync>;

/// Optional per-request callback, run after parsing and before routing,
/// typically used to set response headers shared by every route.
pub type InitHook = Box<dyn Fn(&HttpRequest, &mut ResponseState) + Send + Sync>;
