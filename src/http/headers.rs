//! Header map shared by [`HttpRequest`](crate::http::request::HttpRequest)
//! and [`ResponseState`](crate::http::response::ResponseState).
//!
//! Headers are stored in an ordered map to preserve insertion order, which
//! the response serializer relies on. Names are matched case-insensitively
//! by lower-casing them on every access. Values may be absent: a masked
//! header stays in the map but is skipped when the response is rendered,
//! which is how a previously-set header (say, `Content-Type` from an init
//! hook) gets dropped on an error path.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: IndexMap<String, Option<String>>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_lowercase(), Some(value.into()));
    }

    /// Mask a header: it keeps its position but renders as absent.
    pub fn unset(&mut self, name: &str) {
        self.entries.insert(name.to_lowercase(), None);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).and_then(|v| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

/// Wire casing for header names: first character upper-case, everything
/// after it lower-case, letters behind hyphens included. `content-type`
/// renders as `Content-type`, `SERVER` as `Server`.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
