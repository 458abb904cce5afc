use crate::handler::Handler;

/// Ordered set of (prefix, handler) registrations with longest-prefix
/// lookup. Registration happens before serving starts; the table is
/// read-only afterwards.
pub struct RouteTable {
    routes: Vec<(String, Handler)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(&mut self, prefix: &str, handler: Handler) {
        self.routes.push((prefix.to_string(), handler));
    }

    /// Sort entries by descending prefix length, called once when
    /// registration closes. The sort is stable, so equal-length prefixes
    /// keep their registration order.
    pub fn seal(&mut self) {
        self.routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// First handler (in sealed order) whose prefix starts `path`. The
    /// match is literal and anchored at index 0 only: prefix "/a" matches
    /// path "/ab".
    pub fn resolve(&self, path: &str) -> Option<&Handler> {
        self.routes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, handler)| handler)
    }
}
