use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::ServiceError;

/// Named path patterns with `{param}` placeholders, used to build URLs.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

pub type SharedRouter = Arc<RouteTable>;

impl RouteTable {
    pub fn new() -> Self { Self::default() }

    pub fn from_map(routes: BTreeMap<String, String>) -> Self { Self { routes } }

    pub fn add(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.routes.insert(name.into(), pattern.into());
        self
    }

    pub fn has(&self, name: &str) -> bool { self.routes.contains_key(name) }

    /// Substitute every `{param}` of the named pattern. Extra params are ignored.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ServiceError> {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| ServiceError::Route(format!("unknown route {name:?}")))?;
        let mut url = String::with_capacity(pattern.len());
        let mut rest = pattern.as_str();
        while let Some(open) = rest.find('{') {
            url.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| ServiceError::Route(format!("unclosed placeholder in route {name:?}")))?;
            let param = &after[..close];
            let value = params
                .iter()
                .find(|(k, _)| *k == param)
                .map(|(_, v)| *v)
                .ok_or_else(|| ServiceError::Route(format!("route {name:?} needs parameter {param:?}")))?;
            url.push_str(value);
            rest = &after[close + 1..];
        }
        url.push_str(rest);
        Ok(url)
    }
}
