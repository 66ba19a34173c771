//! Sort and filter specs derived from query parameters.
//!
//! `order=field` sorts ascending, `order=-field` descending. Every other query
//! key is a filter candidate. Both are restricted to per-service allow-lists;
//! anything outside the allow-list is dropped, never reported.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Query parameter carrying the sort field.
pub const ORDER_PARAM: &str = "order";

/// Decoded query string. A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, name: &str) -> Option<&str> { self.0.get(name).map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Ordered `field → direction` list; a field appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec(Vec<(String, Direction)>);

impl OrderSpec {
    pub fn new() -> Self { Self::default() }

    pub fn asc(field: impl Into<String>) -> Self { Self::new().then(field, Direction::Asc) }

    pub fn desc(field: impl Into<String>) -> Self { Self::new().then(field, Direction::Desc) }

    /// Append a field; an existing entry for the same field is replaced in place.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        let field = field.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = direction,
            None => self.0.push((field, direction)),
        }
        self
    }

    /// Parse an `order` query value: `-field` is descending, `field` ascending.
    /// Empty values, `0` and a bare `-` yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "0" {
            return None;
        }
        let (field, direction) = match value.strip_prefix('-') {
            Some(field) => (field, Direction::Desc),
            None => (value, Direction::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self::new().then(field, direction))
    }

    pub fn retain_allowed(&mut self, allowed: &[&str]) {
        self.0.retain(|(field, _)| allowed.iter().any(|a| *a == field.as_str()));
    }

    pub fn get(&self, field: &str) -> Option<Direction> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, d)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.0.iter().map(|(f, d)| (f.as_str(), *d))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>> FromIterator<(K, Direction)> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = (K, Direction)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |spec, (field, direction)| spec.then(field, direction))
    }
}

/// `field → value` filter conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec(BTreeMap<String, Value>);

impl FilterSpec {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> { self.0.get(field) }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn into_inner(self) -> BTreeMap<String, Value> { self.0 }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Sort order for a listing.
///
/// Returns `default` unchanged when the `order` parameter is absent or empty,
/// or when its field is not in `allowed`.
pub fn resolve_order(query: &QueryParams, allowed: &[&str], default: OrderSpec) -> OrderSpec {
    let Some(mut parsed) = query.get(ORDER_PARAM).and_then(OrderSpec::parse) else {
        return default;
    };
    parsed.retain_allowed(allowed);
    if parsed.is_empty() {
        debug!(order = ?query.get(ORDER_PARAM), "order field not allowed; using default");
        return default;
    }
    parsed
}

/// Filter conditions for a listing.
///
/// Query params in `allowed` override same-named entries of `default`;
/// default entries not overridden are kept; all other params are dropped.
pub fn resolve_where(query: &QueryParams, allowed: &[&str], default: FilterSpec) -> FilterSpec {
    let mut merged = default.into_inner();
    for (field, value) in query.iter() {
        if allowed.iter().any(|a| *a == field) {
            merged.insert(field.to_string(), Value::String(value.to_string()));
        } else {
            debug!(%field, "filter field not allowed; dropped");
        }
    }
    FilterSpec(merged)
}
