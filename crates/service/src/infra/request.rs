use axum::extract::Query;
use axum::http::Uri;

use crate::errors::ServiceError;
use crate::query::QueryParams;

/// The current HTTP request as seen by services: its URI and decoded query string.
#[derive(Debug, Clone)]
pub struct Request {
    uri: Uri,
    query: QueryParams,
}

impl Request {
    pub fn from_uri(uri: Uri) -> Result<Self, ServiceError> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        Ok(Self { uri, query: QueryParams::from_pairs(pairs) })
    }

    /// Parse a path-and-query string such as `/questions?order=-vote_count`.
    pub fn parse(uri: &str) -> Result<Self, ServiceError> {
        let uri: Uri = uri.parse().map_err(|e: axum::http::uri::InvalidUri| ServiceError::InvalidRequest(e.to_string()))?;
        Self::from_uri(uri)
    }

    pub fn uri(&self) -> &Uri { &self.uri }

    pub fn path(&self) -> &str { self.uri.path() }

    /// A single query parameter; `None` when absent.
    pub fn query_param(&self, name: &str) -> Option<&str> { self.query.get(name) }

    pub fn query_params(&self) -> &QueryParams { &self.query }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_query_string() {
        let req = Request::parse("/questions?order=-created_at&title=hello%20world&status=open").unwrap();
        assert_eq!(req.path(), "/questions");
        assert_eq!(req.query_param("order"), Some("-created_at"));
        assert_eq!(req.query_param("title"), Some("hello world"));
        assert_eq!(req.query_param("page"), None);
        assert_eq!(req.query_params().len(), 3);
    }

    #[test]
    fn no_query_string_means_no_params() {
        let req = Request::parse("/users").unwrap();
        assert!(req.query_params().is_empty());
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let req = Request::parse("/answers?status=open&status=closed").unwrap();
        assert_eq!(req.query_param("status"), Some("closed"));
    }
}
