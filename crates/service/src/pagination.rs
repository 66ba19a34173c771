//! Pagination utilities for service layer
//!
//! `page` and `per_page` query params, normalized the same way for every listing.

use crate::query::QueryParams;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Read from query params; missing or unparsable values keep the defaults.
    pub fn from_query(query: &QueryParams) -> Self {
        let d = Self::default();
        let read = |name: &str, fallback: u32| {
            query.get(name).and_then(|v| v.trim().parse::<u32>().ok()).unwrap_or(fallback)
        };
        Self { page: read(PAGE_PARAM, d.page), per_page: read(PER_PAGE_PARAM, d.per_page) }
    }

    /// Clamp to sane defaults and convert to `(0-based page index, per_page)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;
    use crate::query::QueryParams;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn reads_query_and_ignores_garbage() {
        let q = QueryParams::from_pairs([("page", "3"), ("per_page", "abc")]);
        assert_eq!(Pagination::from_query(&q), Pagination { page: 3, per_page: 20 });
        let q = QueryParams::from_pairs([("page", "-1"), ("per_page", " 50 ")]);
        assert_eq!(Pagination::from_query(&q), Pagination { page: 1, per_page: 50 });
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }
}
