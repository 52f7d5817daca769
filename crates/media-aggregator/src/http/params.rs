//! Query string parsing.
//!
//! Numeric parameters never reject a request: unparseable input falls back
//! to the default and the result is clamped into the allowed range.

use serde::Deserialize;
use std::ops::RangeInclusive;

/// Raw `q`/`page`/`limit` parameters, kept as text so bad numbers can fall back
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        numeric(self.page.as_deref(), 1, &(1..=crate::service::MAX_PAGE))
    }

    pub fn limit(&self, default: u32, bounds: &RangeInclusive<u32>) -> u32 {
        numeric(self.limit.as_deref(), default, bounds)
    }

    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

/// Parse `raw` as an integer, defaulting when absent or non-numeric, then clamp
pub fn numeric(raw: Option<&str>, default: u32, bounds: &RangeInclusive<u32>) -> u32 {
    let value = raw
        .and_then(|r| r.trim().parse::<i64>().ok())
        .unwrap_or(i64::from(default));

    value.clamp(i64::from(*bounds.start()), i64::from(*bounds.end())) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_defaults_and_clamps() {
        let bounds = 1..=50;
        assert_eq!(numeric(None, 20, &bounds), 20);
        assert_eq!(numeric(Some("abc"), 20, &bounds), 20);
        assert_eq!(numeric(Some("7"), 20, &bounds), 7);
        assert_eq!(numeric(Some("500"), 20, &bounds), 50);
        assert_eq!(numeric(Some("-3"), 20, &bounds), 1);
        assert_eq!(numeric(Some("0"), 20, &bounds), 1);
    }

    #[test]
    fn test_page_is_clamped() {
        let query = ListQuery {
            page: Some("99999".to_string()),
            ..Default::default()
        };
        assert_eq!(query.page(), 10_000);
        assert_eq!(ListQuery::default().page(), 1);
    }
}
