//! Deterministic cache keys.

/// Cache key built from an operation name, query text and paging window.
///
/// Query text is trimmed, lower-cased and has whitespace runs collapsed so
/// that `"  Naruto "` and `"naruto"` share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(operation: &str, query: &str, page: u32, limit: u32) -> Self {
        Self(format!(
            "{}:{}:{}:{}",
            operation,
            normalize_query(query),
            page,
            limit
        ))
    }

    /// Key for operations without query text or paging
    pub fn singleton(operation: &str) -> Self {
        Self::new(operation, "", 0, 0)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, lower-case and collapse internal whitespace
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
