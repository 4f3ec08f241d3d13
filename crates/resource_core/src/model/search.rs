//! Search parameters for the read path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PAGE_DEFAULT_LIMIT: u32 = 20;
const PAGE_LIMIT_MAX: u32 = 100;

/// Query specification handed to `Store::query` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Exact-match attribute filters, keyed by attribute name.
    #[serde(default)]
    pub filter: BTreeMap<String, serde_json::Value>,
    /// Page size. Defaults to 20 and clamps to 100.
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl SearchParameters {
    /// Adds one exact-match attribute filter.
    pub fn with_filter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.filter.insert(key.into(), value);
        self
    }
}

/// Index request: the resource type being listed plus its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    pub resource_type: String,
    pub parameters: SearchParameters,
}

impl IndexRequest {
    pub fn new(resource_type: impl Into<String>, parameters: SearchParameters) -> Self {
        Self {
            resource_type: resource_type.into(),
            parameters,
        }
    }
}

/// Normalizes a page limit.
pub fn normalize_page_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PAGE_DEFAULT_LIMIT,
        Some(value) if value > PAGE_LIMIT_MAX => PAGE_LIMIT_MAX,
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_page_limit;

    #[test]
    fn page_limit_defaults_and_clamps() {
        assert_eq!(normalize_page_limit(None), 20);
        assert_eq!(normalize_page_limit(Some(0)), 20);
        assert_eq!(normalize_page_limit(Some(7)), 7);
        assert_eq!(normalize_page_limit(Some(500)), 100);
    }
}
