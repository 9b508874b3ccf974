use serde::{Deserialize, Serialize};

/// Largest `limitPage` a request may ask for.
pub const MAX_LIMIT_PAGE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Page size used when a request does not carry `limitPage`.
    pub default_limit: i64,
    /// Largest `limitPage` accepted. It can only lower the ceiling: values above
    /// [`MAX_LIMIT_PAGE`] are clamped to it, see [`PaginationConfig::limit_ceiling`].
    pub max_limit: i64,
    /// Field cursor pagination walks when the caller does not name one.
    pub default_cursor_field: String,
    /// When set, store failures are logged and turned into an empty page.
    pub degrade_on_error: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: MAX_LIMIT_PAGE,
            default_cursor_field: "id".to_string(),
            degrade_on_error: true,
        }
    }
}

impl PaginationConfig {
    /// `max_limit` clamped to `1..=MAX_LIMIT_PAGE`.
    pub fn limit_ceiling(&self) -> i64 {
        self.max_limit.clamp(1, MAX_LIMIT_PAGE)
    }
}
