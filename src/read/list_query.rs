use crate::PaginationConfig;
use crate::read::filters::Filterization;
use crate::read::orders::Orderization;
use crate::read::paged::{CursorValue, OffsetPaginationRequest};
use crate::read::query_parser::{parse_filters, parse_orders};
use serde::{Deserialize, Serialize};
#[cfg(feature = "utoipa")]
use utoipa::IntoParams;

/// Query-string parameters of an offset list endpoint.
///
/// `orders` looks like `created_at:desc,type:asc`, `filters` like `type:info,user_id:123`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub orders: Option<String>,
    pub filters: Option<String>,
    pub current_page: Option<i64>,
    pub limit_page: Option<i64>,
}

impl ListQuery {
    pub fn orders(&self) -> Vec<Orderization> {
        parse_orders(self.orders.as_deref())
    }

    pub fn filters(&self) -> Vec<Filterization> {
        parse_filters(self.filters.as_deref())
    }

    pub fn page(&self, config: &PaginationConfig) -> OffsetPaginationRequest {
        OffsetPaginationRequest::new(
            self.current_page.unwrap_or(1),
            self.limit_page.unwrap_or(config.default_limit),
        )
    }
}

/// Query-string parameters of a cursor list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct CursorListQuery {
    pub filters: Option<String>,
    pub cursor_page: Option<String>,
    pub limit_page: Option<i64>,
}

impl CursorListQuery {
    pub fn filters(&self) -> Vec<Filterization> {
        parse_filters(self.filters.as_deref())
    }

    /// Query strings carry no type, so anything that parses as an integer is one.
    pub fn cursor(&self) -> Option<CursorValue> {
        let raw = self.cursor_page.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(i) => CursorValue::Int(i),
            Err(_) => CursorValue::from(raw),
        })
    }

    pub fn limit(&self, config: &PaginationConfig) -> i64 {
        self.limit_page.unwrap_or(config.default_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PaginationConfig::default();
        let query = ListQuery::default();
        assert_eq!(query.page(&config), OffsetPaginationRequest::new(1, 10));
        assert!(query.orders().is_empty());
        assert!(query.filters().is_empty());
        assert_eq!(CursorListQuery::default().limit(&config), 10);
        assert_eq!(CursorListQuery::default().cursor(), None);
    }

    #[test]
    fn test_from_query_string_json() {
        let query: ListQuery = serde_json::from_str(
            r#"{"orders":"created_at:desc","filters":"type:info","currentPage":3,"limitPage":25}"#,
        )
        .unwrap();
        assert_eq!(query.orders(), vec![Orderization::desc("created_at")]);
        assert_eq!(query.filters(), vec![Filterization::new("type", "info")]);
        assert_eq!(
            query.page(&PaginationConfig::default()),
            OffsetPaginationRequest::new(3, 25)
        );
    }

    #[test]
    fn test_cursor_typing() {
        let numeric = CursorListQuery {
            cursor_page: Some("42".to_string()),
            ..CursorListQuery::default()
        };
        assert_eq!(numeric.cursor(), Some(CursorValue::Int(42)));

        let text = CursorListQuery {
            cursor_page: Some("01HXZ3".to_string()),
            ..CursorListQuery::default()
        };
        assert_eq!(text.cursor(), Some(CursorValue::from("01HXZ3")));

        let blank = CursorListQuery {
            cursor_page: Some(" ".to_string()),
            ..CursorListQuery::default()
        };
        assert_eq!(blank.cursor(), None);
    }
}
