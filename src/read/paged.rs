use crate::PaginationError;
use crate::config::MAX_LIMIT_PAGE;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// Value of a cursor field: integers and strings are the only cursor types a page can
/// resume from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(untagged)]
pub enum CursorValue {
    Int(i64),
    Str(String),
}

impl CursorValue {
    /// Reads a cursor out of a JSON scalar.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(CursorValue::Int),
            serde_json::Value::String(s) => Some(CursorValue::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CursorValue::Int(i) => serde_json::Value::from(*i),
            CursorValue::Str(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for CursorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorValue::Int(i) => write!(f, "{i}"),
            CursorValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CursorValue {
    fn from(value: i64) -> Self {
        CursorValue::Int(value)
    }
}

impl From<&str> for CursorValue {
    fn from(value: &str) -> Self {
        CursorValue::Str(value.to_string())
    }
}

impl From<String> for CursorValue {
    fn from(value: String) -> Self {
        CursorValue::Str(value)
    }
}

fn validate_limit(limit_page: i64) -> Result<(), PaginationError> {
    if !(1..=MAX_LIMIT_PAGE).contains(&limit_page) {
        return Err(PaginationError::validation(format!(
            "limitPage must be between 1 and {MAX_LIMIT_PAGE}, got {limit_page}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OffsetPaginationRequest {
    pub current_page: i64,
    pub limit_page: i64,
}

impl OffsetPaginationRequest {
    pub fn new(current_page: i64, limit_page: i64) -> Self {
        Self {
            current_page,
            limit_page,
        }
    }

    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.current_page < 1 {
            return Err(PaginationError::validation(format!(
                "currentPage must be at least 1, got {}",
                self.current_page
            )));
        }
        validate_limit(self.limit_page)?;
        self.skip().map(|_| ())
    }

    /// Rows before this page. Fails when the offset does not fit a signed 64-bit column.
    pub fn skip(&self) -> Result<u64, PaginationError> {
        (self.current_page - 1)
            .checked_mul(self.limit_page)
            .and_then(|skip| u64::try_from(skip).ok())
            .ok_or_else(|| {
                PaginationError::validation(format!(
                    "currentPage {} is out of range for limitPage {}",
                    self.current_page, self.limit_page
                ))
            })
    }
}

impl Default for OffsetPaginationRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CursorPaginationRequest {
    pub cursor_field: String,
    #[serde(default)]
    pub cursor_page: Option<CursorValue>,
    pub limit_page: i64,
}

impl CursorPaginationRequest {
    pub fn new(
        cursor_field: impl Into<String>,
        cursor_page: Option<CursorValue>,
        limit_page: i64,
    ) -> Self {
        Self {
            cursor_field: cursor_field.into(),
            cursor_page,
            limit_page,
        }
    }

    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.cursor_field.trim().is_empty() {
            return Err(PaginationError::validation("cursorField must not be empty"));
        }
        validate_limit(self.limit_page)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OffsetPagination<T> {
    pub total_page: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
    pub first_page: i64,
    pub last_page: i64,
    pub data: Vec<T>,
}

impl<T> OffsetPagination<T> {
    /// Builds the page descriptor for `total` matching records.
    pub fn from_total(total: u64, request: &OffsetPaginationRequest, data: Vec<T>) -> Self {
        let per_page = request.limit_page;
        let current_page = request.current_page;
        let last_page = last_page(total, per_page);
        Self {
            total_page: last_page,
            per_page,
            current_page,
            next_page: (current_page < last_page).then_some(current_page + 1),
            previous_page: (current_page > 1).then_some(current_page - 1),
            first_page: 1,
            last_page,
            data,
        }
    }

    /// The page returned when the query could not be run.
    pub fn empty(request: &OffsetPaginationRequest) -> Self {
        Self {
            total_page: 1,
            per_page: request.limit_page,
            current_page: request.current_page,
            next_page: None,
            previous_page: None,
            first_page: 1,
            last_page: 1,
            data: vec![],
        }
    }

    pub fn map<U, F>(self, f: F) -> OffsetPagination<U>
    where
        F: FnMut(T) -> U,
    {
        OffsetPagination {
            total_page: self.total_page,
            per_page: self.per_page,
            current_page: self.current_page,
            next_page: self.next_page,
            previous_page: self.previous_page,
            first_page: self.first_page,
            last_page: self.last_page,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// `ceil(total / per_page)`, or 1 when nothing matches.
pub fn last_page(total: u64, per_page: i64) -> i64 {
    if total == 0 || per_page <= 0 {
        return 1;
    }
    let per_page = per_page as u64;
    total.div_ceil(per_page) as i64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CursorPagination<T> {
    pub next_cursor_page: Option<CursorValue>,
    pub data: Vec<T>,
}

impl<T> CursorPagination<T> {
    /// Builds a page out of up to `limit + 1` fetched rows; the extra row only signals
    /// that the stream continues.
    pub fn from_fetched<F>(
        mut rows: Vec<T>,
        limit: usize,
        cursor_of: F,
    ) -> Result<Self, PaginationError>
    where
        F: Fn(&T) -> Result<CursorValue, PaginationError>,
    {
        if rows.len() <= limit {
            return Ok(Self {
                next_cursor_page: None,
                data: rows,
            });
        }
        rows.truncate(limit);
        let next_cursor_page = match rows.last() {
            Some(last) => Some(cursor_of(last)?),
            None => None,
        };
        Ok(Self {
            next_cursor_page,
            data: rows,
        })
    }

    pub fn empty() -> Self {
        Self {
            next_cursor_page: None,
            data: vec![],
        }
    }

    pub fn map<U, F>(self, f: F) -> CursorPagination<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPagination {
            next_cursor_page: self.next_cursor_page,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// Response body wrapper: `{status, message, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ResponseEnvelope<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            message: "Ok".to_string(),
            data: Some(data),
        }
    }
}

/// Total order over JSON values used to sort in-memory records:
/// null < bool < number < string < array < object.
pub(crate) fn compare_json(a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
    use serde_json::Value;
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_page_math() {
        assert_eq!(last_page(0, 10), 1);
        assert_eq!(last_page(1, 10), 1);
        assert_eq!(last_page(10, 10), 1);
        assert_eq!(last_page(11, 10), 2);
        assert_eq!(last_page(25, 10), 3);
        assert_eq!(last_page(100, 1), 100);
        assert_eq!(last_page(101, 100), 2);
    }

    #[test]
    fn test_navigation_middle_page() {
        let page = OffsetPagination::from_total(25, &OffsetPaginationRequest::new(2, 10), vec![0u8; 10]);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.total_page, 3);
        assert_eq!(page.next_page, Some(3));
        assert_eq!(page.previous_page, Some(1));
        assert_eq!(page.first_page, 1);
    }

    #[test]
    fn test_navigation_edges() {
        let first = OffsetPagination::<u8>::from_total(25, &OffsetPaginationRequest::new(1, 10), vec![]);
        assert_eq!(first.previous_page, None);
        assert_eq!(first.next_page, Some(2));

        let last = OffsetPagination::<u8>::from_total(25, &OffsetPaginationRequest::new(3, 10), vec![]);
        assert_eq!(last.next_page, None);
        assert_eq!(last.previous_page, Some(2));

        let beyond = OffsetPagination::<u8>::from_total(25, &OffsetPaginationRequest::new(7, 10), vec![]);
        assert_eq!(beyond.next_page, None);
        assert_eq!(beyond.previous_page, Some(6));

        let nothing = OffsetPagination::<u8>::from_total(0, &OffsetPaginationRequest::new(1, 10), vec![]);
        assert_eq!(nothing.last_page, 1);
        assert_eq!(nothing.next_page, None);
        assert_eq!(nothing.previous_page, None);
    }

    #[test]
    fn test_offset_wire_format() {
        let page = OffsetPagination::from_total(3, &OffsetPaginationRequest::new(1, 2), vec!["a", "b"]);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "totalPage": 2,
                "perPage": 2,
                "currentPage": 1,
                "nextPage": 2,
                "previousPage": null,
                "firstPage": 1,
                "lastPage": 2,
                "data": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_empty_offset_page() {
        let page = OffsetPagination::<u8>::empty(&OffsetPaginationRequest::new(4, 20));
        assert_eq!(page.total_page, 1);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.current_page, 4);
        assert!(page.next_page.is_none());
        assert!(page.previous_page.is_none());
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_request_validation() {
        assert!(OffsetPaginationRequest::new(1, 1).validate().is_ok());
        assert!(OffsetPaginationRequest::new(1, 100).validate().is_ok());
        assert!(OffsetPaginationRequest::new(0, 10).validate().is_err());
        assert!(OffsetPaginationRequest::new(1, 0).validate().is_err());
        assert!(OffsetPaginationRequest::new(1, 101).validate().is_err());
        assert!(CursorPaginationRequest::new("id", None, 100).validate().is_ok());
        assert!(CursorPaginationRequest::new("", None, 10).validate().is_err());
        assert!(CursorPaginationRequest::new("id", None, 0).validate().is_err());
    }

    #[test]
    fn test_skip() {
        assert_eq!(OffsetPaginationRequest::new(1, 10).skip().unwrap(), 0);
        assert_eq!(OffsetPaginationRequest::new(3, 10).skip().unwrap(), 20);
    }

    #[test]
    fn test_skip_overflow_is_rejected() {
        let largest = OffsetPaginationRequest::new(i64::MAX / 100 + 1, 100);
        assert_eq!(largest.skip().unwrap(), (i64::MAX / 100 * 100) as u64);
        assert!(largest.validate().is_ok());

        let far = OffsetPaginationRequest::new(i64::MAX / 10, 100);
        assert!(matches!(far.skip(), Err(PaginationError::Validation(_))));
        assert!(matches!(far.validate(), Err(PaginationError::Validation(_))));
        assert!(OffsetPaginationRequest::new(i64::MAX, 2).validate().is_err());
    }

    #[test]
    fn test_cursor_truncation() {
        let page = CursorPagination::from_fetched(vec!["a", "b", "c"], 2, |s| {
            Ok(CursorValue::from(*s))
        })
        .unwrap();
        assert_eq!(page.data, vec!["a", "b"]);
        assert_eq!(page.next_cursor_page, Some(CursorValue::from("b")));
    }

    #[test]
    fn test_cursor_termination() {
        let exact = CursorPagination::from_fetched(vec![1i64, 2], 2, |i| Ok(CursorValue::Int(*i))).unwrap();
        assert_eq!(exact.data, vec![1, 2]);
        assert_eq!(exact.next_cursor_page, None);

        let short = CursorPagination::from_fetched(vec![1i64], 2, |i| Ok(CursorValue::Int(*i))).unwrap();
        assert_eq!(short.next_cursor_page, None);

        let none = CursorPagination::<i64>::from_fetched(vec![], 2, |i| Ok(CursorValue::Int(*i))).unwrap();
        assert!(none.data.is_empty());
        assert_eq!(none.next_cursor_page, None);
    }

    #[test]
    fn test_cursor_value_wire_format() {
        let req: CursorPaginationRequest =
            serde_json::from_str(r#"{"cursorField":"id","cursorPage":42,"limitPage":5}"#).unwrap();
        assert_eq!(req.cursor_page, Some(CursorValue::Int(42)));
        let req: CursorPaginationRequest =
            serde_json::from_str(r#"{"cursorField":"id","cursorPage":"01HX","limitPage":5}"#).unwrap();
        assert_eq!(req.cursor_page, Some(CursorValue::from("01HX")));
        let req: CursorPaginationRequest =
            serde_json::from_str(r#"{"cursorField":"id","limitPage":5}"#).unwrap();
        assert_eq!(req.cursor_page, None);

        let page = CursorPagination::<u8> {
            next_cursor_page: None,
            data: vec![],
        };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"nextCursorPage": null, "data": []})
        );
    }

    #[test]
    fn test_envelope() {
        let envelope = ResponseEnvelope::ok(CursorPagination::<u8>::empty());
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 200, "message": "Ok", "data": {"nextCursorPage": null, "data": []}})
        );
    }

    #[test]
    fn test_compare_json_ranks() {
        assert_eq!(compare_json(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_json(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_json(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_json(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_json(&json!(1), &json!("1")), Ordering::Less);
    }
}
