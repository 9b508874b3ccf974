use crate::PaginationError;
use crate::read::filters::{Condition, FilterPredicate};
use crate::read::orders::{OrderClause, SortDirection};
use crate::read::paged::{CursorValue, compare_json};
use crate::read::storage::{RecordStore, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A record store kept in memory, for tests and small applications.
///
/// Records are matched against their serde JSON form, so a field a record does not have
/// behaves like a document store's missing field: it never matches a substring and
/// counts as null.
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore<V> {
    records: Arc<Mutex<Vec<V>>>,
    type_name: String,
}

impl<V> InMemoryRecordStore<V>
where
    V: Clone + Serialize,
{
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            type_name: type_name.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<V>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, record: V) {
        self.lock().push(record);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = V>) {
        self.lock().extend(records);
    }

    pub fn all(&self) -> Vec<V> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn matching(&self, predicate: &FilterPredicate) -> Result<Vec<(Value, V)>, PaginationError> {
        let records = self.lock();
        let mut result = Vec::new();
        for record in records.iter() {
            let json = serde_json::to_value(record)?;
            if !json.is_object() {
                return Err(PaginationError::serialization_error(StorageError::NotAnObject));
            }
            if matches(&json, predicate)? {
                result.push((json, record.clone()));
            }
        }
        Ok(result)
    }
}

fn matches(record: &Value, predicate: &FilterPredicate) -> Result<bool, PaginationError> {
    for condition in predicate.conditions() {
        if !matches_condition(record, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_condition(record: &Value, condition: &Condition) -> Result<bool, PaginationError> {
    let value = record.get(condition.field()).unwrap_or(&Value::Null);
    match condition {
        Condition::Contains { search, .. } => {
            let haystack = match value {
                Value::String(s) => s.to_lowercase(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Ok(false),
            };
            Ok(haystack.contains(&search.to_lowercase()))
        }
        Condition::Equals {
            value: expected, ..
        } => Ok(match (value, expected) {
            (Value::Number(n), CursorValue::Int(i)) => n.as_i64() == Some(*i),
            (Value::String(s), CursorValue::Str(e)) => s == e,
            _ => false,
        }),
        Condition::IsNull { .. } => Ok(value.is_null()),
        Condition::GreaterThan { field, value: cursor } => match (value, cursor) {
            (Value::Null, _) => Ok(false),
            (Value::Number(_), CursorValue::Int(_)) | (Value::String(_), CursorValue::Str(_)) => {
                Ok(compare_json(value, &cursor.to_json()) == Ordering::Greater)
            }
            _ => Err(PaginationError::database_error(
                StorageError::CursorTypeMismatch(field.clone(), cursor.to_string()),
            )),
        },
    }
}

fn compare_records(a: &Value, b: &Value, order: &OrderClause) -> Ordering {
    for (field, direction) in order.iter() {
        let left = a.get(field).unwrap_or(&Value::Null);
        let right = b.get(field).unwrap_or(&Value::Null);
        let ordering = match direction {
            SortDirection::Asc => compare_json(left, right),
            SortDirection::Desc => compare_json(right, left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait::async_trait]
impl<V> RecordStore<V> for InMemoryRecordStore<V>
where
    V: Debug + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    type Session = ();

    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn start_session(&self) -> Result<Self::Session, PaginationError> {
        Ok(())
    }

    async fn close_session(&self, _session: Self::Session) -> Result<(), PaginationError> {
        Ok(())
    }

    async fn count(
        &self,
        _session: &mut Self::Session,
        predicate: &FilterPredicate,
    ) -> Result<u64, PaginationError> {
        let total = self.matching(predicate)?.len() as u64;
        debug!(store = %self.type_name, total, "Counted in-memory records");
        Ok(total)
    }

    async fn fetch(
        &self,
        _session: &mut Self::Session,
        predicate: &FilterPredicate,
        order: &OrderClause,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<V>, PaginationError> {
        let mut rows = self.matching(predicate)?;
        if !order.is_empty() {
            rows.sort_by(|(a, _), (b, _)| compare_records(a, b, order));
        }
        let limit = usize::try_from(limit).unwrap_or(0);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let items: Vec<V> = rows
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, record)| record)
            .collect();
        debug!(store = %self.type_name, fetched = items.len(), "Fetched in-memory records");
        Ok(items)
    }
}
