use crate::PaginationError;
use crate::read::filters::FilterPredicate;
use crate::read::orders::OrderClause;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Field '{0}' cannot be compared with cursor value {1}")]
    CursorTypeMismatch(String, String),
    #[error("Field '{0}' is not a valid cursor (expected an integer or a string)")]
    InvalidCursorField(String),
    #[error("Record is not a JSON object")]
    NotAnObject,
}

/// A record store the paginator can count and fetch from.
///
/// Every pagination call opens exactly one session, runs at most one count and one fetch
/// on it, and closes it again whatever the outcome.
#[async_trait::async_trait]
pub trait RecordStore<V>: Clone + Debug + Send + Sync
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    type Session: Send;

    fn type_name(&self) -> &str;

    async fn start_session(&self) -> Result<Self::Session, PaginationError>;

    async fn close_session(&self, session: Self::Session) -> Result<(), PaginationError>;

    async fn count(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
    ) -> Result<u64, PaginationError>;

    async fn fetch(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
        order: &OrderClause,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<V>, PaginationError>;
}
