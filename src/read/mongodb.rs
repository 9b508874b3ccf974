use crate::PaginationError;
use crate::read::filters::{Condition, FilterPredicate};
use crate::read::orders::{OrderClause, SortDirection};
use crate::read::paged::CursorValue;
use crate::read::storage::RecordStore;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{ClientSession, Database};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

fn map_mongo_error(e: mongodb::error::Error) -> PaginationError {
    PaginationError::database_error(e)
}

/// Escapes regex metacharacters so a search string is matched literally.
fn escape_regex(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn cursor_bson(value: &CursorValue) -> Bson {
    match value {
        CursorValue::Int(i) => Bson::Int64(*i),
        CursorValue::Str(s) => Bson::String(s.clone()),
    }
}

/// Filter document for a predicate; several conditions are combined with `$and`.
pub fn to_query(predicate: &FilterPredicate) -> Document {
    let mut conditions: Vec<Document> = predicate
        .conditions()
        .iter()
        .map(|condition| match condition {
            Condition::Contains { field, search } => {
                doc! { field: { "$regex": escape_regex(search), "$options": "i" } }
            }
            Condition::Equals { field, value } => doc! { field: cursor_bson(value) },
            Condition::IsNull { field } => doc! { field: Bson::Null },
            Condition::GreaterThan { field, value } => {
                doc! { field: { "$gt": cursor_bson(value) } }
            }
        })
        .collect();
    match conditions.len() {
        0 => doc! {},
        1 => conditions.remove(0),
        _ => doc! { "$and": conditions },
    }
}

/// Sort document; key order is precedence.
pub fn to_sort(order: &OrderClause) -> Option<Document> {
    if order.is_empty() {
        return None;
    }
    let mut sort = Document::new();
    for (field, direction) in order.iter() {
        let direction = match direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        sort.insert(field, direction);
    }
    Some(sort)
}

#[derive(Debug, Clone)]
pub struct MongoDbRecordStore<V> {
    _phantom: PhantomData<V>,
    database: Database,
    type_name: String,
    collection_name: String,
}

impl<V> MongoDbRecordStore<V>
where
    V: Debug + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    #[must_use]
    pub fn new(database: Database, type_name: &str, collection_name: &str) -> Self {
        Self {
            _phantom: PhantomData,
            database,
            type_name: type_name.to_string(),
            collection_name: collection_name.to_string(),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection_name.as_str()
    }
}

#[async_trait::async_trait]
impl<V> RecordStore<V> for MongoDbRecordStore<V>
where
    V: Debug + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    type Session = ClientSession;

    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn start_session(&self) -> Result<Self::Session, PaginationError> {
        self.database
            .client()
            .start_session()
            .await
            .map_err(map_mongo_error)
    }

    async fn close_session(&self, session: Self::Session) -> Result<(), PaginationError> {
        // The server-side session ends when the handle is dropped.
        drop(session);
        Ok(())
    }

    async fn count(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
    ) -> Result<u64, PaginationError> {
        let collection = self.database.collection::<V>(&self.collection_name);
        let query = to_query(predicate);
        debug!(collection = %self.collection_name, query = %query, "Counting documents");
        collection
            .count_documents(query)
            .session(&mut *session)
            .await
            .map_err(map_mongo_error)
    }

    async fn fetch(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
        order: &OrderClause,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<V>, PaginationError> {
        let collection = self.database.collection::<V>(&self.collection_name);
        let query = to_query(predicate);
        debug!(collection = %self.collection_name, query = %query, skip, limit, "Finding documents");
        let mut find = collection.find(query).skip(skip).limit(limit);
        if let Some(sort) = to_sort(order) {
            find = find.sort(sort);
        }
        let mut cursor = find
            .session(&mut *session)
            .await
            .map_err(map_mongo_error)?;
        cursor
            .stream(session)
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }
}
