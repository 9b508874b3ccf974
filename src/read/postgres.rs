use crate::PaginationError;
use crate::read::filters::{Condition, FilterPredicate};
use crate::read::orders::{OrderClause, SortDirection};
use crate::read::paged::CursorValue;
use crate::read::storage::RecordStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_postgres::{Client, types::ToSql};
use tracing::debug;

fn map_pg_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> PaginationError {
    PaginationError::database_error(e)
}

pub type SqlParams = Vec<Box<dyn ToSql + Sync + Send>>;

/// Double-quotes an identifier so field names coming from a query string can never
/// leave the identifier position.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `%search%` with LIKE wildcards escaped.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Pushes a typed value and returns the cast its placeholder needs.
fn bind_value(value: &CursorValue, params: &mut SqlParams) -> &'static str {
    match value {
        CursorValue::Int(i) => {
            params.push(Box::new(*i));
            "BIGINT"
        }
        CursorValue::Str(s) => {
            params.push(Box::new(s.clone()));
            "TEXT"
        }
    }
}

/// Returns the WHERE body (without the keyword) and pushes bind values onto `params`.
/// An empty predicate gives an empty string.
pub fn to_where(predicate: &FilterPredicate, params: &mut SqlParams) -> String {
    predicate
        .conditions()
        .iter()
        .map(|condition| match condition {
            Condition::Contains { field, search } => {
                params.push(Box::new(like_pattern(search)));
                format!(
                    "CAST({} AS TEXT) ILIKE ${}",
                    quote_ident(field),
                    params.len()
                )
            }
            Condition::Equals { field, value } => {
                let cast = bind_value(value, params);
                format!("{} = ${}::{}", quote_ident(field), params.len(), cast)
            }
            Condition::IsNull { field } => format!("{} IS NULL", quote_ident(field)),
            Condition::GreaterThan { field, value } => {
                let cast = bind_value(value, params);
                format!("{} > ${}::{}", quote_ident(field), params.len(), cast)
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Returns the ORDER BY body (e.g. `"name" ASC, "id" DESC`).
pub fn to_order_by(order: &OrderClause) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    Some(
        order
            .iter()
            .map(|(field, direction)| {
                let direction = match direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{} {}", quote_ident(field), direction)
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn as_refs(params: &SqlParams) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|b| b.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Relational record store: rows are read back as `to_jsonb(row)` and deserialized into `V`,
/// so any table whose columns match `V`'s serde fields works.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore<V> {
    _phantom: PhantomData<V>,
    client: Arc<Client>,
    type_name: String,
    table_name: String,
}

impl<V> PostgresRecordStore<V>
where
    V: Debug + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    #[must_use]
    pub fn new(client: Arc<Client>, type_name: &str, table_name: &str) -> Self {
        Self {
            _phantom: PhantomData,
            client,
            type_name: type_name.to_string(),
            table_name: table_name.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        self.table_name.as_str()
    }

    fn where_clause(&self, predicate: &FilterPredicate, params: &mut SqlParams) -> String {
        let where_sql = to_where(predicate, params);
        if where_sql.trim().is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_sql)
        }
    }
}

#[async_trait::async_trait]
impl<V> RecordStore<V> for PostgresRecordStore<V>
where
    V: Debug + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    // The client handle is the session: each call runs its statements on it and drops it.
    type Session = Arc<Client>;

    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn start_session(&self) -> Result<Self::Session, PaginationError> {
        if self.client.is_closed() {
            return Err(PaginationError::database_error("postgres connection is closed"));
        }
        Ok(self.client.clone())
    }

    async fn close_session(&self, _session: Self::Session) -> Result<(), PaginationError> {
        Ok(())
    }

    async fn count(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
    ) -> Result<u64, PaginationError> {
        let mut params = SqlParams::new();
        let where_full = self.where_clause(predicate, &mut params);
        let sql = format!(
            "SELECT COUNT(*)::BIGINT AS total FROM {} t{}",
            self.table_name, where_full
        );
        debug!(sql = %sql, "Counting rows");
        let row = session
            .query_one(&sql, &as_refs(&params))
            .await
            .map_err(map_pg_error)?;
        let total: i64 = row.try_get::<_, i64>("total").map_err(map_pg_error)?;
        Ok(total.max(0) as u64)
    }

    async fn fetch(
        &self,
        session: &mut Self::Session,
        predicate: &FilterPredicate,
        order: &OrderClause,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<V>, PaginationError> {
        let mut params = SqlParams::new();
        let where_full = self.where_clause(predicate, &mut params);
        let order_by = to_order_by(order)
            .map(|s| format!(" ORDER BY {}", s))
            .unwrap_or_default();
        let offset = i64::try_from(skip).map_err(PaginationError::unexpected)?;
        params.push(Box::new(offset));
        params.push(Box::new(limit));
        let sql = format!(
            "SELECT to_jsonb(t) AS data FROM {} t{}{} OFFSET ${} LIMIT ${}",
            self.table_name,
            where_full,
            order_by,
            params.len() - 1,
            params.len()
        );
        debug!(sql = %sql, "Fetching rows");
        let rows = session
            .query(&sql, &as_refs(&params))
            .await
            .map_err(map_pg_error)?;
        let mut items: Vec<V> = Vec::with_capacity(rows.len());
        for row in rows {
            let val: JsonValue = row.try_get::<_, JsonValue>("data").map_err(map_pg_error)?;
            let v: V = serde_json::from_value(val).map_err(PaginationError::serialization_error)?;
            items.push(v);
        }
        Ok(items)
    }
}
