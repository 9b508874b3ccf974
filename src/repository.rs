use crate::read::storage::RecordStore;
use crate::read::{
    CursorListQuery, CursorPagination, CursorPaginationRequest, CursorValue, Filterization,
    FilterPredicate, ListQuery, OffsetPagination, OffsetPaginationRequest, Orderization,
    Paginator, build_order_clause, owner_scope, scoped_predicate,
};
use crate::{PaginationConfig, PaginationError, QueryContext};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The usual shape of a list repository: user filters plus the soft-delete scope, user
/// orders, and cursor pagination always walking the configured cursor field.
///
/// With an owner field set, every query is also restricted to records whose owner field
/// equals the context's user id, and a context without a user is rejected.
#[derive(Debug, Clone)]
pub struct Repository<V, S> {
    paginator: Paginator<V, S>,
    owner_field: Option<String>,
}

impl<V, S> Repository<V, S>
where
    V: Serialize + DeserializeOwned + Send + Sync,
    S: RecordStore<V>,
{
    #[must_use]
    pub fn new(store: S, config: PaginationConfig) -> Self {
        Self {
            paginator: Paginator::new(store, config),
            owner_field: None,
        }
    }

    #[must_use]
    pub fn with_owner_field(mut self, field: impl Into<String>) -> Self {
        self.owner_field = Some(field.into());
        self
    }

    pub fn owner_field(&self) -> Option<&str> {
        self.owner_field.as_deref()
    }

    fn scope(
        &self,
        filters: &[Filterization],
        context: &QueryContext,
    ) -> Result<FilterPredicate, PaginationError> {
        let predicate = scoped_predicate(filters);
        let Some(field) = self.owner_field.as_deref() else {
            return Ok(predicate);
        };
        let owner = context.user_id().ok_or_else(|| {
            PaginationError::validation(format!(
                "{} is scoped by {field}, the request has no user",
                self.paginator.store().type_name()
            ))
        })?;
        Ok(predicate.and(owner_scope(field, owner)))
    }

    pub fn paginator(&self) -> &Paginator<V, S> {
        &self.paginator
    }

    pub async fn all_offset(
        &self,
        orders: &[Orderization],
        filters: &[Filterization],
        page: &OffsetPaginationRequest,
        context: &QueryContext,
    ) -> Result<OffsetPagination<V>, PaginationError> {
        let predicate = self.scope(filters, context)?;
        self.paginator
            .paginate_by_offset(&predicate, &build_order_clause(orders), page, context)
            .await
    }

    pub async fn all_cursor(
        &self,
        filters: &[Filterization],
        cursor_page: Option<CursorValue>,
        limit_page: i64,
        context: &QueryContext,
    ) -> Result<CursorPagination<V>, PaginationError> {
        let request = CursorPaginationRequest::new(
            self.paginator.config().default_cursor_field.as_str(),
            cursor_page,
            limit_page,
        );
        let predicate = self.scope(filters, context)?;
        self.paginator
            .paginate_by_cursor(&predicate, &request, context)
            .await
    }

    pub async fn list_offset(
        &self,
        query: &ListQuery,
        context: &QueryContext,
    ) -> Result<OffsetPagination<V>, PaginationError> {
        let page = query.page(self.paginator.config());
        self.all_offset(&query.orders(), &query.filters(), &page, context)
            .await
    }

    pub async fn list_cursor(
        &self,
        query: &CursorListQuery,
        context: &QueryContext,
    ) -> Result<CursorPagination<V>, PaginationError> {
        let limit = query.limit(self.paginator.config());
        self.all_cursor(&query.filters(), query.cursor(), limit, context)
            .await
    }
}
