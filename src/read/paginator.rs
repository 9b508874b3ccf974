use crate::read::filters::{Condition, FilterPredicate};
use crate::read::orders::{OrderClause, SortDirection};
use crate::read::paged::{
    CursorPagination, CursorPaginationRequest, CursorValue, OffsetPagination,
    OffsetPaginationRequest,
};
use crate::read::storage::{RecordStore, StorageError};
use crate::{PaginationConfig, PaginationError, QueryContext};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Runs offset and cursor pagination against a [`RecordStore`].
///
/// Store failures follow [`PaginationConfig::degrade_on_error`]: when set (the default)
/// the error is logged and an empty page is returned, so a failed query looks like a
/// query over zero records. Request validation errors are always returned.
#[derive(Debug, Clone)]
pub struct Paginator<V, S> {
    _phantom: PhantomData<V>,
    store: S,
    config: PaginationConfig,
}

impl<V, S> Paginator<V, S>
where
    V: Serialize + DeserializeOwned + Send + Sync,
    S: RecordStore<V>,
{
    #[must_use]
    pub fn new(store: S, config: PaginationConfig) -> Self {
        Self {
            _phantom: PhantomData,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    fn check_limit(&self, limit_page: i64) -> Result<(), PaginationError> {
        let ceiling = self.config.limit_ceiling();
        if limit_page > ceiling {
            return Err(PaginationError::validation(format!(
                "limitPage must not exceed {ceiling}, got {limit_page}"
            )));
        }
        Ok(())
    }

    fn degrade(
        &self,
        error: PaginationError,
        mode: &'static str,
        context: &QueryContext,
    ) -> Result<(), PaginationError> {
        if !self.config.degrade_on_error {
            return Err(error);
        }
        warn!(
            store = %self.store.type_name(),
            mode,
            request_id = %context.request_id(),
            user = %context.current_user(),
            received_at = %context.received_at(),
            kind = error.kind(),
            error = %error,
            "Pagination error, returning an empty page"
        );
        Ok(())
    }

    pub async fn paginate_by_offset(
        &self,
        predicate: &FilterPredicate,
        order: &OrderClause,
        request: &OffsetPaginationRequest,
        context: &QueryContext,
    ) -> Result<OffsetPagination<V>, PaginationError> {
        request.validate()?;
        self.check_limit(request.limit_page)?;
        debug!(
            store = %self.store.type_name(),
            request_id = %context.request_id(),
            current_page = request.current_page,
            limit_page = request.limit_page,
            conditions = predicate.conditions().len(),
            "Offset pagination"
        );
        match self.offset_page(predicate, order, request).await {
            Ok(page) => Ok(page),
            Err(e) => {
                self.degrade(e, "offset", context)?;
                Ok(OffsetPagination::empty(request))
            }
        }
    }

    pub async fn paginate_by_cursor(
        &self,
        predicate: &FilterPredicate,
        request: &CursorPaginationRequest,
        context: &QueryContext,
    ) -> Result<CursorPagination<V>, PaginationError> {
        request.validate()?;
        self.check_limit(request.limit_page)?;
        debug!(
            store = %self.store.type_name(),
            request_id = %context.request_id(),
            cursor_field = %request.cursor_field,
            cursor_page = ?request.cursor_page,
            limit_page = request.limit_page,
            "Cursor pagination"
        );
        match self.cursor_page(predicate, request).await {
            Ok(page) => Ok(page),
            Err(e) => {
                self.degrade(e, "cursor", context)?;
                Ok(CursorPagination::empty())
            }
        }
    }

    async fn offset_page(
        &self,
        predicate: &FilterPredicate,
        order: &OrderClause,
        request: &OffsetPaginationRequest,
    ) -> Result<OffsetPagination<V>, PaginationError> {
        let mut session = self.store.start_session().await?;
        let result = async {
            let total = self.store.count(&mut session, predicate).await?;
            let skip = request.skip()?;
            let data = self
                .store
                .fetch(&mut session, predicate, order, skip, request.limit_page)
                .await?;
            Ok::<_, PaginationError>(OffsetPagination::from_total(total, request, data))
        }
        .await;
        self.store.close_session(session).await?;
        result
    }

    async fn cursor_page(
        &self,
        predicate: &FilterPredicate,
        request: &CursorPaginationRequest,
    ) -> Result<CursorPagination<V>, PaginationError> {
        let field = request.cursor_field.as_str();
        let predicate = match &request.cursor_page {
            Some(value) => predicate.clone().with(Condition::GreaterThan {
                field: field.to_string(),
                value: value.clone(),
            }),
            None => predicate.clone(),
        };
        let order = OrderClause::by(field, SortDirection::Asc);

        let mut session = self.store.start_session().await?;
        let result = self
            .store
            .fetch(&mut session, &predicate, &order, 0, request.limit_page + 1)
            .await;
        self.store.close_session(session).await?;

        let limit = usize::try_from(request.limit_page).unwrap_or(0);
        CursorPagination::from_fetched(result?, limit, |record| cursor_of(record, field))
    }
}

/// Reads `field` out of a record's serde form.
pub fn cursor_of<V: Serialize>(record: &V, field: &str) -> Result<CursorValue, PaginationError> {
    let json = serde_json::to_value(record)?;
    json.get(field)
        .and_then(CursorValue::from_json)
        .ok_or_else(|| {
            PaginationError::serialization_error(StorageError::InvalidCursorField(
                field.to_string(),
            ))
        })
}
