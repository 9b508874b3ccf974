use crate::read::paged::CursorValue;
use serde::{Deserialize, Serialize};
#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// Nullable timestamp column marking a record as deleted.
pub const SOFT_DELETE_FIELD: &str = "deleted_at";

/// One substring condition on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Filterization {
    pub field: String,
    pub search: String,
}

impl Filterization {
    pub fn new(field: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            search: search.into(),
        }
    }
}

/// A single store-neutral condition. Each backend translates it into its own syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring match.
    Contains { field: String, search: String },
    /// Exact match, type included: `"u1"` never matches `"u11"` or `1`.
    Equals { field: String, value: CursorValue },
    IsNull { field: String },
    GreaterThan { field: String, value: CursorValue },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Condition::Contains { field, .. }
            | Condition::Equals { field, .. }
            | Condition::IsNull { field }
            | Condition::GreaterThan { field, .. } => field,
        }
    }
}

/// Conjunction of conditions. An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    conditions: Vec<Condition>,
}

impl FilterPredicate {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn and(mut self, other: FilterPredicate) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

pub fn build_filter_predicate(filters: &[Filterization]) -> FilterPredicate {
    FilterPredicate::new(
        filters
            .iter()
            .map(|f| Condition::Contains {
                field: f.field.clone(),
                search: f.search.clone(),
            })
            .collect(),
    )
}

/// `deleted_at IS NULL`.
pub fn soft_delete_scope() -> FilterPredicate {
    FilterPredicate::new(vec![Condition::IsNull {
        field: SOFT_DELETE_FIELD.to_string(),
    }])
}

/// `field = owner`, restricting a query to one owner's records.
pub fn owner_scope(field: &str, owner: impl Into<CursorValue>) -> FilterPredicate {
    FilterPredicate::new(vec![Condition::Equals {
        field: field.to_string(),
        value: owner.into(),
    }])
}

/// User filters with the soft-delete scope ANDed in, which is what every repository query runs.
pub fn scoped_predicate(filters: &[Filterization]) -> FilterPredicate {
    build_filter_predicate(filters).and(soft_delete_scope())
}
