use crate::PaginationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = PaginationError;

    // Case-sensitive on purpose: the accepted pattern is ^(asc|desc)$.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(PaginationError::validation(format!(
                "direction must match ^(asc|desc)$, got '{other}'"
            ))),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Orderization {
    pub field: String,
    pub direction: SortDirection,
}

impl Orderization {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Sort keys in precedence order: the first entry is the primary key, the rest break ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderClause {
    keys: Vec<(String, SortDirection)>,
}

impl OrderClause {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            keys: vec![(field.into(), direction)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.keys.iter().map(|(f, d)| (f.as_str(), *d))
    }
}

pub fn build_order_clause(orders: &[Orderization]) -> OrderClause {
    OrderClause {
        keys: orders
            .iter()
            .map(|o| (o.field.clone(), o.direction))
            .collect(),
    }
}
