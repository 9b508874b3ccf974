/// Represents the various errors that can occur while building or running a paginated query.
///
/// Variants:
/// - `Validation`: the request carried a value the DTO constraints reject (page below 1,
///   limit outside `[1, 100]`, a sort direction other than `asc`/`desc`).
/// - `DatabaseError`: the record store failed (connectivity loss, unknown field, type
///   mismatch between a cursor value and the stored column). Encapsulates the driver error.
/// - `SerializationError`: a record could not be converted to or from its stored form, or
///   its cursor field is not an integer or a string.
/// - `UnexpectedError`: anything else.
///
/// Example:
/// ```
/// use paging_rust_lib::PaginationError;
///
/// fn example() -> Result<(), PaginationError> {
///     Err(PaginationError::validation("limitPage must be between 1 and 100"))
/// }
///
/// match example() {
///     Ok(_) => println!("Operation succeeded"),
///     Err(e) => eprintln!("Operation failed: {:?}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    DatabaseError(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("{0}")]
    SerializationError(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("{0}")]
    UnexpectedError(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl PaginationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn database_error<E>(e: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::DatabaseError(e.into())
    }

    pub fn serialization_error<E>(e: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::SerializationError(e.into())
    }

    pub fn unexpected<E>(e: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::UnexpectedError(e.into())
    }

    /// Short label used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            PaginationError::Validation(_) => "validation",
            PaginationError::DatabaseError(_) => "database",
            PaginationError::SerializationError(_) => "serialization",
            PaginationError::UnexpectedError(_) => "unexpected",
        }
    }
}

impl From<serde_json::Error> for PaginationError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(PaginationError::validation("x").kind(), "validation");
        assert_eq!(
            PaginationError::database_error("connection refused").kind(),
            "database"
        );
        assert_eq!(
            PaginationError::serialization_error("bad json").kind(),
            "serialization"
        );
    }

    #[test]
    fn test_display_forwards_inner_message() {
        let err = PaginationError::database_error("relation \"users\" does not exist");
        assert_eq!(err.to_string(), "relation \"users\" does not exist");
    }
}
