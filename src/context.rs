use chrono::{DateTime, Utc};

const ANONYMOUS: &str = "anonymous";

/// Per-request context handed by reference to every pagination call.
///
/// Owner-scoped repositories read [`QueryContext::user_id`]; the paginator reads the rest
/// for its log records.
#[derive(Debug, Clone)]
pub struct QueryContext {
    user_id: Option<String>,
    request_id: String,
    received_at: DateTime<Utc>,
    rand_bytes: Option<[u8; 16]>,
}

impl QueryContext {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id,
            request_id: String::new(),
            received_at: Utc::now(),
            rand_bytes: None,
        }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// User for log records, `anonymous` when there is none.
    pub fn current_user(&self) -> &str {
        self.user_id().unwrap_or(ANONYMOUS)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn with_next_request_id(self) -> Self {
        Self {
            request_id: self.next_uuid(),
            ..self
        }
    }

    /// When the request entered the library.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Fixes the random bytes behind [`QueryContext::next_uuid`], so every id is the same.
    ///
    /// ```rust
    /// use paging_rust_lib::QueryContext;
    ///
    /// let context = QueryContext::default().with_rand_bytes([0; 16]);
    /// assert_eq!(context.next_uuid(), "00000000-0000-4000-8000-000000000000");
    /// ```
    pub fn with_rand_bytes(mut self, bytes: [u8; 16]) -> Self {
        self.rand_bytes = Some(bytes);
        self
    }

    pub fn next_uuid(&self) -> String {
        let bytes = self.rand_bytes.unwrap_or_else(rand::random::<[u8; 16]>);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(None)
    }
}
