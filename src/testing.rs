use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TestRecord {
    pub fn new(id: i64, name: &str, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            deleted_at: None,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        self
    }
}

/// Six records, the last one soft-deleted, inserted out of name order.
pub fn test_records() -> Vec<TestRecord> {
    vec![
        TestRecord::new(1, "Alice", "alice@example.org"),
        TestRecord::new(2, "Bob", "bob@example.com"),
        TestRecord::new(3, "Carol", "carol@example.org"),
        TestRecord::new(4, "Dave", "dave@example.com"),
        TestRecord::new(5, "Bob", "bob.two@example.net"),
        TestRecord::new(6, "Eve", "eve@example.org").deleted(),
    ]
}
