#![cfg(feature = "postgres")]

use paging_rust_lib::read::postgres::PostgresRecordStore;
use paging_rust_lib::read::{CursorValue, ListQuery, OffsetPaginationRequest, Orderization};
use paging_rust_lib::{PaginationConfig, QueryContext, Repository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
    email: String,
    deleted_at: Option<String>,
}

async fn setup_pg(table: &str) -> Option<tokio_postgres::Client> {
    use tokio_postgres::NoTls;
    // Only run Postgres-backed tests if PG_TEST_URI is provided.
    let dsn = std::env::var("PG_TEST_URI").ok()?;
    let (client, connection) = tokio_postgres::connect(&dsn, NoTls).await.ok()?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("Postgres connection error: {}", e);
        }
    });

    client
        .batch_execute(&format!(
            r#"
            DROP TABLE IF EXISTS {table};
            CREATE TABLE {table} (
                id BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                deleted_at TEXT
            );
            INSERT INTO {table} (id, name, email, deleted_at) VALUES
                (1, 'Alice', 'alice@example.org', NULL),
                (2, 'Bob', 'bob@example.com', NULL),
                (3, 'Carol', 'carol@example.org', NULL),
                (4, 'Dave', 'dave@example.com', NULL),
                (5, 'Bob', 'bob.two@example.net', NULL),
                (6, 'Eve', 'eve@example.org', '2024-01-01T00:00:00Z');
            "#
        ))
        .await
        .ok()?;
    Some(client)
}

fn repository(
    client: tokio_postgres::Client,
    table: &str,
) -> Repository<User, PostgresRecordStore<User>> {
    let store = PostgresRecordStore::new(Arc::new(client), "users", table);
    Repository::new(store, PaginationConfig::default())
}

#[tokio::test]
async fn test_postgres_offset_and_cursor() {
    let Some(client) = setup_pg("paging_users_pages").await else {
        eprintln!("PG_TEST_URI not set or connection failed; skipping Postgres test");
        return;
    };
    let repository = repository(client, "paging_users_pages");
    let context = QueryContext::default();

    let page = repository
        .all_offset(
            &[Orderization::asc("name"), Orderization::desc("id")],
            &[],
            &OffsetPaginationRequest::new(1, 3),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(page.last_page, 2);
    let keys: Vec<_> = page.data.iter().map(|u| (u.name.as_str(), u.id)).collect();
    assert_eq!(keys, vec![("Alice", 1), ("Bob", 5), ("Bob", 2)]);

    let cursor = repository
        .all_cursor(&[], Some(CursorValue::Int(3)), 1, &context)
        .await
        .unwrap();
    assert_eq!(cursor.data.iter().map(|u| u.id).collect::<Vec<_>>(), vec![4]);
    assert_eq!(cursor.next_cursor_page, Some(CursorValue::Int(4)));
}

#[tokio::test]
async fn test_postgres_filters_are_case_insensitive_and_literal() {
    let Some(client) = setup_pg("paging_users_filters").await else {
        return;
    };
    let repository = repository(client, "paging_users_filters");
    let query = ListQuery {
        filters: Some("name:BO,email:.com".to_string()),
        ..ListQuery::default()
    };
    let page = repository
        .list_offset(&query, &QueryContext::default())
        .await
        .unwrap();
    assert_eq!(page.data.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);

    let wildcard = ListQuery {
        filters: Some("email:%".to_string()),
        ..ListQuery::default()
    };
    let page = repository
        .list_offset(&wildcard, &QueryContext::default())
        .await
        .unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_postgres_unknown_column_degrades_to_empty_page() {
    let Some(client) = setup_pg("paging_users_degrade").await else {
        return;
    };
    let repository = repository(client, "paging_users_degrade");
    let query = ListQuery {
        orders: Some("missing_column:asc".to_string()),
        current_page: Some(2),
        ..ListQuery::default()
    };
    let page = repository
        .list_offset(&query, &QueryContext::default())
        .await
        .unwrap();
    assert_eq!(page.total_page, 1);
    assert_eq!(page.last_page, 1);
    assert_eq!(page.next_page, None);
    assert_eq!(page.previous_page, None);
    assert!(page.data.is_empty());

    let cursor = repository
        .all_cursor(&[], Some(CursorValue::from("abc")), 2, &QueryContext::default())
        .await
        .unwrap();
    assert!(cursor.data.is_empty());
    assert_eq!(cursor.next_cursor_page, None);
}
