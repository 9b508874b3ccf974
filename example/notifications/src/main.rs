use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use paging_rust_lib::read::postgres::PostgresRecordStore;
use paging_rust_lib::read::storage::RecordStore;
use paging_rust_lib::read::{CursorListQuery, InMemoryRecordStore, ListQuery, ResponseEnvelope};
use paging_rust_lib::{PaginationConfig, QueryContext, Repository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_postgres::NoTls;
use tracing::{Level, error, info};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn seed(count: i64) -> Vec<Notification> {
    let origin = DateTime::<Utc>::UNIX_EPOCH + Duration::days(19_723) + Duration::hours(8);
    (1..=count)
        .map(|i| Notification {
            id: i,
            user_id: format!("u{}", i % 4),
            kind: if i % 3 == 0 { "Warning" } else { "Info" }.to_string(),
            message: format!("notification #{i}"),
            created_at: origin + Duration::minutes(i * 7),
            read_at: (i % 2 == 0).then(|| origin + Duration::hours(i)),
            deleted_at: (i % 11 == 0).then(|| origin + Duration::days(1)),
        })
        .collect()
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Offset pagination, e.g. `list --orders created_at:desc --filters type:warning`.
    List {
        #[clap(long)]
        orders: Option<String>,
        #[clap(long)]
        filters: Option<String>,
        #[clap(long)]
        current_page: Option<i64>,
        #[clap(long)]
        limit_page: Option<i64>,
    },
    /// Cursor pagination over `id`.
    Cursor {
        #[clap(long)]
        filters: Option<String>,
        #[clap(long)]
        cursor_page: Option<String>,
        #[clap(long)]
        limit_page: Option<i64>,
    },
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(long, global = true)]
    pub log_level: Option<Level>,
    /// Reads from the `notifications` table instead of an in-memory sample.
    #[clap(long, global = true, env = "PG_URL_SECRET")]
    pub pg_uri: Option<String>,
    #[clap(long, global = true, default_value = "42")]
    pub sample_size: i64,
    /// Only lists this user's notifications (`user_id` column).
    #[clap(long, global = true)]
    pub user_id: Option<String>,
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn execute(&self) -> Result<(), BoxError> {
        let config = PaginationConfig::default();
        match &self.pg_uri {
            Some(pg_uri) => {
                let (client, connection) = tokio_postgres::connect(pg_uri, NoTls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        error!("Postgres connection error: {}", e);
                    }
                });
                let client = Arc::new(client);
                init_schema(&client, self.sample_size).await?;
                let store = PostgresRecordStore::new(client, "notifications", "notifications");
                self.run(Repository::new(store, config)).await
            }
            None => {
                let store = InMemoryRecordStore::new("notifications");
                store.extend(seed(self.sample_size));
                self.run(Repository::new(store, config)).await
            }
        }
    }

    async fn run<S>(&self, repository: Repository<Notification, S>) -> Result<(), BoxError>
    where
        S: RecordStore<Notification>,
    {
        let (repository, context) = match &self.user_id {
            Some(user_id) => (
                repository.with_owner_field("user_id"),
                QueryContext::for_user(user_id.as_str()),
            ),
            None => (repository, QueryContext::default()),
        };
        let context = context.with_next_request_id();
        info!(request_id = context.request_id(), "Listing notifications");
        let body = match &self.command {
            Commands::List {
                orders,
                filters,
                current_page,
                limit_page,
            } => {
                let query = ListQuery {
                    orders: orders.clone(),
                    filters: filters.clone(),
                    current_page: *current_page,
                    limit_page: *limit_page,
                };
                let page = repository.list_offset(&query, &context).await?;
                serde_json::to_string_pretty(&ResponseEnvelope::ok(page))?
            }
            Commands::Cursor {
                filters,
                cursor_page,
                limit_page,
            } => {
                let query = CursorListQuery {
                    filters: filters.clone(),
                    cursor_page: cursor_page.clone(),
                    limit_page: *limit_page,
                };
                let page = repository.list_cursor(&query, &context).await?;
                serde_json::to_string_pretty(&ResponseEnvelope::ok(page))?
            }
        };
        println!("{body}");
        Ok(())
    }
}

async fn init_schema(client: &tokio_postgres::Client, count: i64) -> Result<(), BoxError> {
    client
        .batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id BIGINT PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                read_at TIMESTAMPTZ,
                deleted_at TIMESTAMPTZ
            );
            "#,
        )
        .await?;
    let row = client
        .query_one("SELECT COUNT(*)::BIGINT FROM notifications", &[])
        .await?;
    let existing: i64 = row.get(0);
    if existing > 0 {
        return Ok(());
    }
    info!(count, "Seeding notifications table");
    for n in seed(count) {
        client
            .execute(
                "INSERT INTO notifications (id, user_id, type, message, created_at, read_at, deleted_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &n.id,
                    &n.user_id,
                    &n.kind,
                    &n.message,
                    &n.created_at,
                    &n.read_at,
                    &n.deleted_at,
                ],
            )
            .await?;
    }
    Ok(())
}

fn init_tracing(log_level: Level) {
    let crate_name = env!("CARGO_CRATE_NAME");
    let filter = EnvFilter::from_default_env()
        .add_directive("info".parse().unwrap())
        .add_directive(format!("{crate_name}={log_level}").parse().unwrap())
        .add_directive(format!("paging_rust_lib={log_level}").parse().unwrap());
    let l = layer::<Registry>();
    let registry = tracing_subscriber::registry();

    registry
        .with(
            l.with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.unwrap_or(Level::INFO));

    cli.execute().await?;
    Ok(())
}
