//! SQLite connection pools for the conversation store.
//!
//! Writes go through a single connection so message appends and title
//! updates never contend on SQLite's one-writer lock; reads (listings,
//! history assembly) fan out over a small pool. WAL mode lets the readers
//! run while an append is in flight, and foreign keys stay on so deleting
//! a conversation cascades to its messages.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READ_POOL_SIZE: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The reader/writer pool pair every repository borrows from.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read-only pool for SELECTs.
    pub reader: SqlitePool,
    /// One connection; all mutations serialize through it.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating the file if needed) and migrate the database at
    /// `database_url`, then hand back the pool pair.
    ///
    /// Migrations run on the writer before the read-only pool opens, so a
    /// fresh database is fully shaped before anything can query it.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READ_POOL_SIZE)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Database URL under the resolved data directory:
/// `$CHATRELAY_DATA_DIR/chatrelay.db`, defaulting to `~/.chatrelay/`.
pub fn default_database_url() -> String {
    format!(
        "sqlite://{}/chatrelay.db",
        crate::config::resolve_data_dir().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp_pool(dir: &tempfile::TempDir, name: &str) -> DatabasePool {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join(name).display());
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_temp_pool(&dir, "schema.db").await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(names, vec!["conversations", "messages"]);
    }

    #[tokio::test]
    async fn test_wal_mode_and_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_temp_pool(&dir, "pragmas.db").await;

        let journal: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(journal.0.to_lowercase(), "wal");

        let fk: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(fk.0, 1);
    }

    #[tokio::test]
    async fn test_reader_pool_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_temp_pool(&dir, "readonly.db").await;

        let result = sqlx::query(
            "INSERT INTO conversations (id, title, created_at, updated_at) VALUES ('x', 't', 'now', 'now')",
        )
        .execute(&pool.reader)
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_default_database_url() {
        let url = default_database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("chatrelay.db"));
    }
}
