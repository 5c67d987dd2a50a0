//! SQLite connection pools for the message log.
//!
//! WAL mode lets readers run alongside the single writer, so the log is
//! served from a small read-only pool while appends go through one
//! dedicated connection.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const READER_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader/writer pool pair over one database file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database at `path`, creating it if needed, and apply migrations.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // The reader pool is read-only, so the schema must exist first.
        MIGRATOR.run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Default database location: `{data_dir}/brainstorm.db`.
pub fn default_database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("brainstorm.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_messages_table() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("test.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn test_open_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("wal.db")).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("again.db");
        drop(DatabasePool::open(&path).await.unwrap());
        assert!(DatabasePool::open(&path).await.is_ok());
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path(Path::new("/data"));
        assert_eq!(path, Path::new("/data/brainstorm.db"));
    }
}
