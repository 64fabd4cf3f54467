use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::{Result, StoreError};

/// One durable record per document uploaded to the provider.
///
/// Column names of the `file_data` table are a compatibility surface for
/// API consumers; renames are breaking.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub file_size: i64,
    pub gigachat_file_id: String,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Fresh record with a generated id and the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, file_size: i64, gigachat_file_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            file_size,
            gigachat_file_id: gigachat_file_id.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

type RecordRow = (String, String, i64, String, String);

impl SqliteStore {
    /// Open (or create) the `SQLite` database and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub async fn new(path: &str) -> Result<Self> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let opts = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Expose the underlying pool for shared access.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_record(&self, record: &FileRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO file_data (id, name, file_size, gigachat_file_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.file_size)
        .bind(&record.gigachat_file_id)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a stored timestamp is invalid.
    pub async fn get_record(&self, id: &str) -> Result<Option<FileRecord>> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT id, name, file_size, gigachat_file_id, created_at \
             FROM file_data WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(record_from_row).transpose()
    }

    /// All records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored timestamp is invalid.
    pub async fn list_records(&self) -> Result<Vec<FileRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, name, file_size, gigachat_file_id, created_at \
             FROM file_data ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    /// Delete a record by id; `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_record(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM file_data WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_records(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

fn record_from_row(row: RecordRow) -> Result<FileRecord> {
    let (id, name, file_size, gigachat_file_id, created_at) = row;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|_| StoreError::InvalidTimestamp(created_at.clone()))?
        .with_timezone(&Utc);
    Ok(FileRecord {
        id,
        name,
        file_size,
        gigachat_file_id,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::new(":memory:").await.expect("in-memory store")
    }

    #[tokio::test]
    async fn insert_and_get_round_trips() {
        let store = store().await;
        let record = FileRecord::new("44FZ.pdf", 4096, "f-1");
        store.insert_record(&record).await.unwrap();

        let loaded = store.get_record(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "44FZ.pdf");
        assert_eq!(loaded.file_size, 4096);
        assert_eq!(loaded.gigachat_file_id, "f-1");
        assert_eq!(loaded.created_at.timestamp(), record.created_at.timestamp());
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let store = store().await;
        assert!(store.get_record("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let store = store().await;
        let mut old = FileRecord::new("old.pdf", 1, "f-old");
        old.created_at = Utc::now() - chrono::TimeDelta::hours(1);
        let new = FileRecord::new("new.pdf", 2, "f-new");
        store.insert_record(&old).await.unwrap();
        store.insert_record(&new).await.unwrap();

        let records = store.list_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "new.pdf");
        assert_eq!(records[1].name, "old.pdf");
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let store = store().await;
        let record = FileRecord::new("doc.pdf", 1, "f-1");
        store.insert_record(&record).await.unwrap();

        assert!(store.delete_record(&record.id).await.unwrap());
        assert!(!store.delete_record(&record.id).await.unwrap());
        assert_eq!(store.count_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_id_insert_fails() {
        let store = store().await;
        let record = FileRecord::new("doc.pdf", 1, "f-1");
        store.insert_record(&record).await.unwrap();
        let err = store.insert_record(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
