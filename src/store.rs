//! SQLite persistence for extracted articles.
//!
//! Each operation opens its own connection, runs inside its own transaction
//! and closes the connection before returning. Article URLs are unique: a
//! second insert for the same URL is reported as [`UpsertOutcome::Duplicate`]
//! and leaves the existing row untouched.

use crate::config::{CrawlConfig, is_sql_identifier};
use crate::error::StoreError;
use crate::models::{ArticleRecord, StoredArticle};
use crate::utils::ensure_parent_dir;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Result of a single insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { id: i64 },
    /// A row with the same article URL already exists.
    Duplicate,
}

/// Durable article storage keyed by article URL.
pub trait ArticleStore {
    /// Create the articles table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Insert `record` unless its URL is already stored.
    async fn upsert(&self, record: &ArticleRecord) -> Result<UpsertOutcome, StoreError>;

    /// The first `limit` rows in insertion order.
    async fn recent(&self, limit: u32) -> Result<Vec<StoredArticle>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// [`ArticleStore`] backed by a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteArticleStore {
    db_path: PathBuf,
    table: String,
    options: SqliteConnectOptions,
}

impl SqliteArticleStore {
    /// Prepare a store for `table_name` inside the database at `db_path`.
    ///
    /// No I/O happens here; the file and its parent directory are created by
    /// [`ArticleStore::ensure_schema`].
    pub fn new(db_path: &Path, table_name: &str) -> Result<Self, StoreError> {
        if !is_sql_identifier(table_name) {
            return Err(StoreError::InvalidTableName(table_name.to_string()));
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Ok(Self {
            db_path: db_path.to_path_buf(),
            table: table_name.to_string(),
            options,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, StoreError> {
        Self::new(&config.db_path, &config.table_name)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        Ok(self.options.connect().await?)
    }

    async fn insert(
        &self,
        conn: &mut SqliteConnection,
        record: &ArticleRecord,
    ) -> Result<UpsertOutcome, StoreError> {
        let sql = format!(
            "INSERT INTO {} (title, author, publication_date, article_url, content) \
             VALUES (?, ?, ?, ?, ?)",
            self.table
        );

        let mut tx = conn.begin().await?;
        let result = sqlx::query(&sql)
            .bind(record.title.as_deref())
            .bind(record.author.as_deref())
            .bind(record.publication_date.as_deref())
            .bind(&record.source_url)
            .bind(&record.content)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) => {
                tx.commit().await?;
                Ok(UpsertOutcome::Inserted {
                    id: done.last_insert_rowid(),
                })
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tx.rollback().await?;
                Ok(UpsertOutcome::Duplicate)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn select_recent(
        &self,
        conn: &mut SqliteConnection,
        limit: u32,
    ) -> Result<Vec<StoredArticle>, StoreError> {
        let sql = format!(
            "SELECT id, title, author, publication_date, article_url FROM {} \
             ORDER BY id LIMIT ?",
            self.table
        );

        let mut tx = conn.begin().await?;
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        rows.iter()
            .map(|row| -> Result<StoredArticle, StoreError> {
                Ok(StoredArticle {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    publication_date: row.try_get("publication_date")?,
                    article_url: row.try_get("article_url")?,
                })
            })
            .collect()
    }
}

/// The operation's own result wins over a failure to close its connection,
/// which is only logged. The transaction has already committed or rolled back.
fn after_close<T>(
    outcome: Result<T, StoreError>,
    closed: Result<(), sqlx::Error>,
) -> Result<T, StoreError> {
    if let Err(e) = closed {
        warn!(error = %e, "Failed to close database connection");
    }
    outcome
}

impl ArticleStore for SqliteArticleStore {
    #[instrument(level = "info", skip(self), fields(db = %self.db_path.display(), table = %self.table))]
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        ensure_parent_dir(&self.db_path).await?;

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                author TEXT,
                publication_date TEXT,
                article_url TEXT UNIQUE NOT NULL,
                content TEXT
            )",
            self.table
        );

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        sqlx::query(&sql).execute(&mut *tx).await?;
        tx.commit().await?;
        conn.close().await?;

        debug!("Article table ready");
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(url = %record.source_url))]
    async fn upsert(&self, record: &ArticleRecord) -> Result<UpsertOutcome, StoreError> {
        let mut conn = self.connect().await?;
        let outcome = self.insert(&mut conn, record).await;
        let outcome = after_close(outcome, conn.close().await)?;
        debug!(?outcome, "Upsert finished");
        Ok(outcome)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredArticle>, StoreError> {
        let mut conn = self.connect().await?;
        let rows = self.select_recent(&mut conn, limit).await;
        after_close(rows, conn.close().await)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        after_close(Ok(count), conn.close().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(url: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            source_url: url.to_string(),
            title: Some(title.to_string()),
            author: None,
            publication_date: Some("2024-03-03T10:00:00+05:30".to_string()),
            content: "Body.".to_string(),
        }
    }

    #[test]
    fn test_close_failure_keeps_insert_outcome() {
        let outcome = after_close(
            Ok(UpsertOutcome::Inserted { id: 7 }),
            Err(sqlx::Error::PoolClosed),
        );
        assert_eq!(outcome.unwrap(), UpsertOutcome::Inserted { id: 7 });
    }

    #[test]
    fn test_close_failure_keeps_operation_error() {
        let outcome: Result<UpsertOutcome, StoreError> = after_close(
            Err(StoreError::InvalidTableName("x".to_string())),
            Err(sqlx::Error::PoolClosed),
        );
        assert!(matches!(outcome, Err(StoreError::InvalidTableName(_))));
    }

    #[test]
    fn test_rejects_non_identifier_table() {
        let err = SqliteArticleStore::new(Path::new("a.db"), "articles;--").unwrap_err();
        assert!(matches!(err, StoreError::InvalidTableName(_)));
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SqliteArticleStore::new(&dir.path().join("articles.db"), "business_articles")
            .unwrap();

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("data").join("nested").join("articles.db");
        let store = SqliteArticleStore::new(&db_path, "business_articles").unwrap();

        store.ensure_schema().await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_duplicate_url_keeps_first_row() {
        let dir = tempdir().unwrap();
        let store = SqliteArticleStore::new(&dir.path().join("articles.db"), "business_articles")
            .unwrap();
        store.ensure_schema().await.unwrap();

        let url = "https://news.example/business/a";
        let first = store.upsert(&record(url, "Original")).await.unwrap();
        assert!(matches!(first, UpsertOutcome::Inserted { .. }));

        let second = store.upsert(&record(url, "Rewritten")).await.unwrap();
        assert_eq!(second, UpsertOutcome::Duplicate);

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("Original"));
        assert_eq!(rows[0].article_url, url);
    }

    #[tokio::test]
    async fn test_recent_orders_by_id_and_limits() {
        let dir = tempdir().unwrap();
        let store = SqliteArticleStore::new(&dir.path().join("articles.db"), "markets").unwrap();
        store.ensure_schema().await.unwrap();

        for (i, slug) in ["c", "a", "b"].iter().enumerate() {
            let outcome = store
                .upsert(&record(&format!("https://news.example/business/{slug}"), slug))
                .await
                .unwrap();
            assert_eq!(outcome, UpsertOutcome::Inserted { id: i as i64 + 1 });
        }

        let rows = store.recent(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].title.as_deref(), Some("c"));
        assert_eq!(rows[1].title.as_deref(), Some("a"));
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_null_fields_round_trip() {
        let dir = tempdir().unwrap();
        let store = SqliteArticleStore::new(&dir.path().join("articles.db"), "business_articles")
            .unwrap();
        store.ensure_schema().await.unwrap();

        let bare = ArticleRecord {
            source_url: "https://news.example/business/bare".to_string(),
            title: None,
            author: None,
            publication_date: None,
            content: "Only a body.".to_string(),
        };
        store.upsert(&bare).await.unwrap();

        let rows = store.recent(1).await.unwrap();
        assert_eq!(rows[0].title, None);
        assert_eq!(rows[0].author, None);
        assert_eq!(rows[0].publication_date, None);
    }

    #[tokio::test]
    async fn test_missing_table_is_store_error() {
        let dir = tempdir().unwrap();
        let store = SqliteArticleStore::new(&dir.path().join("articles.db"), "business_articles")
            .unwrap();

        let err = store
            .upsert(&record("https://news.example/business/a", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
