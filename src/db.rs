//! SQLite-backed insight store.
//!
//! Every operation opens its own connection and closes it before returning;
//! nothing is pooled or batched.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};

use crate::error::ConsumerError;
use crate::models::{EngagementInsight, EngagementLevel, InsightRecord};

#[derive(Debug, Clone)]
pub struct InsightStore {
    path: PathBuf,
}

impl InsightStore {
    /// Create the database file and schema if they are missing.
    pub async fn initialize(location: &Path) -> Result<Self, ConsumerError> {
        let store = InsightStore {
            path: location.to_path_buf(),
        };

        store
            .init_db()
            .await
            .map_err(|source| ConsumerError::StorageInit {
                location: location.to_path_buf(),
                source,
            })?;

        Ok(store)
    }

    async fn init_db(&self) -> Result<(), sqlx::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut conn = self.connect(true).await?;
        sqlx::migrate!("./migrations").run(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    async fn connect(&self, create_if_missing: bool) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(create_if_missing)
            .connect()
            .await
    }

    /// Insert one insight and return its row id.
    pub async fn append(&self, insight: &EngagementInsight) -> Result<i64, ConsumerError> {
        self.insert(insight)
            .await
            .map_err(ConsumerError::StorageWrite)
    }

    async fn insert(&self, insight: &EngagementInsight) -> Result<i64, sqlx::Error> {
        let mut conn = self.connect(false).await?;
        let mut tx = conn.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO engagement_insights
            (author, timestamp, category, sentiment, message_length,
             engagement_score, engagement_level, message_key)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&insight.author)
        .bind(&insight.timestamp)
        .bind(&insight.category)
        .bind(insight.sentiment)
        .bind(insight.message_length)
        .bind(insight.engagement_score)
        .bind(insight.engagement_level.as_str())
        .bind(&insight.message_key)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        conn.close().await?;
        Ok(id)
    }

    /// Message keys of the newest rows, newest first.
    pub async fn recent_keys(&self, limit: usize) -> Result<Vec<String>, ConsumerError> {
        self.select_recent_keys(limit)
            .await
            .map_err(ConsumerError::StorageRead)
    }

    async fn select_recent_keys(&self, limit: usize) -> Result<Vec<String>, sqlx::Error> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.connect(false).await?;

        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT message_key FROM engagement_insights
            WHERE message_key IS NOT NULL
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;
        Ok(keys)
    }

    /// Every stored insight, oldest first.
    pub async fn fetch_insights(&self) -> Result<Vec<InsightRecord>, ConsumerError> {
        self.select_insights()
            .await
            .map_err(ConsumerError::StorageRead)
    }

    async fn select_insights(&self) -> Result<Vec<InsightRecord>, sqlx::Error> {
        let mut conn = self.connect(false).await?;

        let rows = sqlx::query(
            "SELECT id, author, timestamp, category, sentiment, message_length, \
             engagement_score, engagement_level, message_key, processed_at \
             FROM engagement_insights ORDER BY id",
        )
        .fetch_all(&mut conn)
        .await?;

        conn.close().await?;
        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<InsightRecord, sqlx::Error> {
    let level: String = row.try_get("engagement_level")?;
    let engagement_level = level
        .parse::<EngagementLevel>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(InsightRecord {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        timestamp: row.try_get("timestamp")?,
        category: row.try_get("category")?,
        sentiment: row.try_get("sentiment")?,
        message_length: row.try_get("message_length")?,
        engagement_score: row.try_get("engagement_score")?,
        engagement_level,
        message_key: row.try_get("message_key")?,
        processed_at: row.try_get("processed_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement;
    use crate::models::Message;

    fn sample_insight(author: &str, sentiment: f64, length: i64) -> EngagementInsight {
        EngagementInsight::from_message(&Message {
            author: Some(author.to_string()),
            timestamp: Some("2025-01-29 14:35:20".to_string()),
            category: Some("humor".to_string()),
            sentiment,
            keyword_mentioned: None,
            message_length: length,
            message: Some(format!("hello from {author}")),
        })
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("insights.sqlite");

        let store = InsightStore::initialize(&path).await.expect("first init");
        store
            .append(&sample_insight("Charlie", 0.87, 42))
            .await
            .expect("append");

        let store = InsightStore::initialize(&path).await.expect("second init");
        let records = store.fetch_insights().await.expect("fetch");
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn unwritable_location_fails_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").expect("write");

        let result = InsightStore::initialize(&blocker.join("insights.sqlite")).await;
        assert!(matches!(result, Err(ConsumerError::StorageInit { .. })));
    }

    #[tokio::test]
    async fn append_without_schema_fails_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InsightStore {
            path: dir.path().join("missing.sqlite"),
        };

        let result = store.append(&sample_insight("Charlie", 0.5, 30)).await;
        assert!(matches!(result, Err(ConsumerError::StorageWrite(_))));
    }

    #[tokio::test]
    async fn stored_rows_match_fresh_scores() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InsightStore::initialize(&dir.path().join("insights.sqlite"))
            .await
            .expect("init");

        let first = store
            .append(&sample_insight("Charlie", 0.87, 42))
            .await
            .expect("append");
        let second = store
            .append(&sample_insight("Alice", 0.2, 30))
            .await
            .expect("append");
        assert!(second > first);

        let records = store.fetch_insights().await.expect("fetch");
        assert_eq!(records.len(), 2);
        for record in &records {
            let (score, level) = engagement::compute(record.sentiment, record.message_length);
            assert_eq!(record.engagement_score, score);
            assert_eq!(record.engagement_level, level);
        }
        assert_eq!(records[0].id, first);
        assert_eq!(records[0].author.as_deref(), Some("Charlie"));
        assert_eq!(records[1].engagement_level, EngagementLevel::VeryLow);
    }

    #[tokio::test]
    async fn recent_keys_are_newest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InsightStore::initialize(&dir.path().join("insights.sqlite"))
            .await
            .expect("init");

        for author in ["Alice", "Bob", "Charlie"] {
            store
                .append(&sample_insight(author, 0.6, 25))
                .await
                .expect("append");
        }

        let keys = store.recent_keys(2).await.expect("keys");
        assert_eq!(
            keys,
            vec![
                "Charlie_2025-01-29 14:35:20_hello from Charlie".to_string(),
                "Bob_2025-01-29 14:35:20_hello from Bob".to_string(),
            ]
        );
    }
}
