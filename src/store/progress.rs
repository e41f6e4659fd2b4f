//! Persisted per-series progress.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::config::OutputFormat;
use crate::error::Result;

/// Last completed episode and output preferences of one series in one
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub series: String,
    pub lang: String,
    /// Listing URL the series was downloaded from.
    pub url: String,
    pub last_chapter: u32,
    pub episodes_per_file: usize,
    pub format: OutputFormat,
    pub updated_at: DateTime<Utc>,
}

/// Key-value store of [`ProgressRecord`]s keyed by `(series, lang)`.
///
/// Implementations must serialize concurrent writes; several series jobs
/// may upsert their own rows at overlapping times.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get(&self, series: &str, lang: &str) -> Result<Option<ProgressRecord>>;

    /// Insert or update a record. `last_chapter` never moves backwards.
    async fn upsert(&self, record: &ProgressRecord) -> Result<()>;

    /// Every stored record, ordered by series then language.
    async fn list(&self) -> Result<Vec<ProgressRecord>>;
}

/// SQLite-backed progress store.
///
/// All statements run on the connection's single background thread, which
/// serializes writers.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    /// Open (or create) the database file and its table.
    pub async fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).await?;
        let store = Self { conn };
        store.setup_database().await?;
        Ok(store)
    }

    /// Open a throwaway in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        let store = Self { conn };
        store.setup_database().await?;
        Ok(store)
    }

    async fn setup_database(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS webtoon (
                        series            TEXT NOT NULL,
                        lang              TEXT NOT NULL,
                        url               TEXT NOT NULL,
                        last_chapter      INTEGER NOT NULL,
                        episodes_per_file INTEGER NOT NULL DEFAULT 1,
                        format            TEXT NOT NULL DEFAULT 'pdf',
                        updated_at        TEXT NOT NULL,
                        PRIMARY KEY (series, lang)
                    )",
                    [],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

const SELECT_COLUMNS: &str =
    "SELECT series, lang, url, last_chapter, episodes_per_file, format, updated_at FROM webtoon";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressRecord> {
    let format: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    let episodes_per_file: i64 = row.get(4)?;

    Ok(ProgressRecord {
        series: row.get(0)?,
        lang: row.get(1)?,
        url: row.get(2)?,
        last_chapter: row.get(3)?,
        episodes_per_file: usize::try_from(episodes_per_file).unwrap_or(1).max(1),
        format: format.parse().unwrap_or_default(),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
    })
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn get(&self, series: &str, lang: &str) -> Result<Option<ProgressRecord>> {
        let series = series.to_string();
        let lang = lang.to_string();

        let record = self
            .conn
            .call(move |conn| {
                let record = conn
                    .query_row(
                        &format!("{} WHERE series = ?1 AND lang = ?2", SELECT_COLUMNS),
                        params![series, lang],
                        record_from_row,
                    )
                    .optional()?;
                Ok(record)
            })
            .await?;
        Ok(record)
    }

    async fn upsert(&self, record: &ProgressRecord) -> Result<()> {
        let record = record.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO webtoon
                        (series, lang, url, last_chapter, episodes_per_file, format, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT (series, lang) DO UPDATE SET
                        url = excluded.url,
                        last_chapter = MAX(last_chapter, excluded.last_chapter),
                        episodes_per_file = excluded.episodes_per_file,
                        format = excluded.format,
                        updated_at = excluded.updated_at",
                    params![
                        record.series,
                        record.lang,
                        record.url,
                        record.last_chapter,
                        record.episodes_per_file as i64,
                        record.format.to_string(),
                        record.updated_at.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProgressRecord>> {
        let records = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{} ORDER BY series, lang", SELECT_COLUMNS))?;
                let rows = stmt.query_map([], record_from_row)?;
                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
            .await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(series: &str, last_chapter: u32) -> ProgressRecord {
        ProgressRecord {
            series: series.to_string(),
            lang: "en".to_string(),
            url: format!("https://www.webtoons.com/en/drama/{}/list?title_no=1", series),
            last_chapter,
            episodes_per_file: 2,
            format: OutputFormat::Cbz,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = SqliteProgressStore::open_in_memory().await.unwrap();
        assert!(store.get("sample", "en").await.unwrap().is_none());

        store.upsert(&record("sample", 12)).await.unwrap();

        let loaded = store.get("sample", "en").await.unwrap().unwrap();
        assert_eq!(loaded.last_chapter, 12);
        assert_eq!(loaded.episodes_per_file, 2);
        assert_eq!(loaded.format, OutputFormat::Cbz);
        assert!(store.get("sample", "fr").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_chapter_never_moves_backwards() {
        let store = SqliteProgressStore::open_in_memory().await.unwrap();
        store.upsert(&record("sample", 30)).await.unwrap();

        let mut older = record("sample", 5);
        older.format = OutputFormat::Pdf;
        store.upsert(&older).await.unwrap();

        let loaded = store.get("sample", "en").await.unwrap().unwrap();
        assert_eq!(loaded.last_chapter, 30);
        assert_eq!(loaded.format, OutputFormat::Pdf);
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = SqliteProgressStore::open_in_memory().await.unwrap();
        store.upsert(&record("zeta", 1)).await.unwrap();
        store.upsert(&record("alpha", 2)).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.series)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.db");

        {
            let store = SqliteProgressStore::open(&path).await.unwrap();
            store.upsert(&record("sample", 9)).await.unwrap();
        }

        let store = SqliteProgressStore::open(&path).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts() {
        let store = std::sync::Arc::new(SqliteProgressStore::open_in_memory().await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert(&record(&format!("s{}", i), i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 8);
    }
}
