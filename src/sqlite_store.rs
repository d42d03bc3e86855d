//! SQLite-backed [`Store`] implementation.
//!
//! Uniqueness is enforced by the `UNIQUE` constraints on `value` and
//! `content_hash`, so check-then-insert is a single atomic statement and a
//! unique violation surfaces as [`Error::Conflict`]. Filter criteria are
//! compiled into a parameterized `WHERE` clause.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use string_analyzer_core::filter::Criteria;
use string_analyzer_core::models::{AnalyzedRecord, StringProperties};
use string_analyzer_core::store::Store;
use string_analyzer_core::{Error, Result};

use crate::config::Config;
use crate::{db, migrate};

const SELECT_COLUMNS: &str = "SELECT content_hash, value, length, is_palindrome, unique_characters, \
     word_count, character_frequency_json, created_at FROM strings";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn storage(err: impl Into<anyhow::Error>) -> Error {
    Error::Storage(err.into())
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn row_to_record(row: &SqliteRow) -> Result<AnalyzedRecord> {
    let frequency_json: String = row.get("character_frequency_json");
    let character_frequency = serde_json::from_str(&frequency_json).map_err(storage)?;
    let created_ms: i64 = row.get("created_at");
    let created_at = DateTime::from_timestamp_millis(created_ms)
        .ok_or_else(|| storage(anyhow!("invalid created_at timestamp: {}", created_ms)))?;
    let content_hash: String = row.get("content_hash");
    let length: i64 = row.get("length");
    let unique_characters: i64 = row.get("unique_characters");
    let word_count: i64 = row.get("word_count");

    Ok(AnalyzedRecord {
        id: content_hash.clone(),
        value: row.get("value"),
        properties: StringProperties {
            length: length as usize,
            is_palindrome: row.get("is_palindrome"),
            unique_character_count: unique_characters as usize,
            word_count: word_count as usize,
            content_hash,
            character_frequency,
        },
        created_at,
    })
}

/// Append one `AND` term per set criterion.
fn push_criteria(qb: &mut QueryBuilder<'_, Sqlite>, criteria: &Criteria) {
    qb.push(" WHERE 1 = 1");

    if let Some(p) = criteria.is_palindrome {
        qb.push(" AND is_palindrome = ").push_bind(p);
    }
    if let Some(n) = criteria.min_length {
        qb.push(" AND length >= ").push_bind(to_i64(n));
    }
    if let Some(n) = criteria.max_length {
        qb.push(" AND length <= ").push_bind(to_i64(n));
    }
    if let Some(n) = criteria.word_count {
        qb.push(" AND word_count = ").push_bind(to_i64(n));
    }
    if let Some(c) = criteria.contains_character {
        // instr() is a literal, case-sensitive character search.
        qb.push(" AND instr(value, ")
            .push_bind(c.to_string())
            .push(") > 0");
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, record: &AnalyzedRecord) -> Result<()> {
        let props = &record.properties;
        let frequency_json =
            serde_json::to_string(&props.character_frequency).map_err(storage)?;

        sqlx::query(
            r#"
            INSERT INTO strings (content_hash, value, length, is_palindrome, unique_characters,
                                 word_count, character_frequency_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.value)
        .bind(to_i64(props.length))
        .bind(props.is_palindrome)
        .bind(to_i64(props.unique_character_count))
        .bind(to_i64(props.word_count))
        .bind(&frequency_json)
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Error::Conflict {
                id: record.id.clone(),
            },
            other => storage(other),
        })?;

        Ok(())
    }

    async fn get_by_hash(&self, hash: &str) -> Result<AnalyzedRecord> {
        let row = sqlx::query(&format!("{} WHERE content_hash = ?", SELECT_COLUMNS))
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row_to_record(&row),
            None => Err(Error::NotFound(hash.to_string())),
        }
    }

    async fn delete_by_hash(&self, hash: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM strings WHERE content_hash = ?")
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(hash.to_string()));
        }
        Ok(())
    }

    async fn query(&self, criteria: &Criteria) -> Result<Vec<AnalyzedRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        push_criteria(&mut qb, criteria);
        qb.push(" ORDER BY created_at DESC, seq DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn count(&self) -> Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM strings")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(n as usize)
    }

    async fn count_matching(&self, criteria: &Criteria) -> Result<usize> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM strings");
        push_criteria(&mut qb, criteria);

        let n: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DbConfig, ServerConfig};
    use chrono::{TimeZone, Utc};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::migrate::apply_schema(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_roundtrip_record() {
        let store = memory_store().await;
        let record = AnalyzedRecord::new("Was it a car or a cat I saw?");
        store.insert(&record).await.unwrap();
        let fetched = store.get_by_hash(&record.id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_unique_violation_is_conflict() {
        let store = memory_store().await;
        store.insert(&AnalyzedRecord::new("racecar")).await.unwrap();
        let err = store
            .insert(&AnalyzedRecord::new("racecar"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = memory_store().await;
        assert!(matches!(
            store.delete_by_hash("missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_query_agrees_with_reference_predicate() {
        let store = memory_store().await;
        let values = [
            "racecar",
            "Racecar",
            "hello world",
            "noon",
            "A man, a plan, a canal: Panama",
            "zebra",
            "abc xyz def",
        ];
        let mut records = Vec::new();
        for (i, v) in values.iter().enumerate() {
            let ts = Utc.timestamp_millis_opt(1_700_000_000_000 + i as i64).unwrap();
            let record = AnalyzedRecord::with_created_at(*v, ts);
            store.insert(&record).await.unwrap();
            records.push(record);
        }

        let cases = [
            Criteria::default(),
            Criteria {
                is_palindrome: Some(true),
                ..Default::default()
            },
            Criteria {
                is_palindrome: Some(true),
                word_count: Some(1),
                min_length: Some(5),
                ..Default::default()
            },
            Criteria {
                contains_character: Some('R'),
                ..Default::default()
            },
            Criteria {
                min_length: Some(4),
                max_length: Some(5),
                ..Default::default()
            },
            Criteria {
                word_count: Some(3),
                contains_character: Some('z'),
                ..Default::default()
            },
        ];

        for criteria in &cases {
            let got: Vec<String> = store
                .query(criteria)
                .await
                .unwrap()
                .into_iter()
                .map(|r| r.value)
                .collect();
            let expected: Vec<String> = records
                .iter()
                .rev()
                .filter(|r| criteria.matches(r))
                .map(|r| r.value.clone())
                .collect();
            assert_eq!(got, expected, "criteria: {:?}", criteria);
            assert_eq!(
                store.count_matching(criteria).await.unwrap(),
                expected.len(),
                "criteria: {:?}",
                criteria
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_inserts_admit_one() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config {
            db: DbConfig {
                path: tmp.path().join("strings.sqlite"),
            },
            server: ServerConfig::default(),
            api: ApiConfig::default(),
        };
        let store = Arc::new(SqliteStore::open(&config).await.unwrap());
        let record = AnalyzedRecord::new("racecar");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let record = record.clone();
                tokio::spawn(async move { store.insert(&record).await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(Error::Conflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
