//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Records live in insertion order in a `Vec` behind `std::sync::RwLock`.
//! The uniqueness check and the push happen under one write guard.

use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::filter::Criteria;
use crate::models::AnalyzedRecord;

use super::Store;

/// In-memory record store.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<AnalyzedRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage(anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert(&self, record: &AnalyzedRecord) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records
            .iter()
            .any(|r| r.id == record.id || r.value == record.value)
        {
            return Err(Error::Conflict {
                id: record.id.clone(),
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn get_by_hash(&self, hash: &str) -> Result<AnalyzedRecord> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .iter()
            .find(|r| r.id == hash)
            .cloned()
            .ok_or_else(|| Error::NotFound(hash.to_string()))
    }

    async fn delete_by_hash(&self, hash: &str) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        let pos = records
            .iter()
            .position(|r| r.id == hash)
            .ok_or_else(|| Error::NotFound(hash.to_string()))?;
        records.remove(pos);
        Ok(())
    }

    async fn query(&self, criteria: &Criteria) -> Result<Vec<AnalyzedRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        // Reverse insertion order first so the stable sort keeps the latest
        // insert ahead on equal timestamps.
        let mut matched: Vec<AnalyzedRecord> = records
            .iter()
            .rev()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }

    async fn count_matching(&self, criteria: &Criteria) -> Result<usize> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().filter(|r| criteria.matches(r)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryStore::new();
        let record = AnalyzedRecord::new("racecar");
        store.insert(&record).await.unwrap();
        let fetched = store.get_by_hash(&record.id).await.unwrap();
        assert_eq!(fetched, record);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let store = InMemoryStore::new();
        store.insert(&AnalyzedRecord::new("racecar")).await.unwrap();
        let err = store
            .insert(&AnalyzedRecord::new("racecar"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_by_hash("deadbeef").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_by_hash("deadbeef").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = InMemoryStore::new();
        let record = AnalyzedRecord::new("level");
        store.insert(&record).await.unwrap();
        store.delete_by_hash(&record.id).await.unwrap();
        assert!(matches!(
            store.get_by_hash(&record.id).await,
            Err(Error::NotFound(_))
        ));
        store.insert(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_newest_first() {
        let store = InMemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        store
            .insert(&AnalyzedRecord::with_created_at("newer", t1))
            .await
            .unwrap();
        store
            .insert(&AnalyzedRecord::with_created_at("older", t0))
            .await
            .unwrap();
        store
            .insert(&AnalyzedRecord::with_created_at("older tie", t0))
            .await
            .unwrap();

        let values: Vec<String> = store
            .query(&Criteria::default())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec!["newer", "older tie", "older"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_inserts_admit_one() {
        let store = Arc::new(InMemoryStore::new());
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

    #[tokio::test]
    async fn test_count_matching() {
        let store = InMemoryStore::new();
        for value in ["racecar", "noon", "hello"] {
            store.insert(&AnalyzedRecord::new(value)).await.unwrap();
        }
        let palindromes = Criteria {
            is_palindrome: Some(true),
            ..Default::default()
        };
        assert_eq!(store.count_matching(&palindromes).await.unwrap(), 2);
        assert_eq!(store.count_matching(&Criteria::default()).await.unwrap(), 3);
    }
}
