//! Storage abstraction for analyzed records.
//!
//! The [`Store`] trait is the only shared mutable resource in the system.
//! Backends are injected explicitly (SQLite in the application, the
//! [`memory::InMemoryStore`] in tests) rather than reached through global
//! state.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::Criteria;
use crate::models::AnalyzedRecord;

/// Abstract record store keyed by content hash.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](Store::insert) | Add a record; `Conflict` on duplicate value or hash |
/// | [`get_by_hash`](Store::get_by_hash) | Fetch one record; `NotFound` if absent |
/// | [`delete_by_hash`](Store::delete_by_hash) | Remove one record; `NotFound` if absent |
/// | [`query`](Store::query) | Records matching a [`Criteria`], newest first |
/// | [`count`](Store::count) | Total number of stored records |
/// | [`count_matching`](Store::count_matching) | Number of records matching a [`Criteria`] |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a record.
    ///
    /// The uniqueness check and the insert must be atomic: of two concurrent
    /// inserts of the same value, exactly one succeeds.
    async fn insert(&self, record: &AnalyzedRecord) -> Result<()>;

    async fn get_by_hash(&self, hash: &str) -> Result<AnalyzedRecord>;

    async fn delete_by_hash(&self, hash: &str) -> Result<()>;

    /// Records satisfying every criterion, ordered by `created_at` descending.
    /// Records created in the same instant are returned latest insert first.
    async fn query(&self, criteria: &Criteria) -> Result<Vec<AnalyzedRecord>>;

    async fn count(&self) -> Result<usize>;

    /// Number of records satisfying every criterion. Backends that can count
    /// without materializing records should override this.
    async fn count_matching(&self, criteria: &Criteria) -> Result<usize> {
        Ok(self.query(criteria).await?.len())
    }
}
