//! Store statistics (`sa stats`).

use anyhow::Result;

use string_analyzer_core::filter::Criteria;
use string_analyzer_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub palindromes: usize,
}

impl StoreStats {
    /// The two counts come from separate queries, so a concurrent insert can
    /// leave `palindromes` ahead of `total`.
    pub fn non_palindromes(&self) -> usize {
        self.total.saturating_sub(self.palindromes)
    }
}

pub async fn gather_stats<S: Store + ?Sized>(store: &S) -> Result<StoreStats> {
    let total = store.count().await?;
    let palindromes = store
        .count_matching(&Criteria {
            is_palindrome: Some(true),
            ..Default::default()
        })
        .await?;
    Ok(StoreStats { total, palindromes })
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = gather_stats(&store).await;
    store.close().await;

    let stats = result?;
    println!("strings:         {}", stats.total);
    println!("palindromes:     {}", stats.palindromes);
    println!("non-palindromes: {}", stats.non_palindromes());
    Ok(())
}
