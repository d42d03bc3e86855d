//! Record creation commands: `sa analyze`, `sa add`, and `sa import`.

use anyhow::{Context, Result};
use std::path::Path;

use string_analyzer_core::analyzer::analyze;
use string_analyzer_core::records::create_record;
use string_analyzer_core::Error;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Print the properties of `value` without storing it.
pub fn run_analyze(value: &str) -> Result<()> {
    let properties = analyze(value);
    println!("{}", serde_json::to_string_pretty(&properties)?);
    Ok(())
}

/// Analyze and store a single value, printing the stored record.
pub async fn run_add(config: &Config, value: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = create_record(&store, value, &config.api.record_options()).await;
    store.close().await;

    let record = result?;
    tracing::info!(id = %record.id, "string stored");
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Counts reported by [`run_import`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub added: u64,
    pub duplicates: u64,
    pub rejected: u64,
}

/// Store every non-blank line of `path`. Duplicates and invalid lines are
/// counted and skipped; storage failures abort the import.
pub async fn run_import(config: &Config, path: &Path) -> Result<ImportStats> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;

    let store = SqliteStore::open(config).await?;
    let opts = config.api.record_options();
    let mut stats = ImportStats::default();

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match create_record(&store, line, &opts).await {
            Ok(_) => stats.added += 1,
            Err(Error::Conflict { .. }) => stats.duplicates += 1,
            Err(Error::InvalidInput(msg)) => {
                tracing::warn!(line = lineno + 1, reason = %msg, "line rejected");
                stats.rejected += 1;
            }
            Err(e) => {
                store.close().await;
                return Err(e).with_context(|| format!("import failed at line {}", lineno + 1));
            }
        }
    }
    store.close().await;

    println!("import {}", path.display());
    println!("  added: {}", stats.added);
    println!("  duplicates: {}", stats.duplicates);
    println!("  rejected: {}", stats.rejected);
    println!("ok");

    Ok(stats)
}
