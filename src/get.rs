//! Single-record commands: `sa get` and `sa delete`.
//!
//! Identifiers resolve the same way as `GET /strings/{identifier}`: content
//! hash first, then raw value when `api.value_lookup` is enabled.

use anyhow::Result;

use string_analyzer_core::models::AnalyzedRecord;
use string_analyzer_core::records::{delete_record, get_record};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_get(config: &Config, identifier: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = get_record(&store, identifier, &config.api.record_options()).await;
    store.close().await;

    print_record(&result?);
    Ok(())
}

pub async fn run_delete(config: &Config, identifier: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = delete_record(&store, identifier, &config.api.record_options()).await;
    store.close().await;

    let id = result?;
    tracing::info!(id = %id, "string deleted");
    println!("deleted {}", id);
    Ok(())
}

fn print_record(record: &AnalyzedRecord) {
    let props = &record.properties;
    println!("--- String ---");
    println!("id:                {}", record.id);
    println!("value:             {}", record.value);
    println!("length:            {}", props.length);
    println!("is_palindrome:     {}", props.is_palindrome);
    println!("unique_characters: {}", props.unique_character_count);
    println!("word_count:        {}", props.word_count);
    println!(
        "created_at:        {}",
        record.created_at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
    );
    println!();

    println!("--- Character frequency ({}) ---", props.character_frequency.len());
    for (c, n) in &props.character_frequency {
        println!("{:?}: {}", c, n);
    }
}
