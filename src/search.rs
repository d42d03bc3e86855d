//! Filtered listing commands: `sa list` (structured criteria) and `sa query`
//! (natural language).

use anyhow::Result;

use string_analyzer_core::filter::{self, Criteria};
use string_analyzer_core::models::AnalyzedRecord;
use string_analyzer_core::nl;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_list(config: &Config, criteria: &Criteria) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = filter::apply(&store, criteria).await;
    store.close().await;

    let outcome = result?;
    if !criteria.is_empty() {
        println!("filters: {}", serde_json::to_string(criteria)?);
    }
    print_records(&outcome.records);
    Ok(())
}

pub async fn run_query(config: &Config, query: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = nl::filter_by_natural_language(&store, query).await;
    store.close().await;

    let outcome = result?;
    let trace = &outcome.interpreted_query;
    println!("query:   {}", trace.original);
    println!("filters: {}", serde_json::to_string(&trace.parsed_filters)?);
    println!("rules:   {}", trace.matched_rules.join(", "));
    print_records(&outcome.data);
    Ok(())
}

fn print_records(records: &[AnalyzedRecord]) {
    if records.is_empty() {
        println!("No results.");
        return;
    }

    println!("{} result(s)", records.len());
    for (i, record) in records.iter().enumerate() {
        let props = &record.properties;
        println!(
            "{}. [{}] {:?} (length: {}, words: {}, palindrome: {})",
            i + 1,
            &record.id[..12],
            record.value,
            props.length,
            props.word_count,
            props.is_palindrome
        );
    }
}
