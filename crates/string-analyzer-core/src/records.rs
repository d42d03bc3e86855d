//! Record lifecycle operations: analyze-and-store, lookup, and deletion.
//!
//! Identifiers resolve against the content hash first. When value lookup
//! is enabled, an identifier that is not a stored hash is treated as a raw
//! value and resolved through its hash, so `GET /strings/racecar` and
//! `GET /strings/<sha256("racecar")>` address the same record.

use crate::analyzer::{content_hash, validate_value};
use crate::error::{Error, Result};
use crate::models::AnalyzedRecord;
use crate::store::Store;

/// Options governing record creation and identifier resolution.
#[derive(Debug, Clone, Copy)]
pub struct RecordOptions {
    /// Resolve identifiers as raw values when no hash matches.
    pub value_lookup: bool,
    /// Maximum accepted value length in characters; `0` means unlimited.
    pub max_value_length: usize,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            value_lookup: true,
            max_value_length: 0,
        }
    }
}

/// Validate, analyze, and insert `value`.
///
/// Fails with `InvalidInput` for blank or oversized values and with
/// `Conflict` when the value is already stored.
pub async fn create_record<S: Store + ?Sized>(
    store: &S,
    value: &str,
    opts: &RecordOptions,
) -> Result<AnalyzedRecord> {
    validate_value(value, opts.max_value_length)?;
    let record = AnalyzedRecord::new(value);
    store.insert(&record).await?;
    Ok(record)
}

pub async fn get_record<S: Store + ?Sized>(
    store: &S,
    identifier: &str,
    opts: &RecordOptions,
) -> Result<AnalyzedRecord> {
    match store.get_by_hash(identifier).await {
        Err(Error::NotFound(_)) if opts.value_lookup => store
            .get_by_hash(&content_hash(identifier))
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound(identifier.to_string()),
                other => other,
            }),
        other => other,
    }
}

/// Delete the record addressed by `identifier`, returning its hash.
pub async fn delete_record<S: Store + ?Sized>(
    store: &S,
    identifier: &str,
    opts: &RecordOptions,
) -> Result<String> {
    let record = get_record(store, identifier, opts).await?;
    store.delete_by_hash(&record.id).await?;
    Ok(record.id)
}
