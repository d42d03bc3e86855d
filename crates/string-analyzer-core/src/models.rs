//! Core data models.
//!
//! An [`AnalyzedRecord`] is the unit of storage: the original string, its
//! derived [`StringProperties`], and the insertion timestamp. Records are
//! immutable once created; the only lifecycle events are creation and
//! deletion.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::analyze;

/// Properties derived from a string value. All fields are pure functions of
/// the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
    /// Number of characters (Unicode scalar values), no trimming.
    pub length: usize,
    /// Case- and punctuation-insensitive palindrome check.
    pub is_palindrome: bool,
    /// Number of distinct characters.
    #[serde(rename = "unique_characters")]
    pub unique_character_count: usize,
    /// Number of whitespace-delimited tokens.
    pub word_count: usize,
    /// Lowercase hex SHA-256 of the UTF-8 value.
    #[serde(rename = "sha256_hash")]
    pub content_hash: String,
    /// Occurrence count per character.
    #[serde(rename = "character_frequency_map")]
    pub character_frequency: BTreeMap<char, usize>,
}

/// A stored string and its analysis.
///
/// Serializes to the public response shape: `id` is the content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedRecord {
    /// Content hash, used as the public identifier.
    pub id: String,
    pub value: String,
    pub properties: StringProperties,
    pub created_at: DateTime<Utc>,
}

impl AnalyzedRecord {
    /// Analyze `value` and stamp the record with the current time.
    ///
    /// The timestamp is truncated to milliseconds, the precision every
    /// store persists.
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_created_at(value, Utc::now().trunc_subsecs(3))
    }

    pub fn with_created_at(value: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let value = value.into();
        let properties = analyze(&value);
        Self {
            id: properties.content_hash.clone(),
            value,
            properties,
            created_at,
        }
    }

    pub fn content_hash(&self) -> &str {
        &self.id
    }
}
