//! Filter engine: a conjunction of optional predicates over stored records.
//!
//! [`Criteria`] is shared by the list endpoint (parsed from query
//! parameters) and the natural-language endpoint (produced by
//! [`crate::nl`]). Stores evaluate it natively; [`Criteria::matches`] is the
//! reference predicate they must agree with.
//!
//! # Parameters
//!
//! | Name | Accepted values | Predicate |
//! |------|-----------------|-----------|
//! | `is_palindrome` | `true`, `false`, `1`, `0` | `is_palindrome == v` |
//! | `min_length` | non-negative integer | `length >= n` |
//! | `max_length` | non-negative integer | `length <= n` |
//! | `word_count` | non-negative integer | `word_count == n` |
//! | `contains_character` | exactly one character | value contains it (case-sensitive) |
//!
//! Empty parameter values are treated as absent; unknown parameters are
//! ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::AnalyzedRecord;
use crate::store::Store;

/// Named optional constraints combined by logical AND.
///
/// Serializes to the `filters_applied` / `parsed_filters` mapping, omitting
/// absent criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

/// Records matching a [`Criteria`], newest first.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOutcome {
    #[serde(rename = "data")]
    pub records: Vec<AnalyzedRecord>,
    pub count: usize,
}

impl Criteria {
    /// Parse criteria from request parameters.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let param = |name: &str| params.get(name).map(String::as_str).filter(|v| !v.is_empty());

        Ok(Self {
            is_palindrome: param("is_palindrome").map(parse_bool).transpose()?,
            min_length: param("min_length")
                .map(|v| parse_count("min_length", v))
                .transpose()?,
            max_length: param("max_length")
                .map(|v| parse_count("max_length", v))
                .transpose()?,
            word_count: param("word_count")
                .map(|v| parse_count("word_count", v))
                .transpose()?,
            contains_character: param("contains_character").map(parse_char).transpose()?,
        })
    }

    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &AnalyzedRecord) -> bool {
        let props = &record.properties;
        self.is_palindrome.map_or(true, |v| props.is_palindrome == v)
            && self.min_length.map_or(true, |n| props.length >= n)
            && self.max_length.map_or(true, |n| props.length <= n)
            && self.word_count.map_or(true, |n| props.word_count == n)
            && self
                .contains_character
                .map_or(true, |c| record.value.contains(c))
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::invalid_criteria(format!(
            "is_palindrome must be true or false, got '{}'",
            other
        ))),
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        Error::invalid_criteria(format!(
            "{} must be a non-negative integer, got '{}'",
            name, value
        ))
    })
}

fn parse_char(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::invalid_criteria(format!(
            "contains_character must be a single character, got '{}'",
            value
        ))),
    }
}

/// Run `criteria` against `store`.
pub async fn apply<S: Store + ?Sized>(store: &S, criteria: &Criteria) -> Result<FilterOutcome> {
    let records = store.query(criteria).await?;
    let count = records.len();
    Ok(FilterOutcome { records, count })
}
