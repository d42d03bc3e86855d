//! String property analysis.
//!
//! Every function here is pure and operates on the unmodified input: no
//! trimming, no normalization except where the palindrome check requires it.

use std::collections::{BTreeMap, HashSet};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::StringProperties;

/// Compute all derived properties of `value`.
pub fn analyze(value: &str) -> StringProperties {
    let character_frequency = character_frequency(value);
    StringProperties {
        length: value.chars().count(),
        is_palindrome: is_palindrome(value),
        unique_character_count: character_frequency.len(),
        word_count: word_count(value),
        content_hash: content_hash(value),
        character_frequency,
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `value`.
///
/// Clients can reproduce a record identifier by hashing the value locally.
pub fn content_hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Palindrome check ignoring case and anything that is not a letter or digit.
///
/// A value with no letters or digits is not a palindrome.
pub fn is_palindrome(value: &str) -> bool {
    let normalized: Vec<char> = value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if normalized.is_empty() {
        return false;
    }
    normalized.iter().eq(normalized.iter().rev())
}

pub fn word_count(value: &str) -> usize {
    value.split_whitespace().count()
}

pub fn unique_character_count(value: &str) -> usize {
    value.chars().collect::<HashSet<_>>().len()
}

pub fn character_frequency(value: &str) -> BTreeMap<char, usize> {
    let mut freq = BTreeMap::new();
    for c in value.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    freq
}

/// Reject values that cannot be stored: empty or whitespace-only strings,
/// and values longer than `max_length` characters (`0` disables the limit).
pub fn validate_value(value: &str, max_length: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input("value must not be empty or whitespace"));
    }
    if max_length > 0 && value.chars().count() > max_length {
        return Err(Error::invalid_input(format!(
            "value exceeds the maximum length of {} characters",
            max_length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hello "));
        assert_ne!(content_hash("hello"), content_hash("Hello"));
    }

    #[test]
    fn test_hash_known_vector() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_palindromes() {
        assert!(is_palindrome("racecar"));
        assert!(is_palindrome("A man, a plan, a canal: Panama"));
        assert!(is_palindrome("Was it a car or a cat I saw?"));
        assert!(is_palindrome("12321"));
        assert!(is_palindrome("x"));
        assert!(!is_palindrome("hello world"));
        assert!(!is_palindrome("ab"));
    }

    #[test]
    fn test_palindrome_without_alphanumerics_is_false() {
        assert!(!is_palindrome(""));
        assert!(!is_palindrome("   "));
        assert!(!is_palindrome("!?!"));
    }

    #[test]
    fn test_palindrome_unicode_letters() {
        assert!(is_palindrome("Ésé"));
        assert!(!is_palindrome("héllo"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("  spaced   out\tvalue\n"), 3);
    }

    #[test]
    fn test_length_counts_characters_untrimmed() {
        let props = analyze(" héllo ");
        assert_eq!(props.length, 7);
    }

    #[test]
    fn test_frequency_and_unique() {
        let props = analyze("hello world");
        assert_eq!(props.character_frequency[&'l'], 3);
        assert_eq!(props.character_frequency[&'o'], 2);
        assert_eq!(props.character_frequency[&' '], 1);
        assert_eq!(props.unique_character_count, 8);
        assert_eq!(unique_character_count("hello world"), 8);
    }

    #[test]
    fn test_frequency_is_case_sensitive() {
        let freq = character_frequency("Aa");
        assert_eq!(freq.len(), 2);
        assert_eq!(freq[&'A'], 1);
        assert_eq!(freq[&'a'], 1);
    }

    #[test]
    fn test_validate_value() {
        assert!(validate_value("ok", 0).is_ok());
        assert!(matches!(validate_value("", 0), Err(Error::InvalidInput(_))));
        assert!(matches!(validate_value(" \t\n", 0), Err(Error::InvalidInput(_))));
        assert!(validate_value("abc", 3).is_ok());
        assert!(matches!(validate_value("abcd", 3), Err(Error::InvalidInput(_))));
    }
}
