//! Rule-based natural-language query interpreter.
//!
//! Free text is lowercased and run through a fixed, ordered list of
//! [`Rule`]s. Each rule is a regex plus an extractor that writes into a
//! [`Criteria`]. Rules are independent: every rule is tried, and a later rule
//! overwrites whatever an earlier rule wrote under the same key. That
//! ordering is the precedence mechanism, e.g. the named-vowel rules run after
//! the generic "containing letter X" rule and win when both fire.
//!
//! | # | Rule | Phrases | Effect |
//! |---|------|---------|--------|
//! | 1 | `palindrome` | palindrome, palindromic | `is_palindrome = true` |
//! | 2 | `word_count` | single/one/1, two/2, three/3 word(s) | `word_count = n` |
//! | 3 | `longer_than` | longer than N | `min_length = N + 1` |
//! | 4 | `shorter_than` | shorter than N (N > 0) | `max_length = N - 1` |
//! | 5 | `exact_length` | exactly N, length of N, of length N | `min_length = max_length = N` |
//! | 6 | `contains_character` | containing/contains/contain/with [the] [letter\|character] X | `contains_character = X` |
//! | 7 | `named_vowel` | vowel a, letter a, character a | `contains_character = a` |
//! | 8 | `bare_vowel` | with a | `contains_character = a` |
//! | 9 | `ordinal_vowel` | first … fifth vowel | `contains_character = a … u` |
//!
//! `N` is a digit string or an English number word from zero to twenty.
//!
//! A rule may match several phrases in one query; every accepted match is
//! applied left to right, so the last phrase in the text wins
//! ("single word and two word strings" selects two words).
//!
//! A bare `a` or `i` after "with"/"containing" (no "letter"/"character")
//! is usually an article or pronoun, so it only counts when it stands alone:
//! end of text, punctuation, or one of `in`/`and`/`or` after it. "with a
//! length of 5" does not select `a`; "containing z characters" selects `z`.
//!
//! Keywords match whole words only: "nonpalindromic" does not trigger the
//! palindrome rule.
//!
//! A query where no rule fires is rejected with
//! [`Error::UnparseableQuery`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::filter::{self, Criteria};
use crate::models::AnalyzedRecord;
use crate::store::Store;

const NUMBER: &str = r"(\d+|zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty)";

static NUMBER_WORDS: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from([
        ("zero", 0),
        ("one", 1),
        ("two", 2),
        ("three", 3),
        ("four", 4),
        ("five", 5),
        ("six", 6),
        ("seven", 7),
        ("eight", 8),
        ("nine", 9),
        ("ten", 10),
        ("eleven", 11),
        ("twelve", 12),
        ("thirteen", 13),
        ("fourteen", 14),
        ("fifteen", 15),
        ("sixteen", 16),
        ("seventeen", 17),
        ("eighteen", 18),
        ("nineteen", 19),
        ("twenty", 20),
    ])
});

/// Words allowed right after a bare letter without turning it into an article.
const STANDALONE_FOLLOWERS: &[&str] = &["in", "and", "or"];

/// Single letters that are also English words.
const WORD_LETTERS: &[&str] = &["a", "i"];

/// One interpretation rule: a pattern and the extractor applied to each
/// match in order.
struct Rule {
    name: &'static str,
    pattern: Regex,
    /// Returns `false` to reject a match, leaving `criteria` untouched.
    extract: fn(&Captures<'_>, &mut Criteria) -> bool,
}

impl Rule {
    fn new(
        name: &'static str,
        pattern: &str,
        extract: fn(&Captures<'_>, &mut Criteria) -> bool,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {}: {}", name, e)),
            extract,
        }
    }

    /// Apply every accepted match. Returns whether the rule fired.
    fn apply(&self, text: &str, criteria: &mut Criteria) -> bool {
        self.pattern
            .captures_iter(text)
            .fold(false, |fired, caps| (self.extract)(&caps, criteria) || fired)
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("palindrome", r"\bpalindrom(?:e|es|ic)\b", |_, c| {
            c.is_palindrome = Some(true);
            true
        }),
        Rule::new(
            "word_count",
            r"\b(single|one|two|three|1|2|3)[\s-]+words?\b",
            |caps, c| {
                let n = match &caps[1] {
                    "single" | "one" | "1" => 1,
                    "two" | "2" => 2,
                    _ => 3,
                };
                c.word_count = Some(n);
                true
            },
        ),
        Rule::new(
            "longer_than",
            &format!(r"\blonger\s+than\s+{}\b", NUMBER),
            |caps, c| match parse_number(&caps[1]).and_then(|n| n.checked_add(1)) {
                Some(n) => {
                    c.min_length = Some(n);
                    true
                }
                None => false,
            },
        ),
        Rule::new(
            "shorter_than",
            &format!(r"\bshorter\s+than\s+{}\b", NUMBER),
            |caps, c| match parse_number(&caps[1]).and_then(|n| n.checked_sub(1)) {
                Some(n) => {
                    c.max_length = Some(n);
                    true
                }
                None => false,
            },
        ),
        Rule::new(
            "exact_length",
            &format!(
                r"\b(?:exactly|length\s+of|of\s+length)\s+{}\b(?:\s+([a-z]+))?",
                NUMBER
            ),
            |caps, c| {
                // "exactly two words" is a word count, not a length.
                if matches!(caps.get(2).map(|m| m.as_str()), Some("word" | "words")) {
                    return false;
                }
                match parse_number(&caps[1]) {
                    Some(n) => {
                        c.min_length = Some(n);
                        c.max_length = Some(n);
                        true
                    }
                    None => false,
                }
            },
        ),
        Rule::new(
            "contains_character",
            r"\b(?:containing|contains|contain|with)\s+(?:the\s+)?((?:letter|character|char)\s+)?([a-z])\b(?:\s+([a-z]+))?",
            |caps, c| {
                let named = caps.get(1).is_some();
                if !named && !reads_as_letter(&caps[2], caps.get(3).map(|m| m.as_str())) {
                    return false;
                }
                c.contains_character = caps[2].chars().next();
                true
            },
        ),
        Rule::new(
            "named_vowel",
            r"\b(?:vowel|letter|character)\s+([aeiou])\b",
            |caps, c| {
                c.contains_character = caps[1].chars().next();
                true
            },
        ),
        Rule::new(
            "bare_vowel",
            r"\bwith\s+([aeiou])\b(?:\s+([a-z]+))?",
            |caps, c| {
                if !reads_as_letter(&caps[1], caps.get(2).map(|m| m.as_str())) {
                    return false;
                }
                c.contains_character = caps[1].chars().next();
                true
            },
        ),
        Rule::new(
            "ordinal_vowel",
            r"\b(first|second|third|fourth|fifth)\s+vowel\b",
            |caps, c| {
                let vowel = match &caps[1] {
                    "first" => 'a',
                    "second" => 'e',
                    "third" => 'i',
                    "fourth" => 'o',
                    _ => 'u',
                };
                c.contains_character = Some(vowel);
                true
            },
        ),
    ]
});

fn parse_number(token: &str) -> Option<usize> {
    NUMBER_WORDS
        .get(token)
        .copied()
        .or_else(|| token.parse().ok())
}

fn reads_as_letter(letter: &str, next_word: Option<&str>) -> bool {
    !WORD_LETTERS.contains(&letter)
        || next_word.map_or(true, |w| STANDALONE_FOLLOWERS.contains(&w))
}

/// What the interpreter understood, echoed back to callers.
#[derive(Debug, Clone, Serialize)]
pub struct QueryTrace {
    /// The query exactly as received.
    pub original: String,
    pub parsed_filters: Criteria,
    /// Names of the rules that fired, in evaluation order.
    pub matched_rules: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Interpretation {
    pub criteria: Criteria,
    pub trace: QueryTrace,
}

/// Translate free text into [`Criteria`].
///
/// Fails with `InvalidInput` for a blank query and `UnparseableQuery` when
/// no rule fires.
pub fn interpret(query: &str) -> Result<Interpretation> {
    if query.trim().is_empty() {
        return Err(Error::invalid_input("query must not be empty"));
    }

    let text = query.to_lowercase();
    let mut criteria = Criteria::default();
    let matched_rules: Vec<&'static str> = RULES
        .iter()
        .filter(|rule| rule.apply(&text, &mut criteria))
        .map(|rule| rule.name)
        .collect();

    if matched_rules.is_empty() {
        return Err(Error::UnparseableQuery(query.to_string()));
    }

    Ok(Interpretation {
        criteria: criteria.clone(),
        trace: QueryTrace {
            original: query.to_string(),
            parsed_filters: criteria,
            matched_rules,
        },
    })
}

/// Records matching a natural-language query, with the interpretation.
#[derive(Debug, Clone, Serialize)]
pub struct NaturalLanguageOutcome {
    pub data: Vec<AnalyzedRecord>,
    pub count: usize,
    pub interpreted_query: QueryTrace,
}

/// Interpret `query` and run the resulting criteria against `store`.
pub async fn filter_by_natural_language<S: Store + ?Sized>(
    store: &S,
    query: &str,
) -> Result<NaturalLanguageOutcome> {
    let Interpretation { criteria, trace } = interpret(query)?;
    let outcome = filter::apply(store, &criteria).await?;
    Ok(NaturalLanguageOutcome {
        data: outcome.records,
        count: outcome.count,
        interpreted_query: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn criteria(query: &str) -> Criteria {
        interpret(query).unwrap().criteria
    }

    #[test]
    fn test_single_word_palindromic() {
        assert_eq!(
            criteria("all single word palindromic strings"),
            Criteria {
                is_palindrome: Some(true),
                word_count: Some(1),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_longer_than() {
        let c = criteria("strings longer than 5 characters");
        assert_eq!(c.min_length, Some(6));
        assert_eq!(c.max_length, None);
        assert_eq!(criteria("longer than ten characters").min_length, Some(11));
    }

    #[test]
    fn test_shorter_than() {
        assert_eq!(criteria("strings shorter than 4").max_length, Some(3));
        assert_eq!(criteria("Shorter Than Twelve letters").max_length, Some(11));
    }

    #[test]
    fn test_shorter_than_zero_does_not_fire() {
        assert!(matches!(
            interpret("strings shorter than 0"),
            Err(Error::UnparseableQuery(_))
        ));
    }

    #[test]
    fn test_exact_length_phrases() {
        for query in [
            "strings of exactly 7 characters",
            "strings with a length of 7",
            "words of length seven",
        ] {
            let c = criteria(query);
            assert_eq!(c.min_length, Some(7), "query: {}", query);
            assert_eq!(c.max_length, Some(7), "query: {}", query);
            assert_eq!(c.contains_character, None, "query: {}", query);
        }
    }

    #[test]
    fn test_exact_length_overrides_bounds() {
        let c = criteria("longer than 3 and exactly 5 characters");
        assert_eq!(c.min_length, Some(5));
        assert_eq!(c.max_length, Some(5));
    }

    #[test]
    fn test_exactly_n_words_is_word_count() {
        let c = criteria("strings with exactly two words");
        assert_eq!(c.word_count, Some(2));
        assert_eq!(c.min_length, None);
        assert_eq!(c.max_length, None);
    }

    #[test]
    fn test_word_count_variants() {
        assert_eq!(criteria("one word strings").word_count, Some(1));
        assert_eq!(criteria("1-word strings").word_count, Some(1));
        assert_eq!(criteria("two words").word_count, Some(2));
        assert_eq!(criteria("3 word phrases").word_count, Some(3));
    }

    #[test]
    fn test_containing_letter() {
        assert_eq!(
            criteria("strings containing the letter z").contains_character,
            Some('z')
        );
        assert_eq!(
            criteria("strings that contain the character q").contains_character,
            Some('q')
        );
        assert_eq!(criteria("strings with the letter k").contains_character, Some('k'));
        assert_eq!(criteria("containing x").contains_character, Some('x'));
        assert_eq!(
            criteria("strings containing z characters").contains_character,
            Some('z')
        );
        assert_eq!(criteria("containing q somewhere").contains_character, Some('q'));
        assert_eq!(criteria("with e characters").contains_character, Some('e'));
    }

    #[test]
    fn test_bare_letter_as_article_is_ignored() {
        assert!(matches!(
            interpret("strings containing a lot of text"),
            Err(Error::UnparseableQuery(_))
        ));
        let c = criteria("strings with a palindrome shape");
        assert_eq!(c.contains_character, None);
        assert_eq!(c.is_palindrome, Some(true));
        let c = criteria("with a length of 7");
        assert_eq!(c.contains_character, None);
        assert_eq!(c.min_length, Some(7));
        assert!(matches!(
            interpret("strings containing i think"),
            Err(Error::UnparseableQuery(_))
        ));
        assert_eq!(criteria("strings containing a").contains_character, Some('a'));
    }

    #[test]
    fn test_last_phrase_in_text_wins() {
        assert_eq!(
            criteria("single word and two word strings").word_count,
            Some(2)
        );
        assert_eq!(criteria("three word or one word").word_count, Some(1));
        assert_eq!(
            criteria("longer than 3 or longer than 8").min_length,
            Some(9)
        );
    }

    #[test]
    fn test_palindrome_keyword_is_whole_word() {
        assert!(matches!(
            interpret("nonpalindromic strings"),
            Err(Error::UnparseableQuery(_))
        ));
    }

    #[test]
    fn test_named_vowels() {
        assert_eq!(criteria("strings with the vowel e").contains_character, Some('e'));
        assert_eq!(criteria("letter o please").contains_character, Some('o'));
        assert_eq!(criteria("words with u").contains_character, Some('u'));
        assert_eq!(
            criteria("palindromic strings that contain the first vowel").contains_character,
            Some('a')
        );
        assert_eq!(criteria("the third vowel").contains_character, Some('i'));
    }

    #[test]
    fn test_vowel_rules_override_generic_letter() {
        let interp = interpret("containing the letter z and the vowel a").unwrap();
        assert_eq!(interp.criteria.contains_character, Some('a'));
        assert_eq!(
            interp.trace.matched_rules,
            vec!["contains_character", "named_vowel"]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let c = criteria("PALINDROMES Longer Than 2");
        assert_eq!(c.is_palindrome, Some(true));
        assert_eq!(c.min_length, Some(3));
    }

    #[test]
    fn test_unparseable_and_blank() {
        assert!(matches!(
            interpret("show me something nice"),
            Err(Error::UnparseableQuery(ref q)) if q == "show me something nice"
        ));
        assert!(matches!(interpret("   "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_trace_keeps_original_text() {
        let interp = interpret("Single Word Palindromes").unwrap();
        assert_eq!(interp.trace.original, "Single Word Palindromes");
        assert_eq!(interp.trace.parsed_filters, interp.criteria);
        assert_eq!(interp.trace.matched_rules, vec!["palindrome", "word_count"]);
    }

    #[tokio::test]
    async fn test_filter_by_natural_language() {
        let store = InMemoryStore::new();
        for value in ["racecar", "noon", "hello", "never odd or even", "kayak"] {
            store.insert(&AnalyzedRecord::new(value)).await.unwrap();
        }
        let outcome = filter_by_natural_language(&store, "single word palindromes longer than 4")
            .await
            .unwrap();
        let mut values: Vec<&str> = outcome.data.iter().map(|r| r.value.as_str()).collect();
        values.sort();
        assert_eq!(values, vec!["kayak", "racecar"]);
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.interpreted_query.parsed_filters.min_length, Some(5));
    }
}
