//! Three-tier key/value classification of tokenized header lines.
//!
//! A line's first token names its category. The rest of the line is
//! split into key and value by, in order:
//! 1. the category's pattern table, matched from token 1;
//! 2. the global "other" table, matched anywhere after token 0;
//! 3. the first token as key and everything else as value.
//!
//! Tables are ordered lists of pattern rows and the first matching row
//! wins, so a row like `{"a", "b"}` must come before `{"a"}`.

use std::collections::HashMap;

use regex::Regex;

use super::tokenize::join_tokens;
use crate::util::{Error, Result};

/// Ordered rows of token patterns.
///
/// Each pattern must match a whole lower-cased token.
#[derive(Clone, Debug)]
pub struct KeyTable {
    rows: Vec<Vec<Regex>>,
}

impl KeyTable {
    /// Compile a table from pattern rows.
    pub fn new(rows: &[&[&str]]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|p| compile(p)).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Token count consumed by the first row matching at `tokens[start..]`.
    fn match_at<S: AsRef<str>>(&self, tokens: &[S], start: usize) -> Option<usize> {
        self.rows
            .iter()
            .find(|row| row_matches(tokens, start, row))
            .map(|row| row.len())
    }

    /// First row matching anywhere in `tokens[1..]`, as the split index.
    fn match_anywhere<S: AsRef<str>>(&self, tokens: &[S]) -> Option<usize> {
        for row in &self.rows {
            // leaves at least one value token after the key
            let end = tokens.len().saturating_sub(row.len());
            for i in 1..end {
                if row_matches(tokens, i, row) {
                    return Some(i + row.len());
                }
            }
        }
        None
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| Error::other(format!("bad key pattern '{}': {}", pattern, e)))
}

fn row_matches<S: AsRef<str>>(tokens: &[S], start: usize, row: &[Regex]) -> bool {
    if start + row.len() > tokens.len() {
        return false;
    }
    row.iter()
        .zip(&tokens[start..])
        .all(|(re, token)| re.is_match(&token.as_ref().to_lowercase()))
}

/// Which tier produced a key/value split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
    Category,
    Other,
    Fallback,
}

/// One classified line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    /// Key tokens joined by single spaces, original case.
    pub key: String,
    /// Remaining tokens joined by single spaces.
    pub value: String,
    pub tier: MatchTier,
}

/// Category tables plus the shared "other" table.
#[derive(Clone, Debug)]
pub struct Classifier {
    categories: HashMap<String, KeyTable>,
    other: KeyTable,
}

impl Classifier {
    pub fn new(other: KeyTable) -> Self {
        Self { categories: HashMap::new(), other }
    }

    /// Register a category table; `name` is matched against the
    /// lower-cased first token.
    pub fn with_category(mut self, name: impl Into<String>, table: KeyTable) -> Self {
        self.categories.insert(name.into(), table);
        self
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Classify a tokenized line using its first token as category.
    ///
    /// Returns `None` for an empty line. Unknown categories skip the
    /// category tier.
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Option<KeyValue> {
        let first = tokens.first()?.as_ref().to_lowercase();
        Some(self.classify_in(tokens, self.categories.get(&first)))
    }

    fn classify_in<S: AsRef<str>>(&self, tokens: &[S], table: Option<&KeyTable>) -> KeyValue {
        let split = |at: usize, tier| KeyValue {
            key: join_tokens(tokens, 0, at),
            value: join_tokens(tokens, at, tokens.len()),
            tier,
        };
        if let Some(n) = table.and_then(|t| t.match_at(tokens, 1)) {
            // one extra for the category token
            return split(1 + n, MatchTier::Category);
        }
        if let Some(at) = self.other.match_anywhere(tokens) {
            return split(at, MatchTier::Other);
        }
        split(1, MatchTier::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn classifier() -> Classifier {
        let history = KeyTable::new(&[&["a", "b"], &["a"], &["laser\\d", "wavelength"]]).unwrap();
        let other = KeyTable::new(&[&["image", "form"], &["source"]]).unwrap();
        Classifier::new(other).with_category("history", history)
    }

    #[test]
    fn test_most_specific_row_wins() {
        let c = classifier();
        let kv = c.classify(&tokenize("history a b 1 2")).unwrap();
        assert_eq!(kv.key, "history a b");
        assert_eq!(kv.value, "1 2");
        assert_eq!(kv.tier, MatchTier::Category);

        let kv = c.classify(&tokenize("history a c")).unwrap();
        assert_eq!(kv.key, "history a");
        assert_eq!(kv.value, "c");
    }

    #[test]
    fn test_patterns_match_whole_lowercase_token() {
        let c = classifier();
        let kv = c.classify(&tokenize("History Laser2 Wavelength 488 nm")).unwrap();
        assert_eq!(kv.key, "History Laser2 Wavelength");
        assert_eq!(kv.value, "488 nm");

        // "ab" is not "a"
        let kv = c.classify(&tokenize("history ab x")).unwrap();
        assert_eq!(kv.tier, MatchTier::Fallback);
    }

    #[test]
    fn test_other_table_matches_anywhere() {
        let c = classifier();
        let kv = c.classify(&tokenize("history weird image form   single")).unwrap();
        assert_eq!(kv.tier, MatchTier::Other);
        assert_eq!(kv.key, "history weird image form");
        assert_eq!(kv.value, "single");

        // needs a value token after the key
        let kv = c.classify(&tokenize("sensor x source")).unwrap();
        assert_eq!(kv.tier, MatchTier::Fallback);
    }

    #[test]
    fn test_fallback_joins_with_single_spaces() {
        let c = classifier();
        let kv = c.classify(&tokenize("history   zzz\t\tone   two")).unwrap();
        assert_eq!(kv.tier, MatchTier::Fallback);
        assert_eq!(kv.key, "history");
        assert_eq!(kv.value, "zzz one two");

        let kv = c.classify(&tokenize("history")).unwrap();
        assert_eq!(kv.value, "");
        assert!(c.classify::<String>(&[]).is_none());
    }

    #[test]
    fn test_bad_pattern() {
        assert!(KeyTable::new(&[&["(unclosed"]]).is_err());
    }
}
