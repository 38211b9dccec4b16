//! Text normalization: cleaning, splitting and stemming raw text into terms.
//!
//! The same normalizer prepares both documents and queries, so a query term
//! always has the form of the indexed terms it should match.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::stemmer::{PorterStemmer, Stemmer};
use crate::error::Result;

lazy_static! {
    static ref NON_ALPHABETIC: Regex =
        Regex::new(r"[^\p{Alphabetic}\s]+").expect("non-alphabetic pattern should be valid");
}

/// Remove every character that is neither alphabetic nor whitespace, then
/// lowercase what remains.
pub fn clean(text: &str) -> String {
    NON_ALPHABETIC.replace_all(text, "").to_lowercase()
}

/// Clean `text` and split it into words on whitespace.
pub fn parse(text: &str) -> Vec<String> {
    clean(text).split_whitespace().map(str::to_string).collect()
}

/// Turns raw text into an ordered sequence of stemmed terms.
#[derive(Clone)]
pub struct TextNormalizer {
    stemmer: Arc<dyn Stemmer>,
}

impl TextNormalizer {
    /// Create a normalizer using the Porter stemmer.
    pub fn new() -> Self {
        Self::with_stemmer(Arc::new(PorterStemmer::new()))
    }

    /// Create a normalizer using a custom stemmer.
    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        TextNormalizer { stemmer }
    }

    /// Clean, split and stem one line, appending the terms to `terms`.
    pub fn stem_line_into<C: Extend<String>>(&self, line: &str, terms: &mut C) {
        terms.extend(
            clean(line)
                .split_whitespace()
                .map(|word| self.stemmer.stem(word)),
        );
    }

    /// Terms of `text` in order of appearance, duplicates kept.
    pub fn list_stems(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        self.stem_line_into(text, &mut terms);
        terms
    }

    /// Distinct terms of `text`, sorted.
    pub fn unique_stems(&self, text: &str) -> BTreeSet<String> {
        let mut terms = BTreeSet::new();
        self.stem_line_into(text, &mut terms);
        terms
    }

    /// Terms of a UTF-8 text file, read one line at a time.
    pub fn list_stems_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut terms = Vec::new();
        for line in reader.lines() {
            self.stem_line_into(&line?, &mut terms);
        }
        Ok(terms)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_clean_removes_punctuation_and_digits() {
        assert_eq!(clean("Hello, World! 42 times"), "hello world  times");
        assert_eq!(clean("can't"), "cant");
        assert_eq!(clean("ÉCOLE"), "école");
    }

    #[test]
    fn test_parse_splits_on_whitespace() {
        assert_eq!(parse("  The\tquick\nbrown  "), vec!["the", "quick", "brown"]);
        assert!(parse("123 !!! ...").is_empty());
    }

    #[test]
    fn test_list_stems_keeps_order_and_duplicates() {
        let normalizer = TextNormalizer::new();
        let stems = normalizer.list_stems("Cats chase cats");

        assert_eq!(stems, vec!["cat", "chase", "cat"]);
    }

    #[test]
    fn test_unique_stems_sorted() {
        let normalizer = TextNormalizer::new();
        let stems = normalizer.unique_stems("world HELLO world hello!");

        assert_eq!(
            stems.into_iter().collect::<Vec<_>>(),
            vec!["hello".to_string(), "world".to_string()]
        );
    }

    #[test]
    fn test_list_stems_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Running cats").unwrap();
        writeln!(file, "hopping").unwrap();

        let normalizer = TextNormalizer::new();
        let stems = normalizer.list_stems_from_file(file.path()).unwrap();

        assert_eq!(stems, vec!["run", "cat", "hop"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.list_stems_from_file("/no/such/file.txt").is_err());
    }
}
