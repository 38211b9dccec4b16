//! Ranked search results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One location that matched at least one query term.
///
/// Results sort by score descending, then matches descending, then
/// location ascending ignoring case. Exact location order breaks any
/// remaining tie so that the ordering is total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    location: String,
    matches: usize,
    count: usize,
    score: f64,
}

impl SearchResult {
    /// Create a result for `location`, which holds `count` terms in total,
    /// with `matches` occurrences of query terms found so far.
    pub fn new(location: impl Into<String>, count: usize, matches: usize) -> Self {
        let mut result = SearchResult {
            location: location.into(),
            matches,
            count,
            score: 0.0,
        };
        result.update_score();
        result
    }

    /// Add the occurrences of one more matching term.
    pub(crate) fn add_matches(&mut self, matches: usize) {
        self.matches += matches;
        self.update_score();
    }

    fn update_score(&mut self) {
        self.score = if self.count == 0 {
            0.0
        } else {
            self.matches as f64 / self.count as f64
        };
    }

    /// The matching location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Total occurrences of all matching terms at this location.
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Total number of terms at this location.
    pub fn count(&self) -> usize {
        self.count
    }

    /// `matches / count`.
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Case-insensitive comparison that folds each character to upper case and
/// then to lower case, so letters with several lower-case forms (`ς`, `σ`)
/// compare equal.
fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().map(fold_case).cmp(b.chars().map(fold_case))
}

fn fold_case(c: char) -> char {
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

// Multi-character mappings (`ß` → `SS`) leave the character unchanged.
fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.matches.cmp(&self.matches))
            .then_with(|| compare_ignore_case(&self.location, &other.location))
            .then_with(|| self.location.cmp(&other.location))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_ratio() {
        let mut result = SearchResult::new("a.txt", 4, 1);
        assert_eq!(result.score(), 0.25);

        result.add_matches(2);
        assert_eq!(result.matches(), 3);
        assert_eq!(result.score(), 0.75);
    }

    #[test]
    fn test_orders_by_score_then_matches_then_location() {
        let mut results = vec![
            SearchResult::new("b.txt", 10, 2),
            SearchResult::new("c.txt", 2, 1),
            SearchResult::new("A.txt", 20, 4),
            SearchResult::new("a.txt", 4, 2),
        ];
        results.sort();

        let order: Vec<&str> = results.iter().map(SearchResult::location).collect();
        // equal scores fall back to matches
        assert_eq!(order, vec!["a.txt", "c.txt", "A.txt", "b.txt"]);
    }

    #[test]
    fn test_location_tie_break_ignores_case() {
        let mut results = vec![
            SearchResult::new("Zebra", 2, 1),
            SearchResult::new("apple", 2, 1),
            SearchResult::new("Mango", 2, 1),
        ];
        results.sort();

        let order: Vec<&str> = results.iter().map(SearchResult::location).collect();
        assert_eq!(order, vec!["apple", "Mango", "Zebra"]);
    }

    #[test]
    fn test_location_tie_break_folds_through_upper_case() {
        assert_eq!(compare_ignore_case("ς", "σ"), Ordering::Equal);
        assert_eq!(compare_ignore_case("ß", "SS"), Ordering::Greater);

        let mut results = vec![SearchResult::new("ςb", 2, 1), SearchResult::new("σa", 2, 1)];
        results.sort();
        assert_eq!(results[0].location(), "σa");
    }

    #[test]
    fn test_equality_follows_ordering() {
        assert_eq!(SearchResult::new("x", 2, 1), SearchResult::new("x", 2, 1));
        // same score, different matches
        assert_ne!(SearchResult::new("x", 2, 1), SearchResult::new("x", 4, 2));
        assert_ne!(SearchResult::new("x", 2, 1), SearchResult::new("X", 2, 1));
    }
}
