//! The single-threaded inverted index.
//!
//! Maps each term to the locations it occurs in and, per location, the
//! sorted set of 1-based positions. A parallel table records for every
//! location the highest position seen there, which serves as that
//! location's total term count when scoring.
//!
//! This type is not synchronized. Once more than one thread can observe an
//! index, wrap it in a
//! [`ConcurrentInvertedIndex`](crate::index::concurrent::ConcurrentInvertedIndex).
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use searchx::index::InvertedIndex;
//!
//! let mut index = InvertedIndex::new();
//! index.add_stems(["cat", "category", "cat"], "docA");
//! index.add("category", "docB", 1);
//!
//! let query: BTreeSet<String> = ["cat".to_string()].into();
//! let results = index.partial_search(&query);
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].location(), "docA");
//! assert_eq!(results[0].matches(), 3);
//! ```

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

use crate::index::search_result::SearchResult;

/// Positions of one term, grouped by location.
pub type Postings = BTreeMap<String, BTreeSet<usize>>;

/// An ordered term → location → positions index with per-location counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    index: BTreeMap<String, Postings>,
    counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `term` at `position` of `location`.
    ///
    /// Returns `true` if the position was not already present. The count of
    /// `location` becomes the larger of its current value and `position`.
    pub fn add(&mut self, term: &str, location: &str, position: usize) -> bool {
        let added = self
            .index
            .entry(term.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);

        self.raise_count(location, position);
        added
    }

    /// Record a sequence of terms at consecutive positions starting at 1.
    pub fn add_stems<I, S>(&mut self, stems: I, location: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (offset, stem) in stems.into_iter().enumerate() {
            self.add(stem.as_ref(), location, offset + 1);
        }
    }

    /// Merge another index into this one.
    ///
    /// Position sets are unioned and counts keep the larger value, so the
    /// result does not depend on the order in which indexes are merged.
    pub fn add_all(&mut self, other: InvertedIndex) {
        for (term, other_postings) in other.index {
            match self.index.entry(term) {
                Entry::Vacant(entry) => {
                    entry.insert(other_postings);
                }
                Entry::Occupied(mut entry) => {
                    let postings = entry.get_mut();
                    for (location, positions) in other_postings {
                        match postings.entry(location) {
                            Entry::Vacant(slot) => {
                                slot.insert(positions);
                            }
                            Entry::Occupied(mut slot) => slot.get_mut().extend(positions),
                        }
                    }
                }
            }
        }

        for (location, count) in other.counts {
            self.raise_count_owned(location, count);
        }
    }

    fn raise_count(&mut self, location: &str, position: usize) {
        match self.counts.get_mut(location) {
            Some(count) => *count = (*count).max(position),
            None => {
                self.counts.insert(location.to_string(), position);
            }
        }
    }

    fn raise_count_owned(&mut self, location: String, position: usize) {
        self.counts
            .entry(location)
            .and_modify(|count| *count = (*count).max(position))
            .or_insert(position);
    }

    /// Number of distinct terms.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// Whether the index holds no terms.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of locations containing `term`, or `None` if the term is absent.
    pub fn term_size(&self, term: &str) -> Option<usize> {
        self.index.get(term).map(BTreeMap::len)
    }

    /// Number of positions of `term` in `location`, or `None` if absent.
    pub fn location_size(&self, term: &str, location: &str) -> Option<usize> {
        self.index
            .get(term)
            .and_then(|postings| postings.get(location))
            .map(BTreeSet::len)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn contains_location(&self, term: &str, location: &str) -> bool {
        self.location_size(term, location).is_some()
    }

    pub fn contains_position(&self, term: &str, location: &str, position: usize) -> bool {
        self.index
            .get(term)
            .and_then(|postings| postings.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    /// All terms in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Locations of `term` in sorted order; empty if the term is absent.
    pub fn locations<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.index
            .get(term)
            .into_iter()
            .flat_map(|postings| postings.keys().map(String::as_str))
    }

    /// Positions of `term` in `location` in ascending order.
    pub fn positions<'a>(&'a self, term: &str, location: &str) -> impl Iterator<Item = usize> + 'a {
        self.index
            .get(term)
            .and_then(|postings| postings.get(location))
            .into_iter()
            .flat_map(|positions| positions.iter().copied())
    }

    /// Term count of `location`, the highest position recorded there.
    pub fn count(&self, location: &str) -> Option<usize> {
        self.counts.get(location).copied()
    }

    /// Term counts of all locations.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// The full term → postings map.
    pub fn entries(&self) -> &BTreeMap<String, Postings> {
        &self.index
    }

    /// Search for `queries`, exactly or by prefix.
    pub fn search(&self, queries: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(queries)
        } else {
            self.partial_search(queries)
        }
    }

    /// Results for terms equal to one of `queries`.
    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut collector = ResultCollector::new(&self.counts);
        for query in queries {
            if let Some(postings) = self.index.get(query) {
                collector.add_postings(postings);
            }
        }
        collector.finish()
    }

    /// Results for terms starting with one of `queries`.
    ///
    /// Terms are kept sorted, so each query scans only the range of terms
    /// that begins at the query itself and ends at the first term that no
    /// longer shares the prefix.
    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut collector = ResultCollector::new(&self.counts);
        for query in queries {
            let range = self
                .index
                .range::<str, _>((Bound::Included(query.as_str()), Bound::Unbounded))
                .take_while(|(term, _)| term.starts_with(query.as_str()));

            for (_, postings) in range {
                collector.add_postings(postings);
            }
        }
        collector.finish()
    }
}

/// Accumulates one result per location while query terms are processed.
struct ResultCollector<'a> {
    counts: &'a BTreeMap<String, usize>,
    lookup: HashMap<&'a str, usize>,
    results: Vec<SearchResult>,
}

impl<'a> ResultCollector<'a> {
    fn new(counts: &'a BTreeMap<String, usize>) -> Self {
        Self {
            counts,
            lookup: HashMap::new(),
            results: Vec::new(),
        }
    }

    fn add_postings(&mut self, postings: &'a Postings) {
        for (location, positions) in postings {
            match self.lookup.get(location.as_str()) {
                Some(&slot) => self.results[slot].add_matches(positions.len()),
                None => {
                    let count = self
                        .counts
                        .get(location)
                        .copied()
                        .unwrap_or(positions.len());
                    self.lookup.insert(location.as_str(), self.results.len());
                    self.results
                        .push(SearchResult::new(location.as_str(), count, positions.len()));
                }
            }
        }
    }

    fn finish(mut self) -> Vec<SearchResult> {
        self.results.sort();
        self.results
    }
}
