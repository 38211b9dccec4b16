//! Thread-safe access to a shared inverted index.
//!
//! [`ConcurrentInvertedIndex`] puts a reader/writer lock around an
//! [`InvertedIndex`]. Any number of readers may search at once, while
//! `add`, `add_stems` and `add_all` take the lock exclusively. The lock is
//! `parking_lot`'s task-fair `RwLock`, so a steady stream of readers cannot
//! starve a waiting writer.
//!
//! Read operations return owned values because borrowed data cannot outlive
//! the read guard. Use [`ConcurrentInvertedIndex::with_read`] to borrow the
//! whole index for a longer read.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::index::inverted_index::InvertedIndex;
use crate::index::search_result::SearchResult;

/// An [`InvertedIndex`] that can be shared between threads.
#[derive(Debug, Default)]
pub struct ConcurrentInvertedIndex {
    inner: RwLock<InvertedIndex>,
}

impl ConcurrentInvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`InvertedIndex::add`].
    pub fn add(&self, term: &str, location: &str, position: usize) -> bool {
        self.inner.write().add(term, location, position)
    }

    /// See [`InvertedIndex::add_stems`].
    pub fn add_stems<I, S>(&self, stems: I, location: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.write().add_stems(stems, location);
    }

    /// Merge a privately built index in one write.
    pub fn add_all(&self, other: InvertedIndex) {
        if other.is_empty() {
            return;
        }
        self.inner.write().add_all(other);
    }

    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn term_size(&self, term: &str) -> Option<usize> {
        self.inner.read().term_size(term)
    }

    pub fn location_size(&self, term: &str, location: &str) -> Option<usize> {
        self.inner.read().location_size(term, location)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.inner.read().contains_term(term)
    }

    pub fn contains_location(&self, term: &str, location: &str) -> bool {
        self.inner.read().contains_location(term, location)
    }

    pub fn contains_position(&self, term: &str, location: &str, position: usize) -> bool {
        self.inner.read().contains_position(term, location, position)
    }

    pub fn terms(&self) -> Vec<String> {
        self.inner.read().terms().map(str::to_string).collect()
    }

    pub fn locations(&self, term: &str) -> Vec<String> {
        self.inner
            .read()
            .locations(term)
            .map(str::to_string)
            .collect()
    }

    pub fn positions(&self, term: &str, location: &str) -> Vec<usize> {
        self.inner.read().positions(term, location).collect()
    }

    pub fn count(&self, location: &str) -> Option<usize> {
        self.inner.read().count(location)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.inner.read().counts().clone()
    }

    pub fn search(&self, queries: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.inner.read().search(queries, exact)
    }

    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().exact_search(queries)
    }

    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().partial_search(queries)
    }

    /// Run `f` with shared access to the whole index.
    ///
    /// Writers are blocked until `f` returns, so keep it short.
    pub fn with_read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        f(&self.inner.read())
    }

    /// A point-in-time copy of the index.
    pub fn snapshot(&self) -> InvertedIndex {
        self.inner.read().clone()
    }

    /// Unwrap the index once it is no longer shared.
    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}

impl From<InvertedIndex> for ConcurrentInvertedIndex {
    fn from(index: InvertedIndex) -> Self {
        ConcurrentInvertedIndex {
            inner: RwLock::new(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let index = Arc::new(ConcurrentInvertedIndex::new());
        let threads = 8;
        let per_thread = 250;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        index.add("shared", "doc", t * per_thread + i + 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.location_size("shared", "doc"), Some(threads * per_thread));
        assert_eq!(index.count("doc"), Some(threads * per_thread));
    }

    #[test]
    fn test_concurrent_merges_match_sequential_build() {
        let pages: Vec<(String, Vec<String>)> = (0..16)
            .map(|page| {
                let words = (0..20).map(|w| format!("w{}", (page * 7 + w) % 13)).collect();
                (format!("page{page}"), words)
            })
            .collect();

        let mut expected = InvertedIndex::new();
        for (location, words) in &pages {
            expected.add_stems(words, location);
        }

        let shared = Arc::new(ConcurrentInvertedIndex::new());
        thread::scope(|scope| {
            for (location, words) in &pages {
                let shared = Arc::clone(&shared);
                scope.spawn(move || {
                    let mut local = InvertedIndex::new();
                    local.add_stems(words, location);
                    shared.add_all(local);
                });
            }
        });

        assert_eq!(shared.snapshot(), expected);
    }

    #[test]
    fn test_readers_run_alongside_writer() {
        let index = Arc::new(ConcurrentInvertedIndex::new());
        index.add_stems(["alpha", "beta"], "seed");

        thread::scope(|scope| {
            for _ in 0..4 {
                let index = Arc::clone(&index);
                scope.spawn(move || {
                    let query: BTreeSet<String> = ["alpha".to_string()].into();
                    for _ in 0..200 {
                        let results = index.partial_search(&query);
                        assert!(!results.is_empty());
                    }
                });
            }

            let index = Arc::clone(&index);
            scope.spawn(move || {
                for i in 0..200 {
                    index.add("alphabet", &format!("doc{i}"), 1);
                }
            });
        });

        assert_eq!(index.term_size("alphabet"), Some(200));
    }

    #[test]
    fn test_with_read_and_into_inner() {
        let mut base = InvertedIndex::new();
        base.add("term", "a", 2);
        let index = ConcurrentInvertedIndex::from(base.clone());

        let terms = index.with_read(|inner| inner.size());
        assert_eq!(terms, 1);
        assert_eq!(index.terms(), vec!["term".to_string()]);
        assert_eq!(index.locations("term"), vec!["a".to_string()]);
        assert_eq!(index.positions("term", "a"), vec![2]);
        assert_eq!(index.into_inner(), base);
    }
}
