//! The inverted index, its thread-safe wrapper and ranked search results.

use std::collections::BTreeSet;

pub mod concurrent;
pub mod inverted_index;
pub mod search_result;

pub use concurrent::ConcurrentInvertedIndex;
pub use inverted_index::InvertedIndex;
pub use search_result::SearchResult;

/// Read-side search operations shared by both index types.
pub trait SearchIndex: Send + Sync {
    /// Results for terms equal to one of `queries`.
    fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult>;

    /// Results for terms starting with one of `queries`.
    fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult>;

    /// Dispatch to [`exact_search`](Self::exact_search) or
    /// [`partial_search`](Self::partial_search).
    fn search(&self, queries: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(queries)
        } else {
            self.partial_search(queries)
        }
    }
}

impl SearchIndex for InvertedIndex {
    fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        InvertedIndex::exact_search(self, queries)
    }

    fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        InvertedIndex::partial_search(self, queries)
    }
}

impl SearchIndex for ConcurrentInvertedIndex {
    fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        ConcurrentInvertedIndex::exact_search(self, queries)
    }

    fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        ConcurrentInvertedIndex::partial_search(self, queries)
    }
}
