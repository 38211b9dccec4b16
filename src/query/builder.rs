//! Turning query lines into ranked results.
//!
//! Each query line is normalized into its distinct stems. The stems, sorted
//! and joined by single spaces, form the key under which the line's results
//! are stored, so lines that normalize to the same stems share one entry
//! and are searched only once. Lines without any stems are skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use crate::analysis::TextNormalizer;
use crate::error::Result;
use crate::index::{ConcurrentInvertedIndex, SearchIndex, SearchResult};
use crate::work_queue::{Task, WorkQueue};

/// Ranked results per normalized query.
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

/// Key under which the results of `stems` are stored.
pub fn query_key(stems: &BTreeSet<String>) -> String {
    stems.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Collects search results for query lines.
pub trait QueryResultBuilder {
    /// Search one query line.
    fn parse_line(&mut self, line: &str, exact: bool) -> Result<()>;

    /// Search every line of a UTF-8 query file.
    fn parse_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            self.parse_line(&line?, exact)?;
        }
        Ok(())
    }

    /// Results gathered so far, ordered by query key.
    fn results(&self) -> QueryResults;
}

/// Searches query lines one after another on the calling thread.
#[derive(Debug)]
pub struct SingleQueryResultBuilder<'a, I: SearchIndex + ?Sized> {
    index: &'a I,
    normalizer: TextNormalizer,
    results: QueryResults,
}

impl<'a, I: SearchIndex + ?Sized> SingleQueryResultBuilder<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self::with_normalizer(index, TextNormalizer::new())
    }

    pub fn with_normalizer(index: &'a I, normalizer: TextNormalizer) -> Self {
        SingleQueryResultBuilder {
            index,
            normalizer,
            results: BTreeMap::new(),
        }
    }

    /// Consume the builder, returning its results.
    pub fn into_results(self) -> QueryResults {
        self.results
    }
}

impl<I: SearchIndex + ?Sized> QueryResultBuilder for SingleQueryResultBuilder<'_, I> {
    fn parse_line(&mut self, line: &str, exact: bool) -> Result<()> {
        let stems = self.normalizer.unique_stems(line);
        if stems.is_empty() {
            return Ok(());
        }

        let key = query_key(&stems);
        if !self.results.contains_key(&key) {
            let results = self.index.search(&stems, exact);
            self.results.insert(key, results);
        }
        Ok(())
    }

    fn results(&self) -> QueryResults {
        self.results.clone()
    }
}

/// Searches one query line against the shared index.
pub struct QueryTask {
    line: String,
    exact: bool,
    index: Arc<ConcurrentInvertedIndex>,
    normalizer: TextNormalizer,
    results: Arc<Mutex<QueryResults>>,
}

impl Task for QueryTask {
    fn run(self: Box<Self>) -> Result<()> {
        let stems = self.normalizer.unique_stems(&self.line);
        if stems.is_empty() {
            return Ok(());
        }

        let key = query_key(&stems);
        if self.results.lock().contains_key(&key) {
            return Ok(());
        }

        // search outside the lock; a duplicate line racing here yields the same results
        let results = self.index.search(&stems, self.exact);
        debug!("Query \"{}\" matched {} locations", key, results.len());
        self.results.lock().entry(key).or_insert(results);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("query \"{}\"", self.line)
    }
}

/// Searches query lines in parallel on a [`WorkQueue`].
#[derive(Debug)]
pub struct MultithreadedQueryResultBuilder {
    queue: Arc<WorkQueue>,
    index: Arc<ConcurrentInvertedIndex>,
    normalizer: TextNormalizer,
    results: Arc<Mutex<QueryResults>>,
}

impl MultithreadedQueryResultBuilder {
    pub fn new(queue: Arc<WorkQueue>, index: Arc<ConcurrentInvertedIndex>) -> Self {
        Self::with_normalizer(queue, index, TextNormalizer::new())
    }

    pub fn with_normalizer(
        queue: Arc<WorkQueue>,
        index: Arc<ConcurrentInvertedIndex>,
        normalizer: TextNormalizer,
    ) -> Self {
        MultithreadedQueryResultBuilder {
            queue,
            index,
            normalizer,
            results: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl QueryResultBuilder for MultithreadedQueryResultBuilder {
    /// Submit the line for searching without waiting for it.
    fn parse_line(&mut self, line: &str, exact: bool) -> Result<()> {
        self.queue.execute(QueryTask {
            line: line.to_string(),
            exact,
            index: Arc::clone(&self.index),
            normalizer: self.normalizer.clone(),
            results: Arc::clone(&self.results),
        })
    }

    fn parse_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = 0;
        for line in reader.lines() {
            self.parse_line(&line?, exact)?;
            lines += 1;
        }
        self.queue.finish();

        info!(
            "Processed {} query lines from {} into {} queries",
            lines,
            path.display(),
            self.results.lock().len()
        );
        Ok(())
    }

    /// Waits for submitted lines before returning.
    fn results(&self) -> QueryResults {
        self.queue.finish();
        self.results.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::index::InvertedIndex;

    fn index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_stems(["hello", "world", "hello"], "a.txt");
        index.add_stems(["world", "peace"], "b.txt");
        index.add_stems(["helicopter"], "c.txt");
        index
    }

    fn query_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_query_key_is_sorted_unique_stems() {
        let normalizer = TextNormalizer::new();
        assert_eq!(query_key(&normalizer.unique_stems("world HELLO world")), "hello world");
        assert_eq!(query_key(&BTreeSet::new()), "");
    }

    #[test]
    fn test_single_builder_merges_equivalent_lines() {
        let index = index();
        let mut builder = SingleQueryResultBuilder::new(&index);

        builder.parse_line("hello hello world!", true).unwrap();
        builder.parse_line("World, hello", true).unwrap();
        builder.parse_line("   ", true).unwrap();
        builder.parse_line("42", true).unwrap();

        let results = builder.results();
        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["hello world"]);

        let hits = &results["hello world"];
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].location(), "a.txt");
        assert_eq!(hits[0].matches(), 3);
    }

    #[test]
    fn test_single_builder_partial_and_missing() {
        let index = index();
        let mut builder = SingleQueryResultBuilder::new(&index);

        builder.parse_line("hel", false).unwrap();
        builder.parse_line("zebra", false).unwrap();

        let results = builder.into_results();
        let locations: Vec<_> = results["hel"].iter().map(SearchResult::location).collect();
        assert_eq!(locations, vec!["c.txt", "a.txt"]);
        assert!(results["zebra"].is_empty());
    }

    #[test]
    fn test_multithreaded_builder_matches_single() {
        let file = query_file(&["hello", "world peace", "hel", "", "peace world", "world"]);
        let single_index = index();
        let mut single = SingleQueryResultBuilder::new(&single_index);
        single.parse_file(file.path(), false).unwrap();

        let queue = Arc::new(WorkQueue::new(3).unwrap());
        let shared = Arc::new(ConcurrentInvertedIndex::from(index()));
        let mut multi = MultithreadedQueryResultBuilder::new(Arc::clone(&queue), shared);
        multi.parse_file(file.path(), false).unwrap();

        assert_eq!(multi.results().len(), 4);
        for (key, expected) in single.results() {
            let actual = &multi.results()[&key];
            let expected: Vec<_> = expected.iter().map(|r| (r.location().to_string(), r.matches())).collect();
            let actual: Vec<_> = actual.iter().map(|r| (r.location().to_string(), r.matches())).collect();
            assert_eq!(actual, expected, "results differ for {key}");
        }

        queue.join().unwrap();
    }

    #[test]
    fn test_missing_query_file() {
        let index = index();
        let mut builder = SingleQueryResultBuilder::new(&index);
        assert!(builder.parse_file(Path::new("/no/such/queries.txt"), true).is_err());
    }
}
