//! Multithreaded construction of a shared index from text files.
//!
//! Each file becomes one [`FileTask`]. A task reads and normalizes its file
//! into a private [`InvertedIndex`] and then merges it into the shared
//! [`ConcurrentInvertedIndex`] with a single `add_all`, so a file that fails
//! halfway through leaves no trace in the shared index.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info};

use crate::analysis::TextNormalizer;
use crate::build::file_finder::TextFileFinder;
use crate::build::index_builder::{BuildSummary, index_file};
use crate::error::Result;
use crate::index::{ConcurrentInvertedIndex, InvertedIndex};
use crate::work_queue::{Task, WorkQueue};

#[derive(Debug, Default)]
struct BuildCounters {
    indexed: AtomicUsize,
}

/// Indexes one file into the shared index.
pub struct FileTask {
    path: PathBuf,
    normalizer: TextNormalizer,
    index: Arc<ConcurrentInvertedIndex>,
    counters: Arc<BuildCounters>,
}

impl Task for FileTask {
    fn run(self: Box<Self>) -> Result<()> {
        let mut local = InvertedIndex::new();
        let terms = index_file(&self.normalizer, &self.path, &mut local)?;
        self.index.add_all(local);
        self.counters.indexed.fetch_add(1, Ordering::Relaxed);
        debug!("Indexed {} ({} terms)", self.path.display(), terms);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("index {}", self.path.display())
    }
}

/// Builds a [`ConcurrentInvertedIndex`] using a [`WorkQueue`].
#[derive(Debug, Clone)]
pub struct MultithreadedIndexBuilder {
    queue: Arc<WorkQueue>,
    index: Arc<ConcurrentInvertedIndex>,
    normalizer: TextNormalizer,
}

impl MultithreadedIndexBuilder {
    pub fn new(queue: Arc<WorkQueue>, index: Arc<ConcurrentInvertedIndex>) -> Self {
        Self::with_normalizer(queue, index, TextNormalizer::new())
    }

    pub fn with_normalizer(
        queue: Arc<WorkQueue>,
        index: Arc<ConcurrentInvertedIndex>,
        normalizer: TextNormalizer,
    ) -> Self {
        MultithreadedIndexBuilder {
            queue,
            index,
            normalizer,
        }
    }

    /// The shared index being built.
    pub fn index(&self) -> &Arc<ConcurrentInvertedIndex> {
        &self.index
    }

    /// Index every text file at or below `start` and wait for all of them.
    ///
    /// Files that cannot be read are logged by the queue and counted as
    /// failed; they do not stop the build.
    pub fn build<P: AsRef<Path>>(&self, start: P) -> Result<BuildSummary> {
        let files = TextFileFinder::list(start.as_ref())?;
        let counters = Arc::new(BuildCounters::default());

        for path in &files {
            self.queue.execute(FileTask {
                path: path.clone(),
                normalizer: self.normalizer.clone(),
                index: Arc::clone(&self.index),
                counters: Arc::clone(&counters),
            })?;
        }
        self.queue.finish();

        let indexed = counters.indexed.load(Ordering::Relaxed);
        let summary = BuildSummary {
            files_found: files.len(),
            files_indexed: indexed,
            files_failed: files.len() - indexed,
        };

        info!(
            "Indexed {} of {} files with {} threads",
            summary.files_indexed,
            summary.files_found,
            self.queue.size()
        );
        Ok(summary)
    }
}
