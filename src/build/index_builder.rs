//! Single-threaded construction of an index from text files.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::TextNormalizer;
use crate::build::file_finder::TextFileFinder;
use crate::error::Result;
use crate::index::InvertedIndex;

/// Outcome of indexing a file or directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub files_found: usize,
    pub files_indexed: usize,
    pub files_failed: usize,
}

/// Location string under which a file's terms are recorded.
pub fn location_of(path: &Path) -> String {
    path.display().to_string()
}

/// Read and normalize one file into `index` at positions starting from 1.
///
/// Returns the number of terms added.
pub fn index_file(normalizer: &TextNormalizer, path: &Path, index: &mut InvertedIndex) -> Result<usize> {
    let stems = normalizer.list_stems_from_file(path)?;
    index.add_stems(&stems, &location_of(path));
    Ok(stems.len())
}

/// Builds an [`InvertedIndex`] one file at a time on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndexBuilder {
    normalizer: TextNormalizer,
}

impl InvertedIndexBuilder {
    pub fn new(normalizer: TextNormalizer) -> Self {
        InvertedIndexBuilder { normalizer }
    }

    /// Index every text file at or below `start` into `index`.
    ///
    /// A file that cannot be read is logged and skipped.
    pub fn build<P: AsRef<Path>>(&self, start: P, index: &mut InvertedIndex) -> Result<BuildSummary> {
        let files = TextFileFinder::list(start.as_ref())?;
        let mut summary = BuildSummary {
            files_found: files.len(),
            ..Default::default()
        };

        for file in &files {
            match index_file(&self.normalizer, file, index) {
                Ok(_) => summary.files_indexed += 1,
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    summary.files_failed += 1;
                }
            }
        }

        info!(
            "Indexed {} of {} files ({} terms)",
            summary.files_indexed,
            summary.files_found,
            index.size()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_build_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one.txt"), "Cats and dogs\nCats").unwrap();
        fs::write(dir.path().join("two.txt"), "dog").unwrap();

        let mut index = InvertedIndex::new();
        let summary = InvertedIndexBuilder::default()
            .build(dir.path(), &mut index)
            .unwrap();

        let one = location_of(&dir.path().join("one.txt"));
        let two = location_of(&dir.path().join("two.txt"));

        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.files_indexed, 2);
        assert_eq!(index.positions("cat", &one).collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(index.positions("dog", &two).collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.count(&one), Some(4));
    }

    #[test]
    fn test_empty_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.txt"), "123 !!!").unwrap();

        let mut index = InvertedIndex::new();
        let summary = InvertedIndexBuilder::default()
            .build(dir.path(), &mut index)
            .unwrap();

        assert_eq!(summary.files_indexed, 1);
        assert!(index.is_empty());
        assert!(index.counts().is_empty());
    }
}
