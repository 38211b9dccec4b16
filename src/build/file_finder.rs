//! Discovery of text files to index.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Finds text files below a starting path.
///
/// A directory is walked recursively, following symbolic links, and every
/// regular file named `*.txt` or `*.text` (in any letter case) is kept. A
/// path that names a file is returned on its own whatever its extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileFinder;

impl TextFileFinder {
    /// Whether `path` has a text file name.
    pub fn is_text(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text"))
    }

    /// All text files at or below `start`, sorted.
    pub fn list<P: AsRef<Path>>(start: P) -> Result<Vec<PathBuf>> {
        let start = start.as_ref();
        if start.is_file() {
            return Ok(vec![start.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(start).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && Self::is_text(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
