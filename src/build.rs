//! Building indexes from text files on disk.

pub mod file_finder;
pub mod index_builder;
pub mod parallel;

pub use file_finder::TextFileFinder;
pub use index_builder::{BuildSummary, InvertedIndexBuilder};
pub use parallel::MultithreadedIndexBuilder;
