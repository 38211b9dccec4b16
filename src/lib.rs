//! # searchx
//!
//! A multithreaded full-text indexer for text files and crawled web pages.
//!
//! ## Features
//!
//! - Inverted index of stemmed terms with per-location positions
//! - Ranked exact and prefix search
//! - Reader/writer locked shared index for concurrent builds
//! - Fixed-size work queue with idle detection
//! - Budget-limited, deduplicated web crawling
//! - Pretty JSON output of indexes, counts and results

pub mod analysis;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod json;
pub mod query;
pub mod web;
pub mod work_queue;

pub mod prelude {
    pub use crate::analysis::TextNormalizer;
    pub use crate::build::{InvertedIndexBuilder, MultithreadedIndexBuilder, TextFileFinder};
    pub use crate::config::SearchxConfig;
    pub use crate::error::{Result, SearchxError};
    pub use crate::index::{ConcurrentInvertedIndex, InvertedIndex, SearchIndex, SearchResult};
    pub use crate::query::{
        MultithreadedQueryResultBuilder, QueryResultBuilder, SingleQueryResultBuilder,
    };
    pub use crate::web::{HtmlFetcher, HttpFetcher, MemoryFetcher, WebCrawler};
    pub use crate::work_queue::{Task, WorkQueue};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
