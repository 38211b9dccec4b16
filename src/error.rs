//! Error types for the searchx library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SearchxError`] enum. Failures inside pool tasks never reach the caller
//! that submitted them; they are logged and counted by the work queue.
//!
//! # Examples
//!
//! ```
//! use searchx::error::{Result, SearchxError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SearchxError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for searchx operations.
#[derive(Error, Debug)]
pub enum SearchxError {
    /// I/O errors (file reads, output files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text analysis errors (HTML cleaning patterns)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Page fetch errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Crawl errors
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Work queue misuse (submit after shutdown, double join)
    #[error("Work queue error: {0}")]
    Pool(String),

    /// Thread join errors
    #[error("Thread join error: {0}")]
    ThreadJoin(String),

    /// URL parse errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory traversal errors
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SearchxError.
pub type Result<T> = std::result::Result<T, SearchxError>;

impl SearchxError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SearchxError::Analysis(msg.into())
    }

    /// Create a new fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        SearchxError::Fetch(msg.into())
    }

    /// Create a new crawl error.
    pub fn crawl<S: Into<String>>(msg: S) -> Self {
        SearchxError::Crawl(msg.into())
    }

    /// Create a new work queue error.
    pub fn pool<S: Into<String>>(msg: S) -> Self {
        SearchxError::Pool(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SearchxError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SearchxError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SearchxError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
