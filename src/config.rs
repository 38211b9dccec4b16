//! Runtime configuration for index builds and crawls.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchxError};

/// Default number of worker threads.
pub const DEFAULT_THREADS: usize = 5;

/// Default number of distinct pages a crawl may visit.
pub const DEFAULT_CRAWL_BUDGET: usize = 1;

/// Default number of HTTP redirects the fetcher follows.
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

/// Configuration shared by the CLI, the builders and the crawler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchxConfig {
    /// Number of worker threads in the work queue.
    pub threads: usize,

    /// Maximum number of distinct pages a crawl visits, seed included.
    pub crawl_budget: usize,

    /// Maximum number of redirects followed per fetch.
    pub max_redirects: usize,

    /// Timeout for a single HTTP request.
    pub fetch_timeout: Duration,

    /// User agent sent with every HTTP request.
    pub user_agent: String,
}

impl Default for SearchxConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            crawl_budget: DEFAULT_CRAWL_BUDGET,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            fetch_timeout: Duration::from_secs(10),
            user_agent: format!("searchx/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SearchxConfig {
    /// Load a configuration from a JSON file. Missing fields use defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: SearchxConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(SearchxError::invalid_config(
                "threads must be greater than zero",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SearchxError::invalid_config("user_agent must not be empty"));
        }
        Ok(())
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the crawl budget.
    pub fn with_crawl_budget(mut self, budget: usize) -> Self {
        self.crawl_budget = budget;
        self
    }

    /// Set the redirect limit.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchxConfig::default();

        assert_eq!(config.threads, 5);
        assert_eq!(config.crawl_budget, 1);
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = SearchxConfig::default().with_threads(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"threads": 8, "crawl_budget": 50}}"#).unwrap();

        let config = SearchxConfig::from_file(file.path()).unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.crawl_budget, 50);
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"threads": 0}}"#).unwrap();

        assert!(SearchxConfig::from_file(file.path()).is_err());
    }
}
