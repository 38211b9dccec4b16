//! Multithreaded, budget-limited web crawling into a shared index.
//!
//! A crawl starts from one seed URL. Each page is handled by a
//! [`CrawlTask`] on the [`WorkQueue`]:
//!
//! 1. fetch the page (a failed fetch ends the task with no side effects);
//! 2. strip comments and non-content elements, then extract links;
//! 3. under the visited-set lock, claim and submit new links while the set
//!    is below the page budget;
//! 4. strip the remaining markup, normalize the text and build a private
//!    index at positions starting from 1;
//! 5. merge the private index into the shared index with one `add_all`.
//!
//! The crawl waits on [`WorkQueue::finish`], which returns only once every
//! page submitted by any task, transitively, has been processed.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::analysis::TextNormalizer;
use crate::config::SearchxConfig;
use crate::error::{Result, SearchxError};
use crate::index::{ConcurrentInvertedIndex, InvertedIndex};
use crate::web::cleaner::HtmlCleaner;
use crate::web::fetcher::HtmlFetcher;
use crate::web::link_parser::LinkParser;
use crate::work_queue::{Task, WorkQueue};

/// Outcome of one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Distinct URLs submitted as tasks, including the seed.
    pub pages_visited: usize,
    pub pages_indexed: usize,
    pub pages_failed: usize,
    pub elapsed: Duration,
}

/// State shared by the tasks of one crawl.
struct CrawlSession {
    queue: Arc<WorkQueue>,
    index: Arc<ConcurrentInvertedIndex>,
    fetcher: Arc<dyn HtmlFetcher>,
    normalizer: TextNormalizer,
    budget: usize,
    max_redirects: usize,
    visited: Mutex<HashSet<String>>,
    indexed: AtomicUsize,
    failed: AtomicUsize,
}

impl CrawlSession {
    /// Claim every unvisited link, in order, until the budget is reached,
    /// and submit a task for each one claimed.
    fn claim_links(self: &Arc<Self>, links: Vec<Url>) -> Result<usize> {
        let mut visited = self.visited.lock();
        let mut claimed = 0;

        for link in links {
            if visited.len() >= self.budget {
                break;
            }
            if visited.insert(link.as_str().to_string()) {
                debug!("Queueing {link}");
                self.queue.execute(CrawlTask {
                    url: link,
                    session: Arc::clone(self),
                })?;
                claimed += 1;
            }
        }

        Ok(claimed)
    }
}

/// Fetches, parses and indexes one page.
pub struct CrawlTask {
    url: Url,
    session: Arc<CrawlSession>,
}

impl Task for CrawlTask {
    fn run(self: Box<Self>) -> Result<()> {
        let session = &self.session;

        let html = match session.fetcher.fetch(self.url.as_str(), session.max_redirects) {
            Some(html) if !html.is_empty() => html,
            _ => {
                warn!("Unable to fetch {}", self.url);
                session.failed.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
        };

        let visible = HtmlCleaner::strip_block_elements(&HtmlCleaner::strip_comments(&html));
        let links = LinkParser::links(&self.url, &visible);
        session.claim_links(links)?;

        let text = HtmlCleaner::strip_entities(&HtmlCleaner::strip_tags(&visible));
        let stems = session.normalizer.list_stems(&text);

        let mut local = InvertedIndex::new();
        local.add_stems(&stems, self.url.as_str());
        session.index.add_all(local);
        session.indexed.fetch_add(1, Ordering::Relaxed);

        debug!("Indexed {} ({} terms)", self.url, stems.len());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("crawl {}", self.url)
    }
}

/// Crawls pages into a shared index using a work queue.
pub struct WebCrawler {
    queue: Arc<WorkQueue>,
    index: Arc<ConcurrentInvertedIndex>,
    fetcher: Arc<dyn HtmlFetcher>,
    normalizer: TextNormalizer,
    max_redirects: usize,
}

impl WebCrawler {
    pub fn new(
        queue: Arc<WorkQueue>,
        index: Arc<ConcurrentInvertedIndex>,
        fetcher: Arc<dyn HtmlFetcher>,
    ) -> Self {
        WebCrawler {
            queue,
            index,
            fetcher,
            normalizer: TextNormalizer::new(),
            max_redirects: crate::config::DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Take the redirect limit from `config`.
    pub fn with_config(mut self, config: &SearchxConfig) -> Self {
        self.max_redirects = config.max_redirects;
        self
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// The shared index pages are merged into.
    pub fn index(&self) -> &Arc<ConcurrentInvertedIndex> {
        &self.index
    }

    /// Crawl from `seed`, indexing at most `budget` distinct pages.
    ///
    /// The seed page is always processed, even with a budget of 0. Pages
    /// that fail to fetch are skipped and counted in the summary.
    pub fn crawl(&self, seed: &str, budget: usize) -> Result<CrawlSummary> {
        let seed = LinkParser::normalize(Url::parse(seed)?);
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(SearchxError::crawl(format!(
                "Seed must be an http or https URL: {seed}"
            )));
        }

        let start = Instant::now();
        let session = Arc::new(CrawlSession {
            queue: Arc::clone(&self.queue),
            index: Arc::clone(&self.index),
            fetcher: Arc::clone(&self.fetcher),
            normalizer: self.normalizer.clone(),
            budget: budget.max(1),
            max_redirects: self.max_redirects,
            visited: Mutex::new(HashSet::from([seed.as_str().to_string()])),
            indexed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        });

        info!("Crawling from {seed} with a budget of {budget} pages");
        self.queue.execute(CrawlTask {
            url: seed,
            session: Arc::clone(&session),
        })?;
        self.queue.finish();

        let summary = CrawlSummary {
            pages_visited: session.visited.lock().len(),
            pages_indexed: session.indexed.load(Ordering::Relaxed),
            pages_failed: session.failed.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };

        info!(
            "Crawl finished: {} visited, {} indexed, {} failed in {:.3}s",
            summary.pages_visited,
            summary.pages_indexed,
            summary.pages_failed,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for WebCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebCrawler")
            .field("queue", &self.queue)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}
