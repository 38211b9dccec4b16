//! Fetching HTML pages.
//!
//! Fetch failures of every kind (connection errors, timeouts, non-200
//! statuses, non-HTML content, too many redirects) are reported as `None`
//! so that a crawl can simply skip the page.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::SearchxConfig;
use crate::error::{Result, SearchxError};

/// Source of raw HTML for a URL.
pub trait HtmlFetcher: Send + Sync {
    /// Fetch the HTML at `url`, following at most `max_redirects` redirects.
    fn fetch(&self, url: &str, max_redirects: usize) -> Option<String>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher using the timeout and user agent from `config`.
    pub fn new(config: &SearchxConfig) -> Result<Self> {
        Self::with_settings(config.fetch_timeout, &config.user_agent)
    }

    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self> {
        // redirects are followed by hand so the limit applies per fetch
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|e| SearchxError::fetch(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpFetcher { client })
    }
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.trim().to_ascii_lowercase().starts_with("text/html"))
}

impl HtmlFetcher for HttpFetcher {
    fn fetch(&self, url: &str, max_redirects: usize) -> Option<String> {
        let mut current = Url::parse(url).ok()?;
        let mut redirects_left = max_redirects;

        loop {
            let response = match self.client.get(current.clone()).send() {
                Ok(response) => response,
                Err(e) => {
                    debug!("Request to {current} failed: {e}");
                    return None;
                }
            };
            let status = response.status();

            if status.is_redirection() {
                if redirects_left == 0 {
                    debug!("Too many redirects fetching {url}");
                    return None;
                }
                let location = response.headers().get(LOCATION)?.to_str().ok()?;
                current = current.join(location).ok()?;
                redirects_left -= 1;
                continue;
            }

            if status != StatusCode::OK {
                debug!("Fetching {current} returned {status}");
                return None;
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            if !is_html(content_type) {
                debug!("Skipping {current}: not HTML");
                return None;
            }

            return response.text().ok();
        }
    }
}

/// Fetcher serving pages from memory, for offline crawls.
///
/// Redirects registered with [`MemoryFetcher::with_redirect`] count against
/// `max_redirects` just as HTTP redirects do. Every fetch attempt is
/// recorded.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl HtmlFetcher for MemoryFetcher {
    fn fetch(&self, url: &str, max_redirects: usize) -> Option<String> {
        self.requests.lock().push(url.to_string());

        let mut current = url;
        for _ in 0..=max_redirects {
            match self.redirects.get(current) {
                Some(target) => current = target,
                None => return self.pages.get(current).cloned(),
            }
        }
        None
    }
}
