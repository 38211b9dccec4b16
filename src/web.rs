//! Fetching, cleaning and crawling web pages.

pub mod cleaner;
pub mod crawler;
pub mod fetcher;
pub mod link_parser;

pub use cleaner::HtmlCleaner;
pub use crawler::{CrawlSummary, WebCrawler};
pub use fetcher::{HtmlFetcher, HttpFetcher, MemoryFetcher};
pub use link_parser::LinkParser;
