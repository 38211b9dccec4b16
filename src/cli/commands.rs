//! Command implementations for the searchx CLI.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::info;

use crate::build::MultithreadedIndexBuilder;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SearchxConfig;
use crate::error::Result;
use crate::index::ConcurrentInvertedIndex;
use crate::json;
use crate::query::{MultithreadedQueryResultBuilder, QueryResultBuilder};
use crate::web::{HttpFetcher, WebCrawler};
use crate::work_queue::WorkQueue;

/// Execute a CLI command.
pub fn execute_command(args: SearchxArgs) -> Result<()> {
    let config = load_config(&args)?;
    let queue = Arc::new(WorkQueue::new(config.threads)?);
    let index = Arc::new(ConcurrentInvertedIndex::new());

    let outcome = match &args.command {
        Command::Index(index_args) => run_index(index_args, &config, &queue, &index, &args),
        Command::Crawl(crawl_args) => run_crawl(crawl_args, &config, &queue, &index, &args),
    };

    // the queue is joined even when the run failed
    let joined = queue.join();
    let mut report = outcome?;
    joined?;

    report.tasks = queue.metrics();
    output_result("Run complete", &report, &args)
}

/// Load the configuration file, if any, and apply command line overrides.
pub fn load_config(args: &SearchxArgs) -> Result<SearchxConfig> {
    let mut config = match &args.config {
        Some(path) => SearchxConfig::from_file(path)?,
        None => SearchxConfig::default(),
    };

    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Command::Crawl(crawl_args) = &args.command
        && let Some(max) = crawl_args.max
    {
        config = config.with_crawl_budget(max);
    }

    config.validate()?;
    Ok(config)
}

fn new_report(command: &str, source: String, config: &SearchxConfig) -> RunReport {
    RunReport {
        command: command.to_string(),
        source,
        threads: config.threads,
        started_at: Utc::now(),
        elapsed_seconds: 0.0,
        terms: 0,
        locations: 0,
        files: None,
        crawl: None,
        queries: None,
        outputs: Vec::new(),
        tasks: Default::default(),
    }
}

/// Index a file or directory.
fn run_index(
    args: &IndexArgs,
    config: &SearchxConfig,
    queue: &Arc<WorkQueue>,
    index: &Arc<ConcurrentInvertedIndex>,
    cli_args: &SearchxArgs,
) -> Result<RunReport> {
    if cli_args.verbosity() > 1 {
        println!("Indexing: {}", args.path.display());
    }

    let start = Instant::now();
    let mut report = new_report("index", args.path.display().to_string(), config);

    let builder = MultithreadedIndexBuilder::new(Arc::clone(queue), Arc::clone(index));
    report.files = Some(builder.build(&args.path)?);

    write_outputs(&args.output, queue, index, &mut report)?;
    report.elapsed_seconds = start.elapsed().as_secs_f64();
    Ok(report)
}

/// Crawl from a seed URL.
fn run_crawl(
    args: &CrawlArgs,
    config: &SearchxConfig,
    queue: &Arc<WorkQueue>,
    index: &Arc<ConcurrentInvertedIndex>,
    cli_args: &SearchxArgs,
) -> Result<RunReport> {
    if cli_args.verbosity() > 1 {
        println!("Crawling: {} (up to {} pages)", args.seed, config.crawl_budget);
    }

    let start = Instant::now();
    let mut report = new_report("crawl", args.seed.clone(), config);

    let fetcher = Arc::new(HttpFetcher::new(config)?);
    let crawler = WebCrawler::new(Arc::clone(queue), Arc::clone(index), fetcher).with_config(config);
    report.crawl = Some(crawler.crawl(&args.seed, config.crawl_budget)?);

    write_outputs(&args.output, queue, index, &mut report)?;
    report.elapsed_seconds = start.elapsed().as_secs_f64();
    Ok(report)
}

/// Write the requested index files and run the queries.
fn write_outputs(
    output: &OutputArgs,
    queue: &Arc<WorkQueue>,
    index: &Arc<ConcurrentInvertedIndex>,
    report: &mut RunReport,
) -> Result<()> {
    report.terms = index.size();
    report.locations = index.with_read(|inner| inner.counts().len());

    if let Some(path) = &output.index_file {
        index.with_read(|inner| json::write_index_to_path(inner, path))?;
        info!("Wrote index to {}", path.display());
        report.outputs.push(path.display().to_string());
    }

    if let Some(path) = &output.counts_file {
        index.with_read(|inner| json::write_counts_to_path(inner.counts(), path))?;
        info!("Wrote counts to {}", path.display());
        report.outputs.push(path.display().to_string());
    }

    let mut builder = MultithreadedQueryResultBuilder::new(Arc::clone(queue), Arc::clone(index));
    if let Some(path) = &output.query_file {
        builder.parse_file(path, output.exact)?;
        report.queries = Some(builder.results().len());
    }

    if let Some(path) = &output.results_file {
        json::write_results_to_path(&builder.results(), path)?;
        info!("Wrote results to {}", path.display());
        report.outputs.push(path.display().to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"threads": 2, "crawl_budget": 10}"#).unwrap();

        let args = SearchxArgs::parse_from([
            "searchx",
            "--config",
            path.to_str().unwrap(),
            "crawl",
            "https://example.com/",
            "--max",
            "25",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.threads, 2);
        assert_eq!(config.crawl_budget, 25);
    }

    #[test]
    fn test_load_config_rejects_zero_threads() {
        let args = SearchxArgs::parse_from(["searchx", "--threads", "0", "index", "docs"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_index_command_writes_outputs() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.txt"), "the quick brown fox").unwrap();
        fs::write(docs.join("b.txt"), "quick quick dogs").unwrap();
        let queries = dir.path().join("queries.txt");
        fs::write(&queries, "quick\nfox brown\n").unwrap();

        let index_out = dir.path().join("index.json");
        let counts_out = dir.path().join("counts.json");
        let results_out = dir.path().join("results.json");

        let args = SearchxArgs::parse_from([
            "searchx".to_string(),
            "-q".to_string(),
            "--threads".to_string(),
            "2".to_string(),
            "index".to_string(),
            docs.display().to_string(),
            "--index".to_string(),
            index_out.display().to_string(),
            "--counts".to_string(),
            counts_out.display().to_string(),
            "--query".to_string(),
            queries.display().to_string(),
            "--results".to_string(),
            results_out.display().to_string(),
        ]);
        execute_command(args).unwrap();

        let counts: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&counts_out).unwrap()).unwrap();
        assert_eq!(counts[docs.join("a.txt").display().to_string()], 4);

        let results: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&results_out).unwrap()).unwrap();
        assert_eq!(results["quick"][0]["where"], docs.join("b.txt").display().to_string());
        assert_eq!(results["quick"][0]["count"], 2);
        assert!(results["brown fox"].is_array());
        assert!(index_out.exists());
    }
}
