//! Command line argument parsing for the searchx CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// searchx - build a ranked full-text index from files or a web crawl
#[derive(Parser, Debug, Clone)]
#[command(name = "searchx")]
#[command(about = "Build and query a ranked inverted index from text files or crawled web pages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SearchxArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for the run report
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE", env = "SEARCHX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SearchxArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index a text file or every text file below a directory
    Index(IndexArgs),

    /// Crawl web pages from a seed URL and index them
    Crawl(CrawlArgs),
}

/// Arguments for indexing files
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// File or directory to index
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for crawling
#[derive(Parser, Debug, Clone)]
pub struct CrawlArgs {
    /// Seed URL
    #[arg(value_name = "SEED_URL")]
    pub seed: String,

    /// Maximum number of distinct pages to crawl
    #[arg(short, long, value_name = "PAGES")]
    pub max: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Queries and output files shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the inverted index as JSON
    #[arg(
        long = "index",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "index.json"
    )]
    pub index_file: Option<PathBuf>,

    /// Write per-location term counts as JSON
    #[arg(
        long = "counts",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "counts.json"
    )]
    pub counts_file: Option<PathBuf>,

    /// Query file with one query per line
    #[arg(long = "query", value_name = "FILE")]
    pub query_file: Option<PathBuf>,

    /// Match query terms exactly instead of by prefix
    #[arg(long)]
    pub exact: bool,

    /// Write query results as JSON
    #[arg(
        long = "results",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "results.json"
    )]
    pub results_file: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
