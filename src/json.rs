//! Pretty JSON output of indexes, counts and query results.
//!
//! Output is indented with tabs and keys appear in sorted order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::error::Result;
use crate::index::{InvertedIndex, SearchResult};
use crate::query::QueryResults;

/// Decimal places kept for scores.
pub const SCORE_PRECISION: i32 = 8;

#[derive(Serialize)]
struct ResultEntry<'a> {
    #[serde(rename = "where")]
    location: &'a str,
    count: usize,
    score: f64,
}

impl<'a> From<&'a SearchResult> for ResultEntry<'a> {
    fn from(result: &'a SearchResult) -> Self {
        ResultEntry {
            location: result.location(),
            count: result.matches(),
            score: round_score(result.score()),
        }
    }
}

fn round_score(score: f64) -> f64 {
    let scale = 10f64.powi(SCORE_PRECISION);
    (score * scale).round() / scale
}

fn write_pretty<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    {
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut serializer)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    Ok(File::create(path)?)
}

/// Write `{term: {location: [positions]}}`.
pub fn write_index<W: Write>(index: &InvertedIndex, writer: W) -> Result<()> {
    write_pretty(index.entries(), writer)
}

/// Write `{location: count}`.
pub fn write_counts<W: Write>(counts: &BTreeMap<String, usize>, writer: W) -> Result<()> {
    write_pretty(counts, writer)
}

/// Write `{query: [{"where": location, "count": matches, "score": score}]}`.
pub fn write_results<W: Write>(results: &QueryResults, writer: W) -> Result<()> {
    let entries: BTreeMap<&str, Vec<ResultEntry<'_>>> = results
        .iter()
        .map(|(query, hits)| (query.as_str(), hits.iter().map(ResultEntry::from).collect()))
        .collect();
    write_pretty(&entries, writer)
}

pub fn write_index_to_path(index: &InvertedIndex, path: &Path) -> Result<()> {
    write_index(index, create(path)?)
}

pub fn write_counts_to_path(counts: &BTreeMap<String, usize>, path: &Path) -> Result<()> {
    write_counts(counts, create(path)?)
}

pub fn write_results_to_path(results: &QueryResults, path: &Path) -> Result<()> {
    write_results(results, create(path)?)
}
