//! CSV output and console preview of collected records.

use crate::error::OutputError;
use crate::model::{Record, ValueStats, COLUMNS};
use crate::openaq::CityQuery;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `records` as CSV (header included) to `writer`, returning the row count.
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<usize, OutputError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(records.len())
}

/// Writes `records` to a new file at `path`, replacing any existing file.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<usize, OutputError> {
    tracing::info!(path = %path.display(), rows = records.len(), "Writing CSV");
    let file = std::fs::File::create(path)?;
    let rows = write_records(file, records)?;
    tracing::info!(rows, "CSV written successfully");
    Ok(rows)
}

/// Builds the output file name for a query run at `created_at`.
pub fn output_filename(query: &CityQuery, created_at: DateTime<Local>) -> String {
    format!(
        "openaq_{}_{}_{}_to_{}_limit_{}_file_created_on_{}.csv",
        query.city.replace(' ', "_").to_lowercase(),
        query.country_code,
        query.date_from,
        query.date_to,
        query.limit,
        created_at.format("%Y%m%d_%H%M%S")
    )
}

pub fn output_path(dir: &Path, query: &CityQuery, created_at: DateTime<Local>) -> PathBuf {
    dir.join(output_filename(query, created_at))
}

/// Renders the first `rows` records as a markdown table, cells formatted as in the CSV.
pub fn markdown_preview(records: &[Record], rows: usize) -> Result<String, OutputError> {
    let mut table = format!("| {} |\n", COLUMNS.join(" | "));
    table.push_str(&format!("|{}\n", "---|".repeat(COLUMNS.len())));
    for record in records.iter().take(rows) {
        table.push_str(&format!("| {} |\n", record.cells()?.join(" | ")));
    }
    Ok(table)
}

pub fn stats_summary(stats: &ValueStats) -> String {
    format!(
        "values: {}, mean: {:.3}, max: {:.3}, min: {:.3}",
        stats.count, stats.mean, stats.max, stats.min
    )
}
