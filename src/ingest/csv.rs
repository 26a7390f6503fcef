use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use tracing::warn;

/// One data row keyed by lower-cased header name.
pub type RawRecord = HashMap<String, String>;

/// Parses a sheet exported as CSV. The first row names the columns; short
/// rows leave the missing columns empty, unreadable rows are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<RawRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV header row is empty");
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                // header is line 1
                warn!(line = row_idx + 2, %err, "skipping unreadable CSV row");
                continue;
            }
        };

        let record: RawRecord = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), row.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Splits a `;`-separated options cell, dropping blanks.
pub fn split_options(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}
