use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::types::PairRecord;

/// Recover the fixed-shape records from accumulated snapshot text.
///
/// The page renders each listing as four consecutive lines: a line
/// containing "Buy", then time, address, and top-10 share. The scan works
/// on non-empty trimmed lines so box borders and blank separators in the
/// log do not break the pattern, matches "buy" case-insensitively, and
/// advances past each accepted record so overlapping entries are not
/// re-read. The address is truncated at the "..." the page renders.
pub fn parse_records(input: &str) -> Vec<PairRecord> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut records = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].to_lowercase().contains("buy") && i + 3 < lines.len() {
            let address_line = lines[i + 2];
            let address = match address_line.split_once("...") {
                Some((prefix, _)) => prefix,
                None => address_line,
            };
            records.push(PairRecord {
                time: lines[i + 1].to_string(),
                address: address.to_string(),
                top10: lines[i + 3].to_string(),
            });
            i += 4;
            continue;
        }
        i += 1;
    }
    records
}

/// Scan a snapshot log and write the recovered records to a CSV file.
///
/// Returns the number of records written. Headers are `Time,Address,Top10`.
pub fn extract_to_csv(input: &Path, output: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read log file {}", input.display()))?;
    let records = parse_records(&text);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    // Write the header row explicitly so an empty log still yields a
    // well-formed CSV file
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("Failed to create CSV file {}", output.display()))?;
    writer.write_record(["Time", "Address", "Top10"])?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} record(s) to {}",
        records.len(),
        output.display()
    );
    Ok(records.len())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
