//! CSV readers and writers for checkpoints, failure files, and finals
//!
//! Record files always carry the full column schema in schema order; absent
//! fields render as empty cells. Failure files are a single `job_link`
//! column, which is exactly the shape the rescrape loader reads back.

use crate::harvest::Checkpointer;
use crate::output::{OutputError, OutputPaths};
use crate::record::schema::COLUMNS;
use crate::record::{FailedLink, Link, Record, RoundResult};
use std::path::Path;

/// Writes records to `path` under the full column schema
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for record in records {
        let row: Vec<String> = COLUMNS.iter().map(|c| record.get(c).render()).collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes failed links to `path` as a single `job_link` column
pub fn write_failures(path: &Path, failures: &[FailedLink]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["job_link"])?;
    for failure in failures {
        writer.write_record([failure.link.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Loads records back from a round checkpoint file.
///
/// Cells are restored as text fields (list cells stay in their rendered
/// form); empty cells stay absent. Rows without a `job_url` cell are skipped.
pub fn load_records(path: &Path) -> Result<Vec<Record>, OutputError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |column: &str| -> Option<&str> {
            headers
                .iter()
                .position(|h| h == column)
                .and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
        };

        let Some(job_url) = cell("job_url") else {
            continue;
        };
        let site = cell("site").unwrap_or_default().to_string();

        let mut record = Record::new(site, Link::new(job_url));
        for (column, value) in headers.iter().zip(row.iter()) {
            if !value.is_empty() {
                record.set(column, crate::record::FieldValue::Text(value.to_string()));
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Loads links from a failure file (or any one-column link list).
///
/// A leading `job_link` header row is tolerated and skipped; blank rows are
/// ignored.
pub fn load_links(path: &Path) -> Result<Vec<Link>, OutputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut links = Vec::new();
    for row in reader.records() {
        let row = row?;
        let Some(first) = row.get(0) else {
            continue;
        };
        let trimmed = first.trim();
        if trimmed.is_empty() || trimmed == "job_link" {
            continue;
        }
        links.push(Link::new(trimmed));
    }
    Ok(links)
}

/// The production [`Checkpointer`]: one records file and one failure file per
/// round, named by [`OutputPaths`]
pub struct CsvCheckpointer {
    paths: OutputPaths,
}

impl CsvCheckpointer {
    /// Creates the checkpointer, ensuring the data directory exists
    pub fn new(paths: OutputPaths) -> Result<Self, OutputError> {
        std::fs::create_dir_all(paths.data_dir())?;
        Ok(Self { paths })
    }
}

impl Checkpointer for CsvCheckpointer {
    fn persist(&self, round: &RoundResult) -> Result<(), OutputError> {
        let records_path = self.paths.round_records(round.round);
        write_records(&records_path, &round.successes)?;
        tracing::info!(
            "Checkpointed {} records to {}",
            round.successes.len(),
            records_path.display()
        );

        if !round.failures.is_empty() {
            let failures_path = self.paths.round_failures(round.round);
            write_failures(&failures_path, &round.failures)?;
            tracing::info!(
                "Checkpointed {} failed links to {}",
                round.failures.len(),
                failures_path.display()
            );
        }
        Ok(())
    }
}
