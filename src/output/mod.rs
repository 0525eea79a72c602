//! Output module: round checkpoints, failure files, and final consolidation
//!
//! Every round writes its records and failures to CSV before the pipeline
//! decides whether to retry; the consolidator merges all rounds into one
//! final file plus a human-readable run summary.

mod consolidate;
mod csv_files;
mod paths;

pub use consolidate::{print_summary, Consolidator};
pub use csv_files::{load_links, load_records, write_failures, write_records, CsvCheckpointer};
pub use paths::OutputPaths;

use thiserror::Error;

/// Output-layer errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
