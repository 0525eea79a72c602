//! Output file naming
//!
//! Every file of a run lives in one data directory and shares the
//! `{site}_{keyword}` stem:
//!
//! - `{stem}.csv` / `{stem}_errors.csv` - round 0 checkpoint
//! - `{stem}_retry_{k}.csv` / `{stem}_retry_{k}_errors.csv` - retry round k
//! - `{stem}_final.csv` - consolidated records
//! - `{stem}_summary.txt` - human-readable run summary
//!
//! Rescrape runs insert `_rescraped` into the stem so they never clobber the
//! originals.

use std::path::{Path, PathBuf};

/// Computes the file paths for one run
#[derive(Debug, Clone)]
pub struct OutputPaths {
    data_dir: PathBuf,
    stem: String,
}

impl OutputPaths {
    pub fn new(data_dir: impl AsRef<Path>, site: &str, keyword: &str) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            stem: format!("{}_{}", site, keyword),
        }
    }

    /// Marks this run as a rescrape; all file names gain a `_rescraped` tag
    pub fn rescraped(mut self) -> Self {
        self.stem.push_str("_rescraped");
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Records checkpoint for one round
    pub fn round_records(&self, round: usize) -> PathBuf {
        if round == 0 {
            self.data_dir.join(format!("{}.csv", self.stem))
        } else {
            self.data_dir
                .join(format!("{}_retry_{}.csv", self.stem, round))
        }
    }

    /// Failure checkpoint for one round
    pub fn round_failures(&self, round: usize) -> PathBuf {
        if round == 0 {
            self.data_dir.join(format!("{}_errors.csv", self.stem))
        } else {
            self.data_dir
                .join(format!("{}_retry_{}_errors.csv", self.stem, round))
        }
    }

    /// Consolidated records across all rounds
    pub fn final_records(&self) -> PathBuf {
        self.data_dir.join(format!("{}_final.csv", self.stem))
    }

    /// Human-readable run summary
    pub fn summary(&self) -> PathBuf {
        self.data_dir.join(format!("{}_summary.txt", self.stem))
    }
}
