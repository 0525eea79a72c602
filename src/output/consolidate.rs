//! Final consolidation across retry rounds
//!
//! Merges every round's successes (a link succeeds in at most one round, so
//! concatenation in round order is already duplicate-free), writes the final
//! CSV, and derives the aggregate run summary.

use crate::output::{csv_files, OutputError, OutputPaths};
use crate::record::{Record, RoundCounts, RoundResult, RunSummary};

/// Merges round checkpoints into the final records file and run summary
pub struct Consolidator {
    paths: OutputPaths,
    config_hash: String,
}

impl Consolidator {
    pub fn new(paths: OutputPaths, config_hash: impl Into<String>) -> Self {
        Self {
            paths,
            config_hash: config_hash.into(),
        }
    }

    /// Writes the final records file and summary file, returning the summary
    pub fn consolidate(&self, rounds: &[RoundResult]) -> Result<RunSummary, OutputError> {
        let merged: Vec<Record> = rounds
            .iter()
            .flat_map(|round| round.successes.iter().cloned())
            .collect();

        let final_path = self.paths.final_records();
        csv_files::write_records(&final_path, &merged)?;
        tracing::info!(
            "Consolidated {} records into {}",
            merged.len(),
            final_path.display()
        );

        let summary = self.build_summary(rounds, merged.len());
        std::fs::write(self.paths.summary(), render_summary(&summary))?;
        Ok(summary)
    }

    /// Rebuilds the final file and summary from round checkpoints already on
    /// disk; used to recover a run whose process died before consolidation
    pub fn consolidate_from_disk(&self) -> Result<RunSummary, OutputError> {
        let mut rounds = Vec::new();
        for round in 0.. {
            let records_path = self.paths.round_records(round);
            if !records_path.exists() {
                break;
            }

            let mut result = RoundResult::new(round);
            result.successes = csv_files::load_records(&records_path)?;

            let failures_path = self.paths.round_failures(round);
            if failures_path.exists() {
                result.failures = csv_files::load_links(&failures_path)?
                    .into_iter()
                    .map(|link| crate::record::FailedLink::new(link, "recorded failure"))
                    .collect();
            }
            rounds.push(result);
        }

        self.consolidate(&rounds)
    }

    fn build_summary(&self, rounds: &[RoundResult], total_successes: usize) -> RunSummary {
        let per_round: Vec<RoundCounts> = rounds
            .iter()
            .map(|round| RoundCounts {
                round: round.round,
                successes: round.successes.len(),
                failures: round.failures.len(),
            })
            .collect();

        RunSummary {
            // Round 0 saw every link exactly once.
            total_links: rounds.first().map(|r| r.total()).unwrap_or(0),
            total_successes,
            permanent_failures: rounds.last().map(|r| r.failures.len()).unwrap_or(0),
            rounds_executed: rounds.len(),
            per_round,
            config_hash: self.config_hash.clone(),
        }
    }
}

/// Renders the summary as the text written to `{stem}_summary.txt`
fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("=== Harvest Summary ===\n\n");
    out.push_str(&format!("Total links:        {}\n", summary.total_links));
    out.push_str(&format!("Successful records: {}\n", summary.total_successes));
    out.push_str(&format!(
        "Permanent failures: {}\n",
        summary.permanent_failures
    ));
    out.push_str(&format!(
        "Success rate:       {:.1}%\n",
        summary.success_rate()
    ));
    out.push_str(&format!("Rounds executed:    {}\n", summary.rounds_executed));
    out.push('\n');
    for counts in &summary.per_round {
        let label = if counts.round == 0 {
            "Round 0".to_string()
        } else {
            format!("Retry {}", counts.round)
        };
        out.push_str(&format!(
            "  {}: {} succeeded, {} failed\n",
            label, counts.successes, counts.failures
        ));
    }
    out.push_str(&format!("\nConfig hash: {}\n", summary.config_hash));
    out
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    print!("{}", render_summary(summary));
}
