//! Retry rounds over a shrinking failure set
//!
//! Round 0 processes every discovered link; each retry round processes only
//! the links that failed the previous round. Every round is checkpointed to
//! disk before the coordinator decides whether to continue, so an interrupted
//! run never loses a completed round.

use crate::harvest::{BatchResourceManager, ExtractionWorkerPool};
use crate::output::OutputError;
use crate::record::{Link, RoundResult};

/// Persists a completed round before the continue decision.
///
/// The pipeline writes CSV checkpoints; tests substitute in-memory
/// implementations to observe ordering.
pub trait Checkpointer: Send + Sync {
    fn persist(&self, round: &RoundResult) -> Result<(), OutputError>;
}

/// Drives rounds 0..=max_retries until the failure set is empty
pub struct RetryCoordinator<'a> {
    batches: BatchResourceManager<'a>,
    checkpointer: &'a dyn Checkpointer,
    max_retries: u32,
}

impl<'a> RetryCoordinator<'a> {
    pub fn new(
        batches: BatchResourceManager<'a>,
        checkpointer: &'a dyn Checkpointer,
        max_retries: u32,
    ) -> Self {
        Self {
            batches,
            checkpointer,
            max_retries,
        }
    }

    /// Runs the full round sequence for `links` and returns every round's
    /// result, in round order.
    ///
    /// Terminates when a round has no failures or when `max_retries` retry
    /// rounds have run, whichever comes first. At most `max_retries + 1`
    /// rounds execute.
    pub async fn run(
        &self,
        pool: &ExtractionWorkerPool,
        links: Vec<Link>,
    ) -> crate::Result<Vec<RoundResult>> {
        let mut rounds = Vec::new();
        let mut pending = links;

        for round in 0..=(self.max_retries as usize) {
            if pending.is_empty() {
                break;
            }

            if round == 0 {
                tracing::info!("Round 0: {} links", pending.len());
            } else {
                tracing::info!(
                    "Retry round {}/{}: {} links",
                    round,
                    self.max_retries,
                    pending.len()
                );
            }

            let result = self.batches.run_round(pool, &pending, round).await?;
            tracing::info!(
                "Round {} done: {} succeeded, {} failed",
                round,
                result.successes.len(),
                result.failures.len()
            );

            // Checkpoint before looking at the failure set; a crash between
            // rounds must not lose this round's records.
            self.checkpointer.persist(&result)?;

            pending = result.failed_links();
            rounds.push(result);
        }

        if let Some(last) = rounds.last() {
            if !last.failures.is_empty() {
                tracing::warn!(
                    "{} links still failing after {} round(s)",
                    last.failures.len(),
                    rounds.len()
                );
            }
        }

        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fixture::{FixtureEngine, PageScript};
    use crate::config::BrowserConfig;
    use crate::extract::ExtractorRegistry;
    use crate::site::profile_for;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn test_browser_config() -> BrowserConfig {
        BrowserConfig {
            navigation_timeout_ms: 1000,
            selector_timeout_ms: 1000,
            poll_interval_ms: 1,
            max_poll_attempts: 5,
            extraction_timeout_ms: 5000,
        }
    }

    fn pool() -> ExtractionWorkerPool {
        let extractor = Arc::new(ExtractorRegistry::for_profile(
            profile_for("vietnamworks").unwrap(),
            test_browser_config(),
        ));
        ExtractionWorkerPool::new(extractor, 4, Duration::from_secs(5))
    }

    /// Records which rounds were checkpointed, and in what order
    #[derive(Default)]
    struct RecordingCheckpointer {
        rounds: Mutex<Vec<(usize, usize, usize)>>,
    }

    impl Checkpointer for RecordingCheckpointer {
        fn persist(&self, round: &RoundResult) -> Result<(), OutputError> {
            self.rounds.lock().unwrap().push((
                round.round,
                round.successes.len(),
                round.failures.len(),
            ));
            Ok(())
        }
    }

    fn scripted_links(engine: &FixtureEngine, count: usize) -> Vec<Link> {
        let profile = profile_for("vietnamworks").unwrap();
        (1..=count)
            .map(|i| {
                let link = Link::new(format!("/job-{}-jd", i));
                engine.script_page(
                    profile.detail_url(&link),
                    PageScript::default().with_text("h1[name='title']", "Job"),
                );
                link
            })
            .collect()
    }

    #[tokio::test]
    async fn test_single_round_when_everything_succeeds() {
        let engine = FixtureEngine::new();
        let links = scripted_links(&engine, 5);
        let checkpointer = RecordingCheckpointer::default();

        let coordinator = RetryCoordinator::new(
            BatchResourceManager::new(&engine, 100),
            &checkpointer,
            2,
        );
        let rounds = coordinator.run(&pool(), links).await.unwrap();

        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].successes.len(), 5);
        assert_eq!(*checkpointer.rounds.lock().unwrap(), vec![(0, 5, 0)]);
    }

    #[tokio::test]
    async fn test_flaky_link_recovers_in_retry_round() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        let links = scripted_links(&engine, 3);
        // One link fails its first navigation, then loads normally.
        engine.fail_navigation(profile.detail_url(&links[1]), 1);

        let checkpointer = RecordingCheckpointer::default();
        let coordinator = RetryCoordinator::new(
            BatchResourceManager::new(&engine, 100),
            &checkpointer,
            2,
        );
        let rounds = coordinator.run(&pool(), links).await.unwrap();

        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].successes.len(), 2);
        assert_eq!(rounds[0].failures.len(), 1);
        assert_eq!(rounds[1].successes.len(), 1);
        assert_eq!(rounds[1].failures.len(), 0);
        assert_eq!(
            *checkpointer.rounds.lock().unwrap(),
            vec![(0, 2, 1), (1, 1, 0)]
        );
    }

    #[tokio::test]
    async fn test_retry_budget_bounds_round_count() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        let links = scripted_links(&engine, 2);
        // This link never loads, in any round.
        engine.fail_navigation(profile.detail_url(&links[0]), u32::MAX);

        let checkpointer = RecordingCheckpointer::default();
        let coordinator = RetryCoordinator::new(
            BatchResourceManager::new(&engine, 100),
            &checkpointer,
            2,
        );
        let rounds = coordinator.run(&pool(), links).await.unwrap();

        // Round 0 plus two retry rounds; the link is a permanent failure.
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[2].failures.len(), 1);
        assert_eq!(
            *checkpointer.rounds.lock().unwrap(),
            vec![(0, 1, 1), (1, 0, 1), (2, 0, 1)]
        );
    }

    #[tokio::test]
    async fn test_zero_retries_means_one_round() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        let links = scripted_links(&engine, 2);
        engine.fail_navigation(profile.detail_url(&links[0]), u32::MAX);

        let checkpointer = RecordingCheckpointer::default();
        let coordinator = RetryCoordinator::new(
            BatchResourceManager::new(&engine, 100),
            &checkpointer,
            0,
        );
        let rounds = coordinator.run(&pool(), links).await.unwrap();

        assert_eq!(rounds.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_link_list_runs_no_rounds() {
        let engine = FixtureEngine::new();
        let checkpointer = RecordingCheckpointer::default();

        let coordinator = RetryCoordinator::new(
            BatchResourceManager::new(&engine, 100),
            &checkpointer,
            2,
        );
        let rounds = coordinator.run(&pool(), Vec::new()).await.unwrap();

        assert!(rounds.is_empty());
        assert!(checkpointer.rounds.lock().unwrap().is_empty());
    }
}
