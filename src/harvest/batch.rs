//! Session recycling across batches
//!
//! A long run leaks browser memory if one session serves every link, so the
//! link set is split into fixed-size batches and each batch gets a fresh
//! session that is torn down at the batch boundary. Failing to launch a
//! session is the one fatal condition in the pipeline: without a browser the
//! round cannot proceed at all.

use crate::browser::BrowserEngine;
use crate::harvest::ExtractionWorkerPool;
use crate::record::{Link, RoundResult};

/// Splits a round's links into batches and recycles the browser session
/// between them
pub struct BatchResourceManager<'a> {
    engine: &'a dyn BrowserEngine,
    batch_size: usize,
}

impl<'a> BatchResourceManager<'a> {
    pub fn new(engine: &'a dyn BrowserEngine, batch_size: usize) -> Self {
        Self { engine, batch_size }
    }

    /// Processes every link of one round, batch by batch.
    ///
    /// Each batch runs on its own session; the session is closed before the
    /// next one launches, including after the final batch.
    pub async fn run_round(
        &self,
        pool: &ExtractionWorkerPool,
        links: &[Link],
        round: usize,
    ) -> crate::Result<RoundResult> {
        let mut result = RoundResult::new(round);
        let batch_count = links.len().div_ceil(self.batch_size);

        for (index, batch) in links.chunks(self.batch_size).enumerate() {
            tracing::info!(
                "Round {}: batch {}/{} ({} links)",
                round,
                index + 1,
                batch_count,
                batch.len()
            );

            let session = self.engine.new_session().await?;
            let batch_result = pool.run_batch(session.clone(), batch, round).await;
            session.close().await;

            result.merge(batch_result);
        }

        Ok(result)
    }
}
