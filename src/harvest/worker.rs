//! Concurrent extraction of one batch of links
//!
//! The worker pool spawns one task per link, bounded by a semaphore so at
//! most `concurrency_limit` detail pages are open at once. Every task owns
//! its own page handle on the shared session and races the extractor against
//! the per-link deadline. Outcomes are partitioned, never short-circuited: a
//! failing link becomes a [`FailedLink`] and the batch keeps going.

use crate::browser::BrowserSession;
use crate::extract::{DetailExtractor, ExtractError};
use crate::record::{FailedLink, Link, RoundResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs one batch of links to completion on a shared session
pub struct ExtractionWorkerPool {
    extractor: Arc<dyn DetailExtractor>,
    concurrency_limit: usize,
    extraction_timeout: Duration,
}

impl ExtractionWorkerPool {
    pub fn new(
        extractor: Arc<dyn DetailExtractor>,
        concurrency_limit: usize,
        extraction_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            concurrency_limit,
            extraction_timeout,
        }
    }

    /// Processes every link in the batch and returns the partitioned outcome.
    ///
    /// Conservation holds: each input link contributes exactly one success or
    /// one failure to the result.
    pub async fn run_batch(
        &self,
        session: Arc<dyn BrowserSession>,
        links: &[Link],
        round: usize,
    ) -> RoundResult {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut tasks = JoinSet::new();

        for link in links {
            let link = link.clone();
            let session = Arc::clone(&session);
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.extraction_timeout;

            tasks.spawn(async move {
                // Closed only if the pool itself is dropped mid-batch.
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            link,
                            Err(ExtractError::Browser(
                                crate::browser::BrowserError::Engine(
                                    "worker pool shut down".to_string(),
                                ),
                            )),
                        );
                    }
                };

                let outcome = extract_one(session.as_ref(), extractor.as_ref(), &link, timeout)
                    .await;
                (link, outcome)
            });
        }

        let mut result = RoundResult::new(round);
        let mut accounted: HashSet<Link> = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((link, Ok(record))) => {
                    tracing::debug!("Extracted {} ({} fields)", link, record.populated_fields());
                    accounted.insert(link);
                    result.successes.push(record);
                }
                Ok((link, Err(e))) => {
                    tracing::warn!("Extraction failed for {}: {}", link, e);
                    accounted.insert(link.clone());
                    result.failures.push(FailedLink::new(link, e.to_string()));
                }
                Err(e) => {
                    tracing::error!("Extraction task aborted: {}", e);
                }
            }
        }

        // A panicked task never yields its (link, outcome) pair; whatever is
        // missing from the tally still belongs on the failure list so it is
        // checkpointed and retried like any other failure.
        for link in links {
            if !accounted.contains(link) {
                result
                    .failures
                    .push(FailedLink::new(link.clone(), "extraction task panicked"));
            }
        }
        result
    }
}

async fn extract_one(
    session: &dyn BrowserSession,
    extractor: &dyn DetailExtractor,
    link: &Link,
    timeout: Duration,
) -> Result<crate::record::Record, ExtractError> {
    let page = session.new_page().await?;

    let outcome = match tokio::time::timeout(timeout, extractor.extract(link, page.as_ref())).await
    {
        Ok(result) => result,
        Err(_) => Err(ExtractError::DeadlineExceeded {
            timeout_ms: timeout.as_millis() as u64,
        }),
    };

    // The page is closed whatever happened; leaked pages accumulate in the
    // session until the batch boundary otherwise.
    page.close().await;
    outcome
}
