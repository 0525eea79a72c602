//! Link discovery over paginated listing pages
//!
//! The frontier walks listing pages 1..=max_pages, harvesting detail-page
//! links from each. Links are deduplicated as they arrive; discovery order is
//! first-seen order. Pagination stops early when the portal signals true
//! end-of-results, or after a configured number of consecutive pages that
//! contribute nothing new (listing endpoints commonly keep serving the same
//! page past the real end).

use crate::browser::{BrowserSession, PageHandle};
use crate::config::BrowserConfig;
use crate::record::Link;
use crate::site::SiteProfile;
use std::collections::HashSet;

/// Discovers the deduplicated link set for one keyword
pub struct LinkFrontier {
    profile: SiteProfile,
    browser: BrowserConfig,
    max_pages: u32,
    max_consecutive_empty: u32,
}

impl LinkFrontier {
    pub fn new(
        profile: SiteProfile,
        browser: BrowserConfig,
        max_pages: u32,
        max_consecutive_empty: u32,
    ) -> Self {
        Self {
            profile,
            browser,
            max_pages,
            max_consecutive_empty,
        }
    }

    /// Walks the listing pages and returns every unique detail link, in
    /// first-seen order.
    ///
    /// A page that fails to navigate or shows no link anchors counts as
    /// empty; it is logged and pagination moves on. Only browser-session
    /// level failures (opening the listing page handle) abort discovery.
    pub async fn discover(
        &self,
        session: &dyn BrowserSession,
        keyword: &str,
    ) -> crate::Result<Vec<Link>> {
        let page = session.new_page().await?;
        let mut seen: HashSet<Link> = HashSet::new();
        let mut links: Vec<Link> = Vec::new();
        let mut consecutive_empty = 0u32;

        for page_index in 1..=self.max_pages {
            let url = self.profile.listing_page_url(keyword, page_index);

            let new_on_page = match self.collect_page(page.as_ref(), &url).await {
                Ok(PageLinks::Links(hrefs)) => {
                    let mut new_count = 0usize;
                    for href in hrefs {
                        let link = Link::new(href);
                        if seen.insert(link.clone()) {
                            links.push(link);
                            new_count += 1;
                        }
                    }
                    new_count
                }
                Ok(PageLinks::EndOfResults) => {
                    tracing::info!(
                        "End-of-results marker on page {}, stopping discovery",
                        page_index
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!("Listing page {} unreadable: {}", page_index, e);
                    0
                }
            };

            if new_on_page == 0 {
                consecutive_empty += 1;
                tracing::debug!(
                    "Page {} contributed no new links ({}/{} consecutive)",
                    page_index,
                    consecutive_empty,
                    self.max_consecutive_empty
                );
                if consecutive_empty >= self.max_consecutive_empty {
                    tracing::info!(
                        "{} consecutive empty pages, stopping discovery",
                        consecutive_empty
                    );
                    break;
                }
            } else {
                consecutive_empty = 0;
                tracing::info!(
                    "Page {}: {} new links ({} total)",
                    page_index,
                    new_on_page,
                    links.len()
                );
            }
        }

        page.close().await;
        tracing::info!("Discovery finished: {} unique links", links.len());
        Ok(links)
    }

    async fn collect_page(
        &self,
        page: &dyn PageHandle,
        url: &str,
    ) -> crate::Result<PageLinks> {
        page.navigate(url, self.browser.navigation_timeout()).await?;

        if page
            .wait_for(
                &self.profile.listing_link_selector,
                self.browser.selector_timeout(),
            )
            .await
            .is_err()
        {
            // No anchors; distinguish true end-of-results from a slow or
            // broken page before deciding how to count it.
            if page.is_visible(&self.profile.no_results_selector).await? {
                return Ok(PageLinks::EndOfResults);
            }
            return Ok(PageLinks::Links(Vec::new()));
        }

        let mut hrefs = Vec::new();
        for anchor in page
            .locate_all(&self.profile.listing_link_selector)
            .await?
        {
            if let Some(href) = anchor.read_attribute("href").await? {
                let trimmed = href.trim();
                if !trimmed.is_empty() {
                    hrefs.push(trimmed.to_string());
                }
            }
        }
        Ok(PageLinks::Links(hrefs))
    }
}

enum PageLinks {
    Links(Vec<String>),
    EndOfResults,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fixture::{FixtureEngine, PageScript};
    use crate::browser::BrowserEngine;
    use crate::site::profile_for;

    fn test_browser_config() -> BrowserConfig {
        BrowserConfig {
            navigation_timeout_ms: 1000,
            selector_timeout_ms: 1000,
            poll_interval_ms: 1,
            max_poll_attempts: 5,
            extraction_timeout_ms: 5000,
        }
    }

    fn listing_page(hrefs: &[&str]) -> PageScript {
        let mut script = PageScript::default();
        for href in hrefs {
            script = script.with_link("a.img_job_card", *href);
        }
        script
    }

    #[tokio::test]
    async fn test_discovers_and_deduplicates_across_pages() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.script_page(
            profile.listing_page_url("rust", 1),
            listing_page(&["/job-a-1-jd", "/job-b-2-jd"]),
        );
        // Page 2 repeats one link from page 1.
        engine.script_page(
            profile.listing_page_url("rust", 2),
            listing_page(&["/job-b-2-jd", "/job-c-3-jd"]),
        );

        let frontier = LinkFrontier::new(profile, test_browser_config(), 2, 3);
        let session = engine.new_session().await.unwrap();
        let links = frontier.discover(session.as_ref(), "rust").await.unwrap();

        assert_eq!(
            links,
            vec![
                Link::new("/job-a-1-jd"),
                Link::new("/job-b-2-jd"),
                Link::new("/job-c-3-jd"),
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_after_consecutive_empty_pages() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.script_page(
            profile.listing_page_url("rust", 1),
            listing_page(&["/job-a-1-jd"]),
        );
        // Pages 2..4 keep serving the same link; pages past that are never
        // scripted, so a visit there would show up in the visit log.
        for page in 2..=4 {
            engine.script_page(
                profile.listing_page_url("rust", page),
                listing_page(&["/job-a-1-jd"]),
            );
        }

        let frontier = LinkFrontier::new(profile.clone(), test_browser_config(), 50, 3);
        let session = engine.new_session().await.unwrap();
        let links = frontier.discover(session.as_ref(), "rust").await.unwrap();

        assert_eq!(links, vec![Link::new("/job-a-1-jd")]);
        // Pages 1-4 visited: the three consecutive no-new-link pages end it.
        assert_eq!(engine.visits().len(), 4);
    }

    #[tokio::test]
    async fn test_end_of_results_marker_stops_discovery() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.script_page(
            profile.listing_page_url("rust", 1),
            listing_page(&["/job-a-1-jd"]),
        );
        engine.script_page(
            profile.listing_page_url("rust", 2),
            PageScript::default().with_text("div.noResultWrapper", "No results"),
        );

        let frontier = LinkFrontier::new(profile, test_browser_config(), 50, 3);
        let session = engine.new_session().await.unwrap();
        let links = frontier.discover(session.as_ref(), "rust").await.unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(engine.visits().len(), 2);
    }

    #[tokio::test]
    async fn test_navigation_failure_counts_as_empty_page() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.fail_navigation(profile.listing_page_url("rust", 1), 1);
        engine.script_page(
            profile.listing_page_url("rust", 2),
            listing_page(&["/job-a-1-jd"]),
        );

        let frontier = LinkFrontier::new(profile, test_browser_config(), 2, 3);
        let session = engine.new_session().await.unwrap();
        let links = frontier.discover(session.as_ref(), "rust").await.unwrap();

        // The failed page is skipped, not fatal.
        assert_eq!(links, vec![Link::new("/job-a-1-jd")]);
    }

    #[tokio::test]
    async fn test_respects_max_pages() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        for page in 1..=10 {
            engine.script_page(
                profile.listing_page_url("rust", page),
                listing_page(&[&format!("/job-{}-jd", page)]),
            );
        }

        let frontier = LinkFrontier::new(profile, test_browser_config(), 3, 3);
        let session = engine.new_session().await.unwrap();
        let links = frontier.discover(session.as_ref(), "rust").await.unwrap();

        assert_eq!(links.len(), 3);
        assert_eq!(engine.visits().len(), 3);
    }
}
