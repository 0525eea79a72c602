//! Page-shape dispatch for detail extractors
//!
//! Portals serve detail pages in more than one layout (redesigns, A/B
//! templates, sponsored listings). Instead of nested conditionals inside one
//! extractor, the registry holds an ordered strategy table: each entry pairs
//! a cheap structural probe selector with the [`PageExtractor`] that handles
//! that shape. After navigating, the first entry whose probe matches wins.

use crate::browser::PageHandle;
use crate::config::BrowserConfig;
use crate::extract::{
    DetailExtractor, ExtractError, ExtractResult, PageExtractor, SelectorMapExtractor,
};
use crate::record::{Link, Record};
use crate::site::SiteProfile;
use async_trait::async_trait;
use std::sync::Arc;

/// One shape entry: probe selector -> extractor
pub struct ShapeEntry {
    pub tag: String,
    pub probe_selector: String,
    pub extractor: Arc<dyn PageExtractor>,
}

/// Strategy table implementing [`DetailExtractor`]: navigates to the detail
/// URL, waits for the page, probes shapes in registration order, and
/// delegates to the matching extractor.
pub struct ExtractorRegistry {
    profile: SiteProfile,
    browser: BrowserConfig,
    entries: Vec<ShapeEntry>,
}

impl ExtractorRegistry {
    pub fn new(profile: SiteProfile, browser: BrowserConfig) -> Self {
        Self {
            profile,
            browser,
            entries: Vec::new(),
        }
    }

    /// Registers a shape; entries are probed in registration order
    pub fn register(
        mut self,
        tag: impl Into<String>,
        probe_selector: impl Into<String>,
        extractor: Arc<dyn PageExtractor>,
    ) -> Self {
        self.entries.push(ShapeEntry {
            tag: tag.into(),
            probe_selector: probe_selector.into(),
            extractor,
        });
        self
    }

    /// The standard single-shape registry for a profile: its declarative
    /// selector table behind its detail probe
    pub fn for_profile(profile: SiteProfile, browser: BrowserConfig) -> Self {
        let probe = profile.detail_probe_selector.clone();
        let extractor = Arc::new(SelectorMapExtractor::new(profile.clone(), browser.clone()));
        Self::new(profile, browser).register("default", probe, extractor)
    }
}

#[async_trait]
impl DetailExtractor for ExtractorRegistry {
    async fn extract(&self, link: &Link, page: &dyn PageHandle) -> ExtractResult<Record> {
        let url = self.profile.detail_url(link);
        page.navigate(&url, self.browser.navigation_timeout()).await?;

        // Give the page its readiness window before probing shapes.
        if let Err(e) = page
            .wait_for(
                &self.profile.detail_probe_selector,
                self.browser.selector_timeout(),
            )
            .await
        {
            // The default probe missing may still mean an alternate shape
            // loaded; only fail outright if nothing matches below.
            tracing::debug!("Readiness probe missed for {}: {}", url, e);
        }

        for entry in &self.entries {
            if page.locate(&entry.probe_selector).await?.is_some() {
                tracing::trace!("Shape '{}' matched for {}", entry.tag, url);
                return entry.extractor.extract_loaded(link, page).await;
            }
        }

        Err(ExtractError::UnrecognizedShape {
            link: link.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fixture::{FixtureEngine, PageScript};
    use crate::browser::BrowserEngine;
    use crate::record::FieldValue;
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

    struct TitleOnly;

    #[async_trait]
    impl PageExtractor for TitleOnly {
        async fn extract_loaded(
            &self,
            link: &Link,
            page: &dyn PageHandle,
        ) -> ExtractResult<Record> {
            let mut record = Record::new("vietnamworks", link.clone());
            let title = match page.locate("h2.alt-title").await? {
                Some(element) => element.read_text().await?,
                None => None,
            };
            record.set("title", FieldValue::from_optional_text(title));
            Ok(record)
        }
    }

    #[tokio::test]
    async fn test_first_matching_shape_wins() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.script_page(
            profile.detail_url(&Link::new("/alt-layout-7-jd")),
            PageScript::default().with_text("h2.alt-title", "Alt layout job"),
        );

        let registry = ExtractorRegistry::for_profile(profile.clone(), test_browser_config())
            .register("alt", "h2.alt-title", Arc::new(TitleOnly));

        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();
        let record = registry
            .extract(&Link::new("/alt-layout-7-jd"), page.as_ref())
            .await
            .unwrap();

        assert_eq!(
            record.get("title"),
            &FieldValue::Text("Alt layout job".into())
        );
    }

    #[tokio::test]
    async fn test_unrecognized_shape_is_an_error() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        engine.script_page(
            profile.detail_url(&Link::new("/broken-1-jd")),
            PageScript::default().with_text("div.captcha", "verify you are human"),
        );

        let registry = ExtractorRegistry::for_profile(profile, test_browser_config());
        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();

        let err = registry
            .extract(&Link::new("/broken-1-jd"), page.as_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnrecognizedShape { .. }));
    }

    #[tokio::test]
    async fn test_navigation_failure_propagates() {
        let profile = profile_for("vietnamworks").unwrap();
        let engine = FixtureEngine::new();
        let url = profile.detail_url(&Link::new("/flaky-2-jd"));
        engine.fail_navigation(url, 1);

        let registry = ExtractorRegistry::for_profile(profile, test_browser_config());
        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();

        let err = registry
            .extract(&Link::new("/flaky-2-jd"), page.as_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Browser(_)));
    }
}
