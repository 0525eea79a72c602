//! Scripted in-memory browser engine
//!
//! A deterministic [`BrowserEngine`] backed by per-URL page scripts instead
//! of a real browser. The pipeline test suite drives every component through
//! this engine: scripts declare which selectors match which elements, how
//! many clicks an expander needs before it hides, and how many times a URL
//! should fail to navigate before it starts succeeding (which is how the
//! retry-round tests simulate flaky detail pages).

use crate::browser::{
    BrowserEngine, BrowserError, BrowserResult, BrowserSession, ElementHandle, PageHandle,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted DOM element
#[derive(Debug, Clone, Default)]
pub struct FixtureElement {
    pub text: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl FixtureElement {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// The scripted contents of one page
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    elements: HashMap<String, Vec<FixtureElement>>,
    expanders: HashMap<String, u32>,
}

impl PageScript {
    /// Adds an element matching `selector`
    pub fn with_element(mut self, selector: impl Into<String>, element: FixtureElement) -> Self {
        self.elements.entry(selector.into()).or_default().push(element);
        self
    }

    /// Adds a text-only element matching `selector`
    pub fn with_text(self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_element(selector, FixtureElement::with_text(text))
    }

    /// Adds an anchor element carrying an `href` attribute
    pub fn with_link(self, selector: impl Into<String>, href: impl Into<String>) -> Self {
        self.with_element(
            selector,
            FixtureElement::default().with_attribute("href", href),
        )
    }

    /// Adds an expander that stays visible for `clicks_to_hide` clicks.
    /// `u32::MAX` makes it permanently stuck.
    pub fn with_expander(mut self, selector: impl Into<String>, clicks_to_hide: u32) -> Self {
        self.expanders.insert(selector.into(), clicks_to_hide);
        self
    }
}

#[derive(Default)]
struct FixtureState {
    scripts: Mutex<HashMap<String, PageScript>>,
    nav_failures: Mutex<HashMap<String, u32>>,
    launch_failures: AtomicU32,
    sessions_launched: AtomicUsize,
    pages_opened: AtomicUsize,
    visits: Mutex<Vec<String>>,
}

/// Scripted browser engine; cheap to clone, all clones share state
#[derive(Clone, Default)]
pub struct FixtureEngine {
    state: Arc<FixtureState>,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the script served for `url`
    pub fn script_page(&self, url: impl Into<String>, script: PageScript) {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert(url.into(), script);
    }

    /// Makes the next `times` navigations to `url` fail, after which the
    /// scripted page (if any) is served normally
    pub fn fail_navigation(&self, url: impl Into<String>, times: u32) {
        self.state
            .nav_failures
            .lock()
            .unwrap()
            .insert(url.into(), times);
    }

    /// Makes the next `times` session launches fail
    pub fn fail_next_launches(&self, times: u32) {
        self.state.launch_failures.store(times, Ordering::SeqCst);
    }

    /// Number of sessions launched so far
    pub fn sessions_launched(&self) -> usize {
        self.state.sessions_launched.load(Ordering::SeqCst)
    }

    /// Number of pages opened so far
    pub fn pages_opened(&self) -> usize {
        self.state.pages_opened.load(Ordering::SeqCst)
    }

    /// Every URL navigated to, in navigation order
    pub fn visits(&self) -> Vec<String> {
        self.state.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserEngine for FixtureEngine {
    async fn new_session(&self) -> BrowserResult<Arc<dyn BrowserSession>> {
        let remaining = self.state.launch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.state
                .launch_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(BrowserError::SessionLaunch(
                "scripted launch failure".to_string(),
            ));
        }

        self.state.sessions_launched.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FixtureSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FixtureSession {
    state: Arc<FixtureState>,
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn new_page(&self) -> BrowserResult<Box<dyn PageHandle>> {
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixturePage {
            state: Some(Arc::clone(&self.state)),
            current: Mutex::new(PageContents::default()),
        }))
    }

    async fn close(&self) {}
}

#[derive(Default)]
struct PageContents {
    script: PageScript,
    expander_clicks_left: HashMap<String, u32>,
}

impl PageContents {
    fn load(script: PageScript) -> Self {
        let expander_clicks_left = script.expanders.clone();
        Self {
            script,
            expander_clicks_left,
        }
    }
}

/// A scripted page handle.
///
/// Unit tests can construct one directly from a [`PageScript`] without going
/// through an engine; navigation then serves empty pages.
pub struct FixturePage {
    state: Option<Arc<FixtureState>>,
    current: Mutex<PageContents>,
}

impl FixturePage {
    pub fn new(script: PageScript) -> Self {
        Self {
            state: None,
            current: Mutex::new(PageContents::load(script)),
        }
    }
}

#[async_trait]
impl PageHandle for FixturePage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> BrowserResult<()> {
        let Some(state) = &self.state else {
            return Ok(());
        };

        state.visits.lock().unwrap().push(url.to_string());

        {
            let mut failures = state.nav_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(BrowserError::Navigation {
                        url: url.to_string(),
                        message: "scripted navigation failure".to_string(),
                    });
                }
            }
        }

        let script = state
            .scripts
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default();
        *self.current.lock().unwrap() = PageContents::load(script);
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let present = !self
            .current
            .lock()
            .unwrap()
            .script
            .elements
            .get(selector)
            .map(|e| e.is_empty())
            .unwrap_or(true);

        if present {
            Ok(())
        } else {
            Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn locate(&self, selector: &str) -> BrowserResult<Option<Box<dyn ElementHandle>>> {
        let element = self
            .current
            .lock()
            .unwrap()
            .script
            .elements
            .get(selector)
            .and_then(|e| e.first())
            .cloned();
        Ok(element.map(|e| Box::new(FixtureElementHandle(e)) as Box<dyn ElementHandle>))
    }

    async fn locate_all(&self, selector: &str) -> BrowserResult<Vec<Box<dyn ElementHandle>>> {
        let elements = self
            .current
            .lock()
            .unwrap()
            .script
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default();
        Ok(elements
            .into_iter()
            .map(|e| Box::new(FixtureElementHandle(e)) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn is_visible(&self, selector: &str) -> BrowserResult<bool> {
        let contents = self.current.lock().unwrap();
        if let Some(clicks_left) = contents.expander_clicks_left.get(selector) {
            return Ok(*clicks_left > 0);
        }
        Ok(contents
            .script
            .elements
            .get(selector)
            .map(|e| !e.is_empty())
            .unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let mut contents = self.current.lock().unwrap();
        if let Some(clicks_left) = contents.expander_clicks_left.get_mut(selector) {
            *clicks_left = clicks_left.saturating_sub(1);
        }
        Ok(())
    }

    async fn close(&self) {}
}

struct FixtureElementHandle(FixtureElement);

#[async_trait]
impl ElementHandle for FixtureElementHandle {
    async fn read_text(&self) -> BrowserResult<Option<String>> {
        Ok(self.0.text.clone())
    }

    async fn read_attribute(&self, name: &str) -> BrowserResult<Option<String>> {
        Ok(self.0.attributes.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_navigation_and_lookup() {
        let engine = FixtureEngine::new();
        engine.script_page(
            "https://example.com/listing?page=1",
            PageScript::default()
                .with_link("a.card", "/job-1-jd")
                .with_link("a.card", "/job-2-jd")
                .with_text("h1", "Listing"),
        );

        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();
        page.navigate("https://example.com/listing?page=1", Duration::from_secs(1))
            .await
            .unwrap();

        let cards = page.locate_all("a.card").await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(
            cards[0].read_attribute("href").await.unwrap().as_deref(),
            Some("/job-1-jd")
        );

        let title = page.locate("h1").await.unwrap().unwrap();
        assert_eq!(title.read_text().await.unwrap().as_deref(), Some("Listing"));
        assert!(page.locate("div.missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_navigation_failures_are_consumed() {
        let engine = FixtureEngine::new();
        engine.script_page("https://example.com/j", PageScript::default().with_text("h1", "ok"));
        engine.fail_navigation("https://example.com/j", 2);

        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();
        let timeout = Duration::from_secs(1);

        assert!(page.navigate("https://example.com/j", timeout).await.is_err());
        assert!(page.navigate("https://example.com/j", timeout).await.is_err());
        assert!(page.navigate("https://example.com/j", timeout).await.is_ok());
        assert_eq!(engine.visits().len(), 3);
    }

    #[tokio::test]
    async fn test_launch_failures() {
        let engine = FixtureEngine::new();
        engine.fail_next_launches(1);

        assert!(engine.new_session().await.is_err());
        assert!(engine.new_session().await.is_ok());
        assert_eq!(engine.sessions_launched(), 1);
    }

    #[tokio::test]
    async fn test_unscripted_url_serves_empty_page() {
        let engine = FixtureEngine::new();
        let session = engine.new_session().await.unwrap();
        let page = session.new_page().await.unwrap();
        page.navigate("https://example.com/nowhere", Duration::from_secs(1))
            .await
            .unwrap();

        assert!(page.locate_all("a.card").await.unwrap().is_empty());
        assert!(page
            .wait_for("a.card", Duration::from_millis(10))
            .await
            .is_err());
    }
}
