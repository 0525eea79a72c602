//! Capability traits for the external browser automation engine
//!
//! JobHarvest does not reimplement a browser. Navigation, DOM lookup, and
//! text/attribute reads are delegated to an engine supplied by the caller
//! through these traits. The crate ships one implementation, the scripted
//! in-memory engine in [`fixture`], used by the test suite and by `--dry-run`
//! style tooling; production callers bind a real headless browser here.

pub mod fixture;
mod poll;

pub use poll::click_until_hidden;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Browser-engine errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser session: {0}")]
    SessionLaunch(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout:?} waiting for selector '{selector}'")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("Element '{selector}' still visible after {attempts} dismiss attempts")]
    ElementStuckVisible { selector: String, attempts: u32 },

    #[error("Failed to open page: {0}")]
    PageOpen(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// The top-level engine: a factory for browser sessions.
///
/// One session corresponds to one browser process/context; the batch manager
/// creates and destroys sessions to bound memory growth across a run.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launches a fresh session. Failure here is the only fatal condition in
    /// the pipeline: without a session the current round cannot proceed.
    async fn new_session(&self) -> BrowserResult<Arc<dyn BrowserSession>>;
}

/// A live browser session shared by the concurrent tasks of one batch.
///
/// Tasks never mutate the session structurally; each owns its own page
/// handle for isolation.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Opens a new page/tab in this session
    async fn new_page(&self) -> BrowserResult<Box<dyn PageHandle>>;

    /// Tears the whole session down, releasing every resource it holds
    async fn close(&self);
}

/// A single page/tab, owned by exactly one task at a time
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates to `url`, suspending until the document has loaded or the
    /// timeout elapses
    async fn navigate(&self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Suspends until `selector` matches at least one element, or times out
    async fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Returns the first element matching `selector`, if any
    async fn locate(&self, selector: &str) -> BrowserResult<Option<Box<dyn ElementHandle>>>;

    /// Returns every element matching `selector`, in document order
    async fn locate_all(&self, selector: &str) -> BrowserResult<Vec<Box<dyn ElementHandle>>>;

    /// Whether any element matching `selector` is currently visible
    async fn is_visible(&self, selector: &str) -> BrowserResult<bool>;

    /// Clicks the first element matching `selector`
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Closes this page
    async fn close(&self);
}

/// A located DOM element
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Reads the element's text content
    async fn read_text(&self) -> BrowserResult<Option<String>>;

    /// Reads one of the element's attributes
    async fn read_attribute(&self, name: &str) -> BrowserResult<Option<String>>;
}
