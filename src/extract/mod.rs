//! Detail extraction capability
//!
//! All site-specific DOM knowledge lives behind two seams:
//!
//! - [`DetailExtractor`] - the contract the worker pool calls: given one link
//!   and a fresh page handle, produce a [`Record`] or fail. Implementations
//!   own navigation to the detail URL.
//! - [`PageExtractor`] - the inner contract used by the shape registry: the
//!   page is already loaded, read fields off it.
//!
//! The crate ships a declarative implementation ([`SelectorMapExtractor`])
//! driven by the field table on a [`crate::site::SiteProfile`], dispatched
//! through [`ExtractorRegistry`]. Sites with bespoke needs register their own
//! [`PageExtractor`] under a shape probe instead.

pub mod currency;
mod registry;
mod selector_map;

pub use currency::CurrencyChain;
pub use registry::{ExtractorRegistry, ShapeEntry};
pub use selector_map::SelectorMapExtractor;

use crate::browser::{BrowserError, PageHandle};
use crate::record::{Link, Record};
use async_trait::async_trait;
use thiserror::Error;

/// Extraction errors. Every variant marks the whole link as failed for the
/// round; per-field misses never reach this type (they become absent fields).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("No registered extractor matched the page shape for {link}")]
    UnrecognizedShape { link: String },

    #[error("Extraction deadline of {timeout_ms}ms exceeded")]
    DeadlineExceeded { timeout_ms: u64 },
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// The capability the worker pool consumes: one link, one fresh page handle,
/// one record or one failure.
#[async_trait]
pub trait DetailExtractor: Send + Sync {
    async fn extract(&self, link: &Link, page: &dyn PageHandle) -> ExtractResult<Record>;
}

/// Extraction against an already-loaded detail page; selected per page by
/// [`ExtractorRegistry`] via a structural probe.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract_loaded(&self, link: &Link, page: &dyn PageHandle) -> ExtractResult<Record>;
}
