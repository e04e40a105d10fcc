//! Request shaping: turning collected form values into a workflow request body.
//!
//! Every [`WorkflowKind`] owns one [`RequestShaper`]. The [`ShaperRegistry`]
//! is the lookup table from kind to shaper; adding a workflow kind means
//! registering one more shaper rather than editing a shared conditional.

use std::sync::Arc;

use frontand_types::{FormValues, WorkflowKind};
use frontand_util::config::DEFAULT_BATCH_SIZE;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

mod batch_rows;
mod keyword_kombat;
mod passthrough;
mod site_crawl;

pub use batch_rows::BatchRowsShaper;
pub use keyword_kombat::{KeywordKombatShaper, extract_keywords};
pub use passthrough::PassthroughShaper;
pub use site_crawl::{SiteCrawlShaper, extract_urls};

/// Run-wide switches applied while shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOptions {
    /// Cheap trial execution: input is truncated before sending.
    pub test_mode: bool,
    /// Ask the backend to enrich rows with web search results.
    pub enable_search: bool,
    /// Rows per backend batch for row-processing workflows.
    pub batch_size: usize,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            test_mode: false,
            enable_search: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Input problems detected while building a request body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Invalid CSV: provide a header row and at least one data row")]
    InvalidCsv,
    #[error("No valid URLs found")]
    NoValidUrls,
    #[error("No keywords found")]
    NoKeywords,
    #[error("{field} is required")]
    MissingValue { field: String },
    #[error("'{value}' is not a valid http(s) URL")]
    InvalidUrl { value: String },
    #[error("shaper '{shaper}' cannot handle workflow kind '{kind}'")]
    KindMismatch { shaper: &'static str, kind: &'static str },
}

/// Builds the JSON body for one workflow kind.
pub trait RequestShaper: Send + Sync {
    /// Shape `values` into a request body.
    ///
    /// `kind` carries the field ids to read; a shaper handed a kind it does
    /// not own reports [`ShapeError::KindMismatch`].
    fn shape(&self, kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError>;
}

/// Lookup table from workflow kind name to shaper.
#[derive(Clone)]
pub struct ShaperRegistry {
    shapers: IndexMap<&'static str, Arc<dyn RequestShaper>>,
    fallback: Arc<dyn RequestShaper>,
}

impl ShaperRegistry {
    /// Empty registry; every kind falls back to passthrough.
    pub fn empty() -> Self {
        Self {
            shapers: IndexMap::new(),
            fallback: Arc::new(PassthroughShaper),
        }
    }

    /// Register `shaper` for the kind named `name`, replacing any previous entry.
    pub fn register(&mut self, name: &'static str, shaper: Arc<dyn RequestShaper>) {
        self.shapers.insert(name, shaper);
    }

    pub fn with(mut self, name: &'static str, shaper: Arc<dyn RequestShaper>) -> Self {
        self.register(name, shaper);
        self
    }

    /// Shaper for `kind`, or the passthrough fallback.
    pub fn shaper_for(&self, kind: &WorkflowKind) -> &Arc<dyn RequestShaper> {
        self.shapers.get(kind.name()).unwrap_or(&self.fallback)
    }

    /// Names with a dedicated shaper, in registration order.
    pub fn registered(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.shapers.keys().copied()
    }

    pub fn shape(&self, kind: &WorkflowKind, values: &FormValues, options: &ShapeOptions) -> Result<Value, ShapeError> {
        debug!(kind = kind.name(), test_mode = options.test_mode, "shaping request body");
        self.shaper_for(kind).shape(kind, values, options)
    }
}

impl Default for ShaperRegistry {
    /// Registry with a shaper for every built-in kind.
    fn default() -> Self {
        Self::empty()
            .with("batch_rows", Arc::new(BatchRowsShaper))
            .with("site_crawl", Arc::new(SiteCrawlShaper))
            .with("keyword_kombat", Arc::new(KeywordKombatShaper))
            .with("passthrough", Arc::new(PassthroughShaper))
    }
}

impl std::fmt::Debug for ShaperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaperRegistry")
            .field("shapers", &self.shapers.keys().collect::<Vec<_>>())
            .finish()
    }
}
