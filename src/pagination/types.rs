//! Pagination types and traits
//!
//! Defines the token-cursor adapter, page request/response shapes and the
//! `PageFetcher` trait every paginated operation implements.

use crate::error::Result;
use crate::types::OptionStringExt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Service maximum for the Neptune "describe" family
pub const DESCRIBE_MAX_RECORDS: usize = 100;

/// Service maximum for the IVS RealTime "list" family
pub const LIST_MAX_RESULTS: usize = 50;

// ============================================================================
// Token Cursor Adapter
// ============================================================================

/// Field names and limits of one paginated operation
///
/// The iterator itself is field-name agnostic; this adapter binds it to the
/// wire names a particular service family uses (`Marker`/`MaxRecords` vs.
/// `nextToken`/`maxResults`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCursor {
    /// Request field carrying the continuation token
    pub token_field: String,
    /// Response field carrying the next token (defaults to `token_field`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_token_field: Option<String>,
    /// Request field carrying the page size
    pub page_size_field: String,
    /// Response field holding the result items
    pub items_field: String,
    /// Service-declared maximum page size
    pub max_page_size: usize,
}

impl TokenCursor {
    /// Create a new cursor adapter
    pub fn new(
        token_field: impl Into<String>,
        page_size_field: impl Into<String>,
        items_field: impl Into<String>,
        max_page_size: usize,
    ) -> Self {
        Self {
            token_field: token_field.into(),
            response_token_field: None,
            page_size_field: page_size_field.into(),
            items_field: items_field.into(),
            max_page_size,
        }
    }

    /// `Marker`/`MaxRecords` pagination (Neptune describe calls)
    pub fn marker(items_field: impl Into<String>) -> Self {
        Self::new("Marker", "MaxRecords", items_field, DESCRIBE_MAX_RECORDS)
    }

    /// `nextToken`/`maxResults` pagination (IVS RealTime list calls)
    pub fn next_token(items_field: impl Into<String>) -> Self {
        Self::new("nextToken", "maxResults", items_field, LIST_MAX_RESULTS)
    }

    /// Use a different field name for the token in responses
    #[must_use]
    pub fn with_response_token_field(mut self, field: impl Into<String>) -> Self {
        self.response_token_field = Some(field.into());
        self
    }

    /// Field name to read the next token from
    pub fn response_token_field(&self) -> &str {
        self.response_token_field
            .as_deref()
            .unwrap_or(&self.token_field)
    }
}

// ============================================================================
// Requests and Pages
// ============================================================================

/// Paging inputs for a single call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation token (None for the first page)
    pub token: Option<String>,
    /// Requested page size
    pub page_size: Option<usize>,
}

impl PageRequest {
    /// Create a request
    pub fn new(token: Option<String>, page_size: Option<usize>) -> Self {
        Self { token, page_size }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in service order
    pub items: Vec<T>,
    /// Token for the next page; never `Some("")`
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Create a page, treating an empty token as absent
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items,
            next_token: next_token.none_if_empty(),
        }
    }

    /// Create a final page
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Whether the service reported no further pages
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

// ============================================================================
// Options
// ============================================================================

/// Caller controls for one iteration
#[derive(Debug, Clone)]
pub struct PagingOptions {
    /// Cap on total items across all pages
    pub max_items: Option<usize>,
    /// Caller page size, clamped to the service maximum
    pub page_size: Option<usize>,
    /// Explicit starting token; implies manual mode
    pub starting_token: Option<String>,
    /// Follow continuation tokens automatically
    pub auto_iterate: bool,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            max_items: None,
            page_size: None,
            starting_token: None,
            auto_iterate: true,
        }
    }
}

impl PagingOptions {
    /// Create default options (auto-iterate, no cap)
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the total number of items
    #[must_use]
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Start from an explicit token
    #[must_use]
    pub fn with_starting_token(mut self, token: impl Into<String>) -> Self {
        self.starting_token = Some(token.into()).none_if_empty();
        self
    }

    /// Disable auto-iteration
    #[must_use]
    pub fn manual(mut self) -> Self {
        self.auto_iterate = false;
        self
    }

    /// Whether more than one page may be fetched
    pub fn is_auto(&self) -> bool {
        self.auto_iterate && self.starting_token.is_none()
    }
}

// ============================================================================
// State
// ============================================================================

/// Why an iteration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The service returned no next token
    Exhausted,
    /// The item cap was met
    CapReached,
    /// Manual mode: one page only
    SinglePage,
    /// A page fetch failed
    Failed,
    /// The cancellation token fired
    Cancelled,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched successfully
    pub pages: usize,
    /// Current continuation token
    pub token: Option<String>,
    /// Total items fetched so far
    pub total_fetched: usize,
    /// Set once the iteration has stopped
    pub stopped: Option<StopReason>,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state resuming from a token
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn stop(&mut self, reason: StopReason) {
        self.stopped = Some(reason);
    }

    /// Is pagination complete?
    pub fn is_done(&self) -> bool {
        self.stopped.is_some()
    }

    /// Record a successful page
    pub fn record_page(&mut self, count: usize, next_token: Option<String>) {
        self.pages += 1;
        self.total_fetched += count;
        self.token = next_token;
    }
}

// ============================================================================
// Fetcher Trait
// ============================================================================

/// A paginated list/describe operation
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Item type produced by the operation
    type Item: Send;

    /// Service-declared maximum page size
    fn max_page_size(&self) -> usize;

    /// Fetch one page
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Item>>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    type Item = F::Item;

    fn max_page_size(&self) -> usize {
        (**self).max_page_size()
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Item>> {
        (**self).fetch_page(request).await
    }
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    type Item = F::Item;

    fn max_page_size(&self) -> usize {
        (**self).max_page_size()
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Item>> {
        (**self).fetch_page(request).await
    }
}

/// Adapts an async closure into a `PageFetcher`
pub struct FnFetcher<F> {
    max_page_size: usize,
    fetch: F,
}

impl<F> FnFetcher<F> {
    /// Wrap a closure with the given service maximum
    pub fn new(max_page_size: usize, fetch: F) -> Self {
        Self {
            max_page_size,
            fetch,
        }
    }
}

#[async_trait]
impl<F, Fut, T> PageFetcher for FnFetcher<F>
where
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>>> + Send,
    T: Send,
{
    type Item = T;

    fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>> {
        (self.fetch)(request).await
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher")
            .field("max_page_size", &self.max_page_size)
            .finish_non_exhaustive()
    }
}
