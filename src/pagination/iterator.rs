//! Token-driven page iterator
//!
//! `PagedQuery` drives a `PageFetcher` one page at a time, carrying the
//! continuation token forward and sizing each request against the caller's
//! item cap.

use super::types::{PageFetcher, PageRequest, PaginationState, PagingOptions, StopReason};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Auto-paginating query over a `PageFetcher`
///
/// Pages are fetched strictly in order. The first failure (or cancellation)
/// ends the iteration; items from earlier pages have already been handed out
/// and stay with the caller. A query cannot be restarted.
pub struct PagedQuery<F: PageFetcher> {
    fetcher: F,
    options: PagingOptions,
    state: PaginationState,
    cancel: Option<CancellationToken>,
}

impl<F: PageFetcher> PagedQuery<F> {
    /// Create a new query
    ///
    /// An empty starting token counts as none.
    pub fn new(fetcher: F, mut options: PagingOptions) -> Self {
        options.starting_token = options.starting_token.take().none_if_empty();
        let state = PaginationState::with_token(options.starting_token.clone());
        Self {
            fetcher,
            options,
            state,
            cancel: None,
        }
    }

    /// Stop cooperatively when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Current pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Options the query was created with
    pub fn options(&self) -> &PagingOptions {
        &self.options
    }

    /// Raw continuation token after the last fetched page
    ///
    /// In manual mode this is what the caller passes back as the next
    /// starting token.
    pub fn next_token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    /// Whether the iteration has stopped
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Why the iteration stopped, once it has
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.state.stopped
    }

    /// Page size the next request would carry
    pub fn next_page_size(&self) -> usize {
        let ceiling = self
            .options
            .page_size
            .map_or(self.fetcher.max_page_size(), |size| {
                size.min(self.fetcher.max_page_size())
            })
            .max(1);

        match self.options.max_items {
            Some(cap) => ceiling.min(cap.saturating_sub(self.state.total_fetched)),
            None => ceiling,
        }
    }

    fn cap_reached(&self) -> bool {
        self.options
            .max_items
            .is_some_and(|cap| self.state.total_fetched >= cap)
    }

    /// Fetch the next page
    ///
    /// Returns `None` once the iteration has stopped. An error is returned at
    /// most once, after which the query is done.
    pub async fn next_page(&mut self) -> Option<Result<Vec<F::Item>>> {
        if self.is_done() {
            return None;
        }
        if self.cap_reached() {
            self.state.stop(StopReason::CapReached);
            return None;
        }
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            self.state.stop(StopReason::Cancelled);
            return Some(Err(Error::Cancelled));
        }

        let page_number = self.state.pages + 1;
        let page_size = self.next_page_size();
        let request = PageRequest::new(self.state.token.clone(), Some(page_size));

        debug!(
            page = page_number,
            page_size,
            has_token = request.token.is_some(),
            "Requesting page"
        );

        let fetch = self.fetcher.fetch_page(request);
        let result = match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(Error::Cancelled),
                    page = fetch => page,
                }
            }
            None => fetch.await,
        };

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                let reason = if e.is_cancelled() {
                    StopReason::Cancelled
                } else {
                    StopReason::Failed
                };
                if self.state.pages > 0 {
                    warn!(
                        page = page_number,
                        items_so_far = self.state.total_fetched,
                        error = %e,
                        "Pagination stopped after partial results"
                    );
                }
                self.state.stop(reason);
                return Some(Err(e.at_page(page_number)));
            }
        };

        let count = page.items.len();
        self.state.record_page(count, page.next_token);

        debug!(
            page = page_number,
            count,
            total = self.state.total_fetched,
            "Fetched page"
        );

        if !self.options.is_auto() {
            self.state.stop(StopReason::SinglePage);
        } else if self.state.token.is_none() {
            self.state.stop(StopReason::Exhausted);
        } else if self.cap_reached() {
            self.state.stop(StopReason::CapReached);
        }

        if let Some(reason) = self.state.stopped {
            info!(
                pages = self.state.pages,
                items = self.state.total_fetched,
                reason = ?reason,
                "Pagination complete"
            );
        }

        Some(Ok(page.items))
    }

    /// Convert into a lazy stream of items
    ///
    /// A failure appears as a single `Err` after the items of every earlier
    /// page, and ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<F::Item>> {
        stream::unfold(self, |mut query| async move {
            query.next_page().await.map(|page| (page, query))
        })
        .flat_map(|page| match page {
            Ok(items) => stream::iter(items.into_iter().map(Ok)).left_stream(),
            Err(e) => stream::once(async move { Err(e) }).right_stream(),
        })
    }

    /// Drive the query to completion, keeping partial results on failure
    pub async fn collect_all(mut self) -> PagedOutput<F::Item> {
        let mut items = Vec::new();
        let mut error = None;

        while let Some(page) = self.next_page().await {
            match page {
                Ok(page_items) => items.extend(page_items),
                Err(e) => error = Some(e),
            }
        }

        PagedOutput {
            items,
            next_token: self.state.token.clone(),
            pages: self.state.pages,
            stop_reason: self.state.stopped,
            error,
        }
    }
}

impl<F: PageFetcher> std::fmt::Debug for PagedQuery<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedQuery")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything a finished query produced
#[derive(Debug)]
pub struct PagedOutput<T> {
    /// Items from every successful page, in service order
    pub items: Vec<T>,
    /// Token after the last successful page
    pub next_token: Option<String>,
    /// Pages fetched successfully
    pub pages: usize,
    /// Why the query stopped
    pub stop_reason: Option<StopReason>,
    /// Terminal error, if any
    pub error: Option<Error>,
}

impl<T> PagedOutput<T> {
    /// Whether the query ended without error
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial results if the query failed
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}
