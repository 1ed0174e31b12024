//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Service
// ============================================================================

/// One scripted response of the mock service
#[derive(Debug, Clone)]
enum Script {
    Items(Vec<u32>),
    Fail(u16),
}

/// Deterministic paginated service
///
/// Page `n` is addressed by token `T{n}` (page 0 by no token) and hands out
/// `T{n+1}` unless it is the last page. Requests are recorded.
#[derive(Debug)]
struct MockService {
    pages: Vec<Script>,
    max_page_size: usize,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockService {
    fn new(pages: Vec<Script>) -> Self {
        Self {
            pages,
            max_page_size: DESCRIBE_MAX_RECORDS,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `count` pages of `size` sequential items each
    fn uniform(count: usize, size: u32) -> Self {
        let pages = (0..count as u32)
            .map(|p| Script::Items((p * size..(p + 1) * size).collect()))
            .collect();
        Self::new(pages)
    }

    fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = max;
        self
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requested_sizes(&self) -> Vec<usize> {
        self.requests()
            .iter()
            .map(|r| r.page_size.unwrap())
            .collect()
    }

    fn requested_tokens(&self) -> Vec<Option<String>> {
        self.requests().into_iter().map(|r| r.token).collect()
    }
}

#[async_trait]
impl PageFetcher for MockService {
    type Item = u32;

    fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<u32>> {
        self.requests.lock().unwrap().push(request.clone());

        let index = match request.token.as_deref() {
            None => 0,
            Some(token) => token
                .strip_prefix('T')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::service(400, "InvalidToken", token.to_string()))?,
        };

        let script = self
            .pages
            .get(index)
            .ok_or_else(|| Error::service(400, "InvalidToken", format!("T{index}")))?;

        match script {
            Script::Items(items) => {
                let next = (index + 1 < self.pages.len()).then(|| format!("T{}", index + 1));
                Ok(Page::new(items.clone(), next))
            }
            Script::Fail(status) => Err(Error::http_status(*status, "mock failure")),
        }
    }
}

fn t(token: &str) -> Option<String> {
    Some(token.to_string())
}

// ============================================================================
// Type Tests
// ============================================================================

#[test]
fn test_page_empty_token_is_last() {
    let page = Page::new(vec![1, 2], Some(String::new()));
    assert!(page.is_last());
    assert_eq!(page.next_token, None);

    let page = Page::new(vec![1], t("abc"));
    assert!(!page.is_last());
}

#[test]
fn test_paging_options_default_is_auto() {
    let options = PagingOptions::new();
    assert!(options.is_auto());
    assert!(options.max_items.is_none());
    assert!(options.starting_token.is_none());
}

#[test]
fn test_paging_options_starting_token_disables_auto() {
    let options = PagingOptions::new().with_starting_token("T1");
    assert!(options.auto_iterate);
    assert!(!options.is_auto());

    // An empty token is no token at all
    let options = PagingOptions::new().with_starting_token("");
    assert!(options.starting_token.is_none());
    assert!(options.is_auto());

    assert!(!PagingOptions::new().manual().is_auto());
}

#[test]
fn test_token_cursor_families() {
    let marker = TokenCursor::marker("Events");
    assert_eq!(marker.token_field, "Marker");
    assert_eq!(marker.page_size_field, "MaxRecords");
    assert_eq!(marker.max_page_size, 100);
    assert_eq!(marker.response_token_field(), "Marker");

    let next = TokenCursor::next_token("participants");
    assert_eq!(next.token_field, "nextToken");
    assert_eq!(next.page_size_field, "maxResults");
    assert_eq!(next.max_page_size, 50);

    let custom = TokenCursor::new("StartingToken", "PageSize", "Items", 25)
        .with_response_token_field("NextToken");
    assert_eq!(custom.response_token_field(), "NextToken");
}

#[test]
fn test_pagination_state_record_page() {
    let mut state = PaginationState::new();
    state.record_page(3, t("T1"));
    state.record_page(0, t("T2"));
    assert_eq!(state.pages, 2);
    assert_eq!(state.total_fetched, 3);
    assert_eq!(state.token, t("T2"));
    assert!(!state.is_done());

    state.stop(StopReason::Exhausted);
    assert!(state.is_done());
}

#[test_case(None, None, 100, 100 ; "no cap uses service maximum")]
#[test_case(Some(5), None, 100, 5 ; "cap below maximum")]
#[test_case(Some(500), None, 100, 100 ; "cap above maximum")]
#[test_case(None, Some(20), 100, 20 ; "caller page size")]
#[test_case(None, Some(80), 50, 50 ; "caller page size clamped")]
#[test_case(Some(7), Some(20), 100, 7 ; "cap below caller page size")]
#[test_case(None, Some(0), 50, 1 ; "zero page size floors at one")]
fn test_first_page_size(
    cap: Option<usize>,
    page_size: Option<usize>,
    service_max: usize,
    expected: usize,
) {
    let service = MockService::uniform(1, 1).with_max_page_size(service_max);
    let options = PagingOptions {
        max_items: cap,
        page_size,
        ..PagingOptions::default()
    };
    let query = PagedQuery::new(&service, options);
    assert_eq!(query.next_page_size(), expected);
}

// ============================================================================
// Iteration Tests
// ============================================================================

#[tokio::test]
async fn test_follows_tokens_until_exhausted() {
    let service = MockService::uniform(3, 2);
    let output = PagedQuery::new(&service, PagingOptions::new())
        .collect_all()
        .await;

    assert!(output.is_complete());
    assert_eq!(output.items, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(output.pages, 3);
    assert_eq!(output.next_token, None);
    assert_eq!(output.stop_reason, Some(StopReason::Exhausted));
    assert_eq!(
        service.requested_tokens(),
        vec![None, t("T1"), t("T2")]
    );
    assert_eq!(service.requested_sizes(), vec![100, 100, 100]);
}

#[tokio::test]
async fn test_single_page_without_token() {
    let service = MockService::uniform(1, 4);
    let output = PagedQuery::new(&service, PagingOptions::new())
        .collect_all()
        .await;

    assert_eq!(output.items, vec![0, 1, 2, 3]);
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_cap_shrinks_requests_without_truncating() {
    // Service ignores the requested size and always returns two items
    let service = MockService::uniform(4, 2);
    let output = PagedQuery::new(&service, PagingOptions::new().with_max_items(5))
        .collect_all()
        .await;

    assert_eq!(service.requested_sizes(), vec![5, 3, 1]);
    assert_eq!(service.call_count(), 3);
    assert_eq!(output.items.len(), 6);
    assert_eq!(output.stop_reason, Some(StopReason::CapReached));
    // The token after the last page is kept so the caller could resume
    assert_eq!(output.next_token, t("T3"));
}

#[tokio::test]
async fn test_cap_met_exactly_stops() {
    let service = MockService::uniform(4, 2);
    let output = PagedQuery::new(&service, PagingOptions::new().with_max_items(4))
        .collect_all()
        .await;

    assert_eq!(output.items, vec![0, 1, 2, 3]);
    assert_eq!(service.call_count(), 2);
    assert_eq!(service.requested_sizes(), vec![4, 2]);
}

#[tokio::test]
async fn test_cap_smaller_than_page() {
    let service = MockService::uniform(3, 2);
    let output = PagedQuery::new(&service, PagingOptions::new().with_max_items(1))
        .collect_all()
        .await;

    assert_eq!(service.requested_sizes(), vec![1]);
    assert_eq!(output.items, vec![0, 1]);
}

#[tokio::test]
async fn test_zero_cap_makes_no_calls() {
    let service = MockService::uniform(3, 2);
    let output = PagedQuery::new(&service, PagingOptions::new().with_max_items(0))
        .collect_all()
        .await;

    assert!(output.items.is_empty());
    assert!(output.is_complete());
    assert_eq!(output.pages, 0);
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_empty_page_with_token_continues() {
    let service = MockService::new(vec![
        Script::Items(vec![1]),
        Script::Items(vec![]),
        Script::Items(vec![2, 3]),
    ]);
    let output = PagedQuery::new(&service, PagingOptions::new())
        .collect_all()
        .await;

    assert_eq!(output.items, vec![1, 2, 3]);
    assert_eq!(service.call_count(), 3);
}

#[tokio::test]
async fn test_starting_token_fetches_one_page() {
    let service = MockService::uniform(4, 2);
    let options = PagingOptions::new().with_starting_token("T1");
    let mut query = PagedQuery::new(&service, options);

    let items = query.next_page().await.unwrap().unwrap();
    assert_eq!(items, vec![2, 3]);
    assert!(query.next_page().await.is_none());

    assert_eq!(service.call_count(), 1);
    assert_eq!(service.requested_tokens(), vec![t("T1")]);
    assert_eq!(query.next_token(), Some("T2"));
    assert_eq!(query.stop_reason(), Some(StopReason::SinglePage));
}

#[tokio::test]
async fn test_empty_starting_token_field_is_ignored() {
    let service = MockService::uniform(2, 2);
    let options = PagingOptions {
        starting_token: Some(String::new()),
        ..PagingOptions::default()
    };
    let query = PagedQuery::new(&service, options);
    assert!(query.options().is_auto());

    let output = query.collect_all().await;

    assert!(output.is_complete());
    assert_eq!(output.items, vec![0, 1, 2, 3]);
    assert_eq!(service.requested_tokens(), vec![None, t("T1")]);
    assert_eq!(output.stop_reason, Some(StopReason::Exhausted));
}

#[tokio::test]
async fn test_manual_mode_fetches_one_page() {
    let service = MockService::uniform(3, 2);
    let output = PagedQuery::new(&service, PagingOptions::new().manual())
        .collect_all()
        .await;

    assert_eq!(output.items, vec![0, 1]);
    assert_eq!(output.next_token, t("T1"));
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_manual_mode_respects_cap_for_page_size() {
    let service = MockService::uniform(3, 2);
    let options = PagingOptions::new()
        .with_starting_token("T1")
        .manual()
        .with_max_items(3);
    let _ = PagedQuery::new(&service, options).collect_all().await;

    assert_eq!(service.requested_sizes(), vec![3]);
}

// ============================================================================
// Error Tests
// ============================================================================

#[tokio::test]
async fn test_first_page_failure_yields_nothing() {
    let service = MockService::new(vec![Script::Fail(500), Script::Items(vec![1])]);
    let output = PagedQuery::new(&service, PagingOptions::new())
        .collect_all()
        .await;

    assert!(output.items.is_empty());
    assert_eq!(output.pages, 0);
    assert_eq!(output.stop_reason, Some(StopReason::Failed));
    let error = output.error.expect("error");
    assert_eq!(error.page(), Some(1));
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_mid_iteration_failure_keeps_prior_items() {
    let service = MockService::new(vec![
        Script::Items(vec![1, 2]),
        Script::Fail(503),
        Script::Items(vec![3, 4]),
    ]);
    let output = PagedQuery::new(&service, PagingOptions::new())
        .collect_all()
        .await;

    assert_eq!(output.items, vec![1, 2]);
    assert_eq!(service.call_count(), 2);
    let error = output.error.as_ref().expect("error");
    assert_eq!(error.page(), Some(2));
    assert!(matches!(
        error,
        Error::Page { source, .. } if matches!(**source, Error::HttpStatus { status: 503, .. })
    ));

    assert!(output.into_result().is_err());
}

#[tokio::test]
async fn test_error_reported_once() {
    let service = MockService::new(vec![Script::Items(vec![1]), Script::Fail(500)]);
    let mut query = PagedQuery::new(&service, PagingOptions::new());

    assert!(query.next_page().await.unwrap().is_ok());
    assert!(query.next_page().await.unwrap().is_err());
    assert!(query.next_page().await.is_none());
    assert!(query.next_page().await.is_none());
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_stream_yields_items_then_error() {
    let service = MockService::new(vec![
        Script::Items(vec![1, 2]),
        Script::Fail(500),
        Script::Items(vec![3]),
    ]);
    let results: Vec<Result<u32>> = PagedQuery::new(&service, PagingOptions::new())
        .into_stream()
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &1);
    assert_eq!(results[1].as_ref().unwrap(), &2);
    assert!(results[2].is_err());
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let service = MockService::uniform(3, 2);
    let mut stream = Box::pin(PagedQuery::new(&service, PagingOptions::new()).into_stream());

    assert_eq!(service.call_count(), 0);
    assert_eq!(stream.next().await.unwrap().unwrap(), 0);
    assert_eq!(service.call_count(), 1);
    assert_eq!(stream.next().await.unwrap().unwrap(), 1);
    assert_eq!(service.call_count(), 1);
    assert_eq!(stream.next().await.unwrap().unwrap(), 2);
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_identical_inputs_identical_output() {
    let service = MockService::uniform(3, 3);
    let options = PagingOptions::new().with_max_items(7);

    let first = PagedQuery::new(&service, options.clone()).collect_all().await;
    let second = PagedQuery::new(&service, options).collect_all().await;

    assert_eq!(first.items, second.items);
    assert_eq!(first.next_token, second.next_token);
    assert_eq!(first.pages, second.pages);
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_first_page() {
    let service = MockService::uniform(3, 2);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let output = PagedQuery::new(&service, PagingOptions::new())
        .with_cancellation(cancel)
        .collect_all()
        .await;

    assert!(output.items.is_empty());
    assert!(output.error.unwrap().is_cancelled());
    assert_eq!(output.stop_reason, Some(StopReason::Cancelled));
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_cancelled_between_pages() {
    let service = MockService::uniform(3, 2);
    let cancel = CancellationToken::new();
    let mut query = PagedQuery::new(&service, PagingOptions::new()).with_cancellation(cancel.clone());

    assert_eq!(query.next_page().await.unwrap().unwrap(), vec![0, 1]);
    cancel.cancel();

    let err = query.next_page().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(query.next_page().await.is_none());
    assert_eq!(service.call_count(), 1);
    assert_eq!(query.state().total_fetched, 2);
}

#[tokio::test]
async fn test_cancelled_while_in_flight() {
    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let fetcher = FnFetcher::new(10, move |request: PageRequest| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            if request.token.is_none() {
                Ok::<_, Error>(Page::new(vec!["a"], Some("next".to_string())))
            } else {
                // Never answers
                futures::future::pending::<()>().await;
                Ok(Page::last(vec![]))
            }
        }
    });

    let cancel = CancellationToken::new();
    let mut query = PagedQuery::new(fetcher, PagingOptions::new()).with_cancellation(cancel.clone());
    assert_eq!(query.next_page().await.unwrap().unwrap(), vec!["a"]);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let err = query.next_page().await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(query.stop_reason(), Some(StopReason::Cancelled));
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_fn_fetcher_through_arc() {
    let fetcher = Arc::new(FnFetcher::new(LIST_MAX_RESULTS, |request: PageRequest| async move {
        Ok::<_, Error>(Page::last(vec![request.page_size.unwrap_or_default()]))
    }));

    let output = PagedQuery::new(fetcher, PagingOptions::new()).collect_all().await;
    assert_eq!(output.items, vec![50]);
}
