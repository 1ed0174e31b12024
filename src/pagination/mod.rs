//! Pagination module
//!
//! Supports continuation-token pagination (`Marker`, `NextToken`, ...) with an
//! optional cap on the total number of items.
//!
//! # Overview
//!
//! A `PageFetcher` performs one remote call per page. `PagedQuery` drives it:
//! it carries the token forward, sizes each request against the remaining
//! cap, and stops on an empty token, a satisfied cap, the first error or a
//! cancellation. Service-specific field names live in `TokenCursor`, not in
//! the iterator.

mod iterator;
mod types;

pub use iterator::{PagedOutput, PagedQuery};
pub use types::{
    FnFetcher, Page, PageFetcher, PageRequest, PaginationState, PagingOptions, StopReason,
    TokenCursor, DESCRIBE_MAX_RECORDS, LIST_MAX_RESULTS,
};

#[cfg(test)]
mod tests;
