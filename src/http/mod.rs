//! HTTP client module
//!
//! Transport for page fetches: retry with backoff, rate limiting, and
//! translation of AWS error bodies into typed errors.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Error Mapping**: `__type`/`message` bodies become `Error::Service`

mod client;
mod rate_limit;

pub use client::{
    classify_error_body, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
    AMZ_JSON_CONTENT_TYPE,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
