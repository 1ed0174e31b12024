// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # paged-query
//!
//! Continuation-token pagination for AWS-style list and describe APIs.
//!
//! A single iterator drives every paginated operation: it carries the
//! service's token (`Marker`, `nextToken`) from page to page, sizes each
//! request against an optional item cap, and stops at the first error,
//! keeping what was already fetched.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paged_query::{ClientConfig, JsonOperation, PagedQuery, PagingOptions, get_builtin};
//!
//! #[tokio::main]
//! async fn main() -> paged_query::Result<()> {
//!     let config = ClientConfig::new("us-east-1").with_env_overrides();
//!     let def = get_builtin("neptune-describe-events").cloned().unwrap();
//!     let op = JsonOperation::from_config(def, &config)?;
//!
//!     let output = PagedQuery::new(op, PagingOptions::new().with_max_items(250))
//!         .collect_all()
//!         .await;
//!     println!("{} events, resume from {:?}", output.items.len(), output.next_token);
//!     output.into_result().map(|_| ())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 PagedQuery<F: PageFetcher>                 │
//! │  token carry · page sizing · cap · stop rules · cancel     │
//! └────────────────────────────────────────────────────────────┘
//!                               │
//!          ┌────────────────────┴────────────────────┐
//!          │        JsonOperation (OperationDef)     │
//!          │  static params · filters · TokenCursor  │
//!          └────────────────────┬────────────────────┘
//!                               │
//! ┌──────────┬──────────────────┴──────┬─────────────────────┐
//! │   Auth   │          HTTP           │       Config        │
//! ├──────────┼─────────────────────────┼─────────────────────┤
//! │ API Key  │ AWS JSON POST           │ YAML / JSON file    │
//! │ Bearer   │ Retry + Backoff         │ Env overrides       │
//! │ Basic    │ Rate Limit              │ Endpoint resolution │
//! └──────────┴─────────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Continuation-token pagination
pub mod pagination;

/// Client configuration
pub mod config;

/// Operation definitions and the built-in catalog
pub mod operations;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ClientConfig;
pub use operations::{get_builtin, load_operation, JsonOperation, OperationDef};
pub use pagination::{Page, PageFetcher, PagedOutput, PagedQuery, PagingOptions, StopReason};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
