//! Operations module
//!
//! Declarative definitions of paginated service calls and the fetcher that
//! executes them.
//!
//! # Overview
//!
//! - `OperationDef` - endpoint, fixed parameters and cursor field names
//! - Built-in catalog of Neptune `describe` and IVS RealTime `list` calls
//! - `JsonOperation` - a `PageFetcher` over the HTTP client

mod catalog;
mod json;
mod parser;
mod types;

pub use catalog::{builtin_operations, get_builtin, is_builtin, list_builtin, BUILTIN_CATALOGS};
pub use json::JsonOperation;
pub use parser::{load_operation, load_operations_from_str};
pub use types::{OperationDef, OperationFile};
