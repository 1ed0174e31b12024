//! Authentication module
//!
//! Supports: API Key, Basic, Bearer, Custom Headers
//!
//! Credentials come from `ClientConfig`; nothing is read from ambient
//! process state.

mod types;

pub use types::{AuthConfig, Location};
