//! Operation definition types
//!
//! An `OperationDef` is everything needed to drive one paginated API call:
//! where to send it, which fixed parameters it always carries, and the
//! token-cursor field names.

use crate::error::{Error, Result};
use crate::pagination::TokenCursor;
use crate::types::{JsonObject, Service};
use serde::{Deserialize, Serialize};

/// A paginated list/describe operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDef {
    /// Unique operation name (e.g., "neptune-describe-events")
    pub name: String,

    /// Service family
    pub service: Service,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Endpoint prefix override (defaults to the service's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_prefix: Option<String>,

    /// Request path relative to the endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// `X-Amz-Target` header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Parameters sent with every request (e.g., Action, Version)
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub static_params: JsonObject,

    /// Token/page-size/items field names and service maximum
    pub cursor: TokenCursor,

    /// Filters the caller must supply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_filters: Vec<String>,
}

fn default_path() -> String {
    "/".to_string()
}

impl OperationDef {
    /// Endpoint prefix to resolve against the region
    pub fn endpoint_prefix(&self) -> &str {
        self.endpoint_prefix
            .as_deref()
            .unwrap_or_else(|| self.service.endpoint_prefix())
    }

    /// Names reserved for the paginator
    pub fn reserved_fields(&self) -> [&str; 2] {
        [
            self.cursor.token_field.as_str(),
            self.cursor.page_size_field.as_str(),
        ]
    }

    /// Check caller filters against this operation
    ///
    /// Filters may not set the token or page-size fields; those belong to
    /// the paginator.
    pub fn check_filters(&self, filters: &JsonObject) -> Result<()> {
        for reserved in self.reserved_fields() {
            if filters.contains_key(reserved) {
                return Err(Error::invalid_value(
                    reserved,
                    format!(
                        "'{reserved}' is managed by the paginator; use the starting token or page size options"
                    ),
                ));
            }
        }

        let missing: Vec<&str> = self
            .required_filters
            .iter()
            .filter(|name| !filters.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Operation '{}' requires filters: {}",
                self.name,
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Validate the definition itself
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Operation name cannot be empty"));
        }

        let cursor = &self.cursor;
        let required = [
            ("cursor.token_field", cursor.token_field.as_str()),
            ("cursor.page_size_field", cursor.page_size_field.as_str()),
            ("cursor.items_field", cursor.items_field.as_str()),
            ("cursor.response_token_field", cursor.response_token_field()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("{}.{field}", self.name),
                    "cannot be empty",
                ));
            }
        }

        if cursor.max_page_size == 0 {
            return Err(Error::invalid_value(
                format!("{}.cursor.max_page_size", self.name),
                "must be > 0",
            ));
        }

        for reserved in self.reserved_fields() {
            if self.static_params.contains_key(reserved) {
                return Err(Error::invalid_value(
                    format!("{}.static_params", self.name),
                    format!("cannot set paginator field '{reserved}'"),
                ));
            }
        }

        Ok(())
    }
}

/// A YAML document holding operation definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationFile {
    /// Definitions in the file
    #[serde(default)]
    pub operations: Vec<OperationDef>,
}
