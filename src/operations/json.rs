//! JSON-over-HTTP page fetcher
//!
//! Binds an `OperationDef` to the transport: every page is one POST whose
//! body merges the static parameters, the caller's filters and the cursor
//! fields. Items and the next token are read back by field name.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::operations::types::OperationDef;
use crate::pagination::{Page, PageFetcher, PageRequest};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// A paginated operation executed against a live endpoint
pub struct JsonOperation {
    def: OperationDef,
    client: Arc<HttpClient>,
    url: String,
    filters: JsonObject,
}

impl JsonOperation {
    /// Create an operation against an explicit endpoint
    pub fn new(def: OperationDef, client: Arc<HttpClient>, endpoint: &Url) -> Self {
        let url = join_path(endpoint, &def.path);
        Self {
            def,
            client,
            url,
            filters: JsonObject::new(),
        }
    }

    /// Create an operation from client configuration
    ///
    /// Resolves the endpoint from the operation's prefix and builds a
    /// transport carrying the configured auth, retries and rate limit.
    pub fn from_config(def: OperationDef, config: &ClientConfig) -> Result<Self> {
        let endpoint = config.endpoint_for(def.endpoint_prefix())?;
        let client = HttpClient::with_auth(config.http_client_config(), config.auth.clone())?;
        Ok(Self::new(def, Arc::new(client), &endpoint))
    }

    /// Set the caller's filters
    ///
    /// Fails if a required filter is missing or a filter names a cursor field.
    pub fn with_filters(mut self, filters: JsonObject) -> Result<Self> {
        self.def.check_filters(&filters)?;
        self.filters = filters;
        Ok(self)
    }

    /// Operation definition
    pub fn definition(&self) -> &OperationDef {
        &self.def
    }

    /// Fully resolved request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the request body for one page
    pub fn request_body(&self, request: &PageRequest) -> JsonValue {
        let cursor = &self.def.cursor;
        let mut body = self.def.static_params.clone();
        body.extend(self.filters.clone());

        if let Some(token) = &request.token {
            body.insert(cursor.token_field.clone(), JsonValue::from(token.as_str()));
        }
        if let Some(size) = request.page_size {
            body.insert(cursor.page_size_field.clone(), JsonValue::from(size));
        }

        JsonValue::Object(body)
    }

    /// Split a response into items and next token
    ///
    /// A missing items field is an empty page. A present but non-array
    /// items field, or a non-string token, is a decode error.
    pub fn parse_response(&self, response: JsonValue) -> Result<Page<JsonValue>> {
        let cursor = &self.def.cursor;

        let items = match lookup(&response, &cursor.items_field) {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items.clone(),
            Some(other) => {
                return Err(Error::decode(format!(
                    "'{}' is not an array (got {})",
                    cursor.items_field,
                    json_kind(other)
                )))
            }
        };

        let token_field = cursor.response_token_field();
        let next_token = match lookup(&response, token_field) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(token)) => Some(token.clone()),
            Some(other) => {
                return Err(Error::decode(format!(
                    "'{token_field}' is not a string (got {})",
                    json_kind(other)
                )))
            }
        };

        Ok(Page::new(items, next_token))
    }
}

#[async_trait]
impl PageFetcher for JsonOperation {
    type Item = JsonValue;

    fn max_page_size(&self) -> usize {
        self.def.cursor.max_page_size
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<JsonValue>> {
        let body = self.request_body(&request);
        debug!(operation = %self.def.name, url = %self.url, "Calling operation");

        let response = self
            .client
            .post_json(&self.url, self.def.target.as_deref(), body)
            .await?;
        self.parse_response(response)
    }
}

impl std::fmt::Debug for JsonOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonOperation")
            .field("name", &self.def.name)
            .field("url", &self.url)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Resolve a dotted field path (`DescribeEventsResult.Events`)
fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn join_path(endpoint: &Url, path: &str) -> String {
    let base = endpoint.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}
