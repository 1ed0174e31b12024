//! Client configuration
//!
//! Region, endpoint, credentials and transport settings for every call.
//! Loaded from YAML or JSON, or built in code, and passed explicitly to the
//! components that need it.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variables consulted by `ClientConfig::with_env_overrides`
pub const ENV_REGION: &str = "AWS_REGION";
/// Fallback region variable
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
/// Endpoint override variable
pub const ENV_ENDPOINT_URL: &str = "PAGED_QUERY_ENDPOINT_URL";

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// AWS region (e.g., "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint override (local mocks, VPC endpoints)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            auth: AuthConfig::None,
            http: HttpConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config for a region
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint override
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the auth configuration
    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the HTTP configuration
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Load configuration from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        Ok(config)
    }

    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(region) = non_empty(ENV_REGION).or_else(|| non_empty(ENV_DEFAULT_REGION)) {
            self.region = region;
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT_URL) {
            self.endpoint_url = Some(endpoint);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::missing_field("region"));
        }
        if let Some(endpoint) = &self.endpoint_url {
            Url::parse(endpoint)
                .map_err(|e| Error::invalid_value("endpoint_url", e.to_string()))?;
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be > 0"));
        }
        Ok(())
    }

    /// Resolve the endpoint for a service prefix
    ///
    /// The override wins; otherwise `https://{prefix}.{region}.amazonaws.com`.
    pub fn endpoint_for(&self, endpoint_prefix: &str) -> Result<Url> {
        let raw = match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{endpoint_prefix}.{}.amazonaws.com", self.region),
        };
        Ok(Url::parse(&raw)?)
    }

    /// Build the transport configuration
    pub fn http_client_config(&self) -> HttpClientConfig {
        let http = &self.http;
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .max_retries(http.max_retries)
            .backoff(
                http.backoff,
                Duration::from_millis(http.initial_backoff_ms),
                Duration::from_millis(http.max_backoff_ms),
            )
            .header("x-amz-region", self.region.clone());

        builder = match &http.rate_limit {
            Some(limit) => builder.rate_limit(RateLimiterConfig::new(
                limit.requests_per_second,
                limit.burst_size,
            )),
            None => builder.no_rate_limit(),
        };

        if let Some(agent) = &http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &http.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Max retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Rate limiting
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    20_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            rate_limit: None,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    pub requests_per_second: u32,
    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint_url.is_none());
        assert!(config.auth.is_none());
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r"
region: eu-west-1
endpoint_url: http://localhost:4566
auth:
  type: bearer
  token: secret
http:
  timeout_secs: 10
  max_retries: 5
  backoff: linear
  rate_limit:
    requests_per_second: 20
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.auth, AuthConfig::bearer("secret"));
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.backoff, BackoffType::Linear);
        assert_eq!(
            config.http.rate_limit,
            Some(RateLimitConfig {
                requests_per_second: 20,
                burst_size: 1
            })
        );
    }

    #[test]
    fn test_parse_json() {
        let config = ClientConfig::from_json_str(r#"{"region": "ap-south-1"}"#).unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_validate_rejects_empty_region() {
        let err = ClientConfig::from_yaml_str("region: ''").unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let err = ClientConfig::from_yaml_str("endpoint_url: 'not a url'").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "region: us-west-2").unwrap();
        assert_eq!(ClientConfig::load(yaml.path()).unwrap().region, "us-west-2");

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"region": "sa-east-1"}}"#).unwrap();
        assert_eq!(ClientConfig::load(json.path()).unwrap().region, "sa-east-1");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/paged-query.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DEFAULT_REGION, "eu-central-1"),
            (ENV_ENDPOINT_URL, "http://127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::default().with_overrides_from(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.region, "eu-central-1");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn test_env_region_precedence() {
        let config = ClientConfig::new("us-east-1").with_overrides_from(|key| match key {
            ENV_REGION => Some("us-west-1".to_string()),
            ENV_DEFAULT_REGION => Some("eu-west-3".to_string()),
            _ => None,
        });
        assert_eq!(config.region, "us-west-1");
    }

    #[test]
    fn test_endpoint_for() {
        let config = ClientConfig::new("eu-west-1");
        assert_eq!(
            config.endpoint_for("ivsrealtime").unwrap().as_str(),
            "https://ivsrealtime.eu-west-1.amazonaws.com/"
        );

        let config = config.with_endpoint_url("http://localhost:8080");
        assert_eq!(
            config.endpoint_for("rds").unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_http_client_config() {
        let mut http = HttpConfig {
            timeout_secs: 5,
            max_retries: 1,
            ..Default::default()
        };
        http.headers.insert("X-Test".to_string(), "1".to_string());

        let client_config = ClientConfig::new("us-east-2").with_http(http).http_client_config();
        assert_eq!(client_config.timeout, Duration::from_secs(5));
        assert_eq!(client_config.max_retries, 1);
        assert!(client_config.rate_limit.is_none());
        assert_eq!(
            client_config.default_headers.get("x-amz-region"),
            Some(&"us-east-2".to_string())
        );
        assert_eq!(client_config.default_headers.get("X-Test"), Some(&"1".to_string()));
    }
}
