//! SDK configuration.

use crate::error::{SdkError, SdkResult};
use std::time::Duration;

/// Configuration for the SDK client.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL for the evaluation backend.
    pub base_url: String,

    /// Authentication method.
    pub auth: AuthConfig,

    /// Request timeout. Evaluation calls can be slow; the default is
    /// generous.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Maximum number of retries for transient failures.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_initial_backoff: Duration,

    /// Maximum backoff duration for retries.
    pub retry_max_backoff: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Enable request/response logging.
    pub enable_logging: bool,

    /// Custom headers added to all requests.
    pub custom_headers: Vec<(String, String)>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            auth: AuthConfig::None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_initial_backoff: Duration::from_millis(100),
            retry_max_backoff: Duration::from_secs(30),
            user_agent: format!("evalbench-sdk/{}", env!("CARGO_PKG_VERSION")),
            enable_logging: false,
            custom_headers: Vec::new(),
        }
    }
}

impl SdkConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a new builder with the given base URL.
    pub fn builder(base_url: impl Into<String>) -> SdkConfigBuilder {
        SdkConfigBuilder {
            config: Self::new(base_url),
        }
    }

    /// Set the authentication method.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the bearer token for authentication.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthConfig::BearerToken(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry backoff configuration.
    pub fn with_retry_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_initial_backoff = initial;
        self.retry_max_backoff = max;
        self
    }

    /// Enable request/response logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Add a custom header to all requests.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SdkResult<()> {
        if self.base_url.is_empty() {
            return Err(SdkError::Configuration(
                "base URL cannot be empty".to_string(),
            ));
        }
        url::Url::parse(&self.base_url)?;
        if self.timeout.is_zero() {
            return Err(SdkError::Configuration("timeout cannot be zero".to_string()));
        }
        Ok(())
    }
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// No authentication (local backend).
    None,

    /// API key authentication.
    ApiKey(String),

    /// Bearer token authentication.
    BearerToken(String),
}

impl AuthConfig {
    /// Check if authentication is configured.
    pub fn is_configured(&self) -> bool {
        !matches!(self, AuthConfig::None)
    }
}

/// Builder for SDK configuration.
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    config: SdkConfig,
}

impl SdkConfigBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the authentication method.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Enable or disable request/response logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config.enable_logging = enable;
        self
    }

    /// Add a custom header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SdkConfig {
        self.config
    }
}
