//! HTTP client with retry logic, backend error decoding, and optional
//! request/response logging.

use crate::config::{AuthConfig, SdkConfig};
use crate::error::{SdkError, SdkResult};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The HTTP client for talking to the evaluation backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<SdkConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        for (name, value) in &config.custom_headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::try_from(name.as_str()),
                header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, value);
            }
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(SdkError::Network)?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Build the full URL for an endpoint. The backend's routes carry a
    /// trailing slash (`evaluate/`, `test_case/`); paths pass through as
    /// given.
    pub fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Make a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> SdkResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Make a PUT request.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> SdkResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Make a DELETE request carrying a JSON body, as the backend's
    /// `test_case/` route expects.
    pub async fn delete_with_body<B: Serialize>(&self, path: &str, body: &B) -> SdkResult<()> {
        let response = self
            .execute_with_retry(Method::DELETE, path, Some(body))
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.map_err(SdkError::Network)?;
            Err(SdkError::from_response(status.as_u16(), &text))
        }
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> SdkResult<T> {
        let response = self.execute_with_retry(method, path, body).await?;

        let status = response.status();
        let text = response.text().await.map_err(SdkError::Network)?;

        if self.config.enable_logging {
            debug!("response body: {}", text);
        }

        if status.is_success() {
            serde_json::from_str(&text).map_err(SdkError::Serialization)
        } else {
            Err(SdkError::from_response(status.as_u16(), &text))
        }
    }

    /// Execute a request, retrying transient failures with exponential
    /// backoff. 4xx responses are returned immediately; their bodies carry
    /// the backend's `{detail}` envelope and retrying will not change them.
    async fn execute_with_retry<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> SdkResult<Response> {
        let url = self.url(path);
        let body_json = match body {
            Some(body) => Some(serde_json::to_string(body).map_err(SdkError::Serialization)?),
            None => None,
        };

        let mut attempts = 0;
        let mut last_error: Option<SdkError> = None;
        let mut backoff = self.config.retry_initial_backoff;

        while attempts <= self.config.max_retries {
            if attempts > 0 {
                info!(
                    "retrying request (attempt {}/{}), waiting {:?}",
                    attempts, self.config.max_retries, backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, self.config.retry_max_backoff);
            }

            let mut request = self.client.request(method.clone(), &url);
            request = self.add_auth(request);
            if let Some(ref body_str) = body_json {
                request = request.body(body_str.clone());
            }

            if self.config.enable_logging {
                debug!("request: {} {}", method, url);
                if let Some(ref body_str) = body_json {
                    debug!("request body: {}", body_str);
                }
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!("rate limited, retry after {} seconds", retry_after);

                        if attempts < self.config.max_retries {
                            last_error =
                                Some(SdkError::Server(format!("rate limited ({retry_after}s)")));
                            backoff = Duration::from_secs(retry_after);
                            attempts += 1;
                            continue;
                        }
                    }

                    if status.is_server_error() && attempts < self.config.max_retries {
                        warn!("server error {}, will retry", status);
                        last_error = Some(SdkError::Server(format!("status: {}", status)));
                        attempts += 1;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    error!("request failed: {}", e);

                    if e.is_timeout() {
                        last_error = Some(SdkError::Timeout(self.config.timeout.as_secs()));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(SdkError::Network(e));
                    } else {
                        return Err(SdkError::Network(e));
                    }

                    attempts += 1;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SdkError::Server("request failed".to_string())))
    }

    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            AuthConfig::None => request,
            AuthConfig::ApiKey(key) => request.header("X-API-Key", key.as_str()),
            AuthConfig::BearerToken(token) => {
                request.header(header::AUTHORIZATION, format!("Bearer {}", token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = HttpClient::new(SdkConfig::new("http://localhost:8000")).unwrap();
        assert_eq!(client.url("evaluate/"), "http://localhost:8000/evaluate/");
        assert_eq!(client.url("/test_case/"), "http://localhost:8000/test_case/");

        let client = HttpClient::new(SdkConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.url("evaluate/"), "http://localhost:8000/evaluate/");
    }
}
