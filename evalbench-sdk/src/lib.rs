//! EvalBench SDK
//!
//! Rust client for the EvalBench LLM-as-judge evaluation backend. It pairs
//! the core crate's codecs and run state machine with an HTTP client for
//! the backend's endpoints.
//!
//! # Features
//!
//! - **Typed wire contracts**: requests and responses built from the core
//!   crate's wire types
//! - **Automatic retries**: transient failures retried with exponential
//!   backoff and `Retry-After` handling
//! - **Backend error decoding**: the `{detail: string | [{type, msg}]}`
//!   envelope is parsed into a structured error
//! - **Run driving**: [`EvaluationRunner`] carries a session's run through
//!   the HTTP round trip, preserving stale-response discard semantics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use evalbench_core::domain::{EvaluationType, TestCase};
//! use evalbench_core::session::{BeginOptions, EvaluationSession};
//! use evalbench_sdk::{EvalBenchClient, EvaluationRunner, SdkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EvalBenchClient::new(SdkConfig::new("http://localhost:8000"))?;
//!
//!     let test_case = TestCase::empty(EvaluationType::Direct);
//!     let mut session = EvaluationSession::new(test_case);
//!     let ids = session.test_case().instance_ids();
//!
//!     let runner = EvaluationRunner::new(client.evaluations().clone());
//!     let result = runner.run(&mut session, &ids, BeginOptions::default()).await?;
//!     println!("run finished: {:?}", result);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod runner;

pub use client::HttpClient;
pub use config::{AuthConfig, SdkConfig, SdkConfigBuilder};
pub use error::{SdkError, SdkResult};
pub use resources::{EvaluationClient, TestCaseClient};
pub use runner::{EvaluationRunner, RunResult};

use std::sync::Arc;

/// The main client for the EvalBench backend.
///
/// Provides access to the endpoint groups through dedicated sub-clients,
/// sharing one HTTP client for connection pooling, retries, and auth.
#[derive(Debug, Clone)]
pub struct EvalBenchClient {
    http_client: Arc<HttpClient>,
    evaluations: EvaluationClient,
    test_cases: TestCaseClient,
}

impl EvalBenchClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        let http_client = Arc::new(HttpClient::new(config)?);
        Ok(Self {
            evaluations: EvaluationClient::new(Arc::clone(&http_client)),
            test_cases: TestCaseClient::new(Arc::clone(&http_client)),
            http_client,
        })
    }

    /// Get the client for the `evaluate/` and `fix-instance/` endpoints.
    pub fn evaluations(&self) -> &EvaluationClient {
        &self.evaluations
    }

    /// Get the client for the `test_case/` persistence endpoints.
    pub fn test_cases(&self) -> &TestCaseClient {
        &self.test_cases
    }

    /// Get a reference to the underlying HTTP client, for endpoints not
    /// covered by the resource clients.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Get the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.http_client.config().base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = EvalBenchClient::new(SdkConfig::new("http://localhost:8000")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        let _ = client.evaluations();
        let _ = client.test_cases();
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        assert!(EvalBenchClient::new(SdkConfig::new("")).is_err());
    }
}
