//! SDK error types.
//!
//! The backend reports failures through a `{detail: ...}` envelope where
//! `detail` is either a plain message or an array of validation errors.
//! [`SdkError::Backend`] preserves that structure so callers can decide how
//! to surface it.

use evalbench_core::wire::{WireErrorBody, WireErrorDetail};
use thiserror::Error;

/// The main error type for the SDK.
#[derive(Error, Debug)]
pub enum SdkError {
    /// The backend rejected the request with a structured `{detail}` body.
    #[error("backend error: {}", .detail.message())]
    Backend {
        status: u16,
        detail: WireErrorDetail,
    },

    /// Non-success status without a parseable `{detail}` body.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Retryable server-side failure.
    #[error("server error: {0}")]
    Server(String),

    /// Error bubbled up from the core codec or session layer.
    #[error(transparent)]
    Core(#[from] evalbench_core::CoreError),
}

/// Result type alias for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

impl SdkError {
    /// Build an error from a non-success response body, preferring the
    /// backend's `{detail}` shape.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(WireErrorBody { detail }) = serde_json::from_str::<WireErrorBody>(body) {
            return SdkError::Backend { status, detail };
        }
        if (500..600).contains(&status) {
            return SdkError::Server(format!("status {status}: {body}"));
        }
        SdkError::Api {
            status,
            message: body.to_string(),
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::Network(_) | SdkError::Timeout(_) | SdkError::Server(_)
        )
    }

    /// The HTTP status code, when the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::Backend { status, .. } | SdkError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` payload, when present.
    pub fn backend_detail(&self) -> Option<&WireErrorDetail> {
        match self {
            SdkError::Backend { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
