//! The `evaluate/` and `fix-instance/` endpoints.

use crate::client::HttpClient;
use crate::error::SdkResult;
use evalbench_core::wire::{
    WireEvaluateRequest, WireEvaluateResponse, WireFixRequest, WireFixResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Client for running evaluations.
#[derive(Debug, Clone)]
pub struct EvaluationClient {
    http: Arc<HttpClient>,
}

impl EvaluationClient {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// `POST evaluate/` — run the evaluator over the request's instances.
    /// The result payloads come back raw; decode them with
    /// [`evalbench_core::wire::decode_instance_result`] against the test
    /// case's evaluation type.
    #[instrument(skip_all, fields(instances = request.instances.len()))]
    pub async fn evaluate(&self, request: &WireEvaluateRequest) -> SdkResult<WireEvaluateResponse> {
        self.http.post("evaluate/", request).await
    }

    /// `POST fix-instance/` — ask the evaluator to rewrite a response so it
    /// would pass the criteria it previously failed.
    #[instrument(skip_all)]
    pub async fn fix_instance(&self, request: &WireFixRequest) -> SdkResult<String> {
        let response: WireFixResponse = self.http.post("fix-instance/", request).await?;
        Ok(response.fixed_response)
    }
}
