//! Drives an [`EvaluationSession`] through the HTTP round trip.
//!
//! The runner is deliberately thin: `begin` and `complete` hold all the
//! state rules (generation checks, merge-by-current-id, failure messages);
//! the runner only carries the request over the wire and maps transport
//! failures into a run failure. Responses that outlive their generation are
//! discarded by `complete`, so a canceled request is simply left to finish.

use crate::error::{SdkError, SdkResult};
use crate::resources::EvaluationClient;
use evalbench_core::session::{
    BeginError, BeginOptions, Completion, EvaluationSession, RunOutcome,
};
use evalbench_core::wire::WireErrorDetail;
use evalbench_core::InstanceId;
use tracing::instrument;

/// What a driven run ended as.
#[derive(Debug)]
pub enum RunResult {
    /// The run never started; no network traffic happened.
    Rejected(BeginError),
    /// The run completed (merged, failed, or discarded as stale).
    Finished(Completion),
}

/// Runs evaluations against a session.
#[derive(Debug, Clone)]
pub struct EvaluationRunner {
    client: EvaluationClient,
}

impl EvaluationRunner {
    /// Create a runner backed by the given evaluation client.
    pub fn new(client: EvaluationClient) -> Self {
        Self { client }
    }

    /// Start a run, perform the HTTP call, and feed the outcome back into
    /// the session.
    #[instrument(skip_all, fields(instances = ids.len()))]
    pub async fn run(
        &self,
        session: &mut EvaluationSession,
        ids: &[InstanceId],
        options: BeginOptions<'_>,
    ) -> SdkResult<RunResult> {
        let ticket = match session.begin(ids, options) {
            Ok(ticket) => ticket,
            Err(reason) => return Ok(RunResult::Rejected(reason)),
        };

        let outcome = match self.client.evaluate(&ticket.request).await {
            Ok(response) => RunOutcome::Success(response.results),
            Err(SdkError::Backend { detail, .. }) => RunOutcome::Failure(detail),
            Err(other) => RunOutcome::Failure(WireErrorDetail::Message(other.to_string())),
        };

        let completion = session.complete(&ticket, outcome)?;
        Ok(RunResult::Finished(completion))
    }
}
