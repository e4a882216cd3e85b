//! Evaluation-run lifecycle: who is in flight, which responses are still
//! current, and when a late response must be thrown away.
//!
//! A run is identified by the session's generation counter. `begin` and
//! `cancel` both advance it, so a response carrying an older generation is
//! recognizably stale and is discarded without touching any state. Network
//! requests are never aborted; cancellation works entirely through this
//! discard path.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use crate::domain::{Criteria, EvaluationType, Instance, InstanceId, ProviderCredentials, TestCase};
use crate::error::Result;
use crate::wire::{decode_instance_result, WireErrorDetail, WireEvaluateRequest, WireEvaluateResult};

/// Lifecycle of a single evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl RunState {
    /// Terminal states accept a new `begin`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// Why a run could not start. All of these are caught before any network
/// traffic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BeginError {
    #[error("the description of predefined criteria '{0}' was edited; restore it or rename the criteria")]
    CriteriaDescriptionEdited(String),
    #[error("none of the selected instances has a response to evaluate")]
    NothingToEvaluate,
    #[error("no evaluator is selected")]
    MissingEvaluator,
}

/// Handed out by [`EvaluationSession::begin`]; pairs the outbound request
/// with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTicket {
    generation: u64,
    pub request: WireEvaluateRequest,
    pub instance_ids: Vec<InstanceId>,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What the backend came back with.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Success(Vec<WireEvaluateResult>),
    Failure(WireErrorDetail),
}

/// What [`EvaluationSession::complete`] did with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The ticket's generation was stale; nothing changed.
    Discarded,
    /// Results merged into the current instance set.
    Merged { updated: usize },
    /// The run failed; the message is ready to surface.
    Failed { message: String },
}

/// Per-run options. `predefined_criteria` is the catalog of rubric entries
/// whose descriptions must not be edited (the risk/harm catalog); pass an
/// empty slice outside that mode.
#[derive(Debug, Clone, Default)]
pub struct BeginOptions<'a> {
    pub credentials: ProviderCredentials,
    pub predefined_criteria: &'a [Criteria],
}

/// Owns a test case and the state of its evaluation runs.
#[derive(Debug, Clone)]
pub struct EvaluationSession {
    test_case: TestCase,
    state: RunState,
    generation: u64,
    in_flight: Vec<InstanceId>,
    last_error: Option<String>,
    last_evaluated: HashMap<InstanceId, String>,
}

impl EvaluationSession {
    pub fn new(test_case: TestCase) -> Self {
        Self {
            test_case,
            state: RunState::Idle,
            generation: 0,
            in_flight: Vec::new(),
            last_error: None,
            last_evaluated: HashMap::new(),
        }
    }

    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    pub fn test_case_mut(&mut self) -> &mut TestCase {
        &mut self.test_case
    }

    /// Swap in a different test case. Any in-flight response becomes stale.
    pub fn replace_test_case(&mut self, test_case: TestCase) {
        self.generation += 1;
        self.test_case = test_case;
        self.state = RunState::Idle;
        self.in_flight.clear();
        self.last_error = None;
        self.last_evaluated.clear();
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a row should show a loading indicator.
    pub fn is_instance_in_flight(&self, id: InstanceId) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn in_flight(&self) -> &[InstanceId] {
        &self.in_flight
    }

    /// Start a run over `ids`. Pre-flight checks run in order: predefined
    /// criteria integrity, evaluator presence, evaluable filtering.
    ///
    /// A `begin` while a run is still in flight is allowed: it bumps the
    /// generation, so the earlier run's response is discarded on arrival.
    /// The generation check, not a lock, is what keeps runs from
    /// interleaving.
    pub fn begin(
        &mut self,
        ids: &[InstanceId],
        options: BeginOptions<'_>,
    ) -> std::result::Result<RunTicket, BeginError> {
        let criteria = &self.test_case.criteria;
        if self.test_case.eval_type == EvaluationType::Direct {
            if let Some(predefined) = options
                .predefined_criteria
                .iter()
                .find(|c| c.name == criteria.name)
            {
                if predefined.description != criteria.description {
                    return Err(BeginError::CriteriaDescriptionEdited(criteria.name.clone()));
                }
            }
        }

        let evaluator = self
            .test_case
            .evaluator
            .as_ref()
            .ok_or(BeginError::MissingEvaluator)?;

        let selected: Vec<&Instance> = self
            .test_case
            .instances
            .iter()
            .filter(|i| ids.contains(&i.id) && i.is_evaluable())
            .collect();
        if selected.is_empty() {
            return Err(BeginError::NothingToEvaluate);
        }

        let instance_ids: Vec<InstanceId> = selected.iter().map(|i| i.id).collect();
        let owned: Vec<Instance> = selected.into_iter().cloned().collect();
        let request = WireEvaluateRequest::new(
            &owned,
            evaluator,
            criteria,
            self.test_case.eval_type,
            options.credentials,
        );

        self.generation += 1;
        self.state = RunState::Running;
        self.in_flight = instance_ids.clone();
        self.last_error = None;
        info!(
            generation = self.generation,
            instances = instance_ids.len(),
            "evaluation run started"
        );

        Ok(RunTicket {
            generation: self.generation,
            request,
            instance_ids,
        })
    }

    /// Cancel the current run. The in-flight request is left to complete;
    /// bumping the generation guarantees its response is discarded.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = RunState::Canceled;
        self.in_flight.clear();
        info!(generation = self.generation, "evaluation run canceled");
    }

    /// Apply the outcome of the run identified by `ticket`. A stale ticket
    /// (superseded by a later `begin`, a `cancel`, or a test-case switch)
    /// mutates nothing.
    pub fn complete(&mut self, ticket: &RunTicket, outcome: RunOutcome) -> Result<Completion> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale evaluation response"
            );
            return Ok(Completion::Discarded);
        }

        match outcome {
            RunOutcome::Success(results) => {
                let eval_type = self.test_case.eval_type;
                let mut updated = 0;
                for entry in results {
                    // Instances deleted mid-run are dropped here by looking
                    // up against the current instance set.
                    let Some(instance) = self.test_case.instance_mut(entry.id) else {
                        continue;
                    };
                    instance.result = Some(decode_instance_result(entry.result, eval_type)?);
                    updated += 1;
                }
                for id in self.test_case.instance_ids() {
                    if let Some(instance) = self.test_case.instance(id) {
                        if instance.result.is_some() {
                            self.last_evaluated
                                .insert(id, instance.content_fingerprint());
                        }
                    }
                }
                self.state = RunState::Succeeded;
                self.in_flight.clear();
                info!(updated, "evaluation run succeeded");
                Ok(Completion::Merged { updated })
            }
            RunOutcome::Failure(detail) => {
                // A plain-string detail is already user-facing; only the
                // validation-array shape needs the generic wrapper.
                let message = match &detail {
                    WireErrorDetail::Message(message) => message.clone(),
                    WireErrorDetail::Validation(_) => format!(
                        "Something went wrong with the evaluation ({})",
                        detail.message()
                    ),
                };
                self.state = RunState::Failed;
                self.in_flight.clear();
                self.last_error = Some(message.clone());
                Ok(Completion::Failed { message })
            }
        }
    }

    /// A result is outdated when the instance's evaluable content has
    /// changed since the run that produced it.
    pub fn is_result_outdated(&self, id: InstanceId) -> bool {
        let Some(instance) = self.test_case.instance(id) else {
            return false;
        };
        if instance.result.is_none() {
            return false;
        }
        match self.last_evaluated.get(&id) {
            Some(snapshot) => *snapshot != instance.content_fingerprint(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Evaluator, ModelProvider, Responses};
    use serde_json::json;

    fn direct_session() -> EvaluationSession {
        let mut test_case = TestCase::empty(EvaluationType::Direct);
        test_case.evaluator = Some(Evaluator {
            name: "llama-3-70b".to_string(),
            eval_type: EvaluationType::Direct,
            provider: ModelProvider::Watsonx,
        });
        test_case.instances[0].responses = Responses::Direct {
            response: "an answer".to_string(),
        };
        EvaluationSession::new(test_case)
    }

    fn success_for(ids: &[InstanceId]) -> RunOutcome {
        RunOutcome::Success(
            ids.iter()
                .map(|id| WireEvaluateResult {
                    id: *id,
                    result: json!({"selected_option": "Yes", "explanation": "fine"}),
                })
                .collect(),
        )
    }

    #[test]
    fn test_successful_run_merges_results() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();
        assert!(session.is_running());
        assert!(session.is_instance_in_flight(ids[0]));

        let completion = session.complete(&ticket, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Merged { updated: 1 });
        assert_eq!(session.state(), RunState::Succeeded);
        assert!(!session.is_instance_in_flight(ids[0]));
        assert!(session.test_case().instances[0].result.is_some());
    }

    #[test]
    fn test_second_begin_supersedes_first_ticket() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();

        // Two overlapping begins with no cancel in between: the second
        // simply issues a new generation.
        let first = session.begin(&ids, BeginOptions::default()).unwrap();
        let second = session.begin(&ids, BeginOptions::default()).unwrap();
        assert!(second.generation() > first.generation());

        // The first run's late response is a no-op.
        let completion = session.complete(&first, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Discarded);
        assert!(session.test_case().instances[0].result.is_none());
        assert!(session.is_running());

        let completion = session.complete(&second, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Merged { updated: 1 });
        assert_eq!(session.state(), RunState::Succeeded);
    }

    #[test]
    fn test_cancel_discards_in_flight_response() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();
        session.cancel();
        assert_eq!(session.state(), RunState::Canceled);
        assert!(session.in_flight().is_empty());

        let completion = session.complete(&ticket, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Discarded);
        assert!(session.test_case().instances[0].result.is_none());
    }

    #[test]
    fn test_instances_deleted_mid_run_are_dropped_at_merge() {
        let mut session = direct_session();
        session.test_case_mut().push_empty_instance();
        session.test_case_mut().instances[1].responses = Responses::Direct {
            response: "second answer".to_string(),
        };
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();

        session.test_case_mut().remove_instance(0).unwrap();
        let completion = session.complete(&ticket, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Merged { updated: 1 });
        assert_eq!(session.test_case().instances.len(), 1);
    }

    #[test]
    fn test_failure_surfaces_first_validation_message() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();

        let detail: WireErrorDetail = serde_json::from_value(json!([
            {"type": "missing", "msg": "field required"},
            {"type": "extra", "msg": "ignored"},
        ]))
        .unwrap();
        let completion = session
            .complete(&ticket, RunOutcome::Failure(detail))
            .unwrap();
        assert_eq!(
            completion,
            Completion::Failed {
                message: "Something went wrong with the evaluation (missing: field required)"
                    .to_string()
            }
        );
        assert_eq!(session.state(), RunState::Failed);
        assert!(session.last_error().is_some());
    }

    #[test]
    fn test_failure_surfaces_plain_detail_unwrapped() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();

        let detail = WireErrorDetail::Message("evaluator not found".to_string());
        let completion = session
            .complete(&ticket, RunOutcome::Failure(detail))
            .unwrap();
        assert_eq!(
            completion,
            Completion::Failed {
                message: "evaluator not found".to_string()
            }
        );
    }

    #[test]
    fn test_blank_instances_are_not_submitted() {
        let mut session = direct_session();
        session.test_case_mut().push_empty_instance();
        let ids = session.test_case().instance_ids();

        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();
        assert_eq!(ticket.request.instances.len(), 1);
        assert_eq!(ticket.instance_ids.len(), 1);
    }

    #[test]
    fn test_nothing_to_evaluate() {
        let mut session = direct_session();
        session.test_case_mut().instances[0].responses = Responses::Direct {
            response: String::new(),
        };
        let ids = session.test_case().instance_ids();
        assert_eq!(
            session.begin(&ids, BeginOptions::default()),
            Err(BeginError::NothingToEvaluate)
        );
    }

    #[test]
    fn test_missing_evaluator_is_rejected() {
        let mut session = direct_session();
        session.test_case_mut().evaluator = None;
        let ids = session.test_case().instance_ids();
        assert_eq!(
            session.begin(&ids, BeginOptions::default()),
            Err(BeginError::MissingEvaluator)
        );
    }

    #[test]
    fn test_edited_predefined_criteria_description_is_rejected() {
        let mut session = direct_session();
        session.test_case_mut().criteria.name = "harm".to_string();
        session.test_case_mut().criteria.description = "my own wording".to_string();

        let mut predefined = Criteria::empty();
        predefined.name = "harm".to_string();
        predefined.description = "The response is harmful.".to_string();
        let catalog = vec![predefined];

        let ids = session.test_case().instance_ids();
        let options = BeginOptions {
            credentials: ProviderCredentials::new(),
            predefined_criteria: &catalog,
        };
        assert_eq!(
            session.begin(&ids, options),
            Err(BeginError::CriteriaDescriptionEdited("harm".to_string()))
        );
        assert_eq!(session.state(), RunState::Idle);
    }

    #[test]
    fn test_unedited_predefined_criteria_passes_preflight() {
        let mut session = direct_session();
        session.test_case_mut().criteria.name = "harm".to_string();
        session.test_case_mut().criteria.description = "The response is harmful.".to_string();

        let catalog = vec![session.test_case().criteria.clone()];
        let ids = session.test_case().instance_ids();
        let options = BeginOptions {
            credentials: ProviderCredentials::new(),
            predefined_criteria: &catalog,
        };
        assert!(session.begin(&ids, options).is_ok());
    }

    #[test]
    fn test_result_staleness_tracks_content_edits() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();
        session.complete(&ticket, success_for(&ids)).unwrap();
        assert!(!session.is_result_outdated(ids[0]));

        session.test_case_mut().instances[0].responses = Responses::Direct {
            response: "edited answer".to_string(),
        };
        assert!(session.is_result_outdated(ids[0]));
    }

    #[test]
    fn test_switching_test_case_invalidates_ticket() {
        let mut session = direct_session();
        let ids = session.test_case().instance_ids();
        let ticket = session.begin(&ids, BeginOptions::default()).unwrap();

        session.replace_test_case(TestCase::empty(EvaluationType::Direct));
        let completion = session.complete(&ticket, success_for(&ids)).unwrap();
        assert_eq!(completion, Completion::Discarded);
    }
}
