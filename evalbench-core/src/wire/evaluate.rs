use serde::{Deserialize, Serialize};

use crate::domain::{
    Criteria, DirectResult, EvaluationType, Evaluator, Instance, InstanceId, ModelProvider,
    ProviderCredentials,
};
use crate::error::{CoreError, Result};

use super::criteria::WireCriteria;
use super::instance::WireInstance;

/// Request body for `POST evaluate/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEvaluateRequest {
    pub instances: Vec<WireInstance>,
    pub evaluator_name: String,
    pub provider: ModelProvider,
    pub criteria: WireCriteria,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    pub llm_provider_credentials: ProviderCredentials,
}

impl WireEvaluateRequest {
    /// Build a request from the evaluable subset of `instances`. Instances
    /// with no response text are not sent.
    pub fn new(
        instances: &[Instance],
        evaluator: &Evaluator,
        criteria: &Criteria,
        eval_type: EvaluationType,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            instances: instances
                .iter()
                .filter(|i| i.is_evaluable())
                .map(WireInstance::from_instance)
                .collect(),
            evaluator_name: evaluator.name.clone(),
            provider: evaluator.provider,
            criteria: WireCriteria::from(criteria),
            eval_type,
            llm_provider_credentials: credentials,
        }
    }
}

/// One `{id, result}` pair from the evaluate response. The result payload
/// is left raw; [`super::result::decode_instance_result`] interprets it
/// against the test case's evaluation type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEvaluateResult {
    pub id: InstanceId,
    pub result: serde_json::Value,
}

/// Response body for `POST evaluate/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEvaluateResponse {
    pub results: Vec<WireEvaluateResult>,
}

/// One entry of a validation-error detail array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireValidationError {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
}

/// The backend's error envelope: `detail` is either a plain message or an
/// array of validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireErrorDetail {
    Message(String),
    Validation(Vec<WireValidationError>),
}

impl WireErrorDetail {
    /// The message to surface to the user. For validation arrays this is
    /// the first entry, formatted as `{type}: {msg}`.
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Validation(errors) => match errors.first() {
                Some(error) => format!("{}: {}", error.kind, error.msg),
                None => "unknown validation error".to_string(),
            },
        }
    }
}

/// The error envelope wrapping [`WireErrorDetail`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireErrorBody {
    pub detail: WireErrorDetail,
}

/// Flat positional-bias shape used only by the fix-instance request; the
/// backend wants the nested result collapsed to its option and explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFixPositionalBias {
    pub detected: bool,
    pub option: String,
    pub explanation: String,
}

/// The prior direct result echoed back in a fix-instance request. `score`
/// is always sent as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFixResult {
    pub criteria: WireCriteria,
    pub option: String,
    pub score: Option<f64>,
    pub explanation: String,
    pub feedback: Option<String>,
    pub positional_bias: Option<WireFixPositionalBias>,
    pub metadata: Option<std::collections::HashMap<String, String>>,
}

impl WireFixResult {
    pub fn new(criteria: &Criteria, result: &DirectResult) -> Self {
        Self {
            criteria: WireCriteria::from(criteria),
            option: result.selected_option.clone(),
            score: None,
            explanation: result.explanation.clone(),
            feedback: result.feedback.clone(),
            positional_bias: result.positional_bias.as_ref().map(|bias| {
                WireFixPositionalBias {
                    detected: bias.detected,
                    option: bias.result.selected_option.clone(),
                    explanation: bias.result.explanation.clone(),
                }
            }),
            metadata: result.metadata.clone(),
        }
    }
}

/// Request body for `POST fix-instance/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFixRequest {
    pub provider: ModelProvider,
    pub llm_provider_credentials: ProviderCredentials,
    pub evaluator_name: String,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    pub instance: WireInstance,
    pub result: WireFixResult,
}

impl WireFixRequest {
    /// Build a fix request for a direct instance that already has a result.
    pub fn new(
        instance: &Instance,
        criteria: &Criteria,
        evaluator: &Evaluator,
        credentials: ProviderCredentials,
    ) -> Result<Self> {
        let result = instance
            .result
            .as_ref()
            .and_then(|r| r.as_direct())
            .ok_or_else(|| {
                CoreError::InvalidState(
                    "fix requires a direct instance with an evaluation result".to_string(),
                )
            })?;
        Ok(Self {
            provider: evaluator.provider,
            llm_provider_credentials: credentials,
            evaluator_name: evaluator.name.clone(),
            eval_type: EvaluationType::Direct,
            instance: WireInstance::from_instance(instance),
            result: WireFixResult::new(criteria, result),
        })
    }
}

/// Response body for `POST fix-instance/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFixResponse {
    pub fixed_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstanceResult, PositionalBias, Responses};
    use serde_json::json;

    fn evaluator() -> Evaluator {
        Evaluator {
            name: "granite-guardian".to_string(),
            eval_type: EvaluationType::Direct,
            provider: ModelProvider::Watsonx,
        }
    }

    #[test]
    fn test_request_skips_unevaluable_instances() {
        let criteria = Criteria::empty();
        let mut full = Instance::empty_direct(&criteria.context_fields);
        full.responses = Responses::Direct {
            response: "an answer".to_string(),
        };
        let blank = Instance::empty_direct(&criteria.context_fields);

        let request = WireEvaluateRequest::new(
            &[full.clone(), blank],
            &evaluator(),
            &criteria,
            EvaluationType::Direct,
            ProviderCredentials::new(),
        );
        assert_eq!(request.instances.len(), 1);
        assert_eq!(request.instances[0].id, full.id);
    }

    #[test]
    fn test_request_wire_shape() {
        let criteria = Criteria::empty();
        let request = WireEvaluateRequest::new(
            &[],
            &evaluator(),
            &criteria,
            EvaluationType::Direct,
            ProviderCredentials::new(),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "direct");
        assert_eq!(json["provider"], "watsonx");
        assert!(json.get("llm_provider_credentials").is_some());
    }

    #[test]
    fn test_error_detail_string() {
        let body: WireErrorBody =
            serde_json::from_value(json!({"detail": "model not found"})).unwrap();
        assert_eq!(body.detail.message(), "model not found");
    }

    #[test]
    fn test_error_detail_validation_array_takes_first() {
        let body: WireErrorBody = serde_json::from_value(json!({
            "detail": [
                {"type": "missing", "msg": "field required"},
                {"type": "string_type", "msg": "input should be a string"},
            ]
        }))
        .unwrap();
        assert_eq!(body.detail.message(), "missing: field required");
    }

    #[test]
    fn test_fix_request_collapses_positional_bias() {
        let criteria = Criteria::empty();
        let mut instance = Instance::empty_direct(&criteria.context_fields);
        instance.responses = Responses::Direct {
            response: "an answer".to_string(),
        };
        instance.result = Some(InstanceResult::Direct(DirectResult {
            selected_option: "Yes".to_string(),
            positional_bias_option: None,
            explanation: "primary".to_string(),
            feedback: Some("ok".to_string()),
            score: Some(0.8),
            positional_bias: Some(PositionalBias {
                detected: true,
                result: Box::new(DirectResult {
                    selected_option: "No".to_string(),
                    positional_bias_option: None,
                    explanation: "flipped".to_string(),
                    feedback: None,
                    score: None,
                    positional_bias: None,
                    metadata: None,
                }),
            }),
            metadata: None,
        }));

        let request =
            WireFixRequest::new(&instance, &criteria, &evaluator(), ProviderCredentials::new())
                .unwrap();
        assert_eq!(request.result.score, None);
        let bias = request.result.positional_bias.as_ref().unwrap();
        assert!(bias.detected);
        assert_eq!(bias.option, "No");
        assert_eq!(bias.explanation, "flipped");
    }

    #[test]
    fn test_fix_request_requires_result() {
        let criteria = Criteria::empty();
        let instance = Instance::empty_direct(&criteria.context_fields);
        let request =
            WireFixRequest::new(&instance, &criteria, &evaluator(), ProviderCredentials::new());
        assert!(request.is_err());
    }
}
