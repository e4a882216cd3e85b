use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::evaluator::EvaluationType;
use super::ids::InstanceId;
use super::result::InstanceResult;

/// One named input variable of an instance, positionally aligned with the
/// owning criteria's `context_fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextVariable {
    pub name: String,
    pub value: String,
}

impl ContextVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The judged payload of an instance: a single response for direct
/// evaluation, or one response per compared system for pairwise.
///
/// Serialized untagged and flattened into the instance so persisted JSON
/// keeps the flat `response` / `responses` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Responses {
    Direct { response: String },
    Pairwise { responses: Vec<String> },
}

impl Responses {
    pub fn empty_direct() -> Self {
        Self::Direct {
            response: String::new(),
        }
    }

    pub fn empty_pairwise(system_count: usize) -> Self {
        Self::Pairwise {
            responses: vec![String::new(); system_count],
        }
    }

    pub fn eval_type(&self) -> EvaluationType {
        match self {
            Self::Direct { .. } => EvaluationType::Direct,
            Self::Pairwise { .. } => EvaluationType::Pairwise,
        }
    }

    /// Direct instances qualify for evaluation when the response is
    /// non-empty; pairwise when at least one response is.
    pub fn is_evaluable(&self) -> bool {
        match self {
            Self::Direct { response } => !response.is_empty(),
            Self::Pairwise { responses } => responses.iter().any(|r| !r.is_empty()),
        }
    }

    /// Number of compared systems; 1 for direct.
    pub fn system_count(&self) -> usize {
        match self {
            Self::Direct { .. } => 1,
            Self::Pairwise { responses } => responses.len(),
        }
    }
}

/// One unit of test data: context, response(s), expected result and, once an
/// evaluation has come back, its result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: InstanceId,
    pub context_variables: Vec<ContextVariable>,
    #[serde(flatten)]
    pub responses: Responses,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub result: Option<InstanceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Instance {
    /// A blank direct instance with one empty variable per context field.
    pub fn empty_direct(context_fields: &[String]) -> Self {
        Self::empty(context_fields, Responses::empty_direct())
    }

    /// A blank pairwise instance with `system_count` empty responses.
    pub fn empty_pairwise(context_fields: &[String], system_count: usize) -> Self {
        Self::empty(context_fields, Responses::empty_pairwise(system_count))
    }

    fn empty(context_fields: &[String], responses: Responses) -> Self {
        Self {
            id: InstanceId::new(),
            context_variables: context_fields
                .iter()
                .map(|name| ContextVariable::new(name.clone(), ""))
                .collect(),
            responses,
            expected_result: String::new(),
            result: None,
            metadata: None,
        }
    }

    pub fn eval_type(&self) -> EvaluationType {
        self.responses.eval_type()
    }

    pub fn is_evaluable(&self) -> bool {
        self.responses.is_evaluable()
    }

    /// Whether the instance came out of backend-assisted synthetic
    /// generation, derived from the metadata marker the generator leaves.
    pub fn is_synthetic(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("synthetic_generation"))
            .is_some_and(|v| !v.is_null())
    }

    /// Canonical JSON of the instance's evaluable content (context values
    /// and response text), with sorted keys. Compared against a snapshot
    /// taken at evaluation time to flag results as outdated after edits.
    pub fn content_fingerprint(&self) -> String {
        let mut content: BTreeMap<String, serde_json::Value> = self
            .context_variables
            .iter()
            .map(|cv| (cv.name.clone(), serde_json::Value::from(cv.value.clone())))
            .collect();
        match &self.responses {
            Responses::Direct { response } => {
                content.insert("response".to_string(), response.clone().into());
            }
            Responses::Pairwise { responses } => {
                content.insert("responses".to_string(), responses.clone().into());
            }
        }
        // BTreeMap keys serialize in sorted order, so equal content always
        // produces an identical string.
        serde_json::to_string(&content).unwrap_or_default()
    }
}
