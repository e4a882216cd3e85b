use serde::{Deserialize, Serialize};

use super::evaluator::EvaluationType;

/// A single selectable option of a direct-evaluation rubric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CriteriaOption {
    pub name: String,
    pub description: String,
}

impl CriteriaOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The rubric definition driving an evaluation.
///
/// `prediction_field` labels the thing being judged (e.g. "Response") and
/// `context_fields` names the auxiliary input variables every instance
/// carries, positionally aligned with `Instance::context_variables`.
/// `options` is only populated for direct evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    pub name: String,
    pub description: String,
    pub prediction_field: String,
    pub context_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CriteriaOption>>,
}

impl Criteria {
    /// A blank pairwise rubric: one "Context" field, no options.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            prediction_field: "Response".to_string(),
            context_fields: vec!["Context".to_string()],
            options: None,
        }
    }

    /// A blank direct rubric, seeded with two unnamed options.
    pub fn empty_with_two_options() -> Self {
        Self {
            options: Some(vec![
                CriteriaOption::new("", ""),
                CriteriaOption::new("", ""),
            ]),
            ..Self::empty()
        }
    }

    /// The blank rubric matching an evaluation type.
    pub fn empty_for(eval_type: EvaluationType) -> Self {
        match eval_type {
            EvaluationType::Direct => Self::empty_with_two_options(),
            EvaluationType::Pairwise => Self::empty(),
        }
    }

    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }
}
