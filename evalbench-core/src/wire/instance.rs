use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Instance, InstanceId, Responses};

/// Backend-facing instance shape: context variables zipped into a
/// name→value map and exactly one of `response` / `responses`, keyed by the
/// test case's evaluation type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireInstance {
    pub context: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<String>>,
    pub id: InstanceId,
    pub expected_result: String,
    pub is_synthetic: bool,
}

impl WireInstance {
    pub fn from_instance(instance: &Instance) -> Self {
        let context = instance
            .context_variables
            .iter()
            .map(|cv| (cv.name.clone(), cv.value.clone()))
            .collect();
        let (response, responses) = match &instance.responses {
            Responses::Direct { response } => (Some(response.clone()), None),
            Responses::Pairwise { responses } => (None, Some(responses.clone())),
        };
        Self {
            context,
            response,
            responses,
            id: instance.id,
            expected_result: instance.expected_result.clone(),
            is_synthetic: instance.is_synthetic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContextVariable;

    #[test]
    fn test_context_is_zipped_by_name() {
        let mut instance = Instance::empty_direct(&["Context".to_string(), "Query".to_string()]);
        instance.context_variables = vec![
            ContextVariable::new("Context", "some background"),
            ContextVariable::new("Query", "what is it?"),
        ];
        let wire = WireInstance::from_instance(&instance);
        assert_eq!(wire.context["Context"], "some background");
        assert_eq!(wire.context["Query"], "what is it?");
    }

    #[test]
    fn test_exactly_one_response_key() {
        let direct = Instance::empty_direct(&[]);
        let wire = WireInstance::from_instance(&direct);
        assert!(wire.response.is_some());
        assert!(wire.responses.is_none());
        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("responses").is_none());

        let pairwise = Instance::empty_pairwise(&[], 3);
        let wire = WireInstance::from_instance(&pairwise);
        assert!(wire.response.is_none());
        assert_eq!(wire.responses.as_ref().map(Vec::len), Some(3));
    }
}
