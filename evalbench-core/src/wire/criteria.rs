use serde::{Deserialize, Serialize};

use crate::domain::{Criteria, CriteriaOption};

/// Backend-facing rubric shape. Options are already flat on both sides and
/// pass through unchanged; the conversion is a pure field renaming and is
/// lossless in both directions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireCriteria {
    pub name: String,
    pub description: String,
    pub prediction_field: String,
    pub context_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CriteriaOption>>,
}

impl From<&Criteria> for WireCriteria {
    fn from(criteria: &Criteria) -> Self {
        Self {
            name: criteria.name.clone(),
            description: criteria.description.clone(),
            prediction_field: criteria.prediction_field.clone(),
            context_fields: criteria.context_fields.clone(),
            options: criteria.options.clone(),
        }
    }
}

impl From<WireCriteria> for Criteria {
    fn from(wire: WireCriteria) -> Self {
        Self {
            name: wire.name,
            description: wire.description,
            prediction_field: wire.prediction_field,
            context_fields: wire.context_fields,
            options: wire.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvaluationType;

    #[test]
    fn test_round_trip_is_identity() {
        for eval_type in [EvaluationType::Direct, EvaluationType::Pairwise] {
            let mut criteria = Criteria::empty_for(eval_type);
            criteria.name = "conciseness".to_string();
            criteria.description = "Is the response concise?".to_string();

            let wire = WireCriteria::from(&criteria);
            assert_eq!(Criteria::from(wire), criteria);
        }
    }

    #[test]
    fn test_wire_field_names_are_snake_case() {
        let json = serde_json::to_value(WireCriteria::from(&Criteria::empty())).unwrap();
        assert!(json.get("prediction_field").is_some());
        assert!(json.get("context_fields").is_some());
    }
}
