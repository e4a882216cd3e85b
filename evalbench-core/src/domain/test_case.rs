use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CoreError, Result};

use super::criteria::Criteria;
use super::evaluator::{EvaluationType, Evaluator};
use super::ids::InstanceId;
use super::instance::{ContextVariable, Instance, Responses};

/// Knobs for backend-assisted synthetic data generation. Everything is
/// optional; the backend fills in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticGenerationConfig {
    pub task: Option<String>,
    pub domain: Option<String>,
    pub persona: Option<String>,
    pub generation_length: Option<String>,
    pub evaluator: Option<Evaluator>,
    pub per_criteria_option_count: Option<HashMap<String, u32>>,
    pub borderline_count: Option<u32>,
}

/// A named collection of instances evaluated against one rubric.
///
/// `id` is `None` until the backend has persisted the test case. All
/// structural edits go through the methods below, which keep two invariants:
/// every instance's context variables stay positionally aligned with
/// `criteria.context_fields`, and for pairwise test cases every instance
/// carries the same number of responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    pub criteria: Criteria,
    pub instances: Vec<Instance>,
    pub evaluator: Option<Evaluator>,
    #[serde(default)]
    pub synthetic_generation_config: SyntheticGenerationConfig,
}

impl TestCase {
    /// A blank unsaved test case with one empty instance. Pairwise test
    /// cases start with two compared systems.
    pub fn empty(eval_type: EvaluationType) -> Self {
        let criteria = Criteria::empty_for(eval_type);
        let instances = vec![match eval_type {
            EvaluationType::Direct => Instance::empty_direct(&criteria.context_fields),
            EvaluationType::Pairwise => Instance::empty_pairwise(&criteria.context_fields, 2),
        }];
        Self {
            id: None,
            name: String::new(),
            eval_type,
            criteria,
            instances,
            evaluator: None,
            synthetic_generation_config: SyntheticGenerationConfig::default(),
        }
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.id).collect()
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    /// Number of compared systems for pairwise test cases; 1 for direct.
    pub fn system_count(&self) -> usize {
        self.instances
            .first()
            .map(|i| i.responses.system_count())
            .unwrap_or(match self.eval_type {
                EvaluationType::Direct => 1,
                EvaluationType::Pairwise => 2,
            })
    }

    /// Append a new context field to the criteria and, in lock-step, an
    /// empty variable to every instance.
    pub fn add_context_field(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.criteria.context_fields.push(name.clone());
        for instance in &mut self.instances {
            instance
                .context_variables
                .push(ContextVariable::new(name.clone(), ""));
        }
    }

    /// Remove a context field by index from the criteria and from every
    /// instance simultaneously.
    pub fn remove_context_field(&mut self, index: usize) -> Result<()> {
        if index >= self.criteria.context_fields.len() {
            return Err(CoreError::Validation(format!(
                "context field index {} out of bounds ({} fields)",
                index,
                self.criteria.context_fields.len()
            )));
        }
        self.criteria.context_fields.remove(index);
        for instance in &mut self.instances {
            if index < instance.context_variables.len() {
                instance.context_variables.remove(index);
            }
        }
        Ok(())
    }

    /// Rename a context field, propagating the new name to every instance's
    /// aligned variable.
    pub fn rename_context_field(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        match self.criteria.context_fields.get_mut(index) {
            Some(field) => *field = name.clone(),
            None => {
                return Err(CoreError::Validation(format!(
                    "context field index {} out of bounds",
                    index
                )))
            }
        }
        for instance in &mut self.instances {
            if let Some(variable) = instance.context_variables.get_mut(index) {
                variable.name = name.clone();
            }
        }
        Ok(())
    }

    /// Add a compared system: every pairwise instance gains one empty
    /// response column.
    pub fn add_system(&mut self) -> Result<()> {
        if self.eval_type != EvaluationType::Pairwise {
            return Err(CoreError::InvalidState(
                "systems can only be added to pairwise test cases".to_string(),
            ));
        }
        for instance in &mut self.instances {
            if let Responses::Pairwise { responses } = &mut instance.responses {
                responses.push(String::new());
            }
        }
        Ok(())
    }

    /// Remove a compared system: the response column at `index` is dropped
    /// from every pairwise instance simultaneously.
    pub fn remove_system(&mut self, index: usize) -> Result<()> {
        if self.eval_type != EvaluationType::Pairwise {
            return Err(CoreError::InvalidState(
                "systems can only be removed from pairwise test cases".to_string(),
            ));
        }
        if index >= self.system_count() {
            return Err(CoreError::Validation(format!(
                "system index {} out of bounds ({} systems)",
                index,
                self.system_count()
            )));
        }
        for instance in &mut self.instances {
            if let Responses::Pairwise { responses } = &mut instance.responses {
                responses.remove(index);
            }
        }
        Ok(())
    }

    /// Append a blank instance shaped like the rest of the test case.
    pub fn push_empty_instance(&mut self) {
        let instance = match self.eval_type {
            EvaluationType::Direct => Instance::empty_direct(&self.criteria.context_fields),
            EvaluationType::Pairwise => {
                Instance::empty_pairwise(&self.criteria.context_fields, self.system_count())
            }
        };
        self.instances.push(instance);
    }

    /// Replace the instance at `index` wholesale. Edits never merge.
    pub fn replace_instance(&mut self, index: usize, instance: Instance) -> Result<()> {
        match self.instances.get_mut(index) {
            Some(slot) => {
                *slot = instance;
                Ok(())
            }
            None => Err(CoreError::Validation(format!(
                "instance index {} out of bounds ({} instances)",
                index,
                self.instances.len()
            ))),
        }
    }

    pub fn remove_instance(&mut self, index: usize) -> Result<Instance> {
        if index >= self.instances.len() {
            return Err(CoreError::Validation(format!(
                "instance index {} out of bounds ({} instances)",
                index,
                self.instances.len()
            )));
        }
        Ok(self.instances.remove(index))
    }

    /// Check the structural invariants. Useful after loading persisted
    /// content that predates the invariant-preserving edit methods.
    pub fn validate(&self) -> Result<()> {
        let field_count = self.criteria.context_fields.len();
        for instance in &self.instances {
            if instance.context_variables.len() != field_count {
                return Err(CoreError::Validation(format!(
                    "instance {} has {} context variables, criteria has {} fields",
                    instance.id,
                    instance.context_variables.len(),
                    field_count
                )));
            }
            if instance.eval_type() != self.eval_type {
                return Err(CoreError::Validation(format!(
                    "instance {} is {} in a {} test case",
                    instance.id,
                    instance.eval_type(),
                    self.eval_type
                )));
            }
        }
        if self.eval_type == EvaluationType::Pairwise {
            let count = self.system_count();
            for instance in &self.instances {
                if instance.responses.system_count() != count {
                    return Err(CoreError::Validation(format!(
                        "instance {} has {} responses, expected {}",
                        instance.id,
                        instance.responses.system_count(),
                        count
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_fields_stay_in_lock_step() {
        let mut test_case = TestCase::empty(EvaluationType::Direct);
        test_case.push_empty_instance();

        test_case.add_context_field("Reference");
        assert_eq!(test_case.criteria.context_fields.len(), 2);
        for instance in &test_case.instances {
            assert_eq!(instance.context_variables.len(), 2);
            assert_eq!(instance.context_variables[1].name, "Reference");
        }

        test_case.remove_context_field(0).unwrap();
        assert_eq!(test_case.criteria.context_fields, vec!["Reference"]);
        for instance in &test_case.instances {
            assert_eq!(instance.context_variables.len(), 1);
        }
        test_case.validate().unwrap();
    }

    #[test]
    fn test_system_columns_added_and_removed_everywhere() {
        let mut test_case = TestCase::empty(EvaluationType::Pairwise);
        test_case.push_empty_instance();
        assert_eq!(test_case.system_count(), 2);

        test_case.add_system().unwrap();
        assert_eq!(test_case.system_count(), 3);

        // Fill one column so removal is observable.
        for instance in &mut test_case.instances {
            if let Responses::Pairwise { responses } = &mut instance.responses {
                responses[1] = "middle".to_string();
            }
        }
        test_case.remove_system(1).unwrap();
        assert_eq!(test_case.system_count(), 2);
        for instance in &test_case.instances {
            if let Responses::Pairwise { responses } = &instance.responses {
                assert!(responses.iter().all(|r| r.is_empty()));
            }
        }
        test_case.validate().unwrap();
    }

    #[test]
    fn test_add_system_rejected_for_direct() {
        let mut test_case = TestCase::empty(EvaluationType::Direct);
        assert!(test_case.add_system().is_err());
    }

    #[test]
    fn test_instance_id_is_stable_across_replace() {
        let mut test_case = TestCase::empty(EvaluationType::Direct);
        let id = test_case.instances[0].id;

        let mut edited = test_case.instances[0].clone();
        edited.expected_result = "Yes".to_string();
        test_case.replace_instance(0, edited).unwrap();
        assert_eq!(test_case.instances[0].id, id);
        assert_eq!(test_case.instances[0].expected_result, "Yes");
    }
}
