use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    Criteria, EvaluationType, Evaluator, Instance, SyntheticGenerationConfig, TestCase,
};
use crate::error::{CoreError, Result};

/// Version written by [`encode_content`]. Older content is migrated forward
/// on load; newer content is rejected.
pub const CURRENT_FORMAT_VERSION: u32 = 2;

/// The persisted test-case payload, stored by the backend as an opaque JSON
/// string. `pipeline` duplicates `evaluator` for compatibility with older
/// readers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseContent {
    pub instances: Vec<Instance>,
    pub evaluator: Option<Evaluator>,
    pub criteria: Criteria,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    pub pipeline: Option<Evaluator>,
    #[serde(default)]
    pub synthetic_generation_config: SyntheticGenerationConfig,
    #[serde(default)]
    pub content_format_version: u32,
}

/// The backend's test-case row. `content` is the JSON string produced by
/// [`encode_content`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCaseRecord {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub name: String,
}

/// Serialize a test case into the persisted content string at the current
/// format version.
pub fn encode_content(test_case: &TestCase) -> Result<String> {
    let content = TestCaseContent {
        instances: test_case.instances.clone(),
        evaluator: test_case.evaluator.clone(),
        criteria: test_case.criteria.clone(),
        eval_type: test_case.eval_type,
        pipeline: test_case.evaluator.clone(),
        synthetic_generation_config: test_case.synthetic_generation_config.clone(),
        content_format_version: CURRENT_FORMAT_VERSION,
    };
    Ok(serde_json::to_string(&content)?)
}

/// Parse a persisted content string into a test case, migrating older
/// format versions forward.
pub fn parse_content(id: Option<i64>, name: impl Into<String>, content: &str) -> Result<TestCase> {
    let mut value: Value = serde_json::from_str(content)?;

    let found = value
        .get("contentFormatVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    if found > CURRENT_FORMAT_VERSION {
        return Err(CoreError::UnsupportedVersion {
            found,
            current: CURRENT_FORMAT_VERSION,
        });
    }
    if found < CURRENT_FORMAT_VERSION {
        debug!(found, current = CURRENT_FORMAT_VERSION, "migrating test case content");
    }
    if found < 1 {
        migrate_v0_to_v1(&mut value);
    }
    if found < 2 {
        migrate_v1_to_v2(&mut value);
    }

    let content: TestCaseContent = serde_json::from_value(value)?;
    Ok(TestCase {
        id,
        name: name.into(),
        eval_type: content.eval_type,
        criteria: content.criteria,
        instances: content.instances,
        evaluator: content.evaluator.or(content.pipeline),
        synthetic_generation_config: content.synthetic_generation_config,
    })
}

/// v0 carried the rubric's field names at the top level instead of on the
/// criteria object.
fn migrate_v0_to_v1(value: &mut Value) {
    let response_variable = value
        .get("responseVariableName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let context_variables = value.get("contextVariableNames").cloned();

    if let Some(criteria) = value.get_mut("criteria").and_then(Value::as_object_mut) {
        if let Some(name) = response_variable {
            criteria
                .entry("predictionField")
                .or_insert(Value::String(name));
        }
        if let Some(names) = context_variables {
            criteria.entry("contextFields").or_insert(names);
        }
    }
    if let Some(root) = value.as_object_mut() {
        root.remove("responseVariableName");
        root.remove("contextVariableNames");
    }
}

/// v1 stored direct results in a legacy shape: `option` instead of
/// `selectedOption`, a scalar `certainty` instead of `score`, and a flat
/// `{detected, option, explanation}` positional-bias object. The legacy
/// shape only ever existed for direct evaluation; pairwise results already
/// match the current shape and must pass through untouched.
fn migrate_v1_to_v2(value: &mut Value) {
    if value.get("type").and_then(Value::as_str) != Some("direct") {
        return;
    }
    let instances = match value.get_mut("instances").and_then(Value::as_array_mut) {
        Some(instances) => instances,
        None => return,
    };
    for instance in instances {
        let result = match instance.get_mut("result") {
            Some(result) if !result.is_null() => result,
            _ => continue,
        };
        migrate_legacy_result(result);
    }
}

fn migrate_legacy_result(result: &mut Value) {
    let object = match result.as_object_mut() {
        Some(object) => object,
        None => return,
    };
    if let Some(option) = object.remove("option") {
        object.entry("selectedOption").or_insert(option);
    }
    if let Some(certainty) = object.remove("certainty") {
        object.entry("score").or_insert(certainty);
    }
    object
        .entry("explanation")
        .or_insert(Value::String(String::new()));

    // The legacy flat bias object becomes a one-level nested result.
    let legacy_bias = object
        .get("positionalBias")
        .map(|bias| bias.get("result").is_none() && !bias.is_null())
        .unwrap_or(false);
    if legacy_bias {
        if let Some(bias) = object.remove("positionalBias") {
            let detected = bias.get("detected").and_then(Value::as_bool).unwrap_or(false);
            let option = bias.get("option").cloned().unwrap_or(Value::String(String::new()));
            let explanation = bias
                .get("explanation")
                .cloned()
                .unwrap_or(Value::String(String::new()));
            object.insert(
                "positionalBias".to_string(),
                serde_json::json!({
                    "detected": detected,
                    "result": {
                        "selectedOption": option,
                        "explanation": explanation,
                    },
                }),
            );
        }
    }
}
