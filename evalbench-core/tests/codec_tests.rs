use evalbench_core::domain::*;
use evalbench_core::wire::*;
use pretty_assertions::assert_eq;
use serde_json::json;

// ===== Criteria Codec Tests =====

#[test]
fn test_criteria_round_trip_with_options() {
    let original = Criteria {
        name: "answer_relevance".to_string(),
        description: "Does the response answer the question?".to_string(),
        prediction_field: "Response".to_string(),
        context_fields: vec!["Question".to_string()],
        options: Some(vec![
            CriteriaOption {
                name: "Yes".to_string(),
                description: "The response answers the question".to_string(),
            },
            CriteriaOption {
                name: "No".to_string(),
                description: "The response is off-topic".to_string(),
            },
        ]),
    };

    let wire = WireCriteria::from(&original);
    assert_eq!(Criteria::from(wire), original);
}

#[test]
fn test_criteria_wire_and_domain_casing_differ() {
    let criteria = Criteria::empty();
    let domain_json = serde_json::to_value(&criteria).unwrap();
    let wire_json = serde_json::to_value(WireCriteria::from(&criteria)).unwrap();

    assert!(domain_json.get("predictionField").is_some());
    assert!(domain_json.get("prediction_field").is_none());
    assert!(wire_json.get("prediction_field").is_some());
    assert!(wire_json.get("predictionField").is_none());
}

// ===== Instance Codec Tests =====

#[test]
fn test_persisted_instance_uses_flat_response_key() {
    let mut instance = Instance::empty_direct(&["Context".to_string()]);
    instance.responses = Responses::Direct {
        response: "an answer".to_string(),
    };

    let value = serde_json::to_value(&instance).unwrap();
    assert_eq!(value["response"], "an answer");
    assert!(value.get("responses").is_none());

    let parsed: Instance = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, instance);
}

#[test]
fn test_persisted_pairwise_instance_round_trip() {
    let mut instance = Instance::empty_pairwise(&["Context".to_string()], 3);
    instance.responses = Responses::Pairwise {
        responses: vec!["a".to_string(), "b".to_string(), "c".to_string()],
    };

    let value = serde_json::to_value(&instance).unwrap();
    assert!(value.get("response").is_none());
    let parsed: Instance = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, instance);
}

// ===== Result Codec Tests =====

#[test]
fn test_persisted_result_discriminates_by_shape() {
    let direct: InstanceResult = serde_json::from_value(json!({
        "selectedOption": "Yes",
        "explanation": "fits",
        "positionalBias": null,
    }))
    .unwrap();
    assert_eq!(direct.eval_type(), EvaluationType::Direct);

    let pairwise: InstanceResult = serde_json::from_value(json!({
        "selectedOption": "system_1",
        "perSystemResults": [{
            "ranking": 0,
            "winrate": 1.0,
            "contestResults": [true],
            "comparedTo": [1],
            "explanations": ["better"],
            "positionalBias": [false],
        }],
    }))
    .unwrap();
    assert_eq!(pairwise.eval_type(), EvaluationType::Pairwise);
}

#[test]
fn test_wire_result_decode_matches_expected_domain_value() {
    let wire = json!({
        "selected_option": "Yes",
        "explanation": "grounded in the reference",
        "feedback": "none",
        "score": 0.92,
        "positional_bias": {
            "detected": false,
            "result": {"selected_option": "Yes", "explanation": "stable"},
        },
    });

    let decoded = decode_instance_result(wire, EvaluationType::Direct).unwrap();
    let direct = decoded.as_direct().unwrap();
    assert_eq!(direct.selected_option, "Yes");
    assert_eq!(direct.score, Some(0.92));
    let bias = direct.positional_bias.as_ref().unwrap();
    assert!(!bias.detected);
    assert_eq!(bias.result.explanation, "stable");
}

#[test]
fn test_pairwise_rankings_form_a_permutation() {
    let wire = json!({
        "selected_option": "system_2",
        "per_system_results": [
            {"ranking": 2, "winrate": 0.0, "contest_results": [false, false], "compared_to": [2, 3], "explanations": ["", ""]},
            {"ranking": 0, "winrate": 1.0, "contest_results": [true, true], "compared_to": [1, 3], "explanations": ["", ""]},
            {"ranking": 1, "winrate": 0.5, "contest_results": [true, false], "compared_to": [1, 2], "explanations": ["", ""]},
        ],
    });
    let decoded = decode_instance_result(wire, EvaluationType::Pairwise).unwrap();
    let pairwise = decoded.as_pairwise().unwrap();
    assert!(pairwise.has_valid_rankings());
    assert_eq!(pairwise.winner_index(), Some(1));
}

// ===== Versioned Persistence Tests =====

#[test]
fn test_full_test_case_persistence_round_trip() {
    let mut test_case = TestCase::empty(EvaluationType::Direct);
    test_case.id = Some(12);
    test_case.name = "groundedness".to_string();
    test_case.evaluator = Some(Evaluator {
        name: "llama-3-70b".to_string(),
        eval_type: EvaluationType::Direct,
        provider: ModelProvider::Watsonx,
    });
    test_case.add_context_field("Reference");
    test_case.instances[0].responses = Responses::Direct {
        response: "an answer".to_string(),
    };
    test_case.instances[0].result = Some(InstanceResult::Direct(DirectResult {
        selected_option: "Yes".to_string(),
        positional_bias_option: None,
        explanation: "grounded".to_string(),
        feedback: None,
        score: Some(0.8),
        positional_bias: None,
        metadata: None,
    }));

    let content = encode_content(&test_case).unwrap();
    let parsed = parse_content(Some(12), "groundedness", &content).unwrap();
    assert_eq!(parsed, test_case);
    parsed.validate().unwrap();
}

#[test]
fn test_unversioned_content_is_treated_as_v0() {
    let content = json!({
        "instances": [],
        "criteria": {"name": "quality", "description": "Good?"},
        "type": "direct",
        "responseVariableName": "Answer",
        "contextVariableNames": ["Question"],
    })
    .to_string();

    let parsed = parse_content(None, "old", &content).unwrap();
    assert_eq!(parsed.criteria.prediction_field, "Answer");
    assert_eq!(parsed.criteria.context_fields, vec!["Question"]);
}

#[test]
fn test_record_carries_content_string() {
    let test_case = TestCase::empty(EvaluationType::Direct);
    let record = TestCaseRecord {
        id: 3,
        user_id: 7,
        content: encode_content(&test_case).unwrap(),
        name: "draft".to_string(),
    };
    let value = serde_json::to_value(&record).unwrap();
    assert!(value["content"].is_string());

    let reparsed = parse_content(Some(record.id), &record.name, &record.content).unwrap();
    assert_eq!(reparsed.eval_type, EvaluationType::Direct);
}
