use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::domain::{
    DirectResult, EvaluationType, InstanceResult, PairwiseResult, PerSystemResult, PositionalBias,
};
use crate::error::Result;

/// Positional-bias recursion cap. The backend has only ever been observed to
/// nest one level; anything deeper is truncated rather than decoded.
pub const MAX_POSITIONAL_BIAS_DEPTH: usize = 8;

/// Wire shape of the recursive positional-bias report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WirePositionalBias<T> {
    pub detected: bool,
    pub result: Box<T>,
}

/// Wire shape of a direct result. Every field defaults so decoding is total
/// on well-typed input; validation is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WireDirectResult {
    #[serde(default)]
    pub selected_option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional_bias_option: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional_bias: Option<WirePositionalBias<WireDirectResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl WireDirectResult {
    pub fn into_domain(self) -> DirectResult {
        self.into_domain_at(0)
    }

    fn into_domain_at(self, depth: usize) -> DirectResult {
        let positional_bias = self.positional_bias.and_then(|bias| {
            if depth >= MAX_POSITIONAL_BIAS_DEPTH {
                warn!(depth, "positional bias nested beyond cap, truncating");
                return None;
            }
            Some(PositionalBias {
                detected: bias.detected,
                result: Box::new(bias.result.into_domain_at(depth + 1)),
            })
        });
        DirectResult {
            selected_option: self.selected_option,
            positional_bias_option: self.positional_bias_option,
            explanation: self.explanation,
            feedback: self.feedback,
            score: self.score,
            positional_bias,
            metadata: self.metadata,
        }
    }
}

impl From<&DirectResult> for WireDirectResult {
    fn from(result: &DirectResult) -> Self {
        Self {
            selected_option: result.selected_option.clone(),
            positional_bias_option: result.positional_bias_option.clone(),
            explanation: result.explanation.clone(),
            feedback: result.feedback.clone(),
            score: result.score,
            positional_bias: result.positional_bias.as_ref().map(|bias| {
                WirePositionalBias {
                    detected: bias.detected,
                    result: Box::new(WireDirectResult::from(bias.result.as_ref())),
                }
            }),
            metadata: result.metadata.clone(),
        }
    }
}

/// Wire shape of one system's pairwise outcome. An older backend version
/// did not emit `positional_bias`; decoding defaults it to all-false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WirePerSystemResult {
    #[serde(default)]
    pub contest_results: Vec<bool>,
    #[serde(default)]
    pub winrate: f64,
    #[serde(default)]
    pub ranking: usize,
    #[serde(default)]
    pub compared_to: Vec<usize>,
    #[serde(default)]
    pub explanations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional_bias: Option<Vec<bool>>,
}

impl WirePerSystemResult {
    pub fn into_domain(self) -> PerSystemResult {
        let contest_count = self.contest_results.len();
        PerSystemResult {
            ranking: self.ranking,
            winrate: self.winrate,
            positional_bias: self
                .positional_bias
                .unwrap_or_else(|| vec![false; contest_count]),
            contest_results: self.contest_results,
            compared_to: self.compared_to,
            explanations: self.explanations,
        }
    }
}

/// Wire shape of a pairwise result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WirePairwiseResult {
    #[serde(default)]
    pub selected_option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_system_results: Option<Vec<WirePerSystemResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional_bias: Option<WirePositionalBias<WirePairwiseResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl WirePairwiseResult {
    pub fn into_domain(self) -> PairwiseResult {
        self.into_domain_at(0)
    }

    fn into_domain_at(self, depth: usize) -> PairwiseResult {
        let positional_bias = self.positional_bias.and_then(|bias| {
            if depth >= MAX_POSITIONAL_BIAS_DEPTH {
                warn!(depth, "positional bias nested beyond cap, truncating");
                return None;
            }
            Some(PositionalBias {
                detected: bias.detected,
                result: Box::new(bias.result.into_domain_at(depth + 1)),
            })
        });
        PairwiseResult {
            selected_option: self.selected_option,
            per_system_results: self
                .per_system_results
                .map(|results| results.into_iter().map(|r| r.into_domain()).collect()),
            positional_bias,
            metadata: self.metadata,
        }
    }
}

/// Decode a raw wire result, dispatching on the test case's evaluation
/// type. The wire payload itself is untagged; the type tag travels in the
/// request envelope.
pub fn decode_instance_result(
    value: serde_json::Value,
    eval_type: EvaluationType,
) -> Result<InstanceResult> {
    match eval_type {
        EvaluationType::Direct => {
            let wire: WireDirectResult = serde_json::from_value(value)?;
            Ok(InstanceResult::Direct(wire.into_domain()))
        }
        EvaluationType::Pairwise => {
            let wire: WirePairwiseResult = serde_json::from_value(value)?;
            Ok(InstanceResult::Pairwise(wire.into_domain()))
        }
    }
}
