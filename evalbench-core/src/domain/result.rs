use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::evaluator::EvaluationType;

/// Positional-bias report attached to a result: `detected` records whether
/// swapping the option/response order changed the judge's decision, and
/// `result` carries the counterfactual result of the swapped run.
///
/// The nesting is self-referential; the backend has only ever been observed
/// to emit one level, and the wire decoder caps the depth regardless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionalBias<T> {
    pub detected: bool,
    pub result: Box<T>,
}

/// Result of judging a single response against a rubric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectResult {
    pub selected_option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional_bias_option: Option<String>,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub positional_bias: Option<PositionalBias<DirectResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Per-system outcome of a pairwise contest: how one compared system fared
/// against each opponent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerSystemResult {
    /// 0-based rank, lower is better. Across one instance the rankings form
    /// a permutation of `0..n`.
    pub ranking: usize,
    /// Fraction of contests won, in `[0, 1]`.
    pub winrate: f64,
    /// Win/loss against each opponent, parallel to `compared_to`.
    pub contest_results: Vec<bool>,
    /// Opponent system indices, parallel to `contest_results`.
    pub compared_to: Vec<usize>,
    /// Judge explanation per contest.
    pub explanations: Vec<String>,
    /// Per-contest positional-bias flag, parallel to `contest_results`.
    pub positional_bias: Vec<bool>,
}

/// Result of ranking several systems' responses against each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseResult {
    pub selected_option: String,
    #[serde(default)]
    pub per_system_results: Option<Vec<PerSystemResult>>,
    #[serde(default)]
    pub positional_bias: Option<PositionalBias<PairwiseResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl PairwiseResult {
    /// The decoded rankings, one per compared system, if present.
    pub fn rankings(&self) -> Option<Vec<usize>> {
        self.per_system_results
            .as_ref()
            .map(|results| results.iter().map(|r| r.ranking).collect())
    }

    /// Whether the rankings form a permutation of `0..n`.
    pub fn has_valid_rankings(&self) -> bool {
        match self.rankings() {
            Some(mut rankings) => {
                rankings.sort_unstable();
                rankings.iter().enumerate().all(|(i, &r)| i == r)
            }
            None => true,
        }
    }

    /// The index of the top-ranked system, if any.
    pub fn winner_index(&self) -> Option<usize> {
        self.per_system_results
            .as_ref()?
            .iter()
            .position(|r| r.ranking == 0)
    }
}

/// An evaluation result, tagged by evaluation type.
///
/// Persisted without an explicit tag for compatibility with stored test-case
/// content: the direct variant is distinguished by its mandatory
/// `explanation` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InstanceResult {
    Direct(DirectResult),
    Pairwise(PairwiseResult),
}

impl InstanceResult {
    pub fn eval_type(&self) -> EvaluationType {
        match self {
            Self::Direct(_) => EvaluationType::Direct,
            Self::Pairwise(_) => EvaluationType::Pairwise,
        }
    }

    pub fn as_direct(&self) -> Option<&DirectResult> {
        match self {
            Self::Direct(result) => Some(result),
            Self::Pairwise(_) => None,
        }
    }

    pub fn as_pairwise(&self) -> Option<&PairwiseResult> {
        match self {
            Self::Pairwise(result) => Some(result),
            Self::Direct(_) => None,
        }
    }

    /// Whether positional bias was detected at the top level.
    pub fn positional_bias_detected(&self) -> bool {
        match self {
            Self::Direct(r) => r.positional_bias.as_ref().is_some_and(|b| b.detected),
            Self::Pairwise(r) => r.positional_bias.as_ref().is_some_and(|b| b.detected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_system(ranking: usize) -> PerSystemResult {
        PerSystemResult {
            ranking,
            winrate: 0.5,
            contest_results: vec![true],
            compared_to: vec![1 - ranking.min(1)],
            explanations: vec!["won".to_string()],
            positional_bias: vec![false],
        }
    }

    #[test]
    fn test_rankings_permutation() {
        let result = PairwiseResult {
            selected_option: "system_1".to_string(),
            per_system_results: Some(vec![per_system(1), per_system(0)]),
            positional_bias: None,
            metadata: None,
        };
        assert!(result.has_valid_rankings());
        assert_eq!(result.winner_index(), Some(1));

        let broken = PairwiseResult {
            per_system_results: Some(vec![per_system(0), per_system(0)]),
            ..result
        };
        assert!(!broken.has_valid_rankings());
    }

    #[test]
    fn test_untagged_persistence_distinguishes_variants() {
        let direct = InstanceResult::Direct(DirectResult {
            selected_option: "Yes".to_string(),
            positional_bias_option: None,
            explanation: "clear".to_string(),
            feedback: None,
            score: Some(1.0),
            positional_bias: None,
            metadata: None,
        });
        let json = serde_json::to_string(&direct).unwrap();
        let back: InstanceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.eval_type(), EvaluationType::Direct);

        let pairwise = InstanceResult::Pairwise(PairwiseResult {
            selected_option: "system_1".to_string(),
            per_system_results: Some(vec![per_system(0), per_system(1)]),
            positional_bias: None,
            metadata: None,
        });
        let json = serde_json::to_string(&pairwise).unwrap();
        let back: InstanceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.eval_type(), EvaluationType::Pairwise);
    }
}
