use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a test case scores a single response (direct) or ranks several
/// compared systems against each other (pairwise).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationType {
    Direct,
    Pairwise,
}

impl std::fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Pairwise => write!(f, "pairwise"),
        }
    }
}

/// Model providers the backend can route evaluator calls through.
///
/// The serialized names are the backend's wire identifiers and must not
/// change independently of it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ModelProvider {
    #[serde(rename = "watsonx")]
    Watsonx,
    #[serde(rename = "open-ai")]
    OpenAi,
    #[serde(rename = "open-ai-like")]
    OpenAiLike,
    #[serde(rename = "rits")]
    Rits,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "hf-local")]
    LocalHf,
    #[serde(rename = "together-ai")]
    TogetherAi,
    #[serde(rename = "aws")]
    Aws,
    #[serde(rename = "vertex-ai")]
    VertexAi,
    #[serde(rename = "replicate")]
    Replicate,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Watsonx => "watsonx",
            Self::OpenAi => "open-ai",
            Self::OpenAiLike => "open-ai-like",
            Self::Rits => "rits",
            Self::Azure => "azure",
            Self::LocalHf => "hf-local",
            Self::TogetherAi => "together-ai",
            Self::Aws => "aws",
            Self::VertexAi => "vertex-ai",
            Self::Replicate => "replicate",
            Self::Ollama => "ollama",
        };
        write!(f, "{}", name)
    }
}

/// The judge model a test case is evaluated with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evaluator {
    pub name: String,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    pub provider: ModelProvider,
}

impl Evaluator {
    pub fn new(
        name: impl Into<String>,
        eval_type: EvaluationType,
        provider: ModelProvider,
    ) -> Self {
        Self {
            name: name.into(),
            eval_type,
            provider,
        }
    }
}

/// Credentials forwarded verbatim to the backend, keyed by provider and then
/// by the provider's own field names (api_key, api_base, project_id, ...).
/// This layer never interprets them.
pub type ProviderCredentials = HashMap<ModelProvider, HashMap<String, String>>;
