//! CLI configuration management

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use evalbench_core::domain::{ModelProvider, ProviderCredentials};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Default backend URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration, stored as TOML under the user's config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Backend API URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// User name sent with test-case saves
    #[serde(default)]
    pub user: Option<String>,

    /// Default page size for result tables
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Per-provider credentials, keyed by the provider's wire name
    /// (e.g. `watsonx`, `open-ai`), each a map of credential fields.
    #[serde(default)]
    pub credentials: HashMap<String, HashMap<String, String>>,
}

impl CliConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: CliConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "evalbench", "evalbench-cli")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve the configured credentials into typed provider keys.
    /// Entries with unknown provider names are skipped.
    pub fn provider_credentials(&self) -> ProviderCredentials {
        self.credentials
            .iter()
            .filter_map(|(name, fields)| {
                let provider: ModelProvider =
                    serde_json::from_value(serde_json::Value::String(name.clone())).ok()?;
                Some((provider, fields.clone()))
            })
            .collect()
    }
}
