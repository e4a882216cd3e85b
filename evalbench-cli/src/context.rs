//! CLI execution context

use anyhow::Result;
use evalbench_core::domain::ProviderCredentials;
use evalbench_sdk::{EvalBenchClient, SdkConfig};

use crate::cli::Cli;
use crate::config::{CliConfig, DEFAULT_API_URL};
use crate::output::{OutputFormat, OutputWriter};

/// Execution context for CLI commands
pub struct Context {
    /// CLI configuration
    pub config: CliConfig,

    /// Output format
    pub output_format: OutputFormat,

    /// Output writer
    pub output: OutputWriter,

    /// Verbose mode
    pub verbose: bool,

    /// API URL override from the command line
    pub api_url_override: Option<String>,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = CliConfig::load().unwrap_or_default();
        let output = OutputWriter::new(cli.output, cli.no_color);

        Ok(Self {
            config,
            output_format: cli.output,
            output,
            verbose: cli.verbose,
            api_url_override: cli.api_url.clone(),
        })
    }

    /// Get the effective API URL
    pub fn api_url(&self) -> &str {
        self.api_url_override
            .as_deref()
            .or(self.config.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// The user name sent with test-case saves
    pub fn user(&self) -> &str {
        self.config.user.as_deref().unwrap_or("evalbench")
    }

    /// Default page size for result tables
    pub fn page_size(&self) -> usize {
        self.config.page_size.unwrap_or(10)
    }

    /// Credentials for the evaluator providers, from the config file
    pub fn provider_credentials(&self) -> ProviderCredentials {
        self.config.provider_credentials()
    }

    /// Build an SDK client for the effective API URL
    pub fn client(&self) -> Result<EvalBenchClient> {
        let config = SdkConfig::new(self.api_url()).with_logging(self.verbose);
        Ok(EvalBenchClient::new(config)?)
    }
}
