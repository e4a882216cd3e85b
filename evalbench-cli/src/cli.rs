//! CLI argument definitions

use clap::{Parser, Subcommand};

use crate::commands::{
    import::ImportCommand, run::RunCommand, show::ShowCommand, test_cases::TestCaseCommands,
};
use crate::output::OutputFormat;

/// EvalBench: run LLM-as-judge evaluations over test cases.
#[derive(Debug, Parser)]
#[command(name = "evalbench", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend API URL override
    #[arg(long, global = true, env = "EVALBENCH_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, global = true, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an evaluation over a test-case file
    Run(RunCommand),

    /// Inspect a test-case file's instances and results
    Show(ShowCommand),

    /// Build a test case from a CSV or JSON data file
    Import(ImportCommand),

    /// Save or delete test cases on the backend
    #[command(subcommand, name = "test-case")]
    TestCase(TestCaseCommands),
}
