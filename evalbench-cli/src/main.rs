//! EvalBench command-line interface.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod context;
mod output;

use cli::{Cli, Command};
use context::Context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli).await {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "evalbench=debug,evalbench_sdk=debug,evalbench_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli)?;
    match cli.command {
        Command::Run(cmd) => commands::run::execute(&ctx, cmd).await,
        Command::Show(cmd) => commands::show::execute(&ctx, cmd),
        Command::Import(cmd) => commands::import::execute(&ctx, cmd),
        Command::TestCase(cmd) => commands::test_cases::execute(&ctx, cmd).await,
    }
}
