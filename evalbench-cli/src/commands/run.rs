//! Run command: evaluate a test-case file against the backend.

use anyhow::{bail, Result};
use clap::Args;
use evalbench_core::session::{BeginOptions, Completion, EvaluationSession};
use evalbench_sdk::{EvaluationRunner, RunResult};
use std::path::PathBuf;

use crate::context::Context;

/// Run an evaluation over a test-case file
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Test-case file (persisted content JSON)
    pub file: PathBuf,

    /// Page of results to print (0-based)
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write the results back into the test-case file
    #[arg(long)]
    pub save: bool,
}

pub async fn execute(ctx: &Context, cmd: RunCommand) -> Result<()> {
    let test_case = super::load_test_case(&cmd.file)?;
    let mut session = EvaluationSession::new(test_case);
    let ids = session.test_case().instance_ids();

    let runner = EvaluationRunner::new(ctx.client()?.evaluations().clone());
    let options = BeginOptions {
        credentials: ctx.provider_credentials(),
        predefined_criteria: &[],
    };

    let spinner = ctx.output.spinner(&format!(
        "Evaluating {} instance(s)...",
        session.test_case().instances.len()
    ));
    let result = runner.run(&mut session, &ids, options).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match result? {
        RunResult::Rejected(reason) => {
            ctx.output.error(&reason.to_string());
            bail!("evaluation not started");
        }
        RunResult::Finished(Completion::Failed { message }) => {
            ctx.output.error(&message);
            bail!("evaluation failed");
        }
        RunResult::Finished(Completion::Discarded) => {
            // Single run, single ticket; a stale generation here means a bug.
            bail!("evaluation response was discarded as stale");
        }
        RunResult::Finished(Completion::Merged { updated }) => {
            ctx.output
                .success(&format!("Evaluated {updated} instance(s)"));
        }
    }

    if cmd.save {
        super::save_test_case(&cmd.file, session.test_case())?;
        ctx.output
            .info(&format!("Results saved to {}", cmd.file.display()));
    }

    let page_size = cmd.page_size.unwrap_or_else(|| ctx.page_size());
    super::show::print_instance_page(ctx, session.test_case(), cmd.page, page_size)
}
