//! Test-case persistence commands.

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;
use evalbench_core::wire::{encode_content, TestCaseRecord};
use std::path::PathBuf;

use crate::context::Context;

/// Save or delete test cases on the backend
#[derive(Debug, Subcommand)]
pub enum TestCaseCommands {
    /// Save a test-case file to the backend
    Save {
        /// Test-case file (persisted content JSON)
        file: PathBuf,

        /// Name to save under (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,

        /// Id of an existing saved test case to overwrite
        #[arg(long)]
        id: Option<i64>,
    },

    /// Delete a saved test case by id
    Delete {
        /// Id of the saved test case
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn execute(ctx: &Context, cmd: TestCaseCommands) -> Result<()> {
    match cmd {
        TestCaseCommands::Save { file, name, id } => save(ctx, &file, name, id).await,
        TestCaseCommands::Delete { id, force } => delete(ctx, id, force).await,
    }
}

async fn save(ctx: &Context, file: &PathBuf, name: Option<String>, id: Option<i64>) -> Result<()> {
    let test_case = super::load_test_case(file)?;
    let record = TestCaseRecord {
        // The backend treats a negative id as "insert".
        id: id.unwrap_or(-1),
        user_id: -1,
        content: encode_content(&test_case)?,
        name: name.unwrap_or_else(|| test_case.name.clone()),
    };

    let client = ctx.client()?;
    let saved = client.test_cases().save(&record, ctx.user()).await?;
    ctx.output
        .success(&format!("Saved test case '{}' (id {})", saved.name, saved.id));
    Ok(())
}

async fn delete(ctx: &Context, id: i64, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete test case {id}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Canceled");
            return Ok(());
        }
    }

    let client = ctx.client()?;
    client.test_cases().delete(id).await?;
    ctx.output.success(&format!("Deleted test case {id}"));
    Ok(())
}
