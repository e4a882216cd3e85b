//! Import command: build a test case from a CSV or JSON data file.

use anyhow::{bail, Context as _, Result};
use clap::{Args, ValueEnum};
use evalbench_core::domain::{
    Criteria, EvaluationType, Evaluator, ModelProvider, TestCase,
};
use evalbench_core::import::{read_csv, read_json, records_to_instances, ImportRecord};
use std::path::PathBuf;

use crate::context::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EvalTypeArg {
    Direct,
    Pairwise,
}

impl From<EvalTypeArg> for EvaluationType {
    fn from(arg: EvalTypeArg) -> Self {
        match arg {
            EvalTypeArg::Direct => EvaluationType::Direct,
            EvalTypeArg::Pairwise => EvaluationType::Pairwise,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportFormat {
    Csv,
    Json,
}

/// Build a test case from a CSV or JSON data file
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Data file: CSV with a header row, or a JSON array of flat objects
    pub file: PathBuf,

    /// Input format (inferred from the file extension when omitted)
    #[arg(long, value_enum)]
    pub format: Option<ImportFormat>,

    /// Evaluation type of the new test case
    #[arg(long, value_enum, default_value_t = EvalTypeArg::Direct)]
    pub eval_type: EvalTypeArg,

    /// Context field, in order (repeatable; inferred from the data columns
    /// when omitted)
    #[arg(long = "context-field")]
    pub context_fields: Vec<String>,

    /// Label of the judged field
    #[arg(long, default_value = "Response")]
    pub prediction_field: String,

    /// Number of compared systems (pairwise only)
    #[arg(long, default_value_t = 2)]
    pub systems: usize,

    /// Evaluator model name
    #[arg(long)]
    pub evaluator: Option<String>,

    /// Evaluator provider wire name (e.g. watsonx, open-ai)
    #[arg(long, value_parser = parse_provider)]
    pub provider: Option<ModelProvider>,

    /// Where to write the test-case file (stdout when omitted)
    #[arg(long = "out")]
    pub out: Option<PathBuf>,
}

fn parse_provider(input: &str) -> Result<ModelProvider, String> {
    serde_json::from_value(serde_json::Value::String(input.to_string()))
        .map_err(|_| format!("unknown provider '{input}'"))
}

pub fn execute(ctx: &Context, cmd: ImportCommand) -> Result<()> {
    let data = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;

    let format = match cmd.format {
        Some(format) => format,
        None => match cmd.file.extension().and_then(|e| e.to_str()) {
            Some("csv") => ImportFormat::Csv,
            Some("json") => ImportFormat::Json,
            other => bail!(
                "cannot infer format from extension {:?}; pass --format",
                other.unwrap_or("")
            ),
        },
    };
    let records = match format {
        ImportFormat::Csv => read_csv(&data)?,
        ImportFormat::Json => read_json(&data)?,
    };
    if records.is_empty() {
        bail!("{} contains no data rows", cmd.file.display());
    }

    let eval_type = EvaluationType::from(cmd.eval_type);
    let mut test_case = TestCase::empty(eval_type);
    test_case.name = cmd
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    test_case.criteria = build_criteria(&cmd, eval_type, &records);
    test_case.instances =
        records_to_instances(&records, &test_case.criteria, eval_type, cmd.systems)?;
    match (cmd.evaluator, cmd.provider) {
        (Some(name), Some(provider)) => {
            test_case.evaluator = Some(Evaluator::new(name, eval_type, provider));
        }
        (Some(_), None) | (None, Some(_)) => {
            bail!("--evaluator and --provider must be given together");
        }
        (None, None) => {}
    }
    test_case.validate()?;

    let count = test_case.instances.len();
    match &cmd.out {
        Some(path) => {
            super::save_test_case(path, &test_case)?;
            ctx.output.success(&format!(
                "Imported {count} instance(s) into {}",
                path.display()
            ));
        }
        None => {
            println!("{}", evalbench_core::wire::encode_content(&test_case)?);
        }
    }
    Ok(())
}

fn build_criteria(
    cmd: &ImportCommand,
    eval_type: EvaluationType,
    records: &[ImportRecord],
) -> Criteria {
    let mut criteria = Criteria::empty_for(eval_type);
    criteria.prediction_field = cmd.prediction_field.clone();
    criteria.context_fields = if cmd.context_fields.is_empty() {
        infer_context_fields(cmd, records)
    } else {
        cmd.context_fields.clone()
    };
    criteria
}

/// Every column that is not a response or the expected result is treated as
/// a context field.
fn infer_context_fields(cmd: &ImportCommand, records: &[ImportRecord]) -> Vec<String> {
    records[0]
        .keys()
        .filter(|column| {
            column.as_str() != cmd.prediction_field
                && column.as_str() != "response"
                && column.as_str() != "expected_result"
                && !is_numbered_response(column)
        })
        .cloned()
        .collect()
}

fn is_numbered_response(column: &str) -> bool {
    column
        .strip_prefix("response_")
        .is_some_and(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parses_wire_names() {
        assert_eq!(parse_provider("watsonx").unwrap(), ModelProvider::Watsonx);
        assert_eq!(parse_provider("open-ai").unwrap(), ModelProvider::OpenAi);
        assert!(parse_provider("not-a-provider").is_err());
    }

    #[test]
    fn test_numbered_response_columns() {
        assert!(is_numbered_response("response_1"));
        assert!(is_numbered_response("response_12"));
        assert!(!is_numbered_response("response_a"));
        assert!(!is_numbered_response("responses"));
    }
}
