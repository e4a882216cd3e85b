//! Show command: inspect a test-case file's instances and results.

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use evalbench_core::domain::{EvaluationType, Instance, Responses, TestCase};
use evalbench_core::pagination::Pager;
use evalbench_core::text::{ordinal_suffix, to_percentage};
use serde::Serialize;
use std::path::PathBuf;

use crate::context::Context;
use crate::output::{
    page_footer, print_field, print_section, truncate_cell, verdict_badge, OutputFormat,
    TableDisplay,
};

/// Inspect a test-case file
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Test-case file (persisted content JSON)
    pub file: PathBuf,

    /// Page of instances to print (0-based)
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,
}

pub fn execute(ctx: &Context, cmd: ShowCommand) -> Result<()> {
    let test_case = super::load_test_case(&cmd.file)?;

    if ctx.output.format() == OutputFormat::Table {
        print_section(&test_case.name);
        print_field("Type", &test_case.eval_type.to_string());
        print_field("Criteria", &test_case.criteria.name);
        if let Some(evaluator) = &test_case.evaluator {
            print_field(
                "Evaluator",
                &format!("{} ({})", evaluator.name, evaluator.provider),
            );
        }
        print_field("Instances", &test_case.instances.len().to_string());
        println!();
    }

    let page_size = cmd.page_size.unwrap_or_else(|| ctx.page_size());
    print_instance_page(ctx, &test_case, cmd.page, page_size)
}

/// Print one page of a test case's instances, with results where present.
pub(crate) fn print_instance_page(
    ctx: &Context,
    test_case: &TestCase,
    page: usize,
    page_size: usize,
) -> Result<()> {
    let mut pager = Pager::new(page_size);
    pager.go_to_page(page, test_case.instances.len());
    let window = pager.page(&test_case.instances);

    match test_case.eval_type {
        EvaluationType::Direct => {
            let rows: Vec<DirectRow> = window
                .iter()
                .enumerate()
                .map(|(local, instance)| DirectRow::new(pager.absolute_index(local), instance))
                .collect();
            ctx.output.write_list(
                &rows,
                &["#", "Response", "Expected", "Verdict", "Score", "Explanation"],
            )?;
        }
        EvaluationType::Pairwise => {
            let rows: Vec<PairwiseRow> = window
                .iter()
                .enumerate()
                .map(|(local, instance)| PairwiseRow::new(pager.absolute_index(local), instance))
                .collect();
            ctx.output
                .write_list(&rows, &["#", "Responses", "Winner", "Rankings"])?;
        }
    }

    if ctx.output.format() == OutputFormat::Table {
        println!(
            "{}",
            page_footer(
                pager.current_page(),
                pager.total_pages(test_case.instances.len()),
                test_case.instances.len(),
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct DirectRow {
    index: usize,
    response: String,
    expected: String,
    verdict: String,
    bias_detected: bool,
    score: Option<f64>,
    explanation: String,
}

impl DirectRow {
    fn new(index: usize, instance: &Instance) -> Self {
        let response = match &instance.responses {
            Responses::Direct { response } => response.clone(),
            Responses::Pairwise { .. } => String::new(),
        };
        let result = instance.result.as_ref().and_then(|r| r.as_direct());
        Self {
            index,
            response,
            expected: instance.expected_result.clone(),
            verdict: result.map(|r| r.selected_option.clone()).unwrap_or_default(),
            bias_detected: result
                .and_then(|r| r.positional_bias.as_ref())
                .is_some_and(|b| b.detected),
            score: result.and_then(|r| r.score),
            explanation: result.map(|r| r.explanation.clone()).unwrap_or_default(),
        }
    }
}

impl TableDisplay for DirectRow {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::new(self.index.to_string()),
            Cell::new(truncate_cell(&self.response, 40)),
            Cell::new(truncate_cell(&self.expected, 16)),
            Cell::new(verdict_badge(&self.verdict, self.bias_detected)),
            Cell::new(
                self.score
                    .map(|s| format!("{s:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(truncate_cell(&self.explanation, 60)),
        ]
    }

    fn display_compact(&self) {
        println!(
            "{}\t{}\t{}\t{}",
            self.index,
            truncate_cell(&self.response, 40),
            self.verdict,
            truncate_cell(&self.explanation, 60),
        );
    }
}

#[derive(Debug, Serialize)]
struct PairwiseRow {
    index: usize,
    responses: Vec<String>,
    winner: String,
    bias_detected: bool,
    rankings: String,
}

impl PairwiseRow {
    fn new(index: usize, instance: &Instance) -> Self {
        let responses = match &instance.responses {
            Responses::Pairwise { responses } => responses.clone(),
            Responses::Direct { .. } => Vec::new(),
        };
        let result = instance.result.as_ref().and_then(|r| r.as_pairwise());
        let rankings = result
            .and_then(|r| r.per_system_results.as_ref())
            .map(|per_system| {
                per_system
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        let place = r.ranking + 1;
                        format!(
                            "system {}: {}{} ({})",
                            i + 1,
                            place,
                            ordinal_suffix(place),
                            to_percentage(r.winrate),
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        Self {
            index,
            responses,
            winner: result.map(|r| r.selected_option.clone()).unwrap_or_default(),
            bias_detected: result
                .and_then(|r| r.positional_bias.as_ref())
                .is_some_and(|b| b.detected),
            rankings,
        }
    }
}

impl TableDisplay for PairwiseRow {
    fn to_row(&self) -> Vec<Cell> {
        let responses = self
            .responses
            .iter()
            .map(|r| truncate_cell(r, 24))
            .collect::<Vec<_>>()
            .join(" | ");
        vec![
            Cell::new(self.index.to_string()),
            Cell::new(responses),
            Cell::new(verdict_badge(&self.winner, self.bias_detected)),
            Cell::new(&self.rankings),
        ]
    }

    fn display_compact(&self) {
        println!("{}\t{}\t{}", self.index, self.winner, self.rankings);
    }
}
