//! Building instances from imported JSON and CSV data files.
//!
//! Both formats decode to column-keyed records. Columns matching the active
//! criteria's context fields become context variables; the prediction field
//! (or `response`/`response_1..n` for pairwise) becomes the response text;
//! an `expected_result` column, when present, fills the ground truth.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{ContextVariable, Criteria, EvaluationType, Instance, Responses};
use crate::error::{CoreError, Result};

/// One imported row: column name to cell text.
pub type ImportRecord = BTreeMap<String, String>;

const EXPECTED_RESULT_COLUMN: &str = "expected_result";

/// Parse a CSV document with a header row and comma delimiter. Empty lines
/// are skipped; any parse error rejects the whole import.
pub fn read_csv(data: &str) -> Result<Vec<ImportRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(false)
        .from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let record: ImportRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        records.push(record);
    }
    debug!(rows = records.len(), "parsed csv import");
    Ok(records)
}

/// Parse a JSON document: an array of flat string-valued objects.
pub fn read_json(data: &str) -> Result<Vec<ImportRecord>> {
    let rows: Vec<BTreeMap<String, serde_json::Value>> = serde_json::from_str(data)?;
    let records = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, text)
                })
                .collect()
        })
        .collect();
    Ok(records)
}

/// Map imported records onto instances shaped by `criteria` and the
/// evaluation type. Missing columns become empty cells; unrecognized
/// columns are ignored.
pub fn records_to_instances(
    records: &[ImportRecord],
    criteria: &Criteria,
    eval_type: EvaluationType,
    system_count: usize,
) -> Result<Vec<Instance>> {
    if eval_type == EvaluationType::Pairwise && system_count < 2 {
        return Err(CoreError::Import(format!(
            "pairwise import needs at least 2 systems, got {system_count}"
        )));
    }

    let mut instances = Vec::with_capacity(records.len());
    for record in records {
        let context_variables = criteria
            .context_fields
            .iter()
            .map(|field| {
                ContextVariable::new(field.clone(), record.get(field).cloned().unwrap_or_default())
            })
            .collect();

        let responses = match eval_type {
            EvaluationType::Direct => Responses::Direct {
                response: record
                    .get(&criteria.prediction_field)
                    .or_else(|| record.get("response"))
                    .cloned()
                    .unwrap_or_default(),
            },
            EvaluationType::Pairwise => Responses::Pairwise {
                responses: (1..=system_count)
                    .map(|n| {
                        record
                            .get(&format!("response_{n}"))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect(),
            },
        };

        let mut instance = Instance::empty_direct(&[]);
        instance.context_variables = context_variables;
        instance.responses = responses;
        instance.expected_result = record
            .get(EXPECTED_RESULT_COLUMN)
            .cloned()
            .unwrap_or_default();
        instances.push(instance);
    }
    Ok(instances)
}
