//! Output renderers for backend payloads.

use anyhow::anyhow;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Columns shown first in tables when present; remaining keys follow in order.
const LEADING_COLUMNS: &[&str] = &["id", "name", "email"];

pub(crate) fn render_value(value: &Value, format: OutputFormat) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => to_json(value)?,
        OutputFormat::Table => to_table(value),
    };
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

fn to_json(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn to_table(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(rows) => rows_table(rows),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, field)| format!("{key}: {}", cell(field)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => cell(other),
    }
}

fn rows_table(rows: &[Value]) -> String {
    let objects: Vec<&Map<String, Value>> = rows.iter().filter_map(Value::as_object).collect();
    if objects.len() != rows.len() {
        return rows.iter().map(cell).collect::<Vec<_>>().join("\n");
    }

    let columns = columns_for(&objects);
    if columns.is_empty() {
        return String::new();
    }
    let table: Vec<Vec<String>> = objects
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column.as_str()).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            table
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header = columns.iter().map(|column| column.to_ascii_uppercase());
    std::iter::once(pad_row(header, &widths))
        .chain(
            table
                .into_iter()
                .map(|row| pad_row(row.into_iter(), &widths)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

fn columns_for(objects: &[&Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = LEADING_COLUMNS
        .iter()
        .filter(|column| objects.iter().any(|row| row.contains_key(**column)))
        .map(|column| (*column).to_string())
        .collect();
    for row in objects {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn pad_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(text, &width)| format!("{text:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
