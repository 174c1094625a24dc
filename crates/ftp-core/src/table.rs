//! Structured tabular answers.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// An ordered table: column names plus rows of JSON cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in display order.
    pub columns: Vec<String>,
    /// Rows; each row has one cell per column.
    pub rows: Vec<Vec<Json>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut cells: Vec<Json>) {
        cells.resize(self.columns.len(), Json::Null);
        self.rows.push(cells);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text rendering with right-aligned columns, one line per row
    /// after the header line.
    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(format_line(&self.columns, &widths));
        for row in &cells {
            lines.push(format_line(row, &widths));
        }
        lines.join("\n")
    }
}

/// Right-align each value within its column width.
fn format_line(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(v, &w)| format!("{v:>w$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Display text for one cell: strings unquoted, everything else as JSON.
fn cell_text(cell: &Json) -> String {
    match cell {
        Json::String(s) => s.clone(),
        Json::Null => "None".to_string(),
        other => other.to_string(),
    }
}
