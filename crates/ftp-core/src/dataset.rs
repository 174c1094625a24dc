//! Tabular datasets.
//!
//! A [`Dataset`] is an ordered list of [`Row`]s sharing one ordered column
//! list. Rows are normalized on construction: every row carries every
//! column, in column order, with [`Value::Null`] for gaps. The core never
//! mutates a dataset after it is built.
//!
//! Two file formats are supported by [`load_dataset`]:
//! - `.json`: an array of objects (column order = first appearance)
//! - `.csv`: a header row followed by records, cells typed by [`Value::parse_cell`]

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::DatasetError;
use crate::value::Value;

/// One dataset record: column name → value, in column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create a row from ordered `(column, value)` pairs.
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Convenience constructor for literals.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value stored under `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An immutable table of rows with a fixed column list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from a column list and positional rows.
    ///
    /// Every row must have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DatasetError> {
        let mut built = Vec::with_capacity(rows.len());
        for (index, values) in rows.into_iter().enumerate() {
            if values.len() != columns.len() {
                return Err(DatasetError::Shape {
                    message: format!(
                        "row {index} has {} values but there are {} columns",
                        values.len(),
                        columns.len()
                    ),
                });
            }
            built.push(Row::new(columns.iter().cloned().zip(values).collect()));
        }
        Ok(Self {
            columns,
            rows: built,
        })
    }

    /// Build a dataset from free-form rows.
    ///
    /// The column list is the union of row columns in first-seen order;
    /// rows missing a column get [`Value::Null`] there.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for row in &rows {
            for (name, _) in row.iter() {
                if seen.insert(name.to_string()) {
                    columns.push(name.to_string());
                }
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| {
                Row::new(
                    columns
                        .iter()
                        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                        .collect(),
                )
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in dataset order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Whether the dataset schema contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a dataset file, choosing the parser by extension.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "json" => parse_json_records(&std::fs::read_to_string(path)?)?,
        "csv" => parse_csv(std::fs::File::open(path)?)?,
        _ => return Err(DatasetError::UnsupportedFormat { extension }),
    };

    debug!(
        ?path,
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse a JSON array of objects into a dataset.
pub fn parse_json_records(text: &str) -> Result<Dataset, DatasetError> {
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(records) = parsed else {
        return Err(DatasetError::Shape {
            message: "expected a JSON array of records".into(),
        });
    };

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let serde_json::Value::Object(map) = record else {
            return Err(DatasetError::Shape {
                message: format!("record {index} is not an object"),
            });
        };
        rows.push(Row::new(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect(),
        ));
    }

    Ok(Dataset::from_rows(rows))
}

/// Parse CSV with a header row into a dataset.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(Value::parse_cell).collect());
    }

    Dataset::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn from_rows_unions_columns_in_order() {
        let ds = Dataset::from_rows(vec![
            Row::from_pairs([("a", 1_i64)]),
            Row::from_pairs([("b", 2_i64), ("a", 3_i64)]),
        ]);
        assert_eq!(ds.columns(), ["a", "b"]);
        assert_eq!(ds.rows()[0].get("b"), Some(&Value::Null));
        assert_eq!(ds.rows()[1].get("a"), Some(&Value::Int(3)));
        // columns are reordered to match the dataset
        let names: Vec<&str> = ds.rows()[1].iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let result = Dataset::new(vec!["a".into()], vec![vec![Value::Int(1), Value::Int(2)]]);
        assert_matches!(result, Err(DatasetError::Shape { .. }));
    }

    #[test]
    fn json_records_preserve_key_order() {
        let ds = parse_json_records(r#"[{"rate": -1, "book": "ALM"}, {"rate": 2.5}]"#).unwrap();
        assert_eq!(ds.columns(), ["rate", "book"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1].get("rate"), Some(&Value::Float(2.5)));
        assert_eq!(ds.rows()[1].get("book"), Some(&Value::Null));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert_matches!(
            parse_json_records(r#"{"rate": 1}"#),
            Err(DatasetError::Shape { .. })
        );
        assert_matches!(parse_json_records("[1, 2]"), Err(DatasetError::Shape { .. }));
        assert_matches!(parse_json_records("not json"), Err(DatasetError::Json(_)));
    }

    #[test]
    fn csv_cells_are_typed() {
        let text = "deal_id,rate,maturity,desk\nD1,-0.5,2024-12-31,ALM\nD2,,2025-01-31,\n";
        let ds = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.columns(), ["deal_id", "rate", "maturity", "desk"]);
        assert_eq!(ds.rows()[0].get("rate"), Some(&Value::Float(-0.5)));
        assert_matches!(ds.rows()[0].get("maturity"), Some(Value::Date(_)));
        assert_eq!(ds.rows()[1].get("rate"), Some(&Value::Null));
        assert_eq!(ds.rows()[1].get("desk"), Some(&Value::Null));
    }

    #[test]
    fn load_dataset_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("rows.json");
        std::fs::write(&json_path, r#"[{"rate": 1}]"#).unwrap();
        assert_eq!(load_dataset(&json_path).unwrap().len(), 1);

        let csv_path = dir.path().join("rows.CSV");
        std::fs::write(&csv_path, "rate\n1\n2\n").unwrap();
        assert_eq!(load_dataset(&csv_path).unwrap().len(), 2);

        let xlsx_path = dir.path().join("rows.xlsx");
        std::fs::write(&xlsx_path, "").unwrap();
        assert_matches!(
            load_dataset(&xlsx_path),
            Err(DatasetError::UnsupportedFormat { extension }) if extension == "xlsx"
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = load_dataset(Path::new("/nonexistent/rows.json"));
        assert_matches!(result, Err(DatasetError::Io(_)));
    }
}
