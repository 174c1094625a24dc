//! Violation records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Description prefix for violations produced by a failing evaluation.
pub const EVALUATION_ERROR_PREFIX: &str = "Error evaluating rule: ";

/// One detected rule-row match, or one evaluation failure.
///
/// `row_context` is a JSON-safe snapshot of the row, in column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The matching rule's description, or an evaluation error message.
    pub description: String,
    /// Snapshot of the offending row.
    pub row_context: Map<String, Json>,
}

impl Violation {
    /// A rule matched this row.
    pub fn matched(description: impl Into<String>, row_context: Map<String, Json>) -> Self {
        Self {
            description: description.into(),
            row_context,
        }
    }

    /// Evaluating the rule against this row failed.
    pub fn evaluation_error(message: &str, row_context: Map<String, Json>) -> Self {
        Self {
            description: format!("{EVALUATION_ERROR_PREFIX}{message}"),
            row_context,
        }
    }

    /// Whether this record encodes an evaluation failure.
    pub fn is_evaluation_error(&self) -> bool {
        self.description.starts_with(EVALUATION_ERROR_PREFIX)
    }

    /// The row snapshot as compact JSON text.
    pub fn row_context_json(&self) -> String {
        Json::Object(self.row_context.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Map<String, Json> {
        let Json::Object(map) = json!({"rate": -1, "desk": "ALM"}) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn evaluation_error_prefix() {
        let v = Violation::evaluation_error("division by zero", context());
        assert_eq!(v.description, "Error evaluating rule: division by zero");
        assert!(v.is_evaluation_error());
        assert!(!Violation::matched("Negative rate", context()).is_evaluation_error());
    }

    #[test]
    fn row_context_json_keeps_column_order() {
        let v = Violation::matched("Negative rate", context());
        assert_eq!(v.row_context_json(), r#"{"rate":-1,"desk":"ALM"}"#);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let v = Violation::matched("Negative rate", context());
        let value = serde_json::to_value(&v).unwrap();
        assert_eq!(value["description"], "Negative rate");
        assert_eq!(value["row_context"]["rate"], -1);
    }
}
