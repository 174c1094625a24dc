//! Rule definitions.

use serde::{Deserialize, Serialize};

/// Description given to rules that do not provide one.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// A declarative policy rule.
///
/// ```json
/// { "column": "rate", "condition": "x < 0", "description": "Negative FTP rate" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Column the rule targets; bound to `x` in the condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Boolean condition over the row.
    pub condition: String,
    /// Policy name reported on each violation.
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl Rule {
    /// Create a rule.
    pub fn new(
        column: Option<&str>,
        condition: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            column: column.map(str::to_string),
            condition: condition.into(),
            description: description.into(),
        }
    }

    /// The target column, treating an empty name as none.
    pub fn target_column(&self) -> Option<&str> {
        self.column.as_deref().filter(|c| !c.is_empty())
    }
}
