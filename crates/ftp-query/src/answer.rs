//! The structured answer returned to callers.

use std::fmt;

use ftp_core::Table;
use serde::{Deserialize, Serialize};

use crate::classifier::Intent;

/// Answer content: text, or a titled table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerBody {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// A table with a heading line.
    Table {
        /// Heading, e.g. `Violating entries: 3`.
        title: String,
        /// The rows.
        table: Table,
    },
}

impl AnswerBody {
    /// Text body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Table body.
    pub fn table(title: impl Into<String>, table: Table) -> Self {
        Self::Table {
            title: title.into(),
            table,
        }
    }
}

/// Answer to one question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Intent the question resolved to.
    pub intent: Intent,
    /// Content.
    pub body: AnswerBody,
    /// Whether the generative model produced the content.
    pub used_model: bool,
    /// Whether scope filtering narrowed the violations.
    pub scope_applied: bool,
    /// Why a requested scope could not be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_note: Option<String>,
}

impl Answer {
    /// The table, if the body is one.
    pub fn table(&self) -> Option<&Table> {
        match &self.body {
            AnswerBody::Table { table, .. } => Some(table),
            AnswerBody::Text { .. } => None,
        }
    }
}

/// Plain-text rendering: the text, or the title line followed by the
/// rendered table, then the scope note if any.
impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            AnswerBody::Text { text } => f.write_str(text)?,
            AnswerBody::Table { title, table } => write!(f, "{title}\n{}", table.render())?,
        }
        if let Some(note) = &self.scope_note {
            write!(f, "\n{note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_text_with_note() {
        let answer = Answer {
            intent: Intent::TotalCount,
            body: AnswerBody::text("Total policy violations: 3"),
            used_model: false,
            scope_applied: false,
            scope_note: Some("FTP scope file not found or empty — using global dataset.".into()),
        };
        assert_eq!(
            answer.to_string(),
            "Total policy violations: 3\nFTP scope file not found or empty — using global dataset."
        );
        assert!(answer.table().is_none());
    }

    #[test]
    fn display_table() {
        let mut table = Table::new(["Policy", "Count"]);
        table.push_row(vec![json!("A"), json!(2)]);
        let answer = Answer {
            intent: Intent::PerPolicy,
            body: AnswerBody::table("Total policy violations: 2", table),
            used_model: false,
            scope_applied: false,
            scope_note: None,
        };
        assert_eq!(
            answer.to_string(),
            "Total policy violations: 2\nPolicy  Count\n     A      2"
        );
        assert_eq!(answer.table().map(Table::len), Some(1));
    }

    #[test]
    fn serializes_tagged_body() {
        let answer = Answer {
            intent: Intent::Narrative,
            body: AnswerBody::text("ok"),
            used_model: true,
            scope_applied: false,
            scope_note: None,
        };
        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["intent"], "NARRATIVE");
        assert_eq!(value["body"]["kind"], "text");
        assert_eq!(value["usedModel"], true);
        assert!(value.get("scopeNote").is_none());
    }
}
