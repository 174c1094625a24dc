//! Deterministic answers: counts, breakdowns and row listings computed
//! directly from the violation set.

use std::collections::HashMap;

use ftp_core::{Table, Violation};
use ftp_rules::ScopeOutcome;
use serde_json::{Value as Json, json};

use crate::answer::AnswerBody;
use crate::classifier::Intent;

/// Answer for an empty violation set, whatever the question.
pub const NO_VIOLATIONS: &str = "No violations found.";

/// Count violations per description, highest first; ties by description.
pub fn policy_counts(violations: &[Violation]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in violations {
        *counts.entry(v.description.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(description, n)| (description.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// `Policy` / `Count` table from [`policy_counts`].
pub fn policy_table(violations: &[Violation]) -> Table {
    let mut table = Table::new(["Policy", "Count"]);
    for (policy, count) in policy_counts(violations) {
        table.push_row(vec![Json::String(policy), json!(count)]);
    }
    table
}

/// One row per violation: `description`, then every row-context column in
/// first-seen order. Cells a violation lacks are null.
pub fn violations_table(violations: &[Violation]) -> Table {
    let mut columns = vec!["description".to_string()];
    for v in violations {
        for key in v.row_context.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for v in violations {
        let row = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                if i == 0 {
                    Json::String(v.description.clone())
                } else {
                    v.row_context.get(column).cloned().unwrap_or(Json::Null)
                }
            })
            .collect();
        table.push_row(row);
    }
    table
}

/// Computes answers for every intent except [`Intent::Narrative`].
#[derive(Clone, Debug)]
pub struct DeterministicAnswerer {
    label: String,
}

impl DeterministicAnswerer {
    /// Answerer naming the scope `label` (e.g. `FTP`) in its output.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Answer `intent` over the global set `all` and its scope `outcome`.
    ///
    /// Returns `None` for [`Intent::Narrative`].
    pub fn answer(
        &self,
        intent: Intent,
        table_requested: bool,
        all: &[Violation],
        outcome: &ScopeOutcome,
    ) -> Option<AnswerBody> {
        if all.is_empty() {
            return Some(AnswerBody::text(NO_VIOLATIONS));
        }
        let total = all.len();

        let body = match intent {
            Intent::TotalCount => AnswerBody::text(format!("Total policy violations: {total}")),
            Intent::PerPolicy => {
                if table_requested {
                    AnswerBody::table(format!("Total policy violations: {total}"), policy_table(all))
                } else {
                    AnswerBody::text(format!(
                        "Violations per policy:\n{}",
                        policy_table(all).render()
                    ))
                }
            }
            Intent::ListRows => {
                let rows = if outcome.applied {
                    outcome.scoped.as_slice()
                } else {
                    all
                };
                let suffix = if outcome.applied {
                    format!(" ({} scope)", self.label)
                } else {
                    String::new()
                };
                AnswerBody::table(
                    format!("Violating entries{suffix}: {}", rows.len()),
                    violations_table(rows),
                )
            }
            Intent::AnomalySummary => self.anomaly_summary(table_requested, all, outcome),
            Intent::Narrative => return None,
        };
        Some(body)
    }

    fn anomaly_summary(
        &self,
        table_requested: bool,
        all: &[Violation],
        outcome: &ScopeOutcome,
    ) -> AnswerBody {
        let total = all.len();
        let (heading, breakdown) = if outcome.applied {
            let scoped = outcome.scoped.len();
            if scoped == 0 {
                return AnswerBody::text(format!(
                    "No {} anomalies. Global violations present: {total}.",
                    self.label
                ));
            }
            (
                format!("{} anomalies: {scoped} (of {total} total)", self.label),
                policy_table(&outcome.scoped),
            )
        } else {
            if total == 0 {
                return AnswerBody::text("No anomalies/violations detected.");
            }
            (
                format!("Anomalies/violations detected: {total}"),
                policy_table(all),
            )
        };

        if table_requested {
            AnswerBody::table(heading, breakdown)
        } else {
            AnswerBody::text(format!("{heading}\nBy policy:\n{}", breakdown.render()))
        }
    }
}
