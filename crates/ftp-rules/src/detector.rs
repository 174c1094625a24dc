//! Violation detection.
//!
//! Every rule is evaluated against every row. Output order is rule order,
//! then row order. A rule whose target column is missing from the dataset
//! is skipped; a rule that fails to evaluate still produces a record for
//! each row, with the error as its description.

use ftp_core::{Dataset, Row, Violation};
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::errors::ExprError;
use crate::expr::{Bindings, Expression};
use crate::types::Rule;

/// Options controlling the violation records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectorOptions {
    /// Columns kept in each row snapshot, in this order. `None` keeps all.
    pub row_context_fields: Option<Vec<String>>,
}

/// A rule with its condition compiled.
#[derive(Clone, Debug)]
struct CompiledRule {
    rule: Rule,
    condition: Result<Expression, ExprError>,
}

/// Evaluates a fixed rule list against datasets.
///
/// Conditions are compiled once in [`ViolationDetector::new`]; the detector
/// can then be run against any number of datasets.
#[derive(Clone, Debug)]
pub struct ViolationDetector {
    rules: Vec<CompiledRule>,
    options: DetectorOptions,
}

impl ViolationDetector {
    /// Compile `rules`. Conditions that fail to parse are kept and reported
    /// per row at detection time.
    pub fn new(rules: &[Rule], options: DetectorOptions) -> Self {
        let rules: Vec<CompiledRule> = rules
            .iter()
            .map(|rule| {
                let condition = Expression::parse(&rule.condition);
                if let Err(err) = &condition {
                    warn!(
                        description = %rule.description,
                        condition = %rule.condition,
                        error = %err,
                        "rule condition does not parse"
                    );
                }
                CompiledRule {
                    rule: rule.clone(),
                    condition,
                }
            })
            .collect();

        debug!(rule_count = rules.len(), "ViolationDetector initialized");
        Self { rules, options }
    }

    /// Number of rules held.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every rule against every row of `dataset`.
    pub fn detect(&self, dataset: &Dataset) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut skipped = 0_usize;
        let mut errors = 0_usize;
        let fields = self.options.row_context_fields.as_deref();

        for compiled in &self.rules {
            let rule = &compiled.rule;
            let target = rule.target_column();

            if let Some(column) = target {
                if !dataset.has_column(column) {
                    warn!(
                        column,
                        description = %rule.description,
                        "skipping rule: column not found in dataset"
                    );
                    skipped += 1;
                    continue;
                }
            }

            for row in dataset.rows() {
                let outcome = match &compiled.condition {
                    Ok(expr) => expr.matches(&Bindings::new(row, target)),
                    Err(err) => Err(err.clone()),
                };
                match outcome {
                    Ok(true) => violations.push(Violation::matched(
                        rule.description.clone(),
                        snapshot_row(row, fields),
                    )),
                    Ok(false) => {}
                    Err(err) => {
                        errors += 1;
                        violations.push(Violation::evaluation_error(
                            &err.to_string(),
                            snapshot_row(row, fields),
                        ));
                    }
                }
            }
        }

        debug!(
            rules_evaluated = self.rules.len() - skipped,
            rules_skipped = skipped,
            violations = violations.len(),
            evaluation_errors = errors,
            "violation detection complete"
        );
        violations
    }
}

/// Evaluate `rules` against `dataset` with default options.
pub fn detect_violations(dataset: &Dataset, rules: &[Rule]) -> Vec<Violation> {
    ViolationDetector::new(rules, DetectorOptions::default()).detect(dataset)
}

/// JSON-safe snapshot of a row.
///
/// With `fields`, only those columns are kept, in that order, with `null`
/// for columns the row lacks.
pub fn snapshot_row(row: &Row, fields: Option<&[String]>) -> Map<String, Json> {
    match fields {
        None => row
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect(),
        Some(fields) => fields
            .iter()
            .map(|name| {
                let value = row.get(name).map_or(Json::Null, ftp_core::Value::to_json);
                (name.clone(), value)
            })
            .collect(),
    }
}
