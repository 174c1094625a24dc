//! Question classification.
//!
//! A question is matched against an ordered list of [`IntentRule`]s; the
//! first rule whose pattern matches (and whose exclusion does not) decides
//! the intent. Questions matching nothing are [`Intent::Narrative`].

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

static LIST_ROWS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(which|what)\b.*\b(entries?|rows?|records?)\b").unwrap()
});
static COUNT_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(how\s+many|number\s+of)\b.*\bviolation").unwrap());
static PER_POLICY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(each|per\s+policy|by\s+policy)").unwrap());
static ANOMALY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(anomal(y|ies)|violations?|issues?|non[-\s]?compliance|breach(es)?)\b")
        .unwrap()
});
static TABLE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(show|display|provide|give|list|present).*table|table(\s+(view|format))?")
        .unwrap()
});

/// What a question asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Global violation count.
    TotalCount,
    /// Violation count per policy.
    PerPolicy,
    /// The violating rows themselves.
    ListRows,
    /// Anomaly overview, scoped when a scope applies.
    AnomalySummary,
    /// Free-form question for the generative model.
    Narrative,
}

impl Intent {
    /// Stable upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalCount => "TOTAL_COUNT",
            Self::PerPolicy => "PER_POLICY",
            Self::ListRows => "LIST_ROWS",
            Self::AnomalySummary => "ANOMALY_SUMMARY",
            Self::Narrative => "NARRATIVE",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Chosen intent.
    pub intent: Intent,
    /// Whether the question names the scope keyword.
    pub scope_requested: bool,
    /// Whether the question asks for tabular output.
    pub table_requested: bool,
}

impl Classification {
    /// Settle the intent once the scope outcome is known: a narrative
    /// question that requested a scope which then applied is answered as an
    /// anomaly summary.
    #[must_use]
    pub fn resolve(self, scope_applied: bool) -> Self {
        if self.intent == Intent::Narrative && self.scope_requested && scope_applied {
            Self {
                intent: Intent::AnomalySummary,
                ..self
            }
        } else {
            self
        }
    }
}

/// One entry in the priority-ordered intent table.
#[derive(Clone, Debug)]
pub struct IntentRule {
    /// Intent chosen when this rule fires.
    pub intent: Intent,
    /// Pattern that must match.
    pub pattern: Regex,
    /// Pattern that must not match.
    pub excluded: Option<Regex>,
}

impl IntentRule {
    /// Whether the rule fires for `question`.
    pub fn fires(&self, question: &str) -> bool {
        self.pattern.is_match(question)
            && !self.excluded.as_ref().is_some_and(|x| x.is_match(question))
    }
}

/// The built-in intent table, highest priority first.
pub fn default_intent_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            intent: Intent::ListRows,
            pattern: LIST_ROWS.clone(),
            excluded: None,
        },
        IntentRule {
            intent: Intent::TotalCount,
            pattern: COUNT_TOTAL.clone(),
            excluded: Some(PER_POLICY.clone()),
        },
        IntentRule {
            intent: Intent::PerPolicy,
            pattern: PER_POLICY.clone(),
            excluded: None,
        },
        IntentRule {
            intent: Intent::AnomalySummary,
            pattern: ANOMALY.clone(),
            excluded: None,
        },
    ]
}

/// Maps question text to a [`Classification`].
#[derive(Clone, Debug)]
pub struct QuestionClassifier {
    rules: Vec<IntentRule>,
    scope_keyword: Option<Regex>,
}

impl QuestionClassifier {
    /// Classifier with the built-in table. `keyword` is matched
    /// case-insensitively on word boundaries; an empty keyword never matches.
    pub fn new(keyword: &str) -> Result<Self> {
        Self::with_rules(default_intent_rules(), keyword)
    }

    /// Classifier with a custom intent table.
    pub fn with_rules(rules: Vec<IntentRule>, keyword: &str) -> Result<Self> {
        let keyword = keyword.trim();
        let scope_keyword = if keyword.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
                    .case_insensitive(true)
                    .build()?,
            )
        };
        Ok(Self {
            rules,
            scope_keyword,
        })
    }

    /// Classify `question`.
    pub fn classify(&self, question: &str) -> Classification {
        let intent = self
            .rules
            .iter()
            .find(|rule| rule.fires(question))
            .map_or(Intent::Narrative, |rule| rule.intent);

        Classification {
            intent,
            scope_requested: self
                .scope_keyword
                .as_ref()
                .is_some_and(|k| k.is_match(question)),
            table_requested: TABLE_HINT.is_match(question) || LIST_ROWS.is_match(question),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(question: &str) -> Classification {
        QuestionClassifier::new("ftp").unwrap().classify(question)
    }

    // ── intent table ─────────────────────────────────────────────────

    #[test]
    fn list_rows_wins_over_counts() {
        let c = classify("Which entries violate policy rules?");
        assert_eq!(c.intent, Intent::ListRows);
        assert!(c.table_requested);
        assert_eq!(
            classify("What rows have how many violations?").intent,
            Intent::ListRows
        );
    }

    #[test]
    fn total_count() {
        assert_eq!(classify("How many violations are there?").intent, Intent::TotalCount);
        assert_eq!(classify("number of violations").intent, Intent::TotalCount);
    }

    #[test]
    fn per_policy_excludes_total() {
        assert_eq!(
            classify("How many violations per policy?").intent,
            Intent::PerPolicy
        );
        assert_eq!(classify("Count by policy").intent, Intent::PerPolicy);
    }

    #[test]
    fn anomaly_terms() {
        for q in [
            "Any anomalies?",
            "Show me non-compliance",
            "list the issues",
            "Is there an anomaly",
        ] {
            assert_eq!(classify(q).intent, Intent::AnomalySummary, "{q}");
        }
    }

    #[test]
    fn everything_else_is_narrative() {
        assert_eq!(
            classify("Explain what is driving the negative rates").intent,
            Intent::Narrative
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("HOW MANY VIOLATIONS").intent, Intent::TotalCount);
    }

    #[test]
    fn rules_are_usable_alone() {
        let rules = default_intent_rules();
        assert_eq!(rules.len(), 4);
        assert!(rules[1].fires("how many violations"));
        assert!(!rules[1].fires("how many violations per policy"));
    }

    // ── flags ────────────────────────────────────────────────────────

    #[test]
    fn scope_keyword_is_word_bounded() {
        assert!(classify("Any FTP anomalies?").scope_requested);
        assert!(classify("ftp: summarize").scope_requested);
        assert!(!classify("Check sftp transfers").scope_requested);
    }

    #[test]
    fn empty_keyword_never_requests_scope() {
        let classifier = QuestionClassifier::new("  ").unwrap();
        assert!(!classifier.classify("ftp anomalies").scope_requested);
    }

    #[test]
    fn keyword_is_escaped() {
        let classifier = QuestionClassifier::new("a.b").unwrap();
        assert!(classifier.classify("about a.b").scope_requested);
        assert!(!classifier.classify("about axb").scope_requested);
    }

    #[test]
    fn table_hints() {
        assert!(classify("Give me a table of anomalies").table_requested);
        assert!(classify("per policy in table format").table_requested);
        assert!(!classify("How many violations?").table_requested);
    }

    // ── resolve ──────────────────────────────────────────────────────

    #[test]
    fn resolve_promotes_scoped_narrative() {
        let c = classify("Explain the FTP picture");
        assert_eq!(c.intent, Intent::Narrative);
        assert_eq!(c.resolve(true).intent, Intent::AnomalySummary);
        assert_eq!(c.resolve(false).intent, Intent::Narrative);
    }

    #[test]
    fn resolve_leaves_other_intents() {
        let c = classify("How many FTP violations?");
        assert_eq!(c.resolve(true).intent, Intent::TotalCount);
    }

    #[test]
    fn intent_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&Intent::AnomalySummary).unwrap(),
            r#""ANOMALY_SUMMARY""#
        );
        assert_eq!(Intent::ListRows.to_string(), "LIST_ROWS");
    }
}
