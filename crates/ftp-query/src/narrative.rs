//! Fact pack construction for narrative answers.

use std::path::Path;

use ftp_core::{FactPack, Violation};
use ftp_rules::ScopeOutcome;
use tracing::{debug, warn};

use crate::answerer::{policy_table, violations_table};

/// Truncation notice when every candidate row is included.
pub const NOT_TRUNCATED: &str = "NO — all rows included.";

/// Builds the [`FactPack`] handed to the narrative model.
#[derive(Clone, Debug, Default)]
pub struct NarrativeComposer {
    label: String,
    scope_source: Option<String>,
    max_violations: Option<usize>,
    policy_guidance: Option<String>,
}

impl NarrativeComposer {
    /// Composer naming the scope `label` in the scoped section.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// File name the scope came from, shown in the scoped section.
    #[must_use]
    pub fn with_scope_source(mut self, source: Option<String>) -> Self {
        self.scope_source = source;
        self
    }

    /// Cap on violation rows sent to the model. `None` sends all.
    #[must_use]
    pub fn with_max_violations(mut self, limit: Option<usize>) -> Self {
        self.max_violations = limit;
        self
    }

    /// Free-text policy guidance included in every pack.
    #[must_use]
    pub fn with_policy_guidance(mut self, guidance: Option<String>) -> Self {
        self.policy_guidance = guidance;
        self
    }

    /// Build the pack for the global set `all` and its scope `outcome`.
    pub fn compose(&self, all: &[Violation], outcome: &ScopeOutcome) -> FactPack {
        let candidates = if outcome.applied {
            outcome.scoped.as_slice()
        } else {
            all
        };
        let shown = match self.max_violations {
            Some(limit) if limit < candidates.len() => &candidates[..limit],
            _ => candidates,
        };

        debug!(
            total = all.len(),
            candidates = candidates.len(),
            shown = shown.len(),
            "fact pack composed"
        );

        FactPack {
            total_count_all: all.len(),
            policy_counts_all: policy_table(all).render(),
            scoped_section: self.scoped_section(outcome),
            truncation_note: truncation_note(shown.len(), candidates.len(), self.max_violations),
            violations: violations_table(shown).render(),
            policy_guidance: self.policy_guidance.clone(),
        }
    }

    fn scoped_section(&self, outcome: &ScopeOutcome) -> String {
        if outcome.applied {
            let breakdown = if outcome.scoped.is_empty() {
                "—".to_string()
            } else {
                policy_table(&outcome.scoped).render()
            };
            let from = self
                .scope_source
                .as_deref()
                .map(|s| format!(" from {s}"))
                .unwrap_or_default();
            format!(
                "Scoped to {} policies{from}:\nscoped_total: {}\nscoped per-policy counts:\n{breakdown}",
                self.label,
                outcome.scoped.len()
            )
        } else {
            match &outcome.note {
                Some(note) => format!("No scoped filter applied. {note}"),
                None => "No scoped filter applied.".to_string(),
            }
        }
    }
}

/// Describe whether `shown` of `candidates` rows were included.
pub fn truncation_note(shown: usize, candidates: usize, limit: Option<usize>) -> String {
    match limit {
        Some(limit) if shown < candidates => format!(
            "YES — showing first {shown} of {candidates} rows (max_violations={limit})."
        ),
        _ => NOT_TRUNCATED.to_string(),
    }
}

/// Read the policy guidance text, failing soft to none.
pub fn load_policy_guidance(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(?path, chars = text.len(), "policy guidance loaded");
            Some(text.trim().to_string())
        }
        Ok(_) => {
            warn!(?path, "policy guidance file is empty");
            None
        }
        Err(err) => {
            warn!(?path, error = %err, "policy guidance unavailable");
            None
        }
    }
}
