//! The fact pack handed to the generative model.
//!
//! Every number the model is allowed to talk about is computed up front and
//! stored here as display text. The model adapter turns the pack into a
//! prompt; it never sees raw violations beyond `violations`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pre-computed, display-ready facts for one narrative question.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactPack {
    /// Number of violations in the full (unscoped) set.
    pub total_count_all: usize,
    /// Rendered per-policy breakdown of the full set.
    pub policy_counts_all: String,
    /// Scope description: scoped total and breakdown, or "no scope applied".
    pub scoped_section: String,
    /// Whether rows were truncated, and how many of how many are included.
    pub truncation_note: String,
    /// Rendered violation rows (after scoping and truncation).
    pub violations: String,
    /// Optional free-text policy guidance for the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_guidance: Option<String>,
}

impl FactPack {
    /// The pack as named context fields, for template substitution.
    pub fn fields(&self) -> BTreeMap<&'static str, String> {
        let mut fields = BTreeMap::new();
        let _ = fields.insert("total_count_all", self.total_count_all.to_string());
        let _ = fields.insert("policy_counts_all", self.policy_counts_all.clone());
        let _ = fields.insert("scoped_section", self.scoped_section.clone());
        let _ = fields.insert("truncation_note", self.truncation_note.clone());
        let _ = fields.insert("violations", self.violations.clone());
        let _ = fields.insert(
            "policy_guidance",
            self.policy_guidance
                .clone()
                .unwrap_or_else(|| "No policy guidance provided.".to_string()),
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_cover_every_section() {
        let pack = FactPack {
            total_count_all: 4,
            policy_counts_all: "Policy  Count".into(),
            scoped_section: "No scoped filter applied.".into(),
            truncation_note: "NO — all rows included.".into(),
            violations: "rows".into(),
            policy_guidance: None,
        };
        let fields = pack.fields();
        assert_eq!(fields["total_count_all"], "4");
        assert_eq!(fields["scoped_section"], "No scoped filter applied.");
        assert_eq!(fields["policy_guidance"], "No policy guidance provided.");
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn guidance_omitted_from_json_when_absent() {
        let json = serde_json::to_value(FactPack::default()).unwrap();
        assert!(json.get("policy_guidance").is_none());
        assert_eq!(json["total_count_all"], 0);
    }
}
