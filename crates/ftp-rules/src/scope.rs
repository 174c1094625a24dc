//! Scope filter: narrows violations to a named policy subset.

use std::collections::BTreeSet;
use std::path::Path;

use ftp_core::Violation;
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::errors::ConfigError;
use crate::store::parse_records;

/// A named set of policy descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    label: String,
    source: Option<String>,
    descriptions: BTreeSet<String>,
}

impl Scope {
    /// Build a scope from descriptions.
    pub fn new<I, S>(label: impl Into<String>, descriptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            source: None,
            descriptions: descriptions.into_iter().map(Into::into).collect(),
        }
    }

    /// An unavailable scope. Applying it never filters.
    pub fn unavailable(label: impl Into<String>) -> Self {
        Self::new(label, std::iter::empty::<String>())
    }

    /// Record the file the scope was read from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Display label, e.g. `FTP`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// File name the scope was read from, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether `description` is in scope.
    pub fn contains(&self, description: &str) -> bool {
        self.descriptions.contains(description)
    }

    /// Number of policies in scope.
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    /// Whether the scope holds no policies.
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Result of applying a scope.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeOutcome {
    /// Violations after filtering; the input unchanged when not applied.
    pub scoped: Vec<Violation>,
    /// Whether filtering removed anything.
    pub applied: bool,
    /// Why the scope could not be used, if it could not.
    pub note: Option<String>,
}

/// Load a scope from `path`, failing soft to an unavailable scope.
pub fn load_scope(path: &Path, label: &str) -> Scope {
    let loaded = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| parse_scope(&text, label));

    match loaded {
        Ok(scope) => {
            debug!(?path, policies = scope.len(), "scope loaded");
            let name = path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            );
            scope.with_source(name)
        }
        Err(err) => {
            warn!(?path, error = %err, "scope configuration unavailable");
            Scope::unavailable(label)
        }
    }
}

/// Parse a JSON array of policy records. Only `description` is used;
/// records without a string description are ignored.
pub fn parse_scope(text: &str, label: &str) -> Result<Scope, ConfigError> {
    let descriptions: Vec<String> = parse_records(text)?
        .iter()
        .filter_map(|record| match record.get("description") {
            Some(Json::String(d)) => Some(d.clone()),
            _ => None,
        })
        .collect();
    Ok(Scope::new(label, descriptions))
}

/// Keep the violations whose description is in `scope`.
///
/// `applied` is false when the scope is unavailable or when it would keep
/// every violation; `scoped` is then the input unchanged.
pub fn apply_scope(violations: &[Violation], scope: &Scope) -> ScopeOutcome {
    if scope.is_empty() {
        return ScopeOutcome {
            scoped: violations.to_vec(),
            applied: false,
            note: Some(format!(
                "{} scope file not found or empty — using global dataset.",
                scope.label()
            )),
        };
    }

    let filtered: Vec<Violation> = violations
        .iter()
        .filter(|v| scope.contains(&v.description))
        .cloned()
        .collect();

    if filtered.len() == violations.len() {
        return ScopeOutcome {
            scoped: violations.to_vec(),
            applied: false,
            note: None,
        };
    }

    debug!(
        label = scope.label(),
        total = violations.len(),
        scoped = filtered.len(),
        "scope applied"
    );
    ScopeOutcome {
        scoped: filtered,
        applied: true,
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn violation(description: &str) -> Violation {
        Violation::matched(description, Map::new())
    }

    fn set(descriptions: &[&str]) -> Vec<Violation> {
        descriptions.iter().map(|d| violation(d)).collect()
    }

    #[test]
    fn filters_to_scope() {
        let scope = Scope::new("FTP", ["Negative FTP rate"]);
        let violations = set(&["Negative FTP rate", "Stale curve", "Negative FTP rate"]);
        let outcome = apply_scope(&violations, &scope);
        assert!(outcome.applied);
        assert_eq!(outcome.scoped.len(), 2);
        assert!(outcome.note.is_none());
    }

    #[test]
    fn full_coverage_is_not_applied() {
        let scope = Scope::new("FTP", ["A", "B"]);
        let outcome = apply_scope(&set(&["A", "B", "A"]), &scope);
        assert!(!outcome.applied);
        assert_eq!(outcome.scoped.len(), 3);
    }

    #[test]
    fn zero_match_is_applied() {
        let scope = Scope::new("FTP", ["Negative FTP rate"]);
        let outcome = apply_scope(&set(&["Stale curve"]), &scope);
        assert!(outcome.applied);
        assert!(outcome.scoped.is_empty());
    }

    #[test]
    fn empty_scope_explains_itself() {
        let outcome = apply_scope(&set(&["A"]), &Scope::unavailable("FTP"));
        assert!(!outcome.applied);
        assert_eq!(outcome.scoped.len(), 1);
        assert_eq!(
            outcome.note.as_deref(),
            Some("FTP scope file not found or empty — using global dataset.")
        );
    }

    #[test]
    fn parse_ignores_records_without_description() {
        let scope = parse_scope(
            r#"[{"description": "Negative FTP rate", "owner": "ALM"}, {"name": "x"}, {"description": 3}]"#,
            "FTP",
        )
        .unwrap();
        assert_eq!(scope.len(), 1);
        assert!(scope.contains("Negative FTP rate"));
    }

    #[test]
    fn load_missing_file_is_unavailable() {
        let scope = load_scope(Path::new("/nonexistent/ftp_policies.json"), "FTP");
        assert!(scope.is_empty());
        assert_eq!(scope.label(), "FTP");
        assert!(scope.source().is_none());
    }

    #[test]
    fn load_records_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftp_policies.json");
        std::fs::write(&path, r#"[{"description": "Negative FTP rate"}]"#).unwrap();
        let scope = load_scope(&path, "FTP");
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.source(), Some("ftp_policies.json"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn descriptions() -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec(prop_oneof![Just("A"), Just("B"), Just("C")], 0..12)
                .prop_map(|v| v.into_iter().map(str::to_string).collect())
        }

        proptest! {
            #[test]
            fn idempotent(input in descriptions(), allowed in descriptions()) {
                let scope = Scope::new("FTP", allowed);
                let violations: Vec<Violation> = input.iter().map(|d| violation(d)).collect();
                let once = apply_scope(&violations, &scope);
                let twice = apply_scope(&once.scoped, &scope);
                prop_assert_eq!(&once.scoped, &twice.scoped);
            }

            #[test]
            fn full_coverage_never_applies(input in descriptions()) {
                let scope = Scope::new("FTP", ["A", "B", "C"]);
                let violations: Vec<Violation> = input.iter().map(|d| violation(d)).collect();
                let outcome = apply_scope(&violations, &scope);
                prop_assert!(!outcome.applied);
                prop_assert_eq!(outcome.scoped, violations);
            }
        }
    }
}
