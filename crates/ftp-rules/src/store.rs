//! Rule store: loads the ordered rule list from configuration.
//!
//! The file is a JSON array of rule records. A missing or unreadable file
//! yields no rules; a malformed record is skipped. Both are logged at `warn`
//! and never fail the caller.

use std::path::Path;

use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::errors::ConfigError;
use crate::types::Rule;

/// Load rules from `path`, failing soft to an empty list.
pub fn load_rules(path: &Path) -> Vec<Rule> {
    match read_rules(path) {
        Ok(rules) => {
            debug!(?path, rules = rules.len(), "rules loaded");
            rules
        }
        Err(err) => {
            warn!(?path, error = %err, "rule configuration unavailable, using no rules");
            Vec::new()
        }
    }
}

/// Read rules from `path`, reporting why the file could not be used.
pub fn read_rules(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&text)
}

/// Parse an in-memory JSON array of rule records.
///
/// Records that do not deserialize are skipped with a warning; order of the
/// remaining records is preserved.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, ConfigError> {
    let records = parse_records(text)?;
    let mut rules = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Rule>(record) {
            Ok(rule) => rules.push(rule),
            Err(err) => warn!(index, error = %err, "skipping malformed rule record"),
        }
    }
    Ok(rules)
}

/// Parse text as a JSON array, returning its elements.
pub(crate) fn parse_records(text: &str) -> Result<Vec<Json>, ConfigError> {
    match serde_json::from_str::<Json>(text)? {
        Json::Array(records) => Ok(records),
        _ => Err(ConfigError::NotAnArray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ftp_core::logging::capture_logs;
    use tracing::Level;

    const RULES: &str = r#"[
        {"column": "rate", "condition": "x < 0", "description": "Negative FTP rate"},
        {"condition": "spread_bps > 500", "description": "Excessive spread"},
        {"column": "tenor", "condition": "x is None"}
    ]"#;

    #[test]
    fn parse_preserves_order() {
        let rules = parse_rules(RULES).unwrap();
        let descriptions: Vec<&str> = rules.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(
            descriptions,
            ["Negative FTP rate", "Excessive spread", "No description"]
        );
    }

    #[test]
    fn malformed_record_is_skipped() {
        let (logs, _guard) = capture_logs();
        let rules = parse_rules(
            r#"[{"column": "rate"}, {"condition": "x > 1"}, 42, {"condition": 5}]"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].condition, "x > 1");
        assert_eq!(logs.count_at_level(Level::WARN), 3);
    }

    #[test]
    fn top_level_must_be_array() {
        assert_matches!(parse_rules(r#"{"condition": "x"}"#), Err(ConfigError::NotAnArray));
        assert_matches!(parse_rules("nope"), Err(ConfigError::Json(_)));
    }

    #[test]
    fn empty_array_is_no_rules() {
        assert!(parse_rules("[]").unwrap().is_empty());
    }

    #[test]
    fn load_missing_file_is_empty_with_warning() {
        let (logs, _guard) = capture_logs();
        let rules = load_rules(Path::new("/nonexistent/ftp_rules.json"));
        assert!(rules.is_empty());
        assert!(logs.has_event(Level::WARN, "rule configuration unavailable"));
    }

    #[test]
    fn load_invalid_json_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftp_rules.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(load_rules(&path).is_empty());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftp_rules.json");
        std::fs::write(&path, RULES).unwrap();
        assert_eq!(load_rules(&path).len(), 3);
        assert_matches!(read_rules(&dir.path().join("missing.json")), Err(ConfigError::Io { .. }));
    }
}
