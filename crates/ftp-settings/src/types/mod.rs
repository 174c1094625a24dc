//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values, so partial JSON files are accepted.

mod model;

pub use model::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the analyzer.
///
/// ```json
/// {
///   "rules": { "path": "config/ftp_rules.json" },
///   "narrative": { "maxViolations": 50 },
///   "model": { "modelId": "cohere.command-r-plus-08-2024" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerSettings {
    /// Rule configuration.
    pub rules: RuleSettings,
    /// Scope (sub-policy) configuration.
    pub scope: ScopeSettings,
    /// Narrative fact-pack options.
    pub narrative: NarrativeSettings,
    /// Generative model endpoint.
    pub model: ModelSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl AnalyzerSettings {
    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.scope.keyword.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "scope.keyword must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(SettingsError::InvalidValue(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(SettingsError::InvalidValue(
                "model.maxTokens must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Where rules come from and how violations snapshot their rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSettings {
    /// Path to the rule configuration (JSON array).
    pub path: String,
    /// Columns to keep in each violation's row snapshot. `None` keeps all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_context_fields: Option<Vec<String>>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            path: "config/ftp_rules.json".to_string(),
            row_context_fields: None,
        }
    }
}

/// Scope configuration: which policy descriptions form the named sub-set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeSettings {
    /// Path to the scope configuration (JSON array of records).
    pub path: String,
    /// Word that signals a scoped question.
    pub keyword: String,
    /// Human label used in answers, e.g. `"FTP"`.
    pub label: String,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            path: "config/ftp_policies.json".to_string(),
            keyword: "ftp".to_string(),
            label: "FTP".to_string(),
        }
    }
}

/// Options for the narrative fact pack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeSettings {
    /// Maximum violation rows sent to the model. Unset sends all rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_violations: Option<usize>,
    /// Optional free-text policy guidance file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_guidance_path: Option<String>,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (an `EnvFilter` directive).
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}
