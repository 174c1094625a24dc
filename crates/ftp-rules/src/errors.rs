//! Error types for rule conditions and rule/scope configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while compiling or evaluating a rule condition.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExprError {
    /// The condition text contains a character sequence that is not a token.
    #[error("invalid syntax at offset {offset}: {message}")]
    Lex {
        /// Character offset into the condition.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// The tokens do not form a valid expression.
    #[error("invalid syntax at offset {offset}: {message}")]
    Parse {
        /// Character offset of the offending token.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// Evaluation against a row failed.
    #[error("{message}")]
    Eval {
        /// Human-readable reason.
        message: String,
    },
}

impl ExprError {
    /// Shorthand for an evaluation error.
    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }

    /// Whether the error happened before any row was seen.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Lex { .. } | Self::Parse { .. })
    }
}

/// Result type for expression operations.
pub type ExprResult<T> = std::result::Result<T, ExprError>;

/// Errors reading a rule or scope configuration file.
///
/// The public loaders turn these into empty collections plus a warning.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is valid but not an array of records.
    #[error("expected a JSON array of records")]
    NotAnArray,
}
