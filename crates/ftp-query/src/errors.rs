//! Query routing errors.

use ftp_llm::ModelError;

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors from answering a question.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The narrative model call failed.
    #[error("narrative model failed: {0}")]
    Model(#[from] ModelError),

    /// The scope keyword could not be turned into a pattern.
    #[error("invalid scope keyword: {0}")]
    Keyword(#[from] regex::Error),
}
