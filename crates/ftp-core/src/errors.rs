//! Error types for dataset loading.

use thiserror::Error;

/// Errors that can occur when loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to read the dataset file from disk.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a JSON records file.
    #[error("failed to parse dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a CSV file.
    #[error("failed to parse dataset CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file parsed but is not a list of records.
    #[error("invalid dataset shape: {message}")]
    Shape {
        /// Description of the problem.
        message: String,
    },

    /// The file extension is not a supported dataset format.
    #[error("unsupported dataset format: {extension}")]
    UnsupportedFormat {
        /// The extension that was found (may be empty).
        extension: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_display() {
        let err = DatasetError::Shape {
            message: "expected an array".into(),
        };
        assert_eq!(err.to_string(), "invalid dataset shape: expected an array");
    }

    #[test]
    fn unsupported_format_display() {
        let err = DatasetError::UnsupportedFormat {
            extension: "xlsx".into(),
        };
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
