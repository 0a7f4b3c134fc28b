//! Error types shared by the OpenTrain crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, OpentrainError>;

/// Errors raised outside the ingestion pipeline proper: configuration and
/// environment problems.
#[derive(Error, Debug)]
pub enum OpentrainError {
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

impl OpentrainError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid value error for an environment key or CLI flag
    pub fn invalid_value(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let err = OpentrainError::invalid_value("INGEST_COMMIT_EVERY", "ten");
        assert_eq!(err.to_string(), "Invalid value 'ten' for INGEST_COMMIT_EVERY");
    }
}
