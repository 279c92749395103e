//! Error types for cguard-ir
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::c_ir::ParseInputError;

/// Main error type for cguard-ir operations
#[derive(Debug, Error)]
pub enum CguardError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Front-end failure that prevents producing any unit (e.g. grammar load)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed function unit
    #[error("Malformed input: {0}")]
    Input(#[from] ParseInputError),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CguardError {
    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        CguardError::Parse(msg.into())
    }

    /// Create an internal error (alias for analysis error)
    pub fn internal(msg: impl Into<String>) -> Self {
        CguardError::Analysis(msg.into())
    }
}

/// Result type alias for cguard operations
pub type Result<T> = std::result::Result<T, CguardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = CguardError::parse_error("grammar version mismatch");
        assert_eq!(err.to_string(), "Parse error: grammar version mismatch");
    }

    #[test]
    fn test_input_error_conversion() {
        let err: CguardError = ParseInputError::EmptyName.into();
        assert!(matches!(err, CguardError::Input(_)));
        assert!(err.to_string().starts_with("Malformed input"));
    }
}
