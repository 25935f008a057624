//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating a parameter store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The parameter file could not be read.
    #[error("IO error reading {path}: {message}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// The parameter file is not valid TOML or does not match the schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown regulator name.
    #[error("Invalid regulator: {0}. Must be one of: BCBS, UK-PRA, EU-EBA, SG-MAS")]
    InvalidRegulator(String),

    /// A derived table could not be built.
    #[error("Derivation error for {asset_class}: {message}")]
    Derivation {
        /// Asset-class code.
        asset_class: String,
        /// What failed.
        message: String,
    },

    /// One or more consistency checks failed.
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Validation(vec!["Error 1".to_string(), "Error 2".to_string()]);
        let display = format!("{}", error);
        assert_eq!(display, "Validation errors: Error 1; Error 2");
    }

    #[test]
    fn test_invalid_regulator_display() {
        let error = ConfigError::InvalidRegulator("FED".into());
        assert!(error.to_string().starts_with("Invalid regulator: FED"));
    }
}
