//! CLI error types.

use frtb_core::types::SbmError;
use infra_config::ConfigError;
use thiserror::Error;

/// Errors surfaced by the `frtb` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A flag value was not understood.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A sensitivities record could not be mapped to a row.
    #[error("Invalid sensitivity at line {line}, column {column}: {reason}")]
    Row {
        /// One-based line in the input file, header included.
        line: u64,
        /// Offending column.
        column: &'static str,
        /// What was wrong with the value.
        reason: FieldReason,
    },

    /// Parameter store failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Capital computation failure.
    #[error(transparent)]
    Engine(#[from] SbmError),

    /// CSV reader failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON writer failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a record column was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldReason {
    /// Column is empty but the risk class needs it.
    #[error("missing value")]
    Missing,
    /// Value could not be parsed.
    #[error("{0}")]
    Invalid(String),
}

/// A column-level failure while mapping one record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{column}: {reason}")]
pub struct FieldError {
    /// Offending column.
    pub column: &'static str,
    /// What was wrong with the value.
    pub reason: FieldReason,
}

impl FieldError {
    /// A required column with no value.
    pub fn missing(column: &'static str) -> Self {
        Self {
            column,
            reason: FieldReason::Missing,
        }
    }

    /// A value that failed to parse.
    pub fn invalid(column: &'static str, reason: impl ToString) -> Self {
        Self {
            column,
            reason: FieldReason::Invalid(reason.to_string()),
        }
    }

    /// Attaches the record's line number.
    pub fn at_line(self, line: u64) -> CliError {
        CliError::Row {
            line,
            column: self.column,
            reason: self.reason,
        }
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
