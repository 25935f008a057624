//! Error types for structured error handling.
//!
//! This module provides:
//! - `RiskClassParseError`: failures parsing risk-class, scenario, tenor or attribute codes
//! - `SbmError`: fatal failures of the capital engine
//! - `DegenerateScenarioWarning`: the recoverable negative-discriminant fallback

use std::fmt;
use thiserror::Error;

use super::risk_class::RiskClass;
use super::scenario::CorrelationScenario;

/// Errors parsing textual codes.
///
/// # Examples
/// ```
/// use frtb_core::types::RiskClassParseError;
///
/// let err = RiskClassParseError::UnknownAssetClass("ZZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown asset class: ZZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskClassParseError {
    /// Code does not have the `XX_YYType` shape.
    #[error("Malformed risk class code: {0}")]
    Malformed(String),

    /// Unknown regime prefix.
    #[error("Unknown regime: {0}")]
    UnknownRegime(String),

    /// Unknown asset-class code.
    #[error("Unknown asset class: {0}")]
    UnknownAssetClass(String),

    /// Unknown sensitivity type.
    #[error("Unknown sensitivity type: {0}")]
    UnknownSensitivity(String),

    /// Combination not defined by the framework.
    #[error("Unsupported risk class: {0}")]
    Unsupported(String),

    /// Unknown correlation scenario name.
    #[error("Unknown correlation scenario: {0}")]
    UnknownScenario(String),

    /// Tenor is not a positive whole number of months.
    #[error("Invalid tenor: {0}")]
    InvalidTenor(String),

    /// Unknown attribute code (curve type, spot/repo, credit quality).
    #[error("Unknown {kind}: {value}")]
    UnknownAttribute {
        /// Attribute being parsed.
        kind: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Fatal errors raised while computing SBM capital.
///
/// None of these are retried: they are deterministic given the same inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SbmError {
    /// A row references a bucket, tenor, rating or curve type that the
    /// parameter store does not define.
    #[error("Config lookup failed for {risk_class}: no {item} entry for '{key}'")]
    ConfigLookup {
        /// Risk class or asset-class code being processed.
        risk_class: String,
        /// Parameter item that was consulted.
        item: String,
        /// Key that was not found.
        key: String,
    },

    /// Matrix dimension disagrees with the vector it is applied to.
    #[error("Shape mismatch: expected dimension {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Explicit matrix rows are not symmetric.
    #[error("Matrix is not symmetric at ({row}, {col})")]
    Asymmetric {
        /// Row index of the first offending element.
        row: usize,
        /// Column index of the first offending element.
        col: usize,
    },

    /// A row's attributes or exposure kind do not belong to its risk class.
    #[error("Attribute mismatch for {risk_class}: {detail}")]
    AttributeMismatch {
        /// Risk class of the row.
        risk_class: String,
        /// What did not match.
        detail: String,
    },

    /// A row was passed for a different risk class than the one computed.
    #[error("Row for {found} passed to {expected} calculation")]
    RiskClassMismatch {
        /// Risk class being computed.
        expected: String,
        /// Risk class carried by the row.
        found: String,
    },

    /// No strategy registered for the risk class.
    #[error("No rules registered for {0}")]
    NoRules(String),

    /// Linear and curvature exposures were given for the same risk factor.
    #[error("Mixed exposure kinds in bucket {bucket} for risk factor {factor}")]
    MixedExposure {
        /// Bucket label.
        bucket: String,
        /// Risk factor carrying both kinds.
        factor: String,
    },
}

impl SbmError {
    /// Convenience constructor for [`SbmError::ConfigLookup`].
    pub fn lookup(
        risk_class: impl Into<String>,
        item: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        SbmError::ConfigLookup {
            risk_class: risk_class.into(),
            item: item.into(),
            key: key.into(),
        }
    }
}

/// Result alias for SBM computations.
pub type SbmResult<T> = Result<T, SbmError>;

/// Records that the cross-bucket discriminant was negative and the
/// clipped `SbAlt` path was used instead.
///
/// This is an expected branch, not a failure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegenerateScenarioWarning {
    /// Risk class being aggregated.
    pub risk_class: RiskClass,
    /// Scenario in which the discriminant was negative.
    pub scenario: CorrelationScenario,
    /// The negative value of `SbᵀΓSb + ΣKb²`.
    pub discriminant: f64,
}

impl fmt::Display for DegenerateScenarioWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: negative discriminant {:.6e}, using SbAlt",
            self.risk_class, self.scenario, self.discriminant
        )
    }
}
