//! Core types for the capital engine.
//!
//! This module provides:
//! - Risk-class taxonomy: [`Regime`], [`AssetClass`], [`SensitivityType`], [`RiskClass`]
//! - Correlation scenarios: [`CorrelationScenario`]
//! - Tenor labels: [`Tenor`]
//! - Error types: [`SbmError`], [`RiskClassParseError`], [`DegenerateScenarioWarning`]

pub mod error;
pub mod risk_class;
pub mod scenario;
pub mod tenor;

pub use error::{DegenerateScenarioWarning, RiskClassParseError, SbmError, SbmResult};
pub use risk_class::{AssetClass, AssetClassKey, Regime, RiskClass, SensitivityType};
pub use scenario::CorrelationScenario;
pub use tenor::Tenor;
