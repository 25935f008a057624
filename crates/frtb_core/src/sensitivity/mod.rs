//! Input sensitivities.
//!
//! - [`SensitivityRow`]: one sensitivity tagged with risk class and bucket
//! - [`FactorAttributes`]: per-risk-class risk-factor identity
//! - [`RiskFactorKey`]: netting key (sub-bucket plus attributes)

pub mod attributes;
pub mod row;

pub use attributes::{CreditQuality, FactorAttributes, IrCurveType, SpotRepo};
pub use row::{Exposure, RiskFactorKey, SensitivityRow};
