//! # frtb_core: Foundation Types for the SBM Capital Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! frtb_core is the bottom layer of the workspace, providing:
//! - Risk-class taxonomy: `Regime`, `AssetClass`, `SensitivityType`, `RiskClass` (`types`)
//! - Correlation scenarios and their scaling rule: `CorrelationScenario` (`types::scenario`)
//! - Tenor labels: `Tenor` (`types::tenor`)
//! - Symmetric correlation matrices: `CorrelationMatrix` (`math`)
//! - Input sensitivities and risk-factor attributes (`sensitivity`)
//! - Error types: `SbmError`, `RiskClassParseError`, `DegenerateScenarioWarning` (`types::error`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use frtb_core::math::CorrelationMatrix;
//! use frtb_core::types::{CorrelationScenario, RiskClass};
//!
//! let rc: RiskClass = "MS_CRDelta".parse().unwrap();
//! assert!(!rc.is_cva());
//!
//! let rho = CorrelationMatrix::uniform(2, 0.5, 1.0)
//!     .map(|r| CorrelationScenario::High.scale(r))
//!     .with_diagonal(1.0);
//! assert_eq!(rho.get(0, 1), 0.625);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for all public types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod sensitivity;
pub mod types;
