//! # infra_config: Regulatory Parameter Store
//!
//! ## Infra Layer Role
//!
//! infra_config supplies the read-only parameters the capital engine consumes:
//! - Per-asset-class parameter sets: buckets, risk weights, correlation constants and
//!   tables, inter-bucket correlation (`params`)
//! - Formula-defined tables derived at load time (`derive`)
//! - Loading from TOML, environment overrides and validation: `FrtbConfig` (`store`)
//! - Supported regulators: `Regulator` (`regulator`)
//! - Error types: `ConfigError` (`error`)
//!
//! A fully loaded [`FrtbConfig`] is never mutated by the engine, so one
//! instance can be shared across worker threads.
//!
//! ## Usage Examples
//!
//! ```rust
//! use infra_config::{FrtbConfig, Regulator};
//!
//! let config = FrtbConfig::bcbs().unwrap();
//! assert_eq!(config.regulator, Regulator::Bcbs);
//! assert!(config.validate().is_ok());
//!
//! let eq = config.asset_class("MS_EQ".parse().unwrap()).unwrap();
//! assert_eq!(eq.residual_bucket(), Some("11"));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod derive;
pub mod error;
pub mod params;
pub mod regulator;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use params::{
    AssetClassParams, BucketSpec, CoveredBondOverride, CvaParams, GammaSpec, LabelledMatrix,
    LiquidityHorizon, MarketCap, MarketCapWeights, MarketRiskParams, RhoConstants, TenorTable,
};
pub use regulator::Regulator;
pub use store::FrtbConfig;
