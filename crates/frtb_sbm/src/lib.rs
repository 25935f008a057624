//! # frtb_sbm: Sensitivities-Based Method Capital Engine
//!
//! ## Capital Layer Role
//!
//! frtb_sbm turns netted sensitivities into Basel III SBM capital for market
//! risk and SA-CVA:
//! - Netting rows into risk factors: `RiskFactorNetter` (`netting`)
//! - Risk weights, intra-bucket ρ and inter-bucket Γ per asset class:
//!   `RiskClassRules`, `RulesRegistry` (`rules`, `gamma`)
//! - Low/Medium/High correlation scaling: `ScenarioScaler` (`scaler`)
//! - Bucket and cross-bucket aggregation: `BucketAggregator`,
//!   `CrossBucketAggregator` (`aggregation`)
//! - The pipeline entry point: `SbmCalculator` (`engine`)
//! - Biting scenarios and portfolio totals: `CapitalSummary`,
//!   `PortfolioCapital` (`summary`)
//!
//! ## Architecture
//!
//! ```text
//! rows ─► RiskFactorNetter ─► RiskClassRules::assign_weights
//!                              RiskClassRules::build_rho ─► ScenarioScaler
//!                                        │
//!                                        ▼
//!                              BucketAggregator (per bucket, per scenario)
//!                                        │
//!              RiskClassRules::build_gamma ─► ScenarioScaler
//!                                        ▼
//!                              CrossBucketAggregator ─► RiskClassCapital
//! ```
//!
//! ## Usage Examples
//!
//! ```rust
//! use frtb_core::sensitivity::{FactorAttributes, SensitivityRow, SpotRepo};
//! use frtb_core::types::CorrelationScenario;
//! use frtb_sbm::{PortfolioCapital, RulesRegistry, SbmCalculator};
//! use infra_config::FrtbConfig;
//!
//! let calculator = SbmCalculator::new(FrtbConfig::bcbs().unwrap(), RulesRegistry::standard());
//!
//! let rc = "MS_EQDelta".parse().unwrap();
//! let spot = |name: &str| FactorAttributes::EquityDelta {
//!     name: name.to_string(),
//!     spot_repo: SpotRepo::Spot,
//! };
//! let rows = vec![
//!     SensitivityRow::linear(rc, "1", spot("ACME"), 100.0),
//!     SensitivityRow::linear(rc, "1", spot("GLOBEX"), -50.0),
//! ];
//!
//! let results = calculator.compute_portfolio(&rows).unwrap();
//! assert!(results[0].capital(CorrelationScenario::Medium).unwrap() > 0.0);
//!
//! let portfolio = PortfolioCapital::from_results(&results, calculator.config().cva.capital_multiplier);
//! assert_eq!(portfolio.market_risk_scenario, Some(CorrelationScenario::Low));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialisation for result and summary types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregation;
pub mod engine;
pub mod gamma;
pub mod netting;
pub mod parallel;
pub mod result;
pub mod rules;
pub mod scaler;
pub mod summary;

pub use aggregation::{BucketAggregator, CrossBucketAggregator};
pub use engine::SbmCalculator;
pub use gamma::GammaBuilder;
pub use netting::{NettedFactor, RiskFactorNetter, WeightedFactor};
pub use parallel::ParallelConfig;
pub use result::{
    BucketResult, CurvatureDetail, CurvatureDirection, CvaDetail, RiskClassCapital, RiskClassResult,
};
pub use rules::{RiskClassRules, RuleContext, RulesRegistry};
pub use scaler::ScenarioScaler;
pub use summary::{CapitalSummary, PortfolioCapital, ScenarioTotal};
