//! Regulatory correlation scenarios.
//!
//! Market-risk capital is computed under three correlation scenarios; CVA
//! capital only under [`CorrelationScenario::Medium`].

use std::fmt;
use std::str::FromStr;

use super::error::RiskClassParseError;
use super::risk_class::Regime;

/// Correlation scenario applied to prescribed correlations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrelationScenario {
    /// `max(0.75ρ, 2ρ − 1)`
    Low,
    /// Prescribed correlations unchanged.
    Medium,
    /// `min(1.25ρ, 1)`
    High,
}

const MARKET_RISK_SCENARIOS: [CorrelationScenario; 3] = [
    CorrelationScenario::Low,
    CorrelationScenario::Medium,
    CorrelationScenario::High,
];

const CVA_SCENARIOS: [CorrelationScenario; 1] = [CorrelationScenario::Medium];

impl CorrelationScenario {
    /// Scenarios computed for a regime.
    pub fn for_regime(regime: Regime) -> &'static [CorrelationScenario] {
        match regime {
            Regime::MarketRisk => &MARKET_RISK_SCENARIOS,
            Regime::Cva => &CVA_SCENARIOS,
        }
    }

    /// Applies the scenario to a single correlation value.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::types::CorrelationScenario;
    ///
    /// assert_eq!(CorrelationScenario::Medium.scale(0.5), 0.5);
    /// assert_eq!(CorrelationScenario::High.scale(0.5), 0.625);
    /// assert_eq!(CorrelationScenario::High.scale(0.9), 1.0);
    /// assert_eq!(CorrelationScenario::Low.scale(0.5), 0.375);
    /// ```
    #[inline]
    pub fn scale(&self, rho: f64) -> f64 {
        match self {
            CorrelationScenario::Low => (0.75 * rho).max(2.0 * rho - 1.0),
            CorrelationScenario::Medium => rho,
            CorrelationScenario::High => (1.25 * rho).min(1.0),
        }
    }

    /// Scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            CorrelationScenario::Low => "Low",
            CorrelationScenario::Medium => "Medium",
            CorrelationScenario::High => "High",
        }
    }
}

impl fmt::Display for CorrelationScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrelationScenario {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(CorrelationScenario::Low),
            "medium" => Ok(CorrelationScenario::Medium),
            "high" => Ok(CorrelationScenario::High),
            _ => Err(RiskClassParseError::UnknownScenario(s.to_string())),
        }
    }
}
