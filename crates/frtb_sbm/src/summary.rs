//! Capital summaries per risk class and for the portfolio.
//!
//! Market-risk capital is the sum over risk classes under a common scenario,
//! then the maximum over scenarios. SA-CVA capital is the sum over CVA risk
//! classes (Medium only) times the CVA multiplier.

use frtb_core::types::{CorrelationScenario, Regime, RiskClass};

use crate::result::{RiskClassCapital, RiskClassResult};

/// Capital under one scenario.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioTotal {
    /// Correlation scenario.
    pub scenario: CorrelationScenario,
    /// Capital.
    pub capital: f64,
}

/// Picks the largest capital; ties go to the higher scenario.
fn biting<'a, I>(totals: I) -> Option<ScenarioTotal>
where
    I: IntoIterator<Item = &'a ScenarioTotal>,
{
    totals.into_iter().copied().reduce(|best, t| {
        if t.capital > best.capital || (t.capital == best.capital && t.scenario > best.scenario) {
            t
        } else {
            best
        }
    })
}

/// Summary of one risk class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapitalSummary {
    /// Risk class.
    pub risk_class: RiskClass,
    /// Capital per scenario, in scenario order.
    pub by_scenario: Vec<ScenarioTotal>,
    /// Scenario with the largest capital.
    pub biting_scenario: CorrelationScenario,
    /// Capital under the biting scenario.
    pub capital: f64,
    /// SumSb under the biting scenario.
    pub sum_sb: f64,
    /// Scenarios in which SbAlt replaced Sb.
    pub sb_alt_scenarios: Vec<CorrelationScenario>,
    /// Number of scenarios with a negative discriminant.
    pub warnings: usize,
}

impl CapitalSummary {
    /// Summarises a risk-class result. Returns `None` if it has no capitals.
    pub fn from_result(result: &RiskClassResult) -> Option<Self> {
        let by_scenario: Vec<ScenarioTotal> = result
            .capitals
            .iter()
            .map(|c| ScenarioTotal {
                scenario: c.scenario,
                capital: c.capital,
            })
            .collect();
        let top = biting(&by_scenario)?;
        let sum_sb = result
            .capitals
            .iter()
            .find(|c| c.scenario == top.scenario)
            .map_or(0.0, |c| c.sum_sb);

        Some(Self {
            risk_class: result.risk_class,
            biting_scenario: top.scenario,
            capital: top.capital,
            sum_sb,
            sb_alt_scenarios: result
                .capitals
                .iter()
                .filter(|c| c.sb_alt)
                .map(|c| c.scenario)
                .collect(),
            warnings: result.capitals.iter().filter(|c| c.warning.is_some()).count(),
            by_scenario,
        })
    }

    /// Capital under `scenario`, if computed.
    pub fn capital_for(&self, scenario: CorrelationScenario) -> Option<f64> {
        self.by_scenario
            .iter()
            .find(|t| t.scenario == scenario)
            .map(|t| t.capital)
    }
}

/// Portfolio totals.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioCapital {
    /// One summary per risk class, in input order.
    pub risk_classes: Vec<CapitalSummary>,
    /// Market-risk capital summed across risk classes, per scenario.
    pub market_risk_by_scenario: Vec<ScenarioTotal>,
    /// Scenario maximising the market-risk sum, if there is market risk.
    pub market_risk_scenario: Option<CorrelationScenario>,
    /// Maximum of `market_risk_by_scenario`.
    pub market_risk: f64,
    /// SA-CVA capital: Medium capitals summed, times the multiplier.
    pub cva: f64,
}

impl PortfolioCapital {
    /// Combines risk-class results.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::types::CorrelationScenario;
    /// use frtb_sbm::result::{RiskClassCapital, RiskClassResult};
    /// use frtb_sbm::summary::PortfolioCapital;
    ///
    /// let rc = "CS_FXDelta".parse().unwrap();
    /// let result = RiskClassResult {
    ///     risk_class: rc,
    ///     capitals: vec![RiskClassCapital {
    ///         risk_class: rc,
    ///         scenario: CorrelationScenario::Medium,
    ///         capital: 10.0,
    ///         sum_sb: 10.0,
    ///         sb_alt: true,
    ///         warning: None,
    ///     }],
    ///     buckets: vec![],
    /// };
    /// let portfolio = PortfolioCapital::from_results(&[result], 1.25);
    /// assert_eq!(portfolio.cva, 12.5);
    /// assert_eq!(portfolio.market_risk, 0.0);
    /// ```
    pub fn from_results(results: &[RiskClassResult], cva_multiplier: f64) -> Self {
        let risk_classes: Vec<CapitalSummary> = results.iter().filter_map(CapitalSummary::from_result).collect();

        let market_risk_by_scenario: Vec<ScenarioTotal> = CorrelationScenario::for_regime(Regime::MarketRisk)
            .iter()
            .map(|&scenario| ScenarioTotal {
                scenario,
                capital: Self::sum_capitals(results, Regime::MarketRisk, scenario),
            })
            .collect();

        let any_market_risk = results.iter().any(|r| r.risk_class.regime() == Regime::MarketRisk);
        let top = if any_market_risk {
            biting(&market_risk_by_scenario)
        } else {
            None
        };

        let cva = cva_multiplier * Self::sum_capitals(results, Regime::Cva, CorrelationScenario::Medium);

        Self {
            risk_classes,
            market_risk_by_scenario,
            market_risk_scenario: top.map(|t| t.scenario),
            market_risk: top.map_or(0.0, |t| t.capital),
            cva,
        }
    }

    /// Market-risk plus SA-CVA capital.
    pub fn total(&self) -> f64 {
        self.market_risk + self.cva
    }

    fn sum_capitals(results: &[RiskClassResult], regime: Regime, scenario: CorrelationScenario) -> f64 {
        results
            .iter()
            .filter(|r| r.risk_class.regime() == regime)
            .flat_map(|r| r.capitals.iter())
            .filter(|c: &&RiskClassCapital| c.scenario == scenario)
            .map(|c| c.capital)
            .sum()
    }
}
