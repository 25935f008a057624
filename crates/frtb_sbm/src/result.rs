//! Bucket- and risk-class-level results.

use std::fmt;

use frtb_core::types::{CorrelationScenario, DegenerateScenarioWarning, RiskClass};

/// Curvature shock direction chosen for a bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurvatureDirection {
    /// Upward shock.
    Up,
    /// Downward shock.
    Down,
}

impl fmt::Display for CurvatureDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurvatureDirection::Up => f.write_str("Up"),
            CurvatureDirection::Down => f.write_str("Down"),
        }
    }
}

/// Both curvature legs of a bucket.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvatureDetail {
    /// Kb under the upward shock.
    pub kb_up: f64,
    /// Kb under the downward shock.
    pub kb_down: f64,
    /// Sum of CVR+.
    pub sb_up: f64,
    /// Sum of CVR-.
    pub sb_down: f64,
    /// Selected direction.
    pub direction: CurvatureDirection,
}

impl CurvatureDetail {
    /// Picks the up leg if `Kb+ > Kb-`, or on a tie if `Sb+ > Sb-`.
    pub fn select(kb_up: f64, kb_down: f64, sb_up: f64, sb_down: f64) -> Self {
        let direction = if kb_up > kb_down || (kb_up == kb_down && sb_up > sb_down) {
            CurvatureDirection::Up
        } else {
            CurvatureDirection::Down
        };
        Self {
            kb_up,
            kb_down,
            sb_up,
            sb_down,
            direction,
        }
    }

    /// `(Kb, Sb)` of the selected direction.
    pub fn selected(&self) -> (f64, f64) {
        match self.direction {
            CurvatureDirection::Up => (self.kb_up, self.sb_up),
            CurvatureDirection::Down => (self.kb_down, self.sb_down),
        }
    }
}

/// CVA decomposition of a bucket's capital.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvaDetail {
    /// `max(WSᵀρWS, 0)` with WS net of hedges.
    pub diversified: f64,
    /// `R · Σ WHS²`.
    pub hedge_disallowance: f64,
    /// Sum of hedge sensitivities.
    pub sum_hedge_sensitivity: f64,
    /// Sum of non-negative hedge sensitivities.
    pub sum_hedge_sensitivity_positive: f64,
    /// Sum of negative hedge sensitivities.
    pub sum_hedge_sensitivity_negative: f64,
}

/// Capital of one bucket under one scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketResult {
    /// Bucket label.
    pub bucket: String,
    /// Correlation scenario.
    pub scenario: CorrelationScenario,
    /// Residual bucket: excluded from Γ and added after the square root.
    pub residual: bool,
    /// Bucket capital, never negative.
    pub kb: f64,
    /// Net weighted sensitivity.
    pub sb: f64,
    /// Sum of sensitivities (zero for curvature).
    pub sum_sensitivity: f64,
    /// Sum of non-negative sensitivities.
    pub sum_sensitivity_positive: f64,
    /// Sum of negative sensitivities.
    pub sum_sensitivity_negative: f64,
    /// Curvature legs.
    pub curvature: Option<CurvatureDetail>,
    /// CVA decomposition.
    pub cva: Option<CvaDetail>,
}

/// Capital of one risk class under one scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskClassCapital {
    /// Risk class.
    pub risk_class: RiskClass,
    /// Correlation scenario.
    pub scenario: CorrelationScenario,
    /// Capital, never negative.
    pub capital: f64,
    /// Sum of Sb (or SbAlt when substituted), residual bucket included.
    pub sum_sb: f64,
    /// Whether the clipped SbAlt was used.
    pub sb_alt: bool,
    /// Set when the discriminant was negative.
    pub warning: Option<DegenerateScenarioWarning>,
}

/// All results for a risk class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskClassResult {
    /// Risk class.
    pub risk_class: RiskClass,
    /// One entry per scenario of the regime, in scenario order.
    pub capitals: Vec<RiskClassCapital>,
    /// Bucket results, ordered by bucket label then scenario.
    pub buckets: Vec<BucketResult>,
}

impl RiskClassResult {
    /// Capital under a scenario, if it was computed.
    pub fn capital(&self, scenario: CorrelationScenario) -> Option<f64> {
        self.capitals
            .iter()
            .find(|c| c.scenario == scenario)
            .map(|c| c.capital)
    }

    /// Bucket results for one scenario.
    pub fn buckets_for(&self, scenario: CorrelationScenario) -> impl Iterator<Item = &BucketResult> {
        self.buckets.iter().filter(move |b| b.scenario == scenario)
    }
}
