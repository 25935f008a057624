//! Risk-class-level aggregation across buckets.

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::{CorrelationScenario, DegenerateScenarioWarning, RiskClass, SbmError, SbmResult};

use crate::aggregation::BucketAggregator;
use crate::result::{BucketResult, RiskClassCapital};
use crate::scaler::{ScenarioScaler, INTER_BUCKET_DIAGONAL};

/// Combines bucket results into risk-class capital.
pub struct CrossBucketAggregator;

impl CrossBucketAggregator {
    /// Aggregates the buckets of one scenario.
    ///
    /// `gamma` is the unscaled inter-bucket correlation of the non-residual
    /// buckets, in the order they appear in `buckets`. Residual buckets are
    /// left out of the quadratic form and their `Kb` and `Sb` are added to the
    /// result afterwards.
    ///
    /// The clipped `SbAlt = clip(Sb, −Kb, Kb)` replaces `Sb` whenever the
    /// discriminant is negative, and always for CVA risk classes.
    pub fn aggregate(
        risk_class: RiskClass,
        scenario: CorrelationScenario,
        buckets: &[BucketResult],
        gamma: &CorrelationMatrix,
    ) -> SbmResult<RiskClassCapital> {
        let (diversified, residual): (Vec<&BucketResult>, Vec<&BucketResult>) =
            buckets.iter().partition(|b| !b.residual);
        let other_kb: f64 = residual.iter().map(|b| b.kb).sum();
        let other_sb: f64 = residual.iter().map(|b| b.sb).sum();

        if diversified.is_empty() {
            return Ok(RiskClassCapital {
                risk_class,
                scenario,
                capital: other_kb,
                sum_sb: other_sb,
                sb_alt: false,
                warning: None,
            });
        }

        if gamma.dim() != diversified.len() {
            return Err(SbmError::ShapeMismatch {
                expected: diversified.len(),
                actual: gamma.dim(),
            });
        }

        let sb: Vec<f64> = diversified.iter().map(|b| b.sb).collect();
        let kb: Vec<f64> = diversified.iter().map(|b| b.kb).collect();
        let kb_squared: f64 = kb.iter().map(|k| k * k).sum();

        let scaled = if risk_class.is_curvature() {
            ScenarioScaler::scale_squared(scenario, gamma, INTER_BUCKET_DIAGONAL)
        } else {
            ScenarioScaler::scale(scenario, gamma, INTER_BUCKET_DIAGONAL)
        };
        let cross_term = |s: &[f64]| -> SbmResult<f64> {
            if risk_class.is_curvature() {
                BucketAggregator::psi(s).hadamard(&scaled)?.quadratic_form(s)
            } else {
                scaled.quadratic_form(s)
            }
        };

        let discriminant = cross_term(&sb)? + kb_squared;
        let mut total = discriminant;
        let mut sum_sb: f64 = sb.iter().sum();
        let mut warning = None;
        let sb_alt = risk_class.is_cva() || discriminant < 0.0;

        if sb_alt {
            if discriminant < 0.0 {
                let w = DegenerateScenarioWarning {
                    risk_class,
                    scenario,
                    discriminant,
                };
                tracing::warn!("{}", w);
                warning = Some(w);
            }
            let clipped: Vec<f64> = sb.iter().zip(&kb).map(|(s, k)| s.max(-k).min(*k)).collect();
            total = cross_term(&clipped)? + kb_squared;
            sum_sb = clipped.iter().sum();
        }

        Ok(RiskClassCapital {
            risk_class,
            scenario,
            capital: total.max(0.0).sqrt() + other_kb,
            sum_sb: sum_sb + other_sb,
            sb_alt,
            warning,
        })
    }
}
