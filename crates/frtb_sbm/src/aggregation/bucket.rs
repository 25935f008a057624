//! Bucket-level aggregation: Kb and Sb.

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::{CorrelationScenario, SbmResult};

use crate::netting::WeightedFactor;
use crate::result::{BucketResult, CurvatureDetail, CvaDetail};
use crate::scaler::{ScenarioScaler, INTRA_BUCKET_DIAGONAL};

/// Computes bucket capital from weighted factors.
pub struct BucketAggregator;

impl BucketAggregator {
    /// `sqrt(max(wsᵀ ρ ws, 0) + hedge_term)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::math::CorrelationMatrix;
    /// use frtb_sbm::aggregation::BucketAggregator;
    ///
    /// let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
    /// let kb = BucketAggregator::kb(&[100.0, -50.0], &rho, 0.0).unwrap();
    /// assert!((kb - 7500f64.sqrt()).abs() < 1e-9);
    /// ```
    pub fn kb(ws: &[f64], rho: &CorrelationMatrix, hedge_term: f64) -> SbmResult<f64> {
        let diversified = rho.quadratic_form(ws)?.max(0.0);
        Ok((diversified + hedge_term).sqrt())
    }

    /// Undiversified `Σ|ws|` of a residual bucket.
    pub fn residual_kb(ws: &[f64]) -> f64 {
        ws.iter().map(|w| w.abs()).sum()
    }

    /// `ψ[i,j] = 0` iff both values are negative, else 1.
    pub fn psi(values: &[f64]) -> CorrelationMatrix {
        let mut psi = CorrelationMatrix::zeros(values.len());
        for (i, vi) in values.iter().enumerate() {
            for (j, vj) in values.iter().enumerate().take(i + 1) {
                let gated = *vi < 0.0 && *vj < 0.0;
                psi.set_symmetric(i, j, if gated { 0.0 } else { 1.0 });
            }
        }
        psi
    }

    /// `sqrt(max(cvrᵀ (ψ ⊙ ρ) cvr, 0))` with ψ built from `cvr`.
    pub fn curvature_kb(cvr: &[f64], rho: &CorrelationMatrix) -> SbmResult<f64> {
        let gated = Self::psi(cvr).hadamard(rho)?;
        Ok(gated.quadratic_form(cvr)?.max(0.0).sqrt())
    }

    /// Delta or vega bucket.
    ///
    /// `base_rho` is `None` for a residual bucket. `hedge_disallowance` is the
    /// CVA constant R; when set, weighted sensitivities are taken net of
    /// weighted hedges and `R·ΣWHS²` is added under the square root.
    pub fn linear(
        bucket: &str,
        scenario: CorrelationScenario,
        factors: &[WeightedFactor],
        base_rho: Option<&CorrelationMatrix>,
        hedge_disallowance: Option<f64>,
    ) -> SbmResult<BucketResult> {
        let whs: Vec<f64> = factors.iter().map(WeightedFactor::weighted_hedge_sensitivity).collect();
        let ws: Vec<f64> = match hedge_disallowance {
            Some(_) => factors
                .iter()
                .zip(&whs)
                .map(|(f, h)| f.weighted_sensitivity() - h)
                .collect(),
            None => factors.iter().map(WeightedFactor::weighted_sensitivity).collect(),
        };

        let sensitivities = factors.iter().map(|f| f.factor.sensitivity());
        let (sum_sensitivity, sum_sensitivity_positive, sum_sensitivity_negative) = signed_sums(sensitivities);

        let (kb, cva) = match base_rho {
            None => (Self::residual_kb(&ws), None),
            Some(base) => {
                let rho = ScenarioScaler::scale(scenario, base, INTRA_BUCKET_DIAGONAL);
                let diversified = rho.quadratic_form(&ws)?.max(0.0);
                match hedge_disallowance {
                    Some(r) => {
                        let hedge_term = r * whs.iter().map(|h| h * h).sum::<f64>();
                        let (sum_hedge, positive, negative) =
                            signed_sums(factors.iter().map(|f| f.factor.hedge_sensitivity()));
                        let detail = CvaDetail {
                            diversified,
                            hedge_disallowance: hedge_term,
                            sum_hedge_sensitivity: sum_hedge,
                            sum_hedge_sensitivity_positive: positive,
                            sum_hedge_sensitivity_negative: negative,
                        };
                        ((diversified + hedge_term).sqrt(), Some(detail))
                    }
                    None => (diversified.sqrt(), None),
                }
            }
        };

        Ok(BucketResult {
            bucket: bucket.to_string(),
            scenario,
            residual: base_rho.is_none(),
            kb,
            sb: ws.iter().sum(),
            sum_sensitivity,
            sum_sensitivity_positive,
            sum_sensitivity_negative,
            curvature: None,
            cva,
        })
    }

    /// Curvature bucket. `base_rho` is `None` for a residual bucket.
    ///
    /// The base correlation is squared before the scenario is applied.
    pub fn curvature(
        bucket: &str,
        scenario: CorrelationScenario,
        factors: &[WeightedFactor],
        base_rho: Option<&CorrelationMatrix>,
    ) -> SbmResult<BucketResult> {
        let (up, down): (Vec<f64>, Vec<f64>) = factors.iter().map(|f| f.factor.cvr()).unzip();
        let sb_up: f64 = up.iter().sum();
        let sb_down: f64 = down.iter().sum();

        let (kb_up, kb_down) = match base_rho {
            None => (
                up.iter().map(|v| v.max(0.0)).sum(),
                down.iter().map(|v| v.max(0.0)).sum(),
            ),
            Some(base) => {
                let rho = ScenarioScaler::scale_squared(scenario, base, INTRA_BUCKET_DIAGONAL);
                (Self::curvature_kb(&up, &rho)?, Self::curvature_kb(&down, &rho)?)
            }
        };

        let detail = CurvatureDetail::select(kb_up, kb_down, sb_up, sb_down);
        let (kb, sb) = detail.selected();

        Ok(BucketResult {
            bucket: bucket.to_string(),
            scenario,
            residual: base_rho.is_none(),
            kb,
            sb,
            sum_sensitivity: 0.0,
            sum_sensitivity_positive: 0.0,
            sum_sensitivity_negative: 0.0,
            curvature: Some(detail),
            cva: None,
        })
    }
}

fn signed_sums(values: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    values.fold((0.0, 0.0, 0.0), |(total, positive, negative), v| {
        if v >= 0.0 {
            (total + v, positive + v, negative)
        } else {
            (total + v, positive, negative + v)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netting::NettedFactor;
    use approx::assert_relative_eq;
    use frtb_core::sensitivity::{Exposure, FactorAttributes, RiskFactorKey};
    use frtb_core::types::SbmError;

    fn linear(s: f64, h: f64, rw: f64) -> WeightedFactor {
        WeightedFactor::new(
            NettedFactor {
                bucket: "1".into(),
                key: RiskFactorKey {
                    sub_bucket: None,
                    attributes: FactorAttributes::Unkeyed,
                },
                exposure: Exposure::Linear {
                    sensitivity: s,
                    hedge_sensitivity: h,
                },
            },
            rw,
        )
    }

    fn curvature(up: f64, down: f64) -> WeightedFactor {
        WeightedFactor::new(
            NettedFactor {
                bucket: "1".into(),
                key: RiskFactorKey {
                    sub_bucket: None,
                    attributes: FactorAttributes::Unkeyed,
                },
                exposure: Exposure::Curvature {
                    cvr_up: up,
                    cvr_down: down,
                },
            },
            1.0,
        )
    }

    #[test]
    fn test_worked_example() {
        let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
        let factors = [linear(100.0, 0.0, 1.0), linear(-50.0, 0.0, 1.0)];
        let result =
            BucketAggregator::linear("1", CorrelationScenario::Medium, &factors, Some(&rho), None).unwrap();
        assert_relative_eq!(result.kb, 86.60254037844386, epsilon = 1e-9);
        assert_relative_eq!(result.sb, 50.0);
        assert_eq!(result.sum_sensitivity_positive, 100.0);
        assert_eq!(result.sum_sensitivity_negative, -50.0);
        assert!(!result.residual);
    }

    #[test]
    fn test_single_factor_reduction() {
        let rho = CorrelationMatrix::identity(1);
        let factors = [linear(-40.0, 0.0, 0.5)];
        for scenario in [CorrelationScenario::Low, CorrelationScenario::High] {
            let result = BucketAggregator::linear("1", scenario, &factors, Some(&rho), None).unwrap();
            assert_relative_eq!(result.kb, 20.0);
        }
    }

    #[test]
    fn test_residual_bucket_is_undiversified() {
        let factors = [linear(10.0, 0.0, 1.0), linear(-5.0, 0.0, 1.0)];
        let result = BucketAggregator::linear("16", CorrelationScenario::Low, &factors, None, None).unwrap();
        assert_eq!(result.kb, 15.0);
        assert_eq!(result.sb, 5.0);
        assert!(result.residual);
    }

    #[test]
    fn test_cva_hedge_disallowance() {
        let rho = CorrelationMatrix::identity(1);
        let factors = [linear(10.0, 4.0, 0.5)];
        let result =
            BucketAggregator::linear("1", CorrelationScenario::Medium, &factors, Some(&rho), Some(0.01)).unwrap();
        // WS = 5 - 2 = 3, WHS = 2
        let cva = result.cva.unwrap();
        assert_relative_eq!(cva.diversified, 9.0);
        assert_relative_eq!(cva.hedge_disallowance, 0.04);
        assert_relative_eq!(result.kb, 9.04f64.sqrt());
        assert_relative_eq!(result.sb, 3.0);
        assert_eq!(cva.sum_hedge_sensitivity, 4.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let rho = CorrelationMatrix::identity(3);
        let factors = [linear(1.0, 0.0, 1.0)];
        let err = BucketAggregator::linear("1", CorrelationScenario::Medium, &factors, Some(&rho), None)
            .unwrap_err();
        assert!(matches!(err, SbmError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_psi_gates_negative_pairs() {
        let psi = BucketAggregator::psi(&[1.0, -1.0, -2.0]);
        assert_eq!(psi.get(0, 1), 1.0);
        assert_eq!(psi.get(1, 2), 0.0);
        assert_eq!(psi.get(2, 2), 0.0);
        assert_eq!(psi.get(0, 0), 1.0);
        assert!(psi.is_symmetric(0.0));
    }

    #[test]
    fn test_curvature_negative_cvr_floors_at_zero() {
        let rho = CorrelationMatrix::identity(1);
        let factors = [curvature(-3.0, 2.0)];
        let result = BucketAggregator::curvature("1", CorrelationScenario::Medium, &factors, Some(&rho)).unwrap();
        let detail = result.curvature.unwrap();
        assert_eq!(detail.kb_up, 0.0);
        assert_eq!(detail.kb_down, 2.0);
        assert_eq!(result.kb, 2.0);
        assert_eq!(result.sb, 2.0);
    }

    #[test]
    fn test_curvature_residual() {
        let factors = [curvature(3.0, -1.0), curvature(-2.0, 4.0)];
        let result = BucketAggregator::curvature("11", CorrelationScenario::High, &factors, None).unwrap();
        let detail = result.curvature.unwrap();
        assert_eq!(detail.kb_up, 3.0);
        assert_eq!(detail.kb_down, 4.0);
        assert_eq!(detail.sb_up, 1.0);
        assert_eq!(detail.sb_down, 3.0);
        assert_eq!(result.kb, 4.0);
    }
}
