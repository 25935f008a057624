//! Risk-factor netting.
//!
//! Rows sharing a bucket and a [`RiskFactorKey`] describe the same risk
//! factor and are summed before any weighting. Output order is the key
//! order, so the result does not depend on the order of the input rows.

use std::collections::BTreeMap;

use frtb_core::sensitivity::{Exposure, RiskFactorKey, SensitivityRow};
use frtb_core::types::{SbmError, SbmResult};

/// One risk factor of a bucket with its summed exposure.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NettedFactor {
    /// Bucket label.
    pub bucket: String,
    /// Risk-factor identity within the bucket.
    pub key: RiskFactorKey,
    /// Net exposure.
    pub exposure: Exposure,
}

impl NettedFactor {
    /// Net sensitivity; zero for curvature factors.
    pub fn sensitivity(&self) -> f64 {
        match self.exposure {
            Exposure::Linear { sensitivity, .. } => sensitivity,
            Exposure::Curvature { .. } => 0.0,
        }
    }

    /// Net hedge sensitivity; zero for curvature factors.
    pub fn hedge_sensitivity(&self) -> f64 {
        match self.exposure {
            Exposure::Linear {
                hedge_sensitivity, ..
            } => hedge_sensitivity,
            Exposure::Curvature { .. } => 0.0,
        }
    }

    /// Net CVR under the upward and downward shocks; zero for linear factors.
    pub fn cvr(&self) -> (f64, f64) {
        match self.exposure {
            Exposure::Curvature { cvr_up, cvr_down } => (cvr_up, cvr_down),
            Exposure::Linear { .. } => (0.0, 0.0),
        }
    }
}

/// A netted factor with its risk weight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedFactor {
    /// The netted factor.
    pub factor: NettedFactor,
    /// Risk weight; 1 for curvature, whose CVRs are already weighted.
    pub risk_weight: f64,
}

impl WeightedFactor {
    /// Attaches a risk weight.
    pub fn new(factor: NettedFactor, risk_weight: f64) -> Self {
        Self {
            factor,
            risk_weight,
        }
    }

    /// `Sensitivity × RiskWeight`.
    #[inline]
    pub fn weighted_sensitivity(&self) -> f64 {
        self.factor.sensitivity() * self.risk_weight
    }

    /// `HedgeSensitivity × RiskWeight`.
    #[inline]
    pub fn weighted_hedge_sensitivity(&self) -> f64 {
        self.factor.hedge_sensitivity() * self.risk_weight
    }
}

fn add_exposure(total: Exposure, next: Exposure) -> Option<Exposure> {
    let sum = match (total, next) {
        (
            Exposure::Linear {
                sensitivity: s1,
                hedge_sensitivity: h1,
            },
            Exposure::Linear {
                sensitivity: s2,
                hedge_sensitivity: h2,
            },
        ) => Exposure::Linear {
            sensitivity: s1 + s2,
            hedge_sensitivity: h1 + h2,
        },
        (
            Exposure::Curvature {
                cvr_up: u1,
                cvr_down: d1,
            },
            Exposure::Curvature {
                cvr_up: u2,
                cvr_down: d2,
            },
        ) => Exposure::Curvature {
            cvr_up: u1 + u2,
            cvr_down: d1 + d2,
        },
        _ => return None,
    };
    Some(sum)
}

/// Adds `exposure` into the entry for `key`, rejecting a change of kind.
fn accumulate(
    factors: &mut BTreeMap<RiskFactorKey, Exposure>,
    bucket: &str,
    key: RiskFactorKey,
    exposure: Exposure,
) -> SbmResult<()> {
    match factors.get_mut(&key) {
        Some(total) => {
            *total = add_exposure(*total, exposure).ok_or_else(|| SbmError::MixedExposure {
                bucket: bucket.to_string(),
                factor: format!("{:?}", key),
            })?;
        }
        None => {
            factors.insert(key, exposure);
        }
    }
    Ok(())
}

fn flatten(grouped: BTreeMap<String, BTreeMap<RiskFactorKey, Exposure>>) -> BTreeMap<String, Vec<NettedFactor>> {
    grouped
        .into_iter()
        .map(|(bucket, factors)| {
            let netted = factors
                .into_iter()
                .map(|(key, exposure)| NettedFactor {
                    bucket: bucket.clone(),
                    key,
                    exposure,
                })
                .collect();
            (bucket, netted)
        })
        .collect()
}

/// Groups sensitivities by bucket and risk factor.
pub struct RiskFactorNetter;

impl RiskFactorNetter {
    /// Nets rows into one factor per (bucket, risk-factor key), grouped by bucket.
    ///
    /// # Errors
    ///
    /// [`SbmError::MixedExposure`] if linear and curvature rows share a
    /// risk factor.
    ///
    /// # Examples
    ///
    /// ```
    /// use frtb_core::sensitivity::{FactorAttributes, SensitivityRow};
    /// use frtb_sbm::netting::RiskFactorNetter;
    ///
    /// let rc = "MS_FXDelta".parse().unwrap();
    /// let rows = vec![
    ///     SensitivityRow::linear(rc, "GBP", FactorAttributes::Unkeyed, 100.0),
    ///     SensitivityRow::linear(rc, "GBP", FactorAttributes::Unkeyed, -30.0),
    ///     SensitivityRow::linear(rc, "JPY", FactorAttributes::Unkeyed, 5.0),
    /// ];
    /// let netted = RiskFactorNetter::net(&rows).unwrap();
    /// assert_eq!(netted.len(), 2);
    /// assert_eq!(netted["GBP"][0].sensitivity(), 70.0);
    /// ```
    pub fn net<'a, I>(rows: I) -> SbmResult<BTreeMap<String, Vec<NettedFactor>>>
    where
        I: IntoIterator<Item = &'a SensitivityRow>,
    {
        let mut grouped: BTreeMap<String, BTreeMap<RiskFactorKey, Exposure>> = BTreeMap::new();
        for row in rows {
            let factors = grouped.entry(row.bucket.clone()).or_default();
            accumulate(factors, &row.bucket, row.risk_factor_key(), row.exposure)?;
        }
        Ok(flatten(grouped))
    }

    /// Nets factors that may repeat a key. Already-netted input is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`SbmError::MixedExposure`] as for [`RiskFactorNetter::net`].
    pub fn renet(factors: &[NettedFactor]) -> SbmResult<Vec<NettedFactor>> {
        let mut grouped: BTreeMap<String, BTreeMap<RiskFactorKey, Exposure>> = BTreeMap::new();
        for factor in factors {
            let entry = grouped.entry(factor.bucket.clone()).or_default();
            accumulate(entry, &factor.bucket, factor.key.clone(), factor.exposure)?;
        }
        Ok(flatten(grouped).into_values().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frtb_core::sensitivity::{FactorAttributes, IrCurveType};
    use frtb_core::types::RiskClass;

    fn ir_row(curve: &str, tenor: &str, s: f64) -> SensitivityRow {
        SensitivityRow::linear(
            "MS_IRDelta".parse::<RiskClass>().unwrap(),
            "USD",
            FactorAttributes::IrDelta {
                curve_type: IrCurveType::Rate,
                curve: curve.to_string(),
                tenor: Some(tenor.parse().unwrap()),
            },
            s,
        )
    }

    #[test]
    fn test_same_key_is_summed() {
        let rows = vec![
            ir_row("SOFR", "5", 10.0),
            ir_row("SOFR", "10", 3.0),
            ir_row("SOFR", "5", -4.0),
        ];
        let netted = RiskFactorNetter::net(&rows).unwrap();
        let usd = &netted["USD"];
        assert_eq!(usd.len(), 2);
        let five = usd
            .iter()
            .find(|f| matches!(&f.key.attributes, FactorAttributes::IrDelta { tenor: Some(t), .. } if t.months() == 60))
            .unwrap();
        assert_eq!(five.sensitivity(), 6.0);
    }

    #[test]
    fn test_order_independent() {
        let rows = vec![
            ir_row("SOFR", "5", 10.0),
            ir_row("ESTR", "1", 2.0),
            ir_row("SOFR", "5", 1.0),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(RiskFactorNetter::net(&rows).unwrap(), RiskFactorNetter::net(&reversed).unwrap());
    }

    #[test]
    fn test_sub_bucket_is_part_of_key() {
        let rc: RiskClass = "CS_CRDelta".parse().unwrap();
        let rows = vec![
            SensitivityRow::linear(rc, "1", FactorAttributes::Unkeyed, 1.0).with_sub_bucket("a"),
            SensitivityRow::linear(rc, "1", FactorAttributes::Unkeyed, 1.0).with_sub_bucket("b"),
        ];
        assert_eq!(RiskFactorNetter::net(&rows).unwrap()["1"].len(), 2);
    }

    #[test]
    fn test_hedge_and_curvature_are_summed() {
        let cva: RiskClass = "CS_FXDelta".parse().unwrap();
        let rows = vec![
            SensitivityRow::linear(cva, "EUR", FactorAttributes::Unkeyed, 5.0).with_hedge(-1.0),
            SensitivityRow::linear(cva, "EUR", FactorAttributes::Unkeyed, 5.0).with_hedge(-2.0),
        ];
        let netted = RiskFactorNetter::net(&rows).unwrap();
        assert_eq!(netted["EUR"][0].hedge_sensitivity(), -3.0);

        let curv: RiskClass = "MS_FXCurvature".parse().unwrap();
        let rows = vec![
            SensitivityRow::curvature(curv, "EUR", FactorAttributes::Unkeyed, 1.0, -2.0),
            SensitivityRow::curvature(curv, "EUR", FactorAttributes::Unkeyed, 0.5, 1.0),
        ];
        assert_eq!(RiskFactorNetter::net(&rows).unwrap()["EUR"][0].cvr(), (1.5, -1.0));
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<SensitivityRow> = Vec::new();
        assert!(RiskFactorNetter::net(&rows).unwrap().is_empty());
        assert!(RiskFactorNetter::renet(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_renet_is_idempotent() {
        let rows = vec![
            ir_row("SOFR", "5", 10.0),
            ir_row("SOFR", "5", 1.0),
            ir_row("ESTR", "2", -7.0),
        ];
        let netted: Vec<NettedFactor> = RiskFactorNetter::net(&rows).unwrap().into_values().flatten().collect();
        assert_eq!(RiskFactorNetter::renet(&netted).unwrap(), netted);
    }

    #[test]
    fn test_mixed_exposure_kinds_are_rejected() {
        let rc: RiskClass = "MS_FXDelta".parse().unwrap();
        let rows = vec![
            SensitivityRow::linear(rc, "GBP", FactorAttributes::Unkeyed, 100.0),
            SensitivityRow::curvature(rc, "GBP", FactorAttributes::Unkeyed, 40.0, -10.0),
        ];
        let err = RiskFactorNetter::net(&rows).unwrap_err();
        assert!(matches!(err, SbmError::MixedExposure { ref bucket, .. } if bucket == "GBP"));

        let linear = RiskFactorNetter::net(&rows[..1]).unwrap().remove("GBP").unwrap();
        let curvature = RiskFactorNetter::net(&rows[1..]).unwrap().remove("GBP").unwrap();
        let mixed: Vec<NettedFactor> = linear.into_iter().chain(curvature).collect();
        assert!(RiskFactorNetter::renet(&mixed).is_err());
    }
}
