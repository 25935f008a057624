//! Sensitivity rows and risk-factor keys.

use crate::types::{RiskClass, SbmError, SbmResult};

use super::attributes::FactorAttributes;

/// Signed exposure carried by a row.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exposure {
    /// Delta or vega sensitivity. `hedge_sensitivity` is only read for CVA.
    Linear {
        /// Sensitivity of the exposure.
        sensitivity: f64,
        /// Sensitivity of eligible hedges (CVA).
        hedge_sensitivity: f64,
    },
    /// Curvature risk under the upward and downward shocks.
    Curvature {
        /// CVR under the upward shock.
        cvr_up: f64,
        /// CVR under the downward shock.
        cvr_down: f64,
    },
}

impl Exposure {
    fn is_finite(&self) -> bool {
        match *self {
            Exposure::Linear {
                sensitivity,
                hedge_sensitivity,
            } => sensitivity.is_finite() && hedge_sensitivity.is_finite(),
            Exposure::Curvature { cvr_up, cvr_down } => cvr_up.is_finite() && cvr_down.is_finite(),
        }
    }
}

/// Identity of a risk factor within a bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskFactorKey {
    /// Sub-bucket qualifier, if any.
    pub sub_bucket: Option<String>,
    /// Risk-factor attributes.
    pub attributes: FactorAttributes,
}

/// One input sensitivity.
///
/// # Examples
///
/// ```
/// use frtb_core::sensitivity::{FactorAttributes, SensitivityRow};
///
/// let row = SensitivityRow::linear("MS_FXDelta".parse().unwrap(), "GBP", FactorAttributes::Unkeyed, 1.0e6);
/// assert!(row.validate().is_ok());
/// assert_eq!(row.sensitivity(), 1.0e6);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensitivityRow {
    /// Risk class.
    pub risk_class: RiskClass,
    /// Regulatory bucket label.
    pub bucket: String,
    /// Sub-bucket qualifier (credit sub-buckets such as `a`/`b`).
    pub sub_bucket: Option<String>,
    /// Risk-factor attributes.
    pub attributes: FactorAttributes,
    /// Exposure.
    pub exposure: Exposure,
}

impl SensitivityRow {
    /// Delta or vega row with no hedge sensitivity.
    pub fn linear(
        risk_class: RiskClass,
        bucket: impl Into<String>,
        attributes: FactorAttributes,
        sensitivity: f64,
    ) -> Self {
        Self {
            risk_class,
            bucket: bucket.into(),
            sub_bucket: None,
            attributes,
            exposure: Exposure::Linear {
                sensitivity,
                hedge_sensitivity: 0.0,
            },
        }
    }

    /// Curvature row.
    pub fn curvature(
        risk_class: RiskClass,
        bucket: impl Into<String>,
        attributes: FactorAttributes,
        cvr_up: f64,
        cvr_down: f64,
    ) -> Self {
        Self {
            risk_class,
            bucket: bucket.into(),
            sub_bucket: None,
            attributes,
            exposure: Exposure::Curvature { cvr_up, cvr_down },
        }
    }

    /// Sets the hedge sensitivity of a linear row.
    pub fn with_hedge(mut self, hedge: f64) -> Self {
        if let Exposure::Linear {
            hedge_sensitivity, ..
        } = &mut self.exposure
        {
            *hedge_sensitivity = hedge;
        }
        self
    }

    /// Sets the sub-bucket.
    pub fn with_sub_bucket(mut self, sub_bucket: impl Into<String>) -> Self {
        self.sub_bucket = Some(sub_bucket.into());
        self
    }

    /// Linear sensitivity, or 0 for curvature rows.
    pub fn sensitivity(&self) -> f64 {
        match self.exposure {
            Exposure::Linear { sensitivity, .. } => sensitivity,
            Exposure::Curvature { .. } => 0.0,
        }
    }

    /// Risk-factor key used for netting.
    pub fn risk_factor_key(&self) -> RiskFactorKey {
        RiskFactorKey {
            sub_bucket: self.sub_bucket.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Checks that attributes and exposure belong to the row's risk class.
    ///
    /// # Errors
    ///
    /// [`SbmError::AttributeMismatch`] describing the first problem.
    pub fn validate(&self) -> SbmResult<()> {
        let mismatch = |detail: String| SbmError::AttributeMismatch {
            risk_class: self.risk_class.code(),
            detail: format!("bucket {}: {}", self.bucket, detail),
        };

        self.attributes.check(self.risk_class).map_err(mismatch)?;

        let curvature_exposure = matches!(self.exposure, Exposure::Curvature { .. });
        if curvature_exposure != self.risk_class.is_curvature() {
            let expected = if self.risk_class.is_curvature() {
                "curvature"
            } else {
                "linear"
            };
            return Err(mismatch(format!("expected {} exposure", expected)));
        }
        if !self.exposure.is_finite() {
            return Err(mismatch("non-finite exposure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitivity::attributes::SpotRepo;

    fn eq_row(name: &str, sensitivity: f64) -> SensitivityRow {
        SensitivityRow::linear(
            "MS_EQDelta".parse().unwrap(),
            "1",
            FactorAttributes::EquityDelta {
                name: name.into(),
                spot_repo: SpotRepo::Spot,
            },
            sensitivity,
        )
    }

    #[test]
    fn test_key_includes_sub_bucket() {
        let a = eq_row("ACME", 1.0);
        let b = eq_row("ACME", 2.0).with_sub_bucket("x");
        assert_ne!(a.risk_factor_key(), b.risk_factor_key());
        assert_eq!(a.risk_factor_key(), eq_row("ACME", 5.0).risk_factor_key());
    }

    #[test]
    fn test_validate_exposure_kind() {
        let row = SensitivityRow::curvature(
            "MS_EQDelta".parse().unwrap(),
            "1",
            FactorAttributes::EquityDelta {
                name: "ACME".into(),
                spot_repo: SpotRepo::Spot,
            },
            1.0,
            -1.0,
        );
        let err = row.validate().unwrap_err();
        assert!(matches!(err, SbmError::AttributeMismatch { .. }));
        assert!(err.to_string().contains("expected linear exposure"));
    }

    #[test]
    fn test_validate_non_finite() {
        assert!(eq_row("ACME", f64::NAN).validate().is_err());
        assert!(eq_row("ACME", 1.0).validate().is_ok());
    }

    #[test]
    fn test_with_hedge_ignored_for_curvature() {
        let row = SensitivityRow::curvature(
            "MS_FXCurvature".parse().unwrap(),
            "USD",
            FactorAttributes::Unkeyed,
            1.0,
            2.0,
        )
        .with_hedge(5.0);
        assert_eq!(
            row.exposure,
            Exposure::Curvature {
                cvr_up: 1.0,
                cvr_down: 2.0
            }
        );
        assert_eq!(row.sensitivity(), 0.0);
    }
}
