//! Commodity rules, market risk and CVA.

use frtb_core::sensitivity::{FactorAttributes, RiskFactorKey};
use frtb_core::types::{AssetClass, AssetClassKey, Regime, SbmResult};

use super::{RiskClassRules, RuleContext};

/// Market-risk commodity. Risk weights come straight from the bucket table.
pub struct CommodityRules;

impl RiskClassRules for CommodityRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::Commodity)
    }

    fn description(&self) -> &'static str {
        "Commodity"
    }

    /// Delta multiplies the bucket's name correlation with the tenor and
    /// delivery-location (basis) constants for each attribute that differs.
    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        use FactorAttributes::*;

        let name_factor = |differ: bool| -> SbmResult<f64> {
            if differ {
                ctx.bucket_name_rho(bucket)
            } else {
                Ok(1.0)
            }
        };

        match (&a.attributes, &b.attributes) {
            (
                CommodityDelta {
                    name: na,
                    delivery_location: la,
                    tenor: ta,
                },
                CommodityDelta {
                    name: nb,
                    delivery_location: lb,
                    tenor: tb,
                },
            ) => {
                let mut corr = name_factor(na != nb)?;
                if ta != tb {
                    corr *= ctx.require(ctx.params.rho.tenor, "rho", "tenor")?;
                }
                if la != lb {
                    corr *= ctx.require(ctx.params.rho.basis, "rho", "basis")?;
                }
                Ok(corr)
            }
            (
                NamedVega {
                    name: na,
                    option_maturity: oa,
                },
                NamedVega {
                    name: nb,
                    option_maturity: ob,
                },
            ) => Ok(name_factor(na != nb)? * ctx.option_rho(*oa, *ob)?),
            (NamedCurvature { name: na }, NamedCurvature { name: nb }) => name_factor(na != nb),
            (x, y) => Err(ctx.pair_mismatch(bucket, x, y)),
        }
    }
}

/// SA-CVA commodity: one factor per bucket.
pub struct CvaCommodityRules;

impl RiskClassRules for CvaCommodityRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::Commodity)
    }

    fn description(&self) -> &'static str {
        "CVA commodity"
    }
}
