//! Equity rules, market risk and CVA.

use frtb_core::sensitivity::{FactorAttributes, RiskFactorKey, SpotRepo};
use frtb_core::types::{AssetClass, AssetClassKey, Regime, SbmResult, SensitivityType};

use super::{RiskClassRules, RuleContext};
use crate::netting::NettedFactor;

/// Market-risk equity.
///
/// Delta weights depend on spot versus repo, vega weights on the bucket's
/// market-cap tier. Name correlation is set per bucket.
pub struct EquityRules;

impl RiskClassRules for EquityRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::Equity)
    }

    fn description(&self) -> &'static str {
        "Equity"
    }

    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        let params = ctx.params;
        let bucket = factor.bucket.as_str();
        match ctx.risk_class.sensitivity() {
            SensitivityType::Delta => {
                let FactorAttributes::EquityDelta { spot_repo, .. } = &factor.key.attributes else {
                    return Err(ctx.mismatch(bucket, &factor.key.attributes));
                };
                let (table, item) = match spot_repo {
                    SpotRepo::Spot => (&params.delta_bucket_risk_weights, "delta risk weight"),
                    SpotRepo::Repo => (&params.delta_repo_bucket_risk_weights, "delta repo risk weight"),
                };
                table
                    .get(bucket)
                    .copied()
                    .ok_or_else(|| ctx.lookup_error(item, bucket))
            }
            SensitivityType::Vega => {
                let cap = params
                    .bucket(bucket)
                    .and_then(|b| b.market_cap)
                    .ok_or_else(|| ctx.lookup_error("market cap", bucket))?;
                params
                    .vega_market_cap_risk_weights
                    .get(cap)
                    .ok_or_else(|| ctx.lookup_error("vega risk weight", cap.label()))
            }
            SensitivityType::Curvature => Ok(1.0),
        }
    }

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
                EquityDelta {
                    name: na,
                    spot_repo: sa,
                },
                EquityDelta {
                    name: nb,
                    spot_repo: sb,
                },
            ) => {
                let mut corr = name_factor(na != nb)?;
                if sa != sb {
                    corr *= ctx.require(ctx.params.rho.spot_repo, "rho", "spot_repo")?;
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
            ) => {
                let table = ctx.table(&ctx.params.vega_option_rho_table, "vega option rho table")?;
                let option = table.lookup(ctx.risk_class, "vega option maturity", *oa, *ob)?;
                Ok(name_factor(na != nb)? * option)
            }
            (NamedCurvature { name: na }, NamedCurvature { name: nb }) => name_factor(na != nb),
            (x, y) => Err(ctx.pair_mismatch(bucket, x, y)),
        }
    }
}

/// SA-CVA equity: one factor per bucket, vega weighted by bucket.
pub struct CvaEquityRules;

impl RiskClassRules for CvaEquityRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::Equity)
    }

    fn description(&self) -> &'static str {
        "CVA equity"
    }
}
