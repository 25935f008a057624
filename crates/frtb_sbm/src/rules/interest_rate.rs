//! General interest rate risk (GIRR) and CVA interest rate rules.

use std::f64::consts::SQRT_2;

use frtb_core::math::CorrelationMatrix;
use frtb_core::sensitivity::{FactorAttributes, IrCurveType, RiskFactorKey};
use frtb_core::types::{AssetClass, AssetClassKey, Regime, SbmResult, Tenor};

use super::{default_risk_weight, RiskClassRules, RuleContext};
use crate::gamma::GammaBuilder;
use crate::netting::NettedFactor;

/// Market-risk GIRR. Buckets are currencies.
pub struct GirrRules;

impl GirrRules {
    fn delta_weight(
        ctx: &RuleContext<'_>,
        factor: &NettedFactor,
        curve_type: IrCurveType,
        tenor: Option<Tenor>,
    ) -> SbmResult<f64> {
        let params = ctx.params;
        let bucket = factor.bucket.as_str();
        let weight = match (curve_type, tenor) {
            (IrCurveType::Rate, Some(tenor)) => params
                .delta_tenor_risk_weights
                .get(&tenor)
                .copied()
                .ok_or_else(|| ctx.lookup_error("delta tenor risk weight", tenor.to_string()))?,
            (IrCurveType::Rate, None) => return Err(ctx.mismatch(bucket, &factor.key.attributes)),
            (IrCurveType::Inflation, _) => {
                ctx.require(params.delta_inflation_risk_weight, "delta inflation risk weight", bucket)?
            }
            (IrCurveType::CrossCurrency, _) => {
                ctx.require(params.delta_xccy_risk_weight, "delta xccy risk weight", bucket)?
            }
        };
        if ctx.is_liquid_currency(bucket) {
            Ok(weight / SQRT_2)
        } else {
            Ok(weight)
        }
    }

    fn delta_rho(
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &FactorAttributes,
        b: &FactorAttributes,
    ) -> SbmResult<f64> {
        let (
            FactorAttributes::IrDelta {
                curve_type: type_a,
                curve: curve_a,
                tenor: tenor_a,
            },
            FactorAttributes::IrDelta {
                curve_type: type_b,
                curve: curve_b,
                tenor: tenor_b,
            },
        ) = (a, b)
        else {
            return Err(ctx.pair_mismatch(bucket, a, b));
        };
        let rho = &ctx.params.rho;

        let mut corr = if *type_a == IrCurveType::CrossCurrency || *type_b == IrCurveType::CrossCurrency {
            ctx.require(rho.xccy, "rho", "xccy")?
        } else if *type_a == IrCurveType::Inflation || *type_b == IrCurveType::Inflation {
            if type_a == type_b {
                1.0
            } else {
                ctx.require(rho.inflation, "rho", "inflation")?
            }
        } else {
            let (Some(tenor_a), Some(tenor_b)) = (tenor_a, tenor_b) else {
                return Err(ctx.mismatch(bucket, if tenor_a.is_none() { a } else { b }));
            };
            ctx.table(&ctx.params.delta_tenor_rho_table, "delta tenor rho table")?
                .lookup(ctx.risk_class, "delta tenor", *tenor_a, *tenor_b)?
        };

        if type_a == type_b && curve_a != curve_b {
            corr *= ctx.require(rho.curve, "rho", "curve")?;
        }
        Ok(corr)
    }

    fn vega_rho(
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &FactorAttributes,
        b: &FactorAttributes,
    ) -> SbmResult<f64> {
        let (
            FactorAttributes::IrVega {
                curve_type: type_a,
                option_maturity: option_a,
                underlying_maturity: underlying_a,
            },
            FactorAttributes::IrVega {
                curve_type: type_b,
                option_maturity: option_b,
                underlying_maturity: underlying_b,
            },
        ) = (a, b)
        else {
            return Err(ctx.pair_mismatch(bucket, a, b));
        };
        let option_rho = || -> SbmResult<f64> {
            ctx.table(&ctx.params.vega_option_rho_table, "vega option rho table")?
                .lookup(ctx.risk_class, "vega option maturity", *option_a, *option_b)
        };

        match (type_a, type_b) {
            (IrCurveType::Rate, IrCurveType::Rate) => {
                let (Some(underlying_a), Some(underlying_b)) = (underlying_a, underlying_b) else {
                    return Err(ctx.mismatch(bucket, if underlying_a.is_none() { a } else { b }));
                };
                let underlying = ctx
                    .table(&ctx.params.vega_underlying_rho_table, "vega underlying rho table")?
                    .lookup(ctx.risk_class, "vega underlying maturity", *underlying_a, *underlying_b)?;
                Ok(option_rho()? * underlying)
            }
            _ if type_a == type_b => option_rho(),
            (IrCurveType::CrossCurrency, _) | (_, IrCurveType::CrossCurrency) => {
                ctx.require(ctx.params.rho.xccy, "rho", "xccy")
            }
            _ => Ok(ctx.require(ctx.params.rho.inflation, "rho", "inflation")? * option_rho()?),
        }
    }
}

impl RiskClassRules for GirrRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::InterestRate)
    }

    fn description(&self) -> &'static str {
        "General interest rate risk"
    }

    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        match &factor.key.attributes {
            FactorAttributes::IrDelta {
                curve_type, tenor, ..
            } => Self::delta_weight(ctx, factor, *curve_type, *tenor),
            _ => default_risk_weight(ctx, factor),
        }
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        match &a.attributes {
            FactorAttributes::IrVega { .. } => Self::vega_rho(ctx, bucket, &a.attributes, &b.attributes),
            _ => Self::delta_rho(ctx, bucket, &a.attributes, &b.attributes),
        }
    }

    fn build_gamma(&self, ctx: &RuleContext<'_>, buckets: &[String]) -> SbmResult<CorrelationMatrix> {
        let gamma = GammaBuilder::standard(ctx, buckets)?;
        Ok(GammaBuilder::with_peg(ctx, buckets, gamma))
    }
}

/// SA-CVA interest rate. Buckets are currencies.
pub struct CvaInterestRateRules;

impl CvaInterestRateRules {
    /// Liquid list plus ERM II currencies; the reporting currency is not added.
    fn is_liquid(ctx: &RuleContext<'_>, bucket: &str) -> bool {
        ctx.params.liquid_currencies.iter().any(|c| c == bucket)
            || ctx.params.erm2_currencies.contains_key(bucket)
    }
}

impl RiskClassRules for CvaInterestRateRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::InterestRate)
    }

    fn description(&self) -> &'static str {
        "CVA interest rate"
    }

    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        let FactorAttributes::CvaIrDelta { curve_type, tenor } = &factor.key.attributes else {
            return default_risk_weight(ctx, factor);
        };
        let params = ctx.params;
        let bucket = factor.bucket.as_str();
        let liquid = Self::is_liquid(ctx, bucket);

        match (curve_type, liquid) {
            (IrCurveType::Rate, true) => {
                let tenor = tenor.ok_or_else(|| ctx.mismatch(bucket, &factor.key.attributes))?;
                params
                    .delta_tenor_risk_weights
                    .get(&tenor)
                    .copied()
                    .ok_or_else(|| ctx.lookup_error("delta tenor risk weight", tenor.to_string()))
            }
            (IrCurveType::Rate, false) => {
                ctx.require(params.delta_illiquid_risk_weight, "delta illiquid risk weight", bucket)
            }
            (IrCurveType::Inflation, true) => {
                ctx.require(params.delta_inflation_risk_weight, "delta inflation risk weight", bucket)
            }
            (IrCurveType::Inflation, false) => ctx.require(
                params.delta_inflation_illiquid_risk_weight,
                "delta inflation illiquid risk weight",
                bucket,
            ),
            (IrCurveType::CrossCurrency, _) => Err(ctx.mismatch(bucket, &factor.key.attributes)),
        }
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        let rho = &ctx.params.rho;
        match (&a.attributes, &b.attributes) {
            (
                FactorAttributes::CvaIrDelta {
                    curve_type: type_a,
                    tenor: tenor_a,
                },
                FactorAttributes::CvaIrDelta {
                    curve_type: type_b,
                    tenor: tenor_b,
                },
            ) => {
                if *type_a == IrCurveType::Inflation || *type_b == IrCurveType::Inflation {
                    if type_a == type_b {
                        Ok(1.0)
                    } else {
                        ctx.require(rho.inflation, "rho", "inflation")
                    }
                } else if Self::is_liquid(ctx, bucket) {
                    let (Some(tenor_a), Some(tenor_b)) = (tenor_a, tenor_b) else {
                        return Err(ctx.pair_mismatch(bucket, &a.attributes, &b.attributes));
                    };
                    ctx.table(&ctx.params.delta_tenor_rho_table, "delta tenor rho table")?
                        .lookup(ctx.risk_class, "delta tenor", *tenor_a, *tenor_b)
                } else {
                    ctx.require(rho.illiquid, "rho", "illiquid")
                }
            }
            (FactorAttributes::CvaIrVega { .. }, FactorAttributes::CvaIrVega { .. }) => {
                ctx.require(rho.vega, "rho", "vega")
            }
            (x, y) => Err(ctx.pair_mismatch(bucket, x, y)),
        }
    }
}
