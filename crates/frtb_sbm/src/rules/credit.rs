//! Credit spread rules: non-securitisations, securitisations (CTP and
//! non-CTP), CVA counterparty and CVA reference credit.

use frtb_core::sensitivity::{FactorAttributes, RiskFactorKey};
use frtb_core::types::{AssetClass, AssetClassKey, Regime, SbmResult};

use super::{default_risk_weight, RiskClassRules, RuleContext};
use crate::netting::NettedFactor;

/// Pairwise correlation shared by the market-risk credit classes.
///
/// Starts from 1 and multiplies by the name (or tranche) constant when the
/// names differ; delta adds basis and tenor, vega the option-maturity
/// correlation capped at 1, curvature nothing more.
fn issuer_rho(
    ctx: &RuleContext<'_>,
    bucket: &str,
    name_rho: Option<f64>,
    name_item: &str,
    a: &FactorAttributes,
    b: &FactorAttributes,
) -> SbmResult<f64> {
    use FactorAttributes::*;

    let constants = ctx.params.rho_for(bucket);
    let name_factor = |differ: bool| -> SbmResult<f64> {
        if differ {
            ctx.require(name_rho, "rho", name_item)
        } else {
            Ok(1.0)
        }
    };
    let delta = |names_differ: bool, curves_differ: bool, tenors_differ: bool| -> SbmResult<f64> {
        let mut corr = name_factor(names_differ)?;
        if curves_differ {
            corr *= ctx.require(constants.basis, "rho", "basis")?;
        }
        if tenors_differ {
            corr *= ctx.require(constants.tenor, "rho", "tenor")?;
        }
        Ok(corr)
    };

    match (a, b) {
        (
            CreditDelta {
                name: na,
                curve_type: ca,
                tenor: ta,
                ..
            },
            CreditDelta {
                name: nb,
                curve_type: cb,
                tenor: tb,
                ..
            },
        ) => delta(na != nb, ca != cb, ta != tb),
        (
            SecuritisationDelta {
                tranche: na,
                curve_type: ca,
                tenor: ta,
            },
            SecuritisationDelta {
                tranche: nb,
                curve_type: cb,
                tenor: tb,
            },
        ) => delta(na != nb, ca != cb, ta != tb),
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

/// Market-risk credit spread, non-securitisations.
pub struct CreditNonSecRules;

impl RiskClassRules for CreditNonSecRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::CreditNonSec)
    }

    fn description(&self) -> &'static str {
        "Credit spread, non-securitisation"
    }

    /// Bucket weight, replaced by the covered-bond weight for highly rated
    /// issuers in the covered-bond bucket.
    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        let weight = default_risk_weight(ctx, factor)?;
        let FactorAttributes::CreditDelta {
            rating: Some(rating), ..
        } = &factor.key.attributes
        else {
            return Ok(weight);
        };
        match &ctx.params.covered_bond {
            Some(covered)
                if covered.bucket == factor.bucket
                    && covered.high_quality_ratings.iter().any(|r| r == rating) =>
            {
                Ok(covered.risk_weight)
            }
            _ => Ok(weight),
        }
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        let name_rho = ctx.params.rho_for(bucket).name;
        issuer_rho(ctx, bucket, name_rho, "name", &a.attributes, &b.attributes)
    }
}

/// Market-risk credit spread, securitisations in the correlation trading portfolio.
pub struct CreditSecCtpRules;

impl RiskClassRules for CreditSecCtpRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::CreditSecCtp)
    }

    fn description(&self) -> &'static str {
        "Credit spread, securitisation (CTP)"
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        issuer_rho(ctx, bucket, ctx.params.rho.name, "name", &a.attributes, &b.attributes)
    }
}

/// Market-risk credit spread, securitisations outside the CTP.
pub struct CreditSecNonCtpRules;

impl RiskClassRules for CreditSecNonCtpRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::CreditSecNonCtp)
    }

    fn description(&self) -> &'static str {
        "Credit spread, securitisation (non-CTP)"
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        issuer_rho(ctx, bucket, ctx.params.rho.tranche, "tranche", &a.attributes, &b.attributes)
    }
}

/// SA-CVA counterparty credit spread.
pub struct CvaCounterpartyRules;

impl RiskClassRules for CvaCounterpartyRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::CreditSecCtp)
    }

    fn description(&self) -> &'static str {
        "CVA counterparty credit spread"
    }

    /// Keyed by credit quality, then bucket plus sub-bucket (`1a`, `2`, ...).
    /// Without a quality table the bucket weights apply.
    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        let tables = &ctx.params.delta_quality_risk_weights;
        let FactorAttributes::CounterpartyDelta { credit_quality, .. } = &factor.key.attributes else {
            return Err(ctx.mismatch(&factor.bucket, &factor.key.attributes));
        };
        if tables.is_empty() {
            return default_risk_weight(ctx, factor);
        }
        let quality = credit_quality.code();
        let key = format!(
            "{}{}",
            factor.bucket,
            factor.key.sub_bucket.as_deref().unwrap_or_default()
        );
        tables
            .get(quality)
            .and_then(|table| table.get(&key))
            .copied()
            .ok_or_else(|| ctx.lookup_error("delta quality risk weight", format!("{} {}", quality, key)))
    }

    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        let (
            FactorAttributes::CounterpartyDelta {
                name: name_a,
                parent: parent_a,
                credit_quality: quality_a,
                tenor: tenor_a,
            },
            FactorAttributes::CounterpartyDelta {
                name: name_b,
                parent: parent_b,
                credit_quality: quality_b,
                tenor: tenor_b,
            },
        ) = (&a.attributes, &b.attributes)
        else {
            return Err(ctx.pair_mismatch(bucket, &a.attributes, &b.attributes));
        };
        let constants = ctx.params.rho_for(bucket);

        let mut corr = 1.0;
        if parent_a == parent_b {
            if name_a != name_b {
                corr *= ctx.require(constants.related_name, "rho", "related_name")?;
            }
        } else {
            corr *= ctx.require(constants.unrelated_name, "rho", "unrelated_name")?;
        }
        if quality_a != quality_b {
            corr *= ctx.require(constants.credit_quality, "rho", "credit_quality")?;
        }
        if tenor_a != tenor_b {
            corr *= ctx.require(constants.tenor, "rho", "tenor")?;
        }
        Ok(corr)
    }
}

/// SA-CVA reference credit spread: one factor per bucket.
pub struct CvaReferenceCreditRules;

impl RiskClassRules for CvaReferenceCreditRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::CreditNonSec)
    }

    fn description(&self) -> &'static str {
        "CVA reference credit spread"
    }
}
