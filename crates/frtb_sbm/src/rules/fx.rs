//! FX rules, market risk and CVA.
//!
//! Buckets are currencies. Delta has one factor per bucket; market-risk
//! vega keys factors by option maturity.

use frtb_core::sensitivity::{FactorAttributes, RiskFactorKey};
use frtb_core::types::{AssetClass, AssetClassKey, Regime, SbmResult, SensitivityType};

use super::{default_risk_weight, RiskClassRules, RuleContext};
use crate::netting::NettedFactor;

/// Market-risk FX.
pub struct FxRules;

impl FxRules {
    /// Delta weight of a currency bucket. Each rule that applies replaces the
    /// previous one:
    ///
    /// 1. `delta_risk_weight`
    /// 2. liquid currency: divided by √2
    /// 3. ERM II currency: its band if below `erm2_band`, else divided by 3
    /// 4. EUR-pegged currency: divided by 2
    fn delta_weight(ctx: &RuleContext<'_>, bucket: &str) -> SbmResult<f64> {
        let params = ctx.params;
        let base = ctx.require(params.delta_risk_weight, "delta risk weight", bucket)?;

        let mut weight = base;
        if params.liquid_currencies.iter().any(|c| c == bucket) {
            weight = base / std::f64::consts::SQRT_2;
        }
        if let Some(&band) = params.erm2_currencies.get(bucket) {
            weight = match params.erm2_band {
                Some(limit) if band < limit => band,
                _ => base / 3.0,
            };
        }
        if params.eur_peg_currencies.iter().any(|c| c == bucket) {
            weight = base / 2.0;
        }
        Ok(weight)
    }
}

impl RiskClassRules for FxRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::MarketRisk, AssetClass::Fx)
    }

    fn description(&self) -> &'static str {
        "Foreign exchange"
    }

    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        match ctx.risk_class.sensitivity() {
            SensitivityType::Delta => Self::delta_weight(ctx, &factor.bucket),
            _ => default_risk_weight(ctx, factor),
        }
    }

    /// Vega factors correlate by option maturity alone.
    fn pairwise_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        a: &RiskFactorKey,
        b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        match (&a.attributes, &b.attributes) {
            (
                FactorAttributes::FxVega { option_maturity: oa },
                FactorAttributes::FxVega { option_maturity: ob },
            ) => {
                let table = ctx.table(&ctx.params.vega_option_rho_table, "vega option rho table")?;
                table.lookup(ctx.risk_class, "vega option maturity", *oa, *ob)
            }
            (FactorAttributes::Unkeyed, FactorAttributes::Unkeyed) => Ok(0.0),
            (x, y) => Err(ctx.pair_mismatch(bucket, x, y)),
        }
    }
}

/// SA-CVA FX: flat delta and vega weights, one factor per bucket.
pub struct CvaFxRules;

impl RiskClassRules for CvaFxRules {
    fn asset_class(&self) -> AssetClassKey {
        AssetClassKey::new(Regime::Cva, AssetClass::Fx)
    }

    fn description(&self) -> &'static str {
        "CVA foreign exchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;
    use approx::assert_relative_eq;
    use frtb_core::types::{RiskClass, Tenor};
    use std::f64::consts::SQRT_2;

    fn rc(code: &str) -> RiskClass {
        code.parse().unwrap()
    }

    fn delta_weight(config: &infra_config::FrtbConfig, bucket: &str) -> f64 {
        let ctx = RuleContext::new(config, rc("MS_FXDelta")).unwrap();
        let f = factor(bucket, FactorAttributes::Unkeyed, 1.0);
        FxRules.risk_weight(&ctx, &f).unwrap()
    }

    #[test]
    fn test_liquid_currency_weights() {
        let config = bcbs();
        assert_relative_eq!(delta_weight(&config, "EUR"), 0.15 / SQRT_2);
        assert_relative_eq!(delta_weight(&config, "BRL"), 0.15 / SQRT_2);
        assert_relative_eq!(delta_weight(&config, "ZMW"), 0.15);
    }

    #[test]
    fn test_erm2_and_peg_weights() {
        let mut config = bcbs();
        let key: AssetClassKey = "MS_FX".parse().unwrap();
        let params = config.asset_classes.get_mut(&key).unwrap();
        params.erm2_currencies.insert("DKK".into(), 0.0225);
        params.erm2_currencies.insert("BGN".into(), 0.15);
        params.erm2_band = Some(0.1);
        params.eur_peg_currencies = vec!["XOF".into(), "BGN".into()];

        assert_relative_eq!(delta_weight(&config, "DKK"), 0.0225);
        assert_relative_eq!(delta_weight(&config, "XOF"), 0.075);
        // The peg rule is applied last
        assert_relative_eq!(delta_weight(&config, "BGN"), 0.075);

        config
            .asset_classes
            .get_mut(&key)
            .unwrap()
            .eur_peg_currencies
            .clear();
        assert_relative_eq!(delta_weight(&config, "BGN"), 0.05);
    }

    #[test]
    fn test_vega_weight_and_rho() {
        let config = bcbs();
        let ctx = RuleContext::new(&config, rc("MS_FXVega")).unwrap();
        let vega = |maturity: &str| FactorAttributes::FxVega {
            option_maturity: maturity.parse::<Tenor>().unwrap(),
        };
        let f = factor("GBP", vega("1"), 1.0);
        let g = factor("GBP", vega("5"), 1.0);
        assert_relative_eq!(FxRules.risk_weight(&ctx, &f).unwrap(), 1.0);
        let rho = FxRules.pairwise_rho(&ctx, "GBP", &f.key, &g.key).unwrap();
        assert_relative_eq!(rho, (-0.04f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_cva_fx_weights() {
        let config = bcbs();
        let f = factor("JPY", FactorAttributes::Unkeyed, 1.0);
        let delta = RuleContext::new(&config, rc("CS_FXDelta")).unwrap();
        let vega = RuleContext::new(&config, rc("CS_FXVega")).unwrap();
        assert_relative_eq!(CvaFxRules.risk_weight(&delta, &f).unwrap(), 0.11);
        assert_relative_eq!(CvaFxRules.risk_weight(&vega, &f).unwrap(), 1.0);
    }
}
