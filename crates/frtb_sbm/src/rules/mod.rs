//! Per-asset-class risk-weight, correlation and Γ strategies.
//!
//! Each regime and asset class has one [`RiskClassRules`] implementation.
//! The three operations of the trait (`assign_weights`, `build_rho`,
//! `build_gamma`) carry default bodies for the common behaviour; the
//! implementations override only what their asset class does differently.
//!
//! [`RulesRegistry::standard`] maps every asset class to its rules from a
//! static table. The registry is handed to the calculator explicitly.

mod commodity;
mod credit;
mod equity;
mod fx;
mod interest_rate;

pub use commodity::{CommodityRules, CvaCommodityRules};
pub use credit::{
    CreditNonSecRules, CreditSecCtpRules, CreditSecNonCtpRules, CvaCounterpartyRules,
    CvaReferenceCreditRules,
};
pub use equity::{CvaEquityRules, EquityRules};
pub use fx::{CvaFxRules, FxRules};
pub use interest_rate::{CvaInterestRateRules, GirrRules};

use std::collections::BTreeMap;
use std::fmt;

use frtb_core::math::CorrelationMatrix;
use frtb_core::sensitivity::{FactorAttributes, RiskFactorKey};
use frtb_core::types::{AssetClassKey, RiskClass, SbmError, SbmResult, SensitivityType, Tenor};
use infra_config::{AssetClassParams, FrtbConfig, TenorTable};

use crate::gamma::GammaBuilder;
use crate::netting::{NettedFactor, WeightedFactor};

/// Everything a rule needs to resolve parameters for one risk class.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// Risk class being computed.
    pub risk_class: RiskClass,
    /// Full parameter store.
    pub config: &'a FrtbConfig,
    /// Parameters of the risk class's asset class.
    pub params: &'a AssetClassParams,
}

impl<'a> RuleContext<'a> {
    /// Resolves the parameter set of `risk_class`.
    pub fn new(config: &'a FrtbConfig, risk_class: RiskClass) -> SbmResult<Self> {
        Ok(Self {
            risk_class,
            config,
            params: config.params_for(risk_class)?,
        })
    }

    /// [`SbmError::ConfigLookup`] for this risk class.
    pub fn lookup_error(&self, item: &str, key: impl Into<String>) -> SbmError {
        SbmError::lookup(self.risk_class.code(), item, key)
    }

    /// Unwraps an optional scalar parameter.
    pub fn require(&self, value: Option<f64>, item: &str, key: &str) -> SbmResult<f64> {
        value.ok_or_else(|| self.lookup_error(item, key))
    }

    /// Unwraps an optional tenor table.
    pub fn table(&self, table: &'a Option<TenorTable>, item: &str) -> SbmResult<&'a TenorTable> {
        table
            .as_ref()
            .ok_or_else(|| self.lookup_error(item, self.risk_class.asset_class_key().code()))
    }

    /// Attribute mismatch for a factor the rules cannot interpret.
    pub fn mismatch(&self, bucket: &str, attributes: &FactorAttributes) -> SbmError {
        SbmError::AttributeMismatch {
            risk_class: self.risk_class.code(),
            detail: format!(
                "bucket {}: unexpected {} attributes",
                bucket,
                attributes.kind()
            ),
        }
    }

    /// Attribute mismatch naming whichever of a pair is of the wrong kind.
    pub fn pair_mismatch(&self, bucket: &str, a: &FactorAttributes, b: &FactorAttributes) -> SbmError {
        let expected = FactorAttributes::expected_kind(self.risk_class);
        if a.kind() != expected {
            self.mismatch(bucket, a)
        } else {
            self.mismatch(bucket, b)
        }
    }

    /// Option-maturity correlation, capped at 1.
    pub fn option_rho(&self, a: Tenor, b: Tenor) -> SbmResult<f64> {
        let table = self.table(&self.params.vega_option_rho_table, "vega option rho table")?;
        Ok(table
            .lookup(self.risk_class, "vega option maturity", a, b)?
            .min(1.0))
    }

    /// Returns true if the currency bucket gets the liquid-currency treatment
    /// (configured list plus reporting currency).
    pub fn is_liquid_currency(&self, bucket: &str) -> bool {
        self.params.liquid_currencies.iter().any(|c| c == bucket)
            || self.config.reporting_currency.as_deref() == Some(bucket)
    }

    /// Name correlation of a bucket: per-bucket `name_rho`, else the constant.
    pub fn bucket_name_rho(&self, bucket: &str) -> SbmResult<f64> {
        match self.params.bucket(bucket).and_then(|b| b.name_rho) {
            Some(rho) => Ok(rho),
            None => self.require(self.params.rho_for(bucket).name, "name rho", bucket),
        }
    }
}

/// Risk-weight, correlation and Γ rules of one asset class.
pub trait RiskClassRules: Send + Sync {
    /// Asset class served.
    fn asset_class(&self) -> AssetClassKey;

    /// Short human-readable name.
    fn description(&self) -> &'static str;

    /// Risk weight of a delta or vega factor.
    ///
    /// Delta looks up `delta_bucket_risk_weights` by bucket plus sub-bucket,
    /// then by bucket, then falls back to `delta_risk_weight`. Vega uses
    /// `vega_bucket_risk_weights`, then `vega_risk_weight`.
    fn risk_weight(&self, ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
        default_risk_weight(ctx, factor)
    }

    /// Attaches risk weights. Curvature factors get 1.
    fn assign_weights(
        &self,
        ctx: &RuleContext<'_>,
        factors: Vec<NettedFactor>,
    ) -> SbmResult<Vec<WeightedFactor>> {
        if ctx.risk_class.is_curvature() {
            return Ok(factors
                .into_iter()
                .map(|f| WeightedFactor::new(f, 1.0))
                .collect());
        }
        factors
            .into_iter()
            .map(|f| {
                let rw = self.risk_weight(ctx, &f)?;
                Ok(WeightedFactor::new(f, rw))
            })
            .collect()
    }

    /// Base correlation between two distinct factors of a bucket.
    ///
    /// The default treats factors as uncorrelated, which is only reached by
    /// asset classes with a single factor per bucket.
    fn pairwise_rho(
        &self,
        _ctx: &RuleContext<'_>,
        _bucket: &str,
        _a: &RiskFactorKey,
        _b: &RiskFactorKey,
    ) -> SbmResult<f64> {
        Ok(0.0)
    }

    /// Unscaled intra-bucket correlation with unit diagonal.
    fn build_rho(
        &self,
        ctx: &RuleContext<'_>,
        bucket: &str,
        factors: &[WeightedFactor],
    ) -> SbmResult<CorrelationMatrix> {
        CorrelationMatrix::from_pairwise(factors.len(), 1.0, |i, j| {
            self.pairwise_rho(ctx, bucket, &factors[i].factor.key, &factors[j].factor.key)
        })
    }

    /// Unscaled Γ over `buckets`, in order, with zero diagonal.
    fn build_gamma(&self, ctx: &RuleContext<'_>, buckets: &[String]) -> SbmResult<CorrelationMatrix> {
        GammaBuilder::standard(ctx, buckets)
    }
}

fn default_risk_weight(ctx: &RuleContext<'_>, factor: &NettedFactor) -> SbmResult<f64> {
    let params = ctx.params;
    let bucket = factor.bucket.as_str();
    match ctx.risk_class.sensitivity() {
        SensitivityType::Delta => {
            let qualified = factor
                .key
                .sub_bucket
                .as_ref()
                .and_then(|sub| params.delta_bucket_risk_weights.get(&format!("{}{}", bucket, sub)));
            qualified
                .or_else(|| params.delta_bucket_risk_weights.get(bucket))
                .copied()
                .or(params.delta_risk_weight)
                .ok_or_else(|| ctx.lookup_error("delta risk weight", bucket))
        }
        SensitivityType::Vega => params
            .vega_bucket_risk_weights
            .get(bucket)
            .copied()
            .or(params.vega_risk_weight)
            .ok_or_else(|| ctx.lookup_error("vega risk weight", bucket)),
        SensitivityType::Curvature => Ok(1.0),
    }
}

/// Rules for every registered asset class.
pub struct RulesRegistry {
    rules: BTreeMap<AssetClassKey, Box<dyn RiskClassRules>>,
}

impl RulesRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Registers rules under their asset class, returning any rules replaced.
    pub fn register(&mut self, rules: Box<dyn RiskClassRules>) -> Option<Box<dyn RiskClassRules>> {
        self.rules.insert(rules.asset_class(), rules)
    }

    /// The thirteen market-risk and CVA asset classes.
    pub fn standard() -> Self {
        let table: [Box<dyn RiskClassRules>; 13] = [
            Box::new(GirrRules),
            Box::new(CreditNonSecRules),
            Box::new(CreditSecCtpRules),
            Box::new(CreditSecNonCtpRules),
            Box::new(EquityRules),
            Box::new(CommodityRules),
            Box::new(FxRules),
            Box::new(CvaInterestRateRules),
            Box::new(CvaFxRules),
            Box::new(CvaCounterpartyRules),
            Box::new(CvaReferenceCreditRules),
            Box::new(CvaEquityRules),
            Box::new(CvaCommodityRules),
        ];
        let mut registry = Self::new();
        for rules in table {
            registry.register(rules);
        }
        registry
    }

    /// Rules for a risk class.
    ///
    /// # Errors
    ///
    /// [`SbmError::NoRules`] if nothing is registered for its asset class.
    pub fn get(&self, risk_class: RiskClass) -> SbmResult<&dyn RiskClassRules> {
        self.rules
            .get(&risk_class.asset_class_key())
            .map(|r| r.as_ref())
            .ok_or_else(|| SbmError::NoRules(risk_class.code()))
    }

    /// Registered asset classes, in key order.
    pub fn asset_classes(&self) -> impl Iterator<Item = AssetClassKey> + '_ {
        self.rules.keys().copied()
    }

    /// Number of registered asset classes.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RulesRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RulesRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(k, r)| (k.code(), r.description())))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use frtb_core::sensitivity::{Exposure, FactorAttributes, RiskFactorKey};
    use infra_config::FrtbConfig;

    use crate::netting::{NettedFactor, WeightedFactor};

    pub fn bcbs() -> FrtbConfig {
        FrtbConfig::bcbs().unwrap()
    }

    pub fn factor(bucket: &str, attributes: FactorAttributes, sensitivity: f64) -> NettedFactor {
        NettedFactor {
            bucket: bucket.to_string(),
            key: RiskFactorKey {
                sub_bucket: None,
                attributes,
            },
            exposure: Exposure::Linear {
                sensitivity,
                hedge_sensitivity: 0.0,
            },
        }
    }

    pub fn weighted(factors: Vec<NettedFactor>) -> Vec<WeightedFactor> {
        factors
            .into_iter()
            .map(|f| WeightedFactor::new(f, 1.0))
            .collect()
    }
}
