//! SBM calculator: from sensitivity rows to risk-class capital.
//!
//! The pipeline for one risk class is
//!
//! 1. validate rows and bucket labels
//! 2. net rows into risk factors per bucket ([`RiskFactorNetter`])
//! 3. per bucket, in parallel above the threshold: weights, ρ, and
//!    [`BucketAggregator`] under every scenario of the regime
//! 4. Γ over the non-residual buckets, then [`CrossBucketAggregator`]
//!    per scenario
//!
//! # Performance
//!
//! Buckets and risk classes share only the read-only parameter store, so
//! both levels fan out with Rayon. Results are collected in bucket-label
//! and risk-class-code order regardless of scheduling.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use frtb_core::sensitivity::SensitivityRow;
use frtb_core::types::{CorrelationScenario, RiskClass, SbmError, SbmResult};
use infra_config::FrtbConfig;

use crate::aggregation::{BucketAggregator, CrossBucketAggregator};
use crate::netting::{NettedFactor, RiskFactorNetter};
use crate::parallel::ParallelConfig;
use crate::result::{BucketResult, RiskClassResult};
use crate::rules::{RiskClassRules, RuleContext, RulesRegistry};

/// Computes SBM capital from a parameter store and a rules registry.
///
/// # Examples
///
/// ```
/// use frtb_core::sensitivity::{FactorAttributes, SensitivityRow};
/// use frtb_core::types::CorrelationScenario;
/// use frtb_sbm::engine::SbmCalculator;
/// use frtb_sbm::rules::RulesRegistry;
/// use infra_config::FrtbConfig;
///
/// let calculator = SbmCalculator::new(FrtbConfig::bcbs().unwrap(), RulesRegistry::standard());
/// let rc = "MS_FXDelta".parse().unwrap();
/// let rows = vec![SensitivityRow::linear(rc, "ZMW", FactorAttributes::Unkeyed, 1_000.0)];
///
/// let result = calculator.compute_risk_class_capital(rc, &rows).unwrap();
/// let medium = result.capital(CorrelationScenario::Medium).unwrap();
/// assert!((medium - 150.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct SbmCalculator {
    config: FrtbConfig,
    registry: RulesRegistry,
    parallel: ParallelConfig,
}

impl SbmCalculator {
    /// Creates a calculator with the default parallel configuration.
    pub fn new(config: FrtbConfig, registry: RulesRegistry) -> Self {
        Self {
            config,
            registry,
            parallel: ParallelConfig::default(),
        }
    }

    /// Sets the parallel configuration.
    pub fn with_parallel_config(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the parameter store.
    pub fn config(&self) -> &FrtbConfig {
        &self.config
    }

    /// Returns the rules registry.
    pub fn registry(&self) -> &RulesRegistry {
        &self.registry
    }

    /// Returns the parallel configuration.
    pub fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Computes the capital of one risk class under every scenario of its
    /// regime.
    ///
    /// An empty row set yields zero capital in every scenario.
    ///
    /// # Errors
    ///
    /// - [`SbmError::RiskClassMismatch`] if a row carries another risk class
    /// - [`SbmError::AttributeMismatch`] if a row fails validation
    /// - [`SbmError::ConfigLookup`] for buckets, tenors or ratings the
    ///   parameter store does not define
    /// - [`SbmError::NoRules`] if the registry has no rules for the risk class
    pub fn compute_risk_class_capital(
        &self,
        risk_class: RiskClass,
        rows: &[SensitivityRow],
    ) -> SbmResult<RiskClassResult> {
        let rules = self.registry.get(risk_class)?;
        let ctx = RuleContext::new(&self.config, risk_class)?;
        self.check_rows(&ctx, rows)?;

        let netted: Vec<(String, Vec<NettedFactor>)> = RiskFactorNetter::net(rows)?.into_iter().collect();
        debug!(
            risk_class = %risk_class,
            rows = rows.len(),
            buckets = netted.len(),
            "netted sensitivities"
        );

        let scenarios = CorrelationScenario::for_regime(risk_class.regime());
        let per_bucket = self.parallel.try_map(&netted, |(bucket, factors)| {
            Self::compute_bucket(rules, &ctx, bucket, factors, scenarios)
        })?;

        let diversified: Vec<String> = netted
            .iter()
            .map(|(bucket, _)| bucket)
            .filter(|bucket| !ctx.params.is_residual(bucket))
            .cloned()
            .collect();
        let gamma = rules.build_gamma(&ctx, &diversified)?;

        let capitals = scenarios
            .iter()
            .enumerate()
            .map(|(k, &scenario)| {
                let buckets: Vec<BucketResult> = per_bucket.iter().map(|results| results[k].clone()).collect();
                let capital = CrossBucketAggregator::aggregate(risk_class, scenario, &buckets, &gamma)?;
                debug!(
                    risk_class = %risk_class,
                    scenario = %scenario,
                    capital = capital.capital,
                    sb_alt = capital.sb_alt,
                    "aggregated risk class"
                );
                Ok(capital)
            })
            .collect::<SbmResult<Vec<_>>>()?;

        Ok(RiskClassResult {
            risk_class,
            capitals,
            buckets: per_bucket.into_iter().flatten().collect(),
        })
    }

    /// Computes every risk class present in `rows`, ordered by risk-class code.
    ///
    /// # Errors
    ///
    /// The first error of any risk class, as for
    /// [`compute_risk_class_capital`](Self::compute_risk_class_capital).
    pub fn compute_portfolio(&self, rows: &[SensitivityRow]) -> SbmResult<Vec<RiskClassResult>> {
        let mut grouped: BTreeMap<String, (RiskClass, Vec<SensitivityRow>)> = BTreeMap::new();
        for row in rows {
            grouped
                .entry(row.risk_class.code())
                .or_insert_with(|| (row.risk_class, Vec::new()))
                .1
                .push(row.clone());
        }

        let groups: Vec<(RiskClass, Vec<SensitivityRow>)> = grouped.into_values().collect();
        debug!(risk_classes = groups.len(), rows = rows.len(), "computing portfolio");

        groups
            .par_iter()
            .map(|(risk_class, rows)| self.compute_risk_class_capital(*risk_class, rows))
            .collect()
    }

    fn check_rows(&self, ctx: &RuleContext<'_>, rows: &[SensitivityRow]) -> SbmResult<()> {
        for row in rows {
            if row.risk_class != ctx.risk_class {
                return Err(SbmError::RiskClassMismatch {
                    expected: ctx.risk_class.code(),
                    found: row.risk_class.code(),
                });
            }
            row.validate()?;
            if !ctx.params.buckets.is_empty() && ctx.params.bucket(&row.bucket).is_none() {
                return Err(ctx.lookup_error("bucket", row.bucket.as_str()));
            }
        }
        Ok(())
    }

    fn compute_bucket(
        rules: &dyn RiskClassRules,
        ctx: &RuleContext<'_>,
        bucket: &str,
        factors: &[NettedFactor],
        scenarios: &[CorrelationScenario],
    ) -> SbmResult<Vec<BucketResult>> {
        let weighted = rules.assign_weights(ctx, factors.to_vec())?;
        let rho = if ctx.params.is_residual(bucket) {
            None
        } else {
            Some(rules.build_rho(ctx, bucket, &weighted)?)
        };
        let hedge_disallowance = ctx
            .risk_class
            .is_cva()
            .then_some(ctx.config.cva.hedge_disallowance);

        scenarios
            .iter()
            .map(|&scenario| {
                let result = if ctx.risk_class.is_curvature() {
                    BucketAggregator::curvature(bucket, scenario, &weighted, rho.as_ref())?
                } else {
                    BucketAggregator::linear(bucket, scenario, &weighted, rho.as_ref(), hedge_disallowance)?
                };
                debug!(
                    risk_class = %ctx.risk_class,
                    bucket,
                    scenario = %scenario,
                    kb = result.kb,
                    sb = result.sb,
                    "aggregated bucket"
                );
                Ok(result)
            })
            .collect()
    }
}
