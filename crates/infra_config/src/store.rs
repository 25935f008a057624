//! The parameter store.
//!
//! Loads a regulator's parameter set from TOML, derives the formula-defined
//! tables, applies environment overrides and validates the result.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::{AssetClassKey, Regime, RiskClass, SbmError, SbmResult};

use crate::derive::{maturity_rho_table, tenor_rho_table, vega_risk_weight};
use crate::error::{ConfigError, ConfigResult};
use crate::params::{AssetClassParams, CvaParams, GammaSpec, MarketRiskParams, RhoConstants, TenorTable};
use crate::regulator::Regulator;

/// Embedded Basel Committee parameter set.
pub const BCBS_TOML: &str = include_str!("../data/bcbs.toml");

/// Floor of the IR delta tenor correlation when the file does not set one.
pub const DEFAULT_TENOR_RHO_FLOOR: f64 = 0.4;

/// Environment variable selecting the regulator.
pub const ENV_REGULATOR: &str = "FRTB_REGULATOR";

/// Environment variable setting the reporting currency.
pub const ENV_REPORTING_CCY: &str = "FRTB_REPORTING_CCY";

/// Read-only regulatory parameters for every risk class.
///
/// # Examples
///
/// ```
/// use infra_config::FrtbConfig;
///
/// let config = FrtbConfig::bcbs().unwrap();
/// let ir = config.asset_class("MS_IR".parse().unwrap()).unwrap();
/// assert!(ir.delta_tenor_rho_table.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrtbConfig {
    /// Regulator whose rules the parameters implement.
    #[serde(default)]
    pub regulator: Regulator,
    /// Reporting currency; treated as liquid for IR risk weights.
    #[serde(default)]
    pub reporting_currency: Option<String>,
    /// Market-risk parameters shared across asset classes.
    #[serde(default)]
    pub market_risk: MarketRiskParams,
    /// SA-CVA parameters.
    #[serde(default)]
    pub cva: CvaParams,
    /// Per-asset-class parameters keyed by code (`MS_IR`, `CS_CC`, ...).
    #[serde(default)]
    pub asset_classes: BTreeMap<AssetClassKey, AssetClassParams>,
}

impl FrtbConfig {
    /// The embedded BCBS parameter set.
    pub fn bcbs() -> ConfigResult<Self> {
        Self::from_toml_str(BCBS_TOML)
    }

    /// Parse a parameter set and derive its formula-defined tables.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.prepare()
    }

    /// Load a parameter set from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            regulator = %config.regulator,
            asset_classes = config.asset_classes.len(),
            "loaded parameter set"
        );
        Ok(config)
    }

    /// Load from file, apply environment overrides and validate.
    pub fn load_with_env_and_validate(path: &Path) -> ConfigResult<Self> {
        let config = Self::from_file(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Fill derived tables that the file leaves out.
    ///
    /// Tables given explicitly are kept as they are, so calling this twice is
    /// harmless.
    pub fn prepare(mut self) -> ConfigResult<Self> {
        let sigma = self.market_risk.vega_risk_weight_sigma;
        let alpha = self.market_risk.vega_option_rho_alpha;

        for (key, params) in self.asset_classes.iter_mut() {
            if let Some(theta) = params.delta_tenor_rho_theta {
                if params.delta_tenor_rho_table.is_none() {
                    if params.delta_tenors.is_empty() {
                        return Err(derivation(*key, "delta_tenor_rho_theta is set but delta_tenors is empty"));
                    }
                    let floor = params.delta_tenor_rho_floor.unwrap_or(DEFAULT_TENOR_RHO_FLOOR);
                    params.delta_tenor_rho_table = Some(tenor_rho_table(&params.delta_tenors, theta, floor));
                }
            }

            if key.regime != Regime::MarketRisk {
                continue;
            }

            if !params.vega_tenors.is_empty() && params.vega_option_rho_table.is_none() {
                params.vega_option_rho_table = Some(maturity_rho_table(&params.vega_tenors, alpha));
            }

            if let Some(underlying_alpha) = params.vega_underlying_rho_alpha {
                if params.vega_underlying_rho_table.is_none() {
                    if params.delta_tenors.is_empty() {
                        return Err(derivation(
                            *key,
                            "vega_underlying_rho_alpha is set but delta_tenors is empty",
                        ));
                    }
                    params.vega_underlying_rho_table =
                        Some(maturity_rho_table(&params.delta_tenors, underlying_alpha));
                }
            }

            for horizon in self.market_risk.liquidity_horizons.iter().filter(|h| h.asset_class == *key) {
                if horizon.days.is_nan() || horizon.days <= 0.0 {
                    return Err(derivation(
                        *key,
                        &format!("liquidity horizon must be positive, got {}", horizon.days),
                    ));
                }
                let weight = vega_risk_weight(sigma, horizon.days);
                match horizon.market_cap {
                    Some(cap) => {
                        if params.vega_market_cap_risk_weights.get(cap).is_none() {
                            params.vega_market_cap_risk_weights.set(cap, weight);
                        }
                    }
                    None => {
                        params.vega_risk_weight.get_or_insert(weight);
                    }
                }
            }
        }

        Ok(self)
    }

    /// Apply `FRTB_REGULATOR` and `FRTB_REPORTING_CCY`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_env_override(mut self) -> Self {
        if let Ok(value) = std::env::var(ENV_REGULATOR) {
            match value.parse::<Regulator>() {
                Ok(regulator) => self.regulator = regulator,
                Err(e) => tracing::warn!(variable = ENV_REGULATOR, error = %e, "ignoring override"),
            }
        }

        if let Ok(value) = std::env::var(ENV_REPORTING_CCY) {
            let ccy = value.trim().to_uppercase();
            if ccy.len() == 3 && ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                self.reporting_currency = Some(ccy);
            } else {
                tracing::warn!(variable = ENV_REPORTING_CCY, value = %value, "ignoring override");
            }
        }

        self
    }

    /// Check the parameter set for internal consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        let sigma = self.market_risk.vega_risk_weight_sigma;
        if sigma.is_nan() || sigma <= 0.0 {
            errors.push(format!(
                "market_risk.vega_risk_weight_sigma must be positive, got {}",
                self.market_risk.vega_risk_weight_sigma
            ));
        }
        if !(0.0..=1.0).contains(&self.cva.hedge_disallowance) {
            errors.push(format!(
                "cva.hedge_disallowance must lie in [0, 1], got {}",
                self.cva.hedge_disallowance
            ));
        }
        if !(self.cva.capital_multiplier > 0.0 && self.cva.capital_multiplier.is_finite()) {
            errors.push(format!(
                "cva.capital_multiplier must be positive, got {}",
                self.cva.capital_multiplier
            ));
        }

        for (key, params) in &self.asset_classes {
            validate_asset_class(&key.code(), params, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Parameters of an asset class.
    pub fn asset_class(&self, key: AssetClassKey) -> SbmResult<&AssetClassParams> {
        self.asset_classes
            .get(&key)
            .ok_or_else(|| SbmError::lookup(key.code(), "asset class parameters", key.code()))
    }

    /// Parameters of the asset class a risk class belongs to.
    pub fn params_for(&self, risk_class: RiskClass) -> SbmResult<&AssetClassParams> {
        self.asset_classes.get(&risk_class.asset_class_key()).ok_or_else(|| {
            SbmError::lookup(
                risk_class.code(),
                "asset class parameters",
                risk_class.asset_class_key().code(),
            )
        })
    }
}

fn derivation(key: AssetClassKey, message: &str) -> ConfigError {
    ConfigError::Derivation {
        asset_class: key.code(),
        message: message.to_string(),
    }
}

fn validate_asset_class(code: &str, params: &AssetClassParams, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for bucket in &params.buckets {
        if !seen.insert(bucket.name.as_str()) {
            errors.push(format!("{code}: duplicate bucket '{}'", bucket.name));
        }
        if let Some(rho) = bucket.name_rho {
            check_correlation(code, &format!("bucket {} name_rho", bucket.name), rho, errors);
        }
    }
    let residual = params.buckets.iter().filter(|b| b.residual).count();
    if residual > 1 {
        errors.push(format!("{code}: {residual} residual buckets, at most one allowed"));
    }

    check_rho_constants(code, "rho", &params.rho, errors);
    if let Some(index_rho) = &params.index_rho {
        check_rho_constants(code, "index_rho", index_rho, errors);
    }

    let scalar_weights = [
        ("delta_risk_weight", params.delta_risk_weight),
        ("delta_inflation_risk_weight", params.delta_inflation_risk_weight),
        ("delta_xccy_risk_weight", params.delta_xccy_risk_weight),
        ("delta_illiquid_risk_weight", params.delta_illiquid_risk_weight),
        (
            "delta_inflation_illiquid_risk_weight",
            params.delta_inflation_illiquid_risk_weight,
        ),
        ("vega_risk_weight", params.vega_risk_weight),
        ("vega_market_cap_risk_weights.large", params.vega_market_cap_risk_weights.large),
        ("vega_market_cap_risk_weights.small", params.vega_market_cap_risk_weights.small),
    ];
    for (item, weight) in scalar_weights {
        if let Some(w) = weight {
            check_weight(code, item, w, errors);
        }
    }
    for (tenor, w) in &params.delta_tenor_risk_weights {
        check_weight(code, &format!("delta_tenor_risk_weights[{tenor}]"), *w, errors);
    }
    for (table, weights) in [
        ("delta_bucket_risk_weights", &params.delta_bucket_risk_weights),
        ("delta_repo_bucket_risk_weights", &params.delta_repo_bucket_risk_weights),
        ("vega_bucket_risk_weights", &params.vega_bucket_risk_weights),
    ] {
        for (bucket, w) in weights {
            check_weight(code, &format!("{table}[{bucket}]"), *w, errors);
        }
    }
    for (quality, weights) in &params.delta_quality_risk_weights {
        for (bucket, w) in weights {
            check_weight(code, &format!("delta_quality_risk_weights[{quality}][{bucket}]"), *w, errors);
        }
    }

    if !params.delta_tenor_risk_weights.is_empty() {
        for tenor in &params.delta_tenors {
            if !params.delta_tenor_risk_weights.contains_key(tenor) {
                errors.push(format!("{code}: delta tenor {tenor} has no risk weight"));
            }
        }
    }

    if let Some(covered) = &params.covered_bond {
        if !params.buckets.is_empty() && params.bucket(&covered.bucket).is_none() {
            errors.push(format!("{code}: covered_bond bucket '{}' is not a bucket", covered.bucket));
        }
        check_weight(code, "covered_bond.risk_weight", covered.risk_weight, errors);
    }

    for (item, table) in [
        ("delta_tenor_rho_table", &params.delta_tenor_rho_table),
        ("vega_option_rho_table", &params.vega_option_rho_table),
        ("vega_underlying_rho_table", &params.vega_underlying_rho_table),
    ] {
        if let Some(table) = table {
            check_tenor_table(code, item, table, errors);
        }
    }
    if let Some(table) = &params.delta_tenor_rho_table {
        for tenor in &params.delta_tenors {
            if !table.tenors().contains(tenor) {
                errors.push(format!("{code}: delta tenor {tenor} missing from delta_tenor_rho_table"));
            }
        }
    }

    match &params.gamma {
        Some(GammaSpec::Uniform(gamma)) => check_correlation(code, "gamma", *gamma, errors),
        Some(GammaSpec::Matrix(labelled)) => {
            check_matrix(code, "gamma", labelled.matrix(), errors);
            let mut labels = HashSet::new();
            for label in labelled.labels() {
                if !labels.insert(label.as_str()) {
                    errors.push(format!("{code}: gamma label '{label}' repeated"));
                }
                if !params.buckets.is_empty() && params.bucket(label).is_none() {
                    errors.push(format!("{code}: gamma label '{label}' is not a bucket"));
                }
            }
        }
        None => {}
    }

    if let Some(gamma_peg) = params.gamma_peg {
        check_correlation(code, "gamma_peg", gamma_peg, errors);
        if params.peg_anchor.is_none() || params.peg_currencies.is_empty() {
            errors.push(format!("{code}: gamma_peg requires peg_anchor and peg_currencies"));
        }
    }
}

fn check_rho_constants(code: &str, table: &str, rho: &RhoConstants, errors: &mut Vec<String>) {
    for (name, value) in rho.entries() {
        if let Some(v) = value {
            check_correlation(code, &format!("{table}.{name}"), v, errors);
        }
    }
}

fn check_tenor_table(code: &str, item: &str, table: &TenorTable, errors: &mut Vec<String>) {
    check_matrix(code, item, table.matrix(), errors);
    for i in 0..table.matrix().dim() {
        if table.matrix().get(i, i) != 1.0 {
            errors.push(format!("{code}: {item} diagonal at {} is not 1", table.tenors()[i]));
        }
    }
}

fn check_matrix(code: &str, item: &str, matrix: &CorrelationMatrix, errors: &mut Vec<String>) {
    if !matrix.is_symmetric(1e-12) {
        errors.push(format!("{code}: {item} is not symmetric"));
    }
    if matrix.to_rows().iter().flatten().any(|v| !(-1.0..=1.0).contains(v)) {
        errors.push(format!("{code}: {item} has entries outside [-1, 1]"));
    }
}

fn check_correlation(code: &str, item: &str, value: f64, errors: &mut Vec<String>) {
    if !(-1.0..=1.0).contains(&value) {
        errors.push(format!("{code}: {item} = {value} outside [-1, 1]"));
    }
}

fn check_weight(code: &str, item: &str, value: f64, errors: &mut Vec<String>) {
    if !(value >= 0.0 && value.is_finite()) {
        errors.push(format!("{code}: {item} = {value} is not a non-negative weight"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [market_risk]
        liquidity_horizons = [{ asset_class = "MS_FX", days = 40 }]

        [asset_classes.MS_FX]
        delta_risk_weight = 0.15
        vega_tenors = ["0.5", "1"]
        gamma = 0.6
    "#;

    #[test]
    fn test_minimal_config_derives_tables() {
        let config = FrtbConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.regulator, Regulator::Bcbs);
        assert_eq!(config.cva, CvaParams::default());

        let fx = config.asset_class("MS_FX".parse().unwrap()).unwrap();
        assert_eq!(fx.vega_risk_weight, Some(1.0));
        assert!(fx.vega_option_rho_table.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let once = FrtbConfig::from_toml_str(MINIMAL).unwrap();
        let twice = once.clone().prepare().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let result = FrtbConfig::from_toml_str("[asset_classes.MS_FX]\ndelta_riskweight = 0.15\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_theta_without_tenors_fails_derivation() {
        let result = FrtbConfig::from_toml_str("[asset_classes.MS_IR]\ndelta_tenor_rho_theta = 0.03\n");
        assert!(matches!(result, Err(ConfigError::Derivation { .. })));
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = FrtbConfig::from_toml_str(MINIMAL).unwrap();
        config.cva.hedge_disallowance = 2.0;
        let fx = config.asset_classes.get_mut(&"MS_FX".parse::<AssetClassKey>().unwrap()).unwrap();
        fx.gamma = Some(GammaSpec::Uniform(1.5));
        fx.delta_risk_weight = Some(-0.1);

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("hedge_disallowance")));
                assert!(errors.iter().any(|e| e.contains("gamma")));
                assert!(errors.iter().any(|e| e.contains("delta_risk_weight")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_asset_class_is_lookup_error() {
        let config = FrtbConfig::from_toml_str(MINIMAL).unwrap();
        let err = config.params_for("CS_IRDelta".parse().unwrap()).unwrap_err();
        assert!(matches!(err, SbmError::ConfigLookup { .. }));
    }
}
