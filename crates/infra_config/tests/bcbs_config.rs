//! Integration tests for the embedded BCBS parameter set and file loading.

use approx::assert_relative_eq;
use std::io::Write;

use frtb_core::types::{AssetClassKey, Tenor};
use infra_config::{ConfigError, FrtbConfig, GammaSpec, MarketCap, Regulator};

fn key(code: &str) -> AssetClassKey {
    code.parse().unwrap()
}

fn tenor(label: &str) -> Tenor {
    label.parse().unwrap()
}

#[test]
fn test_bcbs_loads_and_validates() {
    let config = FrtbConfig::bcbs().unwrap();
    assert_eq!(config.regulator, Regulator::Bcbs);
    assert!(config.validate().is_ok());
    assert_eq!(config.asset_classes.len(), 13);
    assert_relative_eq!(config.cva.hedge_disallowance, 0.01);
}

#[test]
fn test_credit_basis_correlations() {
    let config = FrtbConfig::bcbs().unwrap();
    let basis = |code: &str| config.asset_class(key(code)).unwrap().rho.basis;

    // Bond vs CDS: 99.9% for non-securitisation and non-CTP, 99.0% for CTP
    assert_eq!(basis("MS_CR"), Some(0.999));
    assert_eq!(basis("MS_CS"), Some(0.999));
    assert_eq!(basis("MS_CC"), Some(0.99));
}

#[test]
fn test_ir_tenor_correlation_is_derived() {
    let config = FrtbConfig::bcbs().unwrap();
    let ir = config.asset_class(key("MS_IR")).unwrap();
    let table = ir.delta_tenor_rho_table.as_ref().unwrap();

    assert_eq!(table.tenors().len(), 10);
    assert_relative_eq!(
        table.get(tenor("0.25"), tenor("0.5")).unwrap(),
        (-0.03f64).exp().max(0.4),
        epsilon = 1e-12
    );
    // 0.25y against 30y decays below the floor
    assert_relative_eq!(table.get(tenor("0.25"), tenor("30")).unwrap(), 0.4);
}

#[test]
fn test_vega_risk_weights_are_derived() {
    let config = FrtbConfig::bcbs().unwrap();

    let ir = config.asset_class(key("MS_IR")).unwrap();
    assert_relative_eq!(ir.vega_risk_weight.unwrap(), 1.0);

    let eq = config.asset_class(key("MS_EQ")).unwrap();
    assert_relative_eq!(
        eq.vega_market_cap_risk_weights.get(MarketCap::Large).unwrap(),
        0.55 * 2f64.sqrt(),
        epsilon = 1e-12
    );
    assert_relative_eq!(eq.vega_market_cap_risk_weights.get(MarketCap::Small).unwrap(), 1.0);
}

#[test]
fn test_vega_option_correlation_for_market_risk_only() {
    let config = FrtbConfig::bcbs().unwrap();
    let cr = config.asset_class(key("MS_CR")).unwrap();
    let table = cr.vega_option_rho_table.as_ref().unwrap();
    assert_relative_eq!(
        table.get(tenor("1"), tenor("3")).unwrap(),
        (-0.01f64 * 2.0).exp(),
        epsilon = 1e-12
    );

    let cva_ir = config.asset_class(key("CS_IR")).unwrap();
    assert!(cva_ir.vega_option_rho_table.is_none());
    assert!(cva_ir.delta_tenor_rho_table.is_some());
}

#[test]
fn test_bucket_taxonomy() {
    let config = FrtbConfig::bcbs().unwrap();

    let cr = config.asset_class(key("MS_CR")).unwrap();
    assert_eq!(cr.residual_bucket(), Some("16"));
    assert!(cr.is_index("17"));
    assert_relative_eq!(cr.rho_for("17").name.unwrap(), 0.8);
    assert_relative_eq!(cr.rho_for("1").name.unwrap(), 0.35);

    let cs = config.asset_class(key("MS_CS")).unwrap();
    assert_eq!(cs.residual_bucket(), Some("25"));
    assert!(matches!(cs.gamma, Some(GammaSpec::Uniform(g)) if g == 0.0));

    let cva_eq = config.asset_class(key("CS_EQ")).unwrap();
    assert_eq!(cva_eq.residual_bucket(), None);
}

#[test]
fn test_gamma_matrix_selection() {
    let config = FrtbConfig::bcbs().unwrap();
    let cr = config.asset_class(key("MS_CR")).unwrap();
    let gamma = cr
        .gamma
        .as_ref()
        .unwrap()
        .for_buckets("MS_CRDelta".parse().unwrap(), &["1".to_string(), "2".to_string()])
        .unwrap();
    assert_eq!(gamma.get(0, 0), 0.0);
    assert_relative_eq!(gamma.get(0, 1), 0.75);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
regulator = "UK-PRA"
reporting_currency = "GBP"

[cva]
hedge_disallowance = 0.01
capital_multiplier = 1.25

[asset_classes.CS_FX]
delta_risk_weight = 0.11
vega_risk_weight = 1.0
gamma = 0.6
"#
    )
    .unwrap();

    let config = FrtbConfig::from_file(file.path()).unwrap();
    assert_eq!(config.regulator, Regulator::UkPra);
    assert_eq!(config.reporting_currency.as_deref(), Some("GBP"));
    assert_relative_eq!(config.cva.capital_multiplier, 1.25);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let result = FrtbConfig::from_file(std::path::Path::new("/nonexistent/frtb.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_env_override() {
    std::env::set_var("FRTB_REGULATOR", "eu-eba");
    std::env::set_var("FRTB_REPORTING_CCY", "chf");
    let config = FrtbConfig::bcbs().unwrap().with_env_override();
    std::env::remove_var("FRTB_REGULATOR");
    std::env::remove_var("FRTB_REPORTING_CCY");

    assert_eq!(config.regulator, Regulator::EuEba);
    assert_eq!(config.reporting_currency.as_deref(), Some("CHF"));
}
