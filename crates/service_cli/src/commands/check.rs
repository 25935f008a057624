//! Check command implementation
//!
//! Loads and validates the parameter store, then lists what it configures.

use std::path::Path;

use frtb_sbm::RulesRegistry;
use infra_config::FrtbConfig;
use tracing::info;

use crate::{config, Result};

/// Run the check command
pub fn run(config_path: Option<&Path>) -> Result<()> {
    info!("Checking parameter store...");
    let config = config::load(config_path)?;
    print!("{}", describe(&config, &RulesRegistry::standard()));
    info!("Parameter store is valid");
    Ok(())
}

/// One line per configured asset class, flagging any without rules.
pub fn describe(config: &FrtbConfig, registry: &RulesRegistry) -> String {
    let mut out = format!("Regulator: {}\n", config.regulator);
    if let Some(ccy) = &config.reporting_currency {
        out.push_str(&format!("Reporting currency: {}\n", ccy));
    }
    out.push_str(&format!(
        "CVA: hedge disallowance {}, multiplier {}\n",
        config.cva.hedge_disallowance, config.cva.capital_multiplier
    ));
    out.push_str(&format!("Asset classes ({}):\n", config.asset_classes.len()));

    for (key, params) in &config.asset_classes {
        let rules = if registry.asset_classes().any(|k| k == *key) {
            ""
        } else {
            " (no rules registered)"
        };
        let buckets = if params.buckets.is_empty() {
            "currency buckets".to_string()
        } else {
            format!("{} buckets", params.buckets.len())
        };
        let residual = params
            .residual_bucket()
            .map(|b| format!(", residual {}", b))
            .unwrap_or_default();
        out.push_str(&format!("  {:<6} {}{}{}\n", key.code(), buckets, residual, rules));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_bcbs() {
        let config = FrtbConfig::bcbs().unwrap();
        let text = describe(&config, &RulesRegistry::standard());
        assert!(text.starts_with("Regulator: BCBS"));
        assert!(text.contains("MS_EQ  13 buckets, residual 11"));
        assert!(text.contains("MS_FX  currency buckets"));
        assert!(!text.contains("no rules registered"));
    }

    #[test]
    fn test_describe_flags_missing_rules() {
        let config = FrtbConfig::bcbs().unwrap();
        let text = describe(&config, &RulesRegistry::new());
        assert!(text.contains("MS_IR  currency buckets (no rules registered)"));
    }
}
