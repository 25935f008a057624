//! Capital command implementation
//!
//! Reads a sensitivities file, computes SBM capital per risk class and prints
//! the portfolio totals.

use std::path::Path;

use frtb_core::sensitivity::SensitivityRow;
use frtb_core::types::{CorrelationScenario, RiskClass};
use frtb_sbm::{PortfolioCapital, RiskClassResult, RulesRegistry, SbmCalculator};
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::{config, input, CliError, Result};

/// How the report is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawn table of scenario capitals and totals.
    Table,
    /// The full report, bucket detail included, as pretty JSON.
    Json,
}

/// Full output of a capital run.
#[derive(Debug, Serialize)]
pub struct CapitalReport {
    /// Per-risk-class results, including bucket detail.
    pub results: Vec<RiskClassResult>,
    /// Biting scenarios and totals.
    pub portfolio: PortfolioCapital,
}

/// Computes the report for already-parsed rows.
pub fn compute(
    calculator: &SbmCalculator,
    rows: &[SensitivityRow],
    risk_class: Option<RiskClass>,
) -> Result<CapitalReport> {
    let results = match risk_class {
        Some(rc) => {
            let selected: Vec<SensitivityRow> = rows.iter().filter(|r| r.risk_class == rc).cloned().collect();
            vec![calculator.compute_risk_class_capital(rc, &selected)?]
        }
        None => calculator.compute_portfolio(rows)?,
    };
    let portfolio = PortfolioCapital::from_results(&results, calculator.config().cva.capital_multiplier);
    Ok(CapitalReport { results, portfolio })
}

/// Run the capital command
pub fn run(
    config_path: Option<&Path>,
    sensitivities: &Path,
    risk_class: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("Starting capital calculation...");
    info!("  Sensitivities: {}", sensitivities.display());
    info!("  Risk class: {}", risk_class.unwrap_or("all"));
    info!("  Output format: {:?}", format);

    let risk_class = risk_class
        .map(|code| {
            code.parse::<RiskClass>()
                .map_err(|e| CliError::InvalidArgument(e.to_string()))
        })
        .transpose()?;

    let config = config::load(config_path)?;
    let rows = input::read_sensitivities(sensitivities)?;
    info!("Read {} sensitivities", rows.len());

    let calculator = SbmCalculator::new(config, RulesRegistry::standard());
    let report = compute(&calculator, &rows, risk_class)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", render_table(&report.portfolio)),
    }

    info!("Capital calculation complete");
    Ok(())
}

fn scenario_cell(capital: Option<f64>) -> String {
    capital.map_or_else(|| "-".to_string(), |c| format!("{:.2}", c))
}

/// Renders per-risk-class capitals and the portfolio totals as a table.
pub fn render_table(portfolio: &PortfolioCapital) -> String {
    let mut out = String::new();
    out.push_str("\n┌────────────────────┬────────────────┬────────────────┬────────────────┬─────────┐\n");
    out.push_str("│ Risk class         │ Low            │ Medium         │ High           │ Biting  │\n");
    out.push_str("├────────────────────┼────────────────┼────────────────┼────────────────┼─────────┤\n");

    for summary in &portfolio.risk_classes {
        let [low, medium, high] =
            [CorrelationScenario::Low, CorrelationScenario::Medium, CorrelationScenario::High]
                .map(|s| scenario_cell(summary.capital_for(s)));
        let flag = if summary.sb_alt_scenarios.is_empty() { "" } else { "*" };
        out.push_str(&format!(
            "│ {:<18} │ {:>14} │ {:>14} │ {:>14} │ {:<7} │\n",
            format!("{}{}", summary.risk_class, flag),
            low,
            medium,
            high,
            summary.biting_scenario.name()
        ));
    }
    if portfolio.risk_classes.is_empty() {
        out.push_str("│ (no data)          │                │                │                │         │\n");
    }
    out.push_str("└────────────────────┴────────────────┴────────────────┴────────────────┴─────────┘\n");

    let biting = portfolio.market_risk_scenario.map_or("-", |s| s.name());
    out.push_str(&format!("Market risk capital: {:.2} ({})\n", portfolio.market_risk, biting));
    out.push_str(&format!("SA-CVA capital:      {:.2}\n", portfolio.cva));
    out.push_str(&format!("Total capital:       {:.2}\n", portfolio.total()));
    if portfolio.risk_classes.iter().any(|s| !s.sb_alt_scenarios.is_empty()) {
        out.push_str("* SbAlt used in at least one scenario\n");
    }
    out
}
