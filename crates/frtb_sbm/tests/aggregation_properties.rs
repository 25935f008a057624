//! Property tests for netting and aggregation.
//!
//! These tests verify:
//! - Netting is idempotent and independent of row order
//! - Kb and capital are never negative, whatever the correlations
//! - Intra-bucket correlation matrices are symmetric
//! - A single factor gives Kb = |WS|
//! - Zero Γ gives the root sum of squared Kb
//! - Same-sign portfolios order their capital Low ≤ Medium ≤ High

use approx::assert_relative_eq;
use frtb_core::math::CorrelationMatrix;
use frtb_core::sensitivity::{Exposure, FactorAttributes, RiskFactorKey, SensitivityRow, SpotRepo};
use frtb_core::types::{CorrelationScenario, RiskClass};
use frtb_sbm::netting::{NettedFactor, RiskFactorNetter, WeightedFactor};
use frtb_sbm::result::BucketResult;
use frtb_sbm::rules::{RuleContext, RulesRegistry};
use frtb_sbm::{BucketAggregator, CrossBucketAggregator, SbmCalculator};
use infra_config::FrtbConfig;
use proptest::prelude::*;

const NAMES: [&str; 4] = ["ACME", "GLOBEX", "INITECH", "UMBRELLA"];
const EQUITY_BUCKETS: [&str; 5] = ["1", "2", "5", "9", "12"];

fn eq_delta() -> RiskClass {
    "MS_EQDelta".parse().unwrap()
}

fn equity_row(bucket: usize, name: usize, repo: bool, sensitivity: f64) -> SensitivityRow {
    SensitivityRow::linear(
        eq_delta(),
        EQUITY_BUCKETS[bucket % EQUITY_BUCKETS.len()],
        FactorAttributes::EquityDelta {
            name: NAMES[name % NAMES.len()].to_string(),
            spot_repo: if repo { SpotRepo::Repo } else { SpotRepo::Spot },
        },
        sensitivity,
    )
}

fn row_strategy() -> impl Strategy<Value = SensitivityRow> {
    (0usize..5, 0usize..4, any::<bool>(), -1_000i32..1_000)
        .prop_map(|(bucket, name, repo, s)| equity_row(bucket, name, repo, f64::from(s)))
}

fn weighted(ws: &[f64]) -> Vec<WeightedFactor> {
    ws.iter()
        .map(|&s| {
            WeightedFactor::new(
                NettedFactor {
                    bucket: "1".into(),
                    key: RiskFactorKey {
                        sub_bucket: None,
                        attributes: FactorAttributes::Unkeyed,
                    },
                    exposure: Exposure::Linear {
                        sensitivity: s,
                        hedge_sensitivity: 0.0,
                    },
                },
                1.0,
            )
        })
        .collect()
}

fn pairwise(values: &[f64], dim: usize) -> CorrelationMatrix {
    CorrelationMatrix::from_pairwise::<(), _>(dim, 1.0, |i, j| Ok(values[(i * 13 + j * 5) % values.len()])).unwrap()
}

fn bucket(name: usize, kb: f64, sb: f64) -> BucketResult {
    BucketResult {
        bucket: name.to_string(),
        scenario: CorrelationScenario::Medium,
        residual: false,
        kb,
        sb,
        sum_sensitivity: 0.0,
        sum_sensitivity_positive: 0.0,
        sum_sensitivity_negative: 0.0,
        curvature: None,
        cva: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_netting_is_idempotent(rows in prop::collection::vec(row_strategy(), 0..60)) {
        let netted: Vec<NettedFactor> = RiskFactorNetter::net(&rows).unwrap().into_values().flatten().collect();
        prop_assert_eq!(RiskFactorNetter::renet(&netted).unwrap(), netted);
    }

    #[test]
    fn test_netting_ignores_row_order(rows in prop::collection::vec(row_strategy(), 0..60)) {
        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(RiskFactorNetter::net(&rows).unwrap(), RiskFactorNetter::net(&reversed).unwrap());
    }

    #[test]
    fn test_kb_is_never_negative(
        values in prop::collection::vec(-1.0..=1.0f64, 1..30),
        ws in prop::collection::vec(-1.0e6..1.0e6f64, 1..12),
    ) {
        let rho = pairwise(&values, ws.len());
        for scenario in [CorrelationScenario::Low, CorrelationScenario::Medium, CorrelationScenario::High] {
            let result = BucketAggregator::linear("1", scenario, &weighted(&ws), Some(&rho), None).unwrap();
            prop_assert!(result.kb >= 0.0);
            prop_assert!(result.kb.is_finite());
        }
    }

    #[test]
    fn test_capital_is_never_negative(
        values in prop::collection::vec(-1.0..=1.0f64, 1..30),
        buckets in prop::collection::vec((0.0..1.0e4f64, -1.0e4..1.0e4f64), 1..10),
    ) {
        let results: Vec<BucketResult> = buckets
            .iter()
            .enumerate()
            .map(|(i, &(kb, sb))| bucket(i, kb, sb))
            .collect();
        let gamma = pairwise(&values, results.len()).with_diagonal(0.0);
        for code in ["MS_CRDelta", "MS_CRCurvature", "CS_CRDelta"] {
            let capital = CrossBucketAggregator::aggregate(
                code.parse().unwrap(),
                CorrelationScenario::Medium,
                &results,
                &gamma,
            )
            .unwrap();
            prop_assert!(capital.capital >= 0.0);
            prop_assert!(capital.capital.is_finite());
        }
    }

    #[test]
    fn test_equity_rho_is_symmetric(rows in prop::collection::vec(row_strategy(), 1..40)) {
        let config = FrtbConfig::bcbs().unwrap();
        let registry = RulesRegistry::standard();
        let ctx = RuleContext::new(&config, eq_delta()).unwrap();
        let rules = registry.get(eq_delta()).unwrap();

        for (bucket, factors) in RiskFactorNetter::net(&rows).unwrap() {
            let weighted = rules.assign_weights(&ctx, factors).unwrap();
            let rho = rules.build_rho(&ctx, &bucket, &weighted).unwrap();
            prop_assert_eq!(rho.dim(), weighted.len());
            prop_assert!(rho.is_symmetric(0.0));
        }
    }

    #[test]
    fn test_single_factor_kb_is_absolute_ws(ws in -1.0e6..1.0e6f64, rho in -1.0..=1.0f64) {
        let matrix = CorrelationMatrix::uniform(1, rho, 1.0);
        let result = BucketAggregator::linear("1", CorrelationScenario::Low, &weighted(&[ws]), Some(&matrix), None).unwrap();
        prop_assert!((result.kb - ws.abs()).abs() <= 1e-9 * ws.abs().max(1.0));
    }

    #[test]
    fn test_zero_gamma_is_root_sum_of_squares(
        buckets in prop::collection::vec((0.0..1.0e4f64, -1.0e4..1.0e4f64), 1..10),
    ) {
        let results: Vec<BucketResult> = buckets
            .iter()
            .enumerate()
            .map(|(i, &(kb, sb))| bucket(i, kb, sb))
            .collect();
        let gamma = CorrelationMatrix::zeros(results.len());
        let expected = results.iter().map(|b| b.kb * b.kb).sum::<f64>().sqrt();
        for scenario in [CorrelationScenario::Low, CorrelationScenario::High] {
            let capital = CrossBucketAggregator::aggregate(eq_delta(), scenario, &results, &gamma).unwrap();
            prop_assert!((capital.capital - expected).abs() <= 1e-9 * expected.max(1.0));
            prop_assert!(!capital.sb_alt);
        }
    }

    #[test]
    fn test_same_sign_scenario_ordering(
        raw in prop::collection::vec((0usize..5, 0usize..4, any::<bool>(), 1i32..1_000), 1..30),
    ) {
        let rows: Vec<SensitivityRow> = raw
            .into_iter()
            .map(|(b, n, repo, s)| equity_row(b, n, repo, f64::from(s)))
            .collect();
        let calculator = SbmCalculator::new(FrtbConfig::bcbs().unwrap(), RulesRegistry::standard());
        let result = calculator.compute_risk_class_capital(eq_delta(), &rows).unwrap();

        let low = result.capital(CorrelationScenario::Low).unwrap();
        let medium = result.capital(CorrelationScenario::Medium).unwrap();
        let high = result.capital(CorrelationScenario::High).unwrap();
        let tolerance = 1e-9 * high.max(1.0);
        prop_assert!(low <= medium + tolerance, "low {} > medium {}", low, medium);
        prop_assert!(medium <= high + tolerance, "medium {} > high {}", medium, high);
    }
}

#[test]
fn test_worked_example() {
    let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
    let result = BucketAggregator::linear(
        "1",
        CorrelationScenario::Medium,
        &weighted(&[100.0, -50.0]),
        Some(&rho),
        None,
    )
    .unwrap();
    assert_relative_eq!(result.kb, 7500f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(result.kb, 86.60, epsilon = 1e-2);
    assert_relative_eq!(result.sb, 50.0);
}
