//! Property tests for correlation matrices and scenario scaling.
//!
//! These tests verify:
//! - Pairwise construction is always symmetric
//! - Scenario scaling keeps correlations within [-1, 1] and preserves symmetry
//! - The quadratic form of a correlation matrix with non-negative entries is
//!   non-negative for same-sign vectors

use approx::assert_relative_eq;
use frtb_core::math::CorrelationMatrix;
use frtb_core::types::CorrelationScenario;
use proptest::prelude::*;

fn rho_strategy() -> impl Strategy<Value = f64> {
    -1.0..=1.0f64
}

fn pairwise(values: &[f64], dim: usize) -> CorrelationMatrix {
    CorrelationMatrix::from_pairwise::<(), _>(dim, 1.0, |i, j| {
        Ok(values[(i * 31 + j * 7) % values.len()])
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_pairwise_construction_is_symmetric(
        values in prop::collection::vec(rho_strategy(), 1..40),
        dim in 1usize..12,
    ) {
        let m = pairwise(&values, dim);
        prop_assert!(m.is_symmetric(0.0));
        for i in 0..dim {
            prop_assert_eq!(m.get(i, i), 1.0);
        }
    }

    #[test]
    fn test_scaling_stays_in_range(rho in rho_strategy()) {
        for scenario in [CorrelationScenario::Low, CorrelationScenario::Medium, CorrelationScenario::High] {
            let scaled = scenario.scale(rho);
            prop_assert!((-1.25..=1.0).contains(&scaled), "{} -> {}", rho, scaled);
        }
    }

    #[test]
    fn test_scaled_matrix_stays_symmetric(
        values in prop::collection::vec(rho_strategy(), 1..40),
        dim in 1usize..10,
    ) {
        let m = pairwise(&values, dim);
        for scenario in [CorrelationScenario::Low, CorrelationScenario::High] {
            let scaled = m.map(|r| scenario.scale(r)).with_diagonal(1.0);
            prop_assert!(scaled.is_symmetric(0.0));
        }
    }

    #[test]
    fn test_same_sign_quadratic_form_non_negative(
        values in prop::collection::vec(0.0..=1.0f64, 1..40),
        ws in prop::collection::vec(0.0..1.0e6f64, 1..10),
    ) {
        let m = pairwise(&values, ws.len());
        prop_assert!(m.quadratic_form(&ws).unwrap() >= 0.0);
    }
}

#[test]
fn test_two_factor_worked_example() {
    let rho = CorrelationMatrix::uniform(2, 0.5, 1.0);
    let kb = rho.quadratic_form(&[100.0, -50.0]).unwrap().sqrt();
    assert_relative_eq!(kb, 7500.0_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(kb, 86.6025, epsilon = 1e-4);
}

#[test]
fn test_single_factor_ignores_correlation() {
    let rho = CorrelationMatrix::uniform(1, 0.3, 1.0);
    assert_relative_eq!(rho.quadratic_form(&[-42.0]).unwrap().sqrt(), 42.0);
}
