//! Criterion benchmarks for SBM aggregation.
//!
//! Benchmarks cover:
//! - Risk-factor netting with varying row counts
//! - Intra-bucket aggregation for growing bucket sizes
//! - Full risk-class capital, sequential against parallel bucket processing
//! - A mixed portfolio across every asset class

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frtb_core::math::CorrelationMatrix;
use frtb_core::sensitivity::{FactorAttributes, IrCurveType, SensitivityRow, SpotRepo};
use frtb_core::types::{CorrelationScenario, RiskClass};
use frtb_sbm::{BucketAggregator, ParallelConfig, RiskFactorNetter, RulesRegistry, SbmCalculator};
use infra_config::FrtbConfig;

const EQUITY_BUCKETS: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];
const IR_TENORS: [&str; 10] = ["0.25", "0.5", "1", "2", "3", "5", "10", "15", "20", "30"];
const CURRENCIES: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "SEK", "ZAR"];

/// Synthetic equity delta rows spread over the equity buckets.
fn equity_rows(n_rows: usize) -> Vec<SensitivityRow> {
    let rc: RiskClass = "MS_EQDelta".parse().unwrap();
    (0..n_rows)
        .map(|i| {
            let attributes = FactorAttributes::EquityDelta {
                name: format!("NAME{}", i % 97),
                spot_repo: if i % 5 == 0 { SpotRepo::Repo } else { SpotRepo::Spot },
            };
            let sensitivity = ((i * 37) % 200) as f64 - 100.0;
            SensitivityRow::linear(rc, EQUITY_BUCKETS[i % EQUITY_BUCKETS.len()], attributes, sensitivity)
        })
        .collect()
}

/// Synthetic GIRR delta rows: several curves per currency over the full tenor grid.
fn girr_rows(n_rows: usize) -> Vec<SensitivityRow> {
    let rc: RiskClass = "MS_IRDelta".parse().unwrap();
    (0..n_rows)
        .map(|i| {
            let attributes = FactorAttributes::IrDelta {
                curve_type: IrCurveType::Rate,
                curve: format!("CURVE{}", i % 3),
                tenor: IR_TENORS[i % IR_TENORS.len()].parse().ok(),
            };
            let sensitivity = ((i * 53) % 400) as f64 - 150.0;
            SensitivityRow::linear(rc, CURRENCIES[i % CURRENCIES.len()], attributes, sensitivity)
        })
        .collect()
}

fn weighted_bucket(n_factors: usize) -> Vec<frtb_sbm::WeightedFactor> {
    let rows = equity_rows(n_factors * EQUITY_BUCKETS.len());
    RiskFactorNetter::net(&rows)
        .unwrap()
        .remove("1")
        .unwrap_or_default()
        .into_iter()
        .take(n_factors)
        .map(|f| frtb_sbm::WeightedFactor::new(f, 0.55))
        .collect()
}

/// Benchmark netting rows into risk factors.
fn bench_netting(c: &mut Criterion) {
    let mut group = c.benchmark_group("netting");

    for n_rows in [100, 1_000, 10_000] {
        let rows = equity_rows(n_rows);
        group.bench_with_input(BenchmarkId::new("rows", n_rows), &rows, |b, rows| {
            b.iter(|| RiskFactorNetter::net(black_box(rows)));
        });
    }

    group.finish();
}

/// Benchmark Kb for a single bucket as the factor count grows.
fn bench_bucket_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_aggregation");

    for n_factors in [10, 50, 100] {
        let factors = weighted_bucket(n_factors);
        let rho = CorrelationMatrix::uniform(factors.len(), 0.15, 1.0);

        group.bench_with_input(BenchmarkId::new("factors", factors.len()), &factors, |b, factors| {
            b.iter(|| {
                BucketAggregator::linear(
                    "1",
                    CorrelationScenario::Medium,
                    black_box(factors),
                    Some(black_box(&rho)),
                    None,
                )
            });
        });
    }

    group.finish();
}

/// Benchmark a full risk class, sequential against parallel buckets.
fn bench_risk_class_capital(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_class_capital");
    group.sample_size(20); // Each iteration builds every bucket's correlation matrix

    let config = FrtbConfig::bcbs().unwrap();
    let equity: RiskClass = "MS_EQDelta".parse().unwrap();
    let girr: RiskClass = "MS_IRDelta".parse().unwrap();

    for n_rows in [500, 5_000] {
        let sequential = SbmCalculator::new(config.clone(), RulesRegistry::standard())
            .with_parallel_config(ParallelConfig::sequential());
        let parallel = SbmCalculator::new(config.clone(), RulesRegistry::standard())
            .with_parallel_config(ParallelConfig::new(1, 2)); // Force parallel

        let rows = equity_rows(n_rows);
        group.bench_with_input(BenchmarkId::new("equity_sequential", n_rows), &rows, |b, rows| {
            b.iter(|| sequential.compute_risk_class_capital(equity, black_box(rows)));
        });
        group.bench_with_input(BenchmarkId::new("equity_parallel", n_rows), &rows, |b, rows| {
            b.iter(|| parallel.compute_risk_class_capital(equity, black_box(rows)));
        });

        let rows = girr_rows(n_rows);
        group.bench_with_input(BenchmarkId::new("girr_sequential", n_rows), &rows, |b, rows| {
            b.iter(|| sequential.compute_risk_class_capital(girr, black_box(rows)));
        });
        group.bench_with_input(BenchmarkId::new("girr_parallel", n_rows), &rows, |b, rows| {
            b.iter(|| parallel.compute_risk_class_capital(girr, black_box(rows)));
        });
    }

    group.finish();
}

/// Benchmark a portfolio spanning several risk classes.
fn bench_portfolio(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio");
    group.sample_size(10);

    let calculator = SbmCalculator::new(FrtbConfig::bcbs().unwrap(), RulesRegistry::standard());
    let fx: RiskClass = "MS_FXDelta".parse().unwrap();

    for n_rows in [1_000, 10_000] {
        let mut rows = equity_rows(n_rows / 2);
        rows.extend(girr_rows(n_rows / 2));
        rows.extend(
            CURRENCIES[1..]
                .iter()
                .map(|ccy| SensitivityRow::linear(fx, *ccy, FactorAttributes::Unkeyed, 1_000.0)),
        );

        group.bench_with_input(BenchmarkId::new("rows", n_rows), &rows, |b, rows| {
            b.iter(|| calculator.compute_portfolio(black_box(rows)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_netting,
    bench_bucket_aggregation,
    bench_risk_class_capital,
    bench_portfolio,
);
criterion_main!(benches);
