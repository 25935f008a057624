//! Tables derived from closed-form parameters.
//!
//! The regulatory text defines several correlation grids and the vega risk
//! weights by formula rather than by table. [`FrtbConfig::prepare`] fills the
//! missing tables with these functions once, at load time.
//!
//! [`FrtbConfig::prepare`]: crate::FrtbConfig::prepare

use frtb_core::types::Tenor;

use crate::params::TenorTable;

/// `exp(−rate·|a−b| / min(a, b))` for tenors in years.
#[inline]
pub fn decay_rho(rate: f64, a: f64, b: f64) -> f64 {
    (-rate * (a - b).abs() / a.min(b)).exp()
}

/// IR delta tenor correlation `max(exp(−θ·|a−b|/min(a,b)), floor)`.
pub fn tenor_rho_table(tenors: &[Tenor], theta: f64, floor: f64) -> TenorTable {
    TenorTable::from_fn(tenors, |a, b| decay_rho(theta, a, b).max(floor))
}

/// Maturity correlation `exp(−α·|a−b|/min(a,b))`.
pub fn maturity_rho_table(tenors: &[Tenor], alpha: f64) -> TenorTable {
    TenorTable::from_fn(tenors, |a, b| decay_rho(alpha, a, b))
}

/// Vega risk weight `min(σ·√(LH/10), 1)`.
#[inline]
pub fn vega_risk_weight(sigma: f64, liquidity_horizon_days: f64) -> f64 {
    (sigma * (liquidity_horizon_days / 10.0).sqrt()).min(1.0)
}
