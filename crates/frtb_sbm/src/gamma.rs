//! Inter-bucket correlation (Γ).

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::SbmResult;

use crate::rules::RuleContext;

/// Builds the unscaled Γ for a set of buckets.
pub struct GammaBuilder;

impl GammaBuilder {
    /// Γ from the asset class's `gamma` parameter: a uniform scalar or a
    /// labelled matrix restricted to `buckets`, in order, with zero diagonal.
    ///
    /// A single bucket needs no Γ and gets a 1×1 zero matrix even when none
    /// is configured.
    pub fn standard(ctx: &RuleContext<'_>, buckets: &[String]) -> SbmResult<CorrelationMatrix> {
        if buckets.len() < 2 {
            return Ok(CorrelationMatrix::zeros(buckets.len()));
        }
        let spec = ctx
            .params
            .gamma
            .as_ref()
            .ok_or_else(|| ctx.lookup_error("gamma", ctx.risk_class.asset_class_key().code()))?;
        spec.for_buckets(ctx.risk_class, buckets)
    }

    /// Overrides Γ between each peg currency and the anchor with `gamma_peg`.
    ///
    /// Returns `gamma` unchanged unless both `gamma_peg` and `peg_anchor` are
    /// configured and the anchor is among `buckets`.
    pub fn with_peg(
        ctx: &RuleContext<'_>,
        buckets: &[String],
        mut gamma: CorrelationMatrix,
    ) -> CorrelationMatrix {
        let params = ctx.params;
        let (Some(gamma_peg), Some(anchor)) = (params.gamma_peg, params.peg_anchor.as_deref()) else {
            return gamma;
        };
        let Some(anchor_idx) = buckets.iter().position(|b| b == anchor) else {
            return gamma;
        };
        for (i, bucket) in buckets.iter().enumerate() {
            if i != anchor_idx && params.peg_currencies.iter().any(|c| c == bucket) {
                gamma.set_symmetric(i, anchor_idx, gamma_peg);
            }
        }
        gamma
    }
}
