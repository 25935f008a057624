//! Typed parameter sets.
//!
//! One [`AssetClassParams`] per regime and asset class (`MS_IR`, `CS_CC`, ...).
//! Every table is optional: a risk class only reads what its rules need and
//! a missing entry surfaces as [`SbmError::ConfigLookup`] at lookup time.

use serde::Deserialize;
use std::collections::BTreeMap;

use frtb_core::math::CorrelationMatrix;
use frtb_core::types::{AssetClassKey, RiskClass, SbmError, SbmResult, Tenor};

/// Equity market-capitalisation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCap {
    /// Large market capitalisation.
    Large,
    /// Small market capitalisation.
    Small,
}

impl MarketCap {
    /// Lower-case label.
    pub fn label(&self) -> &'static str {
        match self {
            MarketCap::Large => "large",
            MarketCap::Small => "small",
        }
    }
}

/// A regulatory bucket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketSpec {
    /// Bucket label.
    pub name: String,
    /// Residual ("Other") bucket: no diversification within or across buckets.
    #[serde(default)]
    pub residual: bool,
    /// Index bucket: uses the index correlation constants.
    #[serde(default)]
    pub index: bool,
    /// Market-cap tier (equity).
    #[serde(default)]
    pub market_cap: Option<MarketCap>,
    /// Name (or commodity) correlation within the bucket.
    #[serde(default)]
    pub name_rho: Option<f64>,
}

/// Scalar intra-bucket correlation constants.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RhoConstants {
    /// Different issuer or underlier names.
    pub name: Option<f64>,
    /// Different tenors.
    pub tenor: Option<f64>,
    /// Different curve types or delivery locations.
    pub basis: Option<f64>,
    /// Different securitisation tranches.
    pub tranche: Option<f64>,
    /// Different names with the same parent (CVA).
    pub related_name: Option<f64>,
    /// Names with different parents (CVA).
    pub unrelated_name: Option<f64>,
    /// Different credit quality (CVA).
    pub credit_quality: Option<f64>,
    /// Different curves of the same type.
    pub curve: Option<f64>,
    /// Inflation against rate curves.
    pub inflation: Option<f64>,
    /// Cross-currency basis against other curves.
    pub xccy: Option<f64>,
    /// Vertices of an illiquid currency (CVA).
    pub illiquid: Option<f64>,
    /// Equity spot against repo.
    pub spot_repo: Option<f64>,
    /// Vega risk factors (CVA).
    pub vega: Option<f64>,
}

impl RhoConstants {
    pub(crate) fn entries(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("name", self.name),
            ("tenor", self.tenor),
            ("basis", self.basis),
            ("tranche", self.tranche),
            ("related_name", self.related_name),
            ("unrelated_name", self.unrelated_name),
            ("credit_quality", self.credit_quality),
            ("curve", self.curve),
            ("inflation", self.inflation),
            ("xccy", self.xccy),
            ("illiquid", self.illiquid),
            ("spot_repo", self.spot_repo),
            ("vega", self.vega),
        ]
    }
}

/// Covered-bond risk weight for highly rated issuers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoveredBondOverride {
    /// Covered-bond bucket.
    pub bucket: String,
    /// Ratings that qualify for the reduced weight.
    pub high_quality_ratings: Vec<String>,
    /// Replacement risk weight.
    pub risk_weight: f64,
}

/// Risk weights per market-cap tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketCapWeights {
    /// Large-cap weight.
    pub large: Option<f64>,
    /// Small-cap weight.
    pub small: Option<f64>,
}

impl MarketCapWeights {
    /// Weight for a tier.
    pub fn get(&self, cap: MarketCap) -> Option<f64> {
        match cap {
            MarketCap::Large => self.large,
            MarketCap::Small => self.small,
        }
    }

    pub(crate) fn set(&mut self, cap: MarketCap, value: f64) {
        match cap {
            MarketCap::Large => self.large = Some(value),
            MarketCap::Small => self.small = Some(value),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTenorTable {
    tenors: Vec<Tenor>,
    rows: Vec<Vec<f64>>,
}

/// Symmetric correlation table indexed by tenor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTenorTable")]
pub struct TenorTable {
    tenors: Vec<Tenor>,
    matrix: CorrelationMatrix,
}

impl TryFrom<RawTenorTable> for TenorTable {
    type Error = String;

    fn try_from(raw: RawTenorTable) -> Result<Self, Self::Error> {
        let matrix = CorrelationMatrix::from_rows(&raw.rows).map_err(|e| e.to_string())?;
        if matrix.dim() != raw.tenors.len() {
            return Err(format!(
                "tenor table has {} tenors but {} rows",
                raw.tenors.len(),
                matrix.dim()
            ));
        }
        Ok(Self {
            tenors: raw.tenors,
            matrix,
        })
    }
}

impl TenorTable {
    /// Builds a table from a pairwise rule on year fractions; diagonal is 1.
    pub fn from_fn<F: Fn(f64, f64) -> f64>(tenors: &[Tenor], rule: F) -> Self {
        let matrix = CorrelationMatrix::from_pairwise::<std::convert::Infallible, _>(
            tenors.len(),
            1.0,
            |i, j| Ok(rule(tenors[i].years(), tenors[j].years())),
        )
        .unwrap_or_else(|never| match never {});
        Self {
            tenors: tenors.to_vec(),
            matrix,
        }
    }

    /// Tenors labelling rows and columns.
    pub fn tenors(&self) -> &[Tenor] {
        &self.tenors
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }

    /// Correlation between two tenors.
    pub fn get(&self, a: Tenor, b: Tenor) -> Option<f64> {
        let i = self.tenors.iter().position(|t| *t == a)?;
        let j = self.tenors.iter().position(|t| *t == b)?;
        Some(self.matrix.get(i, j))
    }

    /// Correlation between two tenors, or a lookup error naming the missing one.
    pub fn lookup(&self, risk_class: RiskClass, item: &str, a: Tenor, b: Tenor) -> SbmResult<f64> {
        self.get(a, b).ok_or_else(|| {
            let missing = if self.tenors.contains(&a) { b } else { a };
            SbmError::lookup(risk_class.code(), item, missing.to_string())
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLabelledMatrix {
    buckets: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Symmetric matrix indexed by bucket label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLabelledMatrix")]
pub struct LabelledMatrix {
    labels: Vec<String>,
    matrix: CorrelationMatrix,
}

impl TryFrom<RawLabelledMatrix> for LabelledMatrix {
    type Error = String;

    fn try_from(raw: RawLabelledMatrix) -> Result<Self, Self::Error> {
        let matrix = CorrelationMatrix::from_rows(&raw.rows).map_err(|e| e.to_string())?;
        if matrix.dim() != raw.buckets.len() {
            return Err(format!(
                "matrix has {} bucket labels but {} rows",
                raw.buckets.len(),
                matrix.dim()
            ));
        }
        Ok(Self {
            labels: raw.buckets,
            matrix,
        })
    }
}

impl LabelledMatrix {
    /// Row and column labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }
}

/// Inter-bucket correlation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GammaSpec {
    /// Same correlation between every pair of buckets.
    Uniform(f64),
    /// Full bucket-pair matrix.
    Matrix(LabelledMatrix),
}

impl GammaSpec {
    /// Gamma for `buckets`, in order, with a zero diagonal.
    pub fn for_buckets(&self, risk_class: RiskClass, buckets: &[String]) -> SbmResult<CorrelationMatrix> {
        match self {
            GammaSpec::Uniform(gamma) => Ok(CorrelationMatrix::uniform(buckets.len(), *gamma, 0.0)),
            GammaSpec::Matrix(labelled) => {
                let indices = buckets
                    .iter()
                    .map(|b| {
                        labelled
                            .labels
                            .iter()
                            .position(|l| l == b)
                            .ok_or_else(|| SbmError::lookup(risk_class.code(), "gamma", b.clone()))
                    })
                    .collect::<SbmResult<Vec<_>>>()?;
                Ok(labelled.matrix.select(&indices).with_diagonal(0.0))
            }
        }
    }
}

/// Parameters of one asset class under one regime.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetClassParams {
    /// Bucket taxonomy. Empty for currency-bucketed classes (IR, FX).
    pub buckets: Vec<BucketSpec>,
    /// Currencies treated as liquid (IR, FX).
    pub liquid_currencies: Vec<String>,
    /// ERM II currencies and their fluctuation bands (FX, CVA IR).
    pub erm2_currencies: BTreeMap<String, f64>,
    /// Band below which the ERM II band itself is the risk weight.
    pub erm2_band: Option<f64>,
    /// Currencies pegged to the euro (FX).
    pub eur_peg_currencies: Vec<String>,
    /// Currencies whose correlation with `peg_anchor` uses `gamma_peg` (IR).
    pub peg_currencies: Vec<String>,
    /// Anchor currency of the peg.
    pub peg_anchor: Option<String>,
    /// Inter-bucket correlation between a peg currency and the anchor.
    pub gamma_peg: Option<f64>,

    /// Scalar delta risk weight (FX, CVA FX).
    pub delta_risk_weight: Option<f64>,
    /// Delta risk weight per tenor (IR).
    pub delta_tenor_risk_weights: BTreeMap<Tenor, f64>,
    /// Inflation curve delta risk weight (IR).
    pub delta_inflation_risk_weight: Option<f64>,
    /// Cross-currency basis delta risk weight (IR).
    pub delta_xccy_risk_weight: Option<f64>,
    /// Illiquid-currency rate risk weight (CVA IR).
    pub delta_illiquid_risk_weight: Option<f64>,
    /// Illiquid-currency inflation risk weight (CVA IR).
    pub delta_inflation_illiquid_risk_weight: Option<f64>,
    /// Delta risk weight keyed by bucket plus sub-bucket.
    pub delta_bucket_risk_weights: BTreeMap<String, f64>,
    /// Equity repo delta risk weight keyed by bucket.
    pub delta_repo_bucket_risk_weights: BTreeMap<String, f64>,
    /// Delta risk weight keyed by credit quality code, then bucket plus sub-bucket (CVA CC).
    pub delta_quality_risk_weights: BTreeMap<String, BTreeMap<String, f64>>,
    /// Covered-bond override (CR).
    pub covered_bond: Option<CoveredBondOverride>,
    /// Scalar vega risk weight; derived from the liquidity horizon when absent.
    pub vega_risk_weight: Option<f64>,
    /// Vega risk weight per market-cap tier (EQ); derived when absent.
    pub vega_market_cap_risk_weights: MarketCapWeights,
    /// Vega risk weight keyed by bucket (CVA EQ).
    pub vega_bucket_risk_weights: BTreeMap<String, f64>,

    /// Scalar correlation constants.
    pub rho: RhoConstants,
    /// Correlation constants for index buckets.
    pub index_rho: Option<RhoConstants>,
    /// Delta tenor grid.
    pub delta_tenors: Vec<Tenor>,
    /// Decay rate of the derived delta tenor correlation (IR).
    pub delta_tenor_rho_theta: Option<f64>,
    /// Floor of the derived delta tenor correlation (IR).
    pub delta_tenor_rho_floor: Option<f64>,
    /// Delta tenor correlation table; derived for IR when absent.
    pub delta_tenor_rho_table: Option<TenorTable>,
    /// Vega option-maturity grid.
    pub vega_tenors: Vec<Tenor>,
    /// Decay rate of the underlying-maturity correlation (IR vega).
    pub vega_underlying_rho_alpha: Option<f64>,
    /// Option-maturity correlation; derived when absent.
    pub vega_option_rho_table: Option<TenorTable>,
    /// Underlying-maturity correlation (IR vega); derived when absent.
    pub vega_underlying_rho_table: Option<TenorTable>,
    /// Inter-bucket correlation.
    pub gamma: Option<GammaSpec>,
}

impl AssetClassParams {
    /// Bucket by label.
    pub fn bucket(&self, name: &str) -> Option<&BucketSpec> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Returns true if `name` is the residual bucket.
    pub fn is_residual(&self, name: &str) -> bool {
        self.bucket(name).is_some_and(|b| b.residual)
    }

    /// Returns true if `name` is an index bucket.
    pub fn is_index(&self, name: &str) -> bool {
        self.bucket(name).is_some_and(|b| b.index)
    }

    /// Label of the residual bucket, if the asset class has one.
    pub fn residual_bucket(&self) -> Option<&str> {
        self.buckets
            .iter()
            .find(|b| b.residual)
            .map(|b| b.name.as_str())
    }

    /// Correlation constants for a bucket: index constants for index buckets.
    pub fn rho_for(&self, bucket: &str) -> &RhoConstants {
        match &self.index_rho {
            Some(index) if self.is_index(bucket) => index,
            _ => &self.rho,
        }
    }
}

/// Liquidity horizon of an asset class (and market-cap tier).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiquidityHorizon {
    /// Asset class.
    pub asset_class: AssetClassKey,
    /// Market-cap tier (equity).
    #[serde(default)]
    pub market_cap: Option<MarketCap>,
    /// Horizon in days.
    pub days: f64,
}

/// Market-risk parameters shared across asset classes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketRiskParams {
    /// σ in `min(σ·√(LH/10), 1)`.
    pub vega_risk_weight_sigma: f64,
    /// α of the option-maturity correlation `exp(−α·|a−b|/min(a,b))`.
    pub vega_option_rho_alpha: f64,
    /// Liquidity horizons feeding the vega risk weights.
    pub liquidity_horizons: Vec<LiquidityHorizon>,
}

impl Default for MarketRiskParams {
    fn default() -> Self {
        Self {
            vega_risk_weight_sigma: 0.55,
            vega_option_rho_alpha: 0.01,
            liquidity_horizons: Vec::new(),
        }
    }
}

/// SA-CVA parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CvaParams {
    /// Hedge-disallowance constant R.
    pub hedge_disallowance: f64,
    /// Multiplier m_CVA applied to the aggregated CVA capital.
    pub capital_multiplier: f64,
}

impl Default for CvaParams {
    fn default() -> Self {
        Self {
            hedge_disallowance: 0.01,
            capital_multiplier: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rc() -> RiskClass {
        "MS_CRDelta".parse().unwrap()
    }

    #[test]
    fn test_tenor_table_lookup() {
        let tenors: Vec<Tenor> = ["1", "5"].iter().map(|t| t.parse().unwrap()).collect();
        let table = TenorTable::from_fn(&tenors, |a, b| a.min(b) / a.max(b));
        assert_eq!(table.get(tenors[0], tenors[1]), Some(0.2));
        assert_eq!(table.get(tenors[1], tenors[1]), Some(1.0));

        let missing: Tenor = "2".parse().unwrap();
        let err = table.lookup(rc(), "tenor rho", tenors[0], missing).unwrap_err();
        assert_eq!(err, SbmError::lookup("MS_CRDelta", "tenor rho", "2"));
    }

    #[test]
    fn test_gamma_uniform() {
        let gamma = GammaSpec::Uniform(0.25);
        let m = gamma.for_buckets(rc(), &["1".into(), "2".into(), "3".into()]).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 2), 0.25);
    }

    #[test]
    fn test_gamma_matrix_selects_in_order() {
        let labelled = LabelledMatrix::try_from(RawLabelledMatrix {
            buckets: vec!["a".into(), "b".into(), "c".into()],
            rows: vec![
                vec![0.0, 0.1, 0.2],
                vec![0.1, 0.0, 0.3],
                vec![0.2, 0.3, 0.0],
            ],
        })
        .unwrap();
        let gamma = GammaSpec::Matrix(labelled);
        let m = gamma.for_buckets(rc(), &["c".into(), "a".into()]).unwrap();
        assert_eq!(m.to_rows(), vec![vec![0.0, 0.2], vec![0.2, 0.0]]);

        let err = gamma.for_buckets(rc(), &["z".into()]).unwrap_err();
        assert!(matches!(err, SbmError::ConfigLookup { .. }));
    }

    #[test]
    fn test_labelled_matrix_rejects_bad_shape() {
        let result = LabelledMatrix::try_from(RawLabelledMatrix {
            buckets: vec!["a".into()],
            rows: vec![vec![0.0, 0.1], vec![0.1, 0.0]],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_bucket_flags() {
        let params = AssetClassParams {
            buckets: vec![
                BucketSpec {
                    name: "1".into(),
                    residual: false,
                    index: true,
                    market_cap: None,
                    name_rho: None,
                },
                BucketSpec {
                    name: "16".into(),
                    residual: true,
                    index: false,
                    market_cap: None,
                    name_rho: None,
                },
            ],
            index_rho: Some(RhoConstants {
                name: Some(0.8),
                ..Default::default()
            }),
            rho: RhoConstants {
                name: Some(0.35),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(params.is_index("1"));
        assert!(params.is_residual("16"));
        assert!(!params.is_residual("99"));
        assert_eq!(params.residual_bucket(), Some("16"));
        assert_eq!(params.rho_for("1").name, Some(0.8));
        assert_eq!(params.rho_for("16").name, Some(0.35));
    }
}
