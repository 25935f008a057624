//! Risk-factor attributes per risk class.
//!
//! Each [`FactorAttributes`] variant carries exactly the fields that define
//! risk-factor identity for the risk classes it serves. Two rows in the same
//! bucket with equal attributes (and sub-bucket) are the same risk factor.

use std::fmt;
use std::str::FromStr;

use crate::types::{AssetClass, Regime, RiskClass, RiskClassParseError, SensitivityType, Tenor};

/// Interest-rate curve type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IrCurveType {
    /// Risk-free rate curve (`IR`).
    #[cfg_attr(feature = "serde", serde(rename = "IR"))]
    Rate,
    /// Inflation curve (`INFL`).
    #[cfg_attr(feature = "serde", serde(rename = "INFL"))]
    Inflation,
    /// Cross-currency basis curve (`XCCY`).
    #[cfg_attr(feature = "serde", serde(rename = "XCCY"))]
    CrossCurrency,
}

impl IrCurveType {
    /// Template code.
    pub fn code(&self) -> &'static str {
        match self {
            IrCurveType::Rate => "IR",
            IrCurveType::Inflation => "INFL",
            IrCurveType::CrossCurrency => "XCCY",
        }
    }
}

impl fmt::Display for IrCurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IrCurveType {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IR" => Ok(IrCurveType::Rate),
            "INFL" => Ok(IrCurveType::Inflation),
            "XCCY" => Ok(IrCurveType::CrossCurrency),
            _ => Err(RiskClassParseError::UnknownAttribute {
                kind: "curve type",
                value: s.to_string(),
            }),
        }
    }
}

/// Equity spot price or repo rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpotRepo {
    /// Equity spot price.
    Spot,
    /// Equity repo rate.
    Repo,
}

impl SpotRepo {
    /// Template code.
    pub fn code(&self) -> &'static str {
        match self {
            SpotRepo::Spot => "Spot",
            SpotRepo::Repo => "Repo",
        }
    }
}

impl fmt::Display for SpotRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SpotRepo {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spot" => Ok(SpotRepo::Spot),
            "repo" => Ok(SpotRepo::Repo),
            _ => Err(RiskClassParseError::UnknownAttribute {
                kind: "spot/repo flag",
                value: s.to_string(),
            }),
        }
    }
}

/// Counterparty credit quality for CVA credit spread delta.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreditQuality {
    /// Investment grade (`IG`).
    #[cfg_attr(feature = "serde", serde(rename = "IG"))]
    InvestmentGrade,
    /// High yield or not rated (`HYNR`).
    #[cfg_attr(feature = "serde", serde(rename = "HYNR"))]
    HighYieldNotRated,
}

impl CreditQuality {
    /// Template code.
    pub fn code(&self) -> &'static str {
        match self {
            CreditQuality::InvestmentGrade => "IG",
            CreditQuality::HighYieldNotRated => "HYNR",
        }
    }
}

impl fmt::Display for CreditQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CreditQuality {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['_', '/', '-'], "").as_str() {
            "IG" => Ok(CreditQuality::InvestmentGrade),
            "HYNR" | "HY" | "NR" => Ok(CreditQuality::HighYieldNotRated),
            _ => Err(RiskClassParseError::UnknownAttribute {
                kind: "credit quality",
                value: s.to_string(),
            }),
        }
    }
}

/// Risk-factor identity attributes, one variant per family of risk classes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FactorAttributes {
    /// Market-risk GIRR delta. Tenor is required for `IR` curves.
    IrDelta {
        /// Curve type.
        curve_type: IrCurveType,
        /// Curve name within the currency bucket.
        curve: String,
        /// Vertex.
        tenor: Option<Tenor>,
    },
    /// Market-risk GIRR vega. Underlying maturity is required for `IR` curves.
    IrVega {
        /// Curve type.
        curve_type: IrCurveType,
        /// Option maturity.
        option_maturity: Tenor,
        /// Residual maturity of the underlying.
        underlying_maturity: Option<Tenor>,
    },
    /// Market-risk CSR non-securitisation delta.
    CreditDelta {
        /// Issuer name.
        name: String,
        /// Bond or CDS curve.
        curve_type: String,
        /// Vertex.
        tenor: Tenor,
        /// Issuer rating; drives the covered-bond weight.
        rating: Option<String>,
    },
    /// Market-risk CSR securitisation delta (CTP and non-CTP).
    SecuritisationDelta {
        /// Underlying name (CTP) or tranche (non-CTP).
        tranche: String,
        /// Bond or CDS curve.
        curve_type: String,
        /// Vertex.
        tenor: Tenor,
    },
    /// Market-risk vega for the credit, equity and commodity classes.
    NamedVega {
        /// Issuer, underlier or commodity name.
        name: String,
        /// Option maturity.
        option_maturity: Tenor,
    },
    /// Market-risk curvature for the credit, equity and commodity classes.
    NamedCurvature {
        /// Issuer, underlier or commodity name.
        name: String,
    },
    /// Market-risk equity delta.
    EquityDelta {
        /// Equity name.
        name: String,
        /// Spot price or repo rate.
        spot_repo: SpotRepo,
    },
    /// Market-risk commodity delta.
    CommodityDelta {
        /// Commodity name.
        name: String,
        /// Delivery location.
        delivery_location: String,
        /// Vertex.
        tenor: Tenor,
    },
    /// Market-risk FX vega.
    FxVega {
        /// Option maturity.
        option_maturity: Tenor,
    },
    /// CVA interest-rate delta. Tenor is required for `IR` curves.
    CvaIrDelta {
        /// Curve type (`IR` or `INFL`).
        curve_type: IrCurveType,
        /// Vertex.
        tenor: Option<Tenor>,
    },
    /// CVA interest-rate vega.
    CvaIrVega {
        /// Curve type (`IR` or `INFL`).
        curve_type: IrCurveType,
    },
    /// CVA counterparty credit spread delta.
    CounterpartyDelta {
        /// Counterparty name.
        name: String,
        /// Parent (legal group) name.
        parent: String,
        /// Credit quality.
        credit_quality: CreditQuality,
        /// Vertex.
        tenor: Tenor,
    },
    /// No attributes: one risk factor per bucket.
    Unkeyed,
}

impl FactorAttributes {
    /// Variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FactorAttributes::IrDelta { .. } => "IrDelta",
            FactorAttributes::IrVega { .. } => "IrVega",
            FactorAttributes::CreditDelta { .. } => "CreditDelta",
            FactorAttributes::SecuritisationDelta { .. } => "SecuritisationDelta",
            FactorAttributes::NamedVega { .. } => "NamedVega",
            FactorAttributes::NamedCurvature { .. } => "NamedCurvature",
            FactorAttributes::EquityDelta { .. } => "EquityDelta",
            FactorAttributes::CommodityDelta { .. } => "CommodityDelta",
            FactorAttributes::FxVega { .. } => "FxVega",
            FactorAttributes::CvaIrDelta { .. } => "CvaIrDelta",
            FactorAttributes::CvaIrVega { .. } => "CvaIrVega",
            FactorAttributes::CounterpartyDelta { .. } => "CounterpartyDelta",
            FactorAttributes::Unkeyed => "Unkeyed",
        }
    }

    /// Variant name expected for a risk class.
    pub fn expected_kind(risk_class: RiskClass) -> &'static str {
        use AssetClass::*;
        use SensitivityType::*;

        match (risk_class.regime(), risk_class.asset_class(), risk_class.sensitivity()) {
            (Regime::MarketRisk, InterestRate, Delta) => "IrDelta",
            (Regime::MarketRisk, InterestRate, Vega) => "IrVega",
            (Regime::MarketRisk, CreditNonSec, Delta) => "CreditDelta",
            (Regime::MarketRisk, CreditSecCtp | CreditSecNonCtp, Delta) => "SecuritisationDelta",
            (Regime::MarketRisk, CreditNonSec | CreditSecCtp | CreditSecNonCtp | Equity | Commodity, Vega) => {
                "NamedVega"
            }
            (
                Regime::MarketRisk,
                CreditNonSec | CreditSecCtp | CreditSecNonCtp | Equity | Commodity,
                Curvature,
            ) => "NamedCurvature",
            (Regime::MarketRisk, Equity, Delta) => "EquityDelta",
            (Regime::MarketRisk, Commodity, Delta) => "CommodityDelta",
            (Regime::MarketRisk, Fx, Vega) => "FxVega",
            (Regime::Cva, InterestRate, Delta) => "CvaIrDelta",
            (Regime::Cva, InterestRate, Vega) => "CvaIrVega",
            (Regime::Cva, CreditSecCtp, Delta) => "CounterpartyDelta",
            _ => "Unkeyed",
        }
    }

    /// Checks the variant and its internal consistency for a risk class.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self, risk_class: RiskClass) -> Result<(), String> {
        let expected = Self::expected_kind(risk_class);
        if self.kind() != expected {
            return Err(format!("expected {} attributes, got {}", expected, self.kind()));
        }
        match self {
            FactorAttributes::IrDelta {
                curve_type: IrCurveType::Rate,
                tenor: None,
                ..
            }
            | FactorAttributes::CvaIrDelta {
                curve_type: IrCurveType::Rate,
                tenor: None,
            } => Err("IR curve requires a tenor".to_string()),
            FactorAttributes::IrVega {
                curve_type: IrCurveType::Rate,
                underlying_maturity: None,
                ..
            } => Err("IR curve requires an underlying residual maturity".to_string()),
            FactorAttributes::CvaIrDelta {
                curve_type: IrCurveType::CrossCurrency,
                ..
            }
            | FactorAttributes::CvaIrVega {
                curve_type: IrCurveType::CrossCurrency,
            } => Err("cross-currency basis is not a CVA risk factor".to_string()),
            _ => Ok(()),
        }
    }
}
