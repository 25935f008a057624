//! Risk-class taxonomy for the Sensitivities-Based Method.
//!
//! A [`RiskClass`] combines a capital [`Regime`] (market risk or CVA), an
//! [`AssetClass`] and a [`SensitivityType`]. Its textual code follows the
//! regulatory-template convention, e.g. `MS_IRDelta` or `CS_FXVega`.
//!
//! # Examples
//!
//! ```
//! use frtb_core::types::{AssetClass, Regime, RiskClass, SensitivityType};
//!
//! let rc: RiskClass = "MS_IRDelta".parse().unwrap();
//! assert_eq!(rc.regime(), Regime::MarketRisk);
//! assert_eq!(rc.asset_class(), AssetClass::InterestRate);
//! assert_eq!(rc.sensitivity(), SensitivityType::Delta);
//! assert_eq!(rc.to_string(), "MS_IRDelta");
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::RiskClassParseError;

/// Capital framework a risk class belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regime {
    /// Market-risk Standardised Approach (code prefix `MS`).
    MarketRisk,
    /// Standardised Approach for CVA risk (code prefix `CS`).
    Cva,
}

impl Regime {
    /// Two-letter code prefix used in risk-class codes.
    pub fn code(&self) -> &'static str {
        match self {
            Regime::MarketRisk => "MS",
            Regime::Cva => "CS",
        }
    }

    /// Returns true for the CVA regime.
    #[inline]
    pub fn is_cva(&self) -> bool {
        matches!(self, Regime::Cva)
    }
}

/// Asset class of a risk class.
///
/// Under the CVA regime [`AssetClass::CreditSecCtp`] (`CC`) is the
/// counterparty credit spread class and [`AssetClass::CreditNonSec`] (`CR`)
/// the reference credit spread class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssetClass {
    /// General interest rate risk (`IR`).
    InterestRate,
    /// Credit spread risk, non-securitisations (`CR`).
    CreditNonSec,
    /// Credit spread risk, securitisations in the correlation trading portfolio (`CC`).
    CreditSecCtp,
    /// Credit spread risk, securitisations outside the CTP (`CS`).
    CreditSecNonCtp,
    /// Equity risk (`EQ`).
    Equity,
    /// Commodity risk (`CM`).
    Commodity,
    /// Foreign exchange risk (`FX`).
    Fx,
}

impl AssetClass {
    /// All asset classes in code order.
    pub const ALL: [AssetClass; 7] = [
        AssetClass::InterestRate,
        AssetClass::CreditNonSec,
        AssetClass::CreditSecCtp,
        AssetClass::CreditSecNonCtp,
        AssetClass::Equity,
        AssetClass::Commodity,
        AssetClass::Fx,
    ];

    /// Two-letter asset-class code.
    pub fn code(&self) -> &'static str {
        match self {
            AssetClass::InterestRate => "IR",
            AssetClass::CreditNonSec => "CR",
            AssetClass::CreditSecCtp => "CC",
            AssetClass::CreditSecNonCtp => "CS",
            AssetClass::Equity => "EQ",
            AssetClass::Commodity => "CM",
            AssetClass::Fx => "FX",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ac| ac.code() == code)
    }
}

/// Sensitivity type treated separately by the Standardised Approach.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensitivityType {
    /// First-order sensitivity to the risk factor.
    Delta,
    /// Sensitivity to implied volatility.
    Vega,
    /// Curvature risk (CVR up/down shocks net of delta).
    Curvature,
}

impl SensitivityType {
    /// Name as it appears in risk-class codes.
    pub fn name(&self) -> &'static str {
        match self {
            SensitivityType::Delta => "Delta",
            SensitivityType::Vega => "Vega",
            SensitivityType::Curvature => "Curvature",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Delta" => Some(SensitivityType::Delta),
            "Vega" => Some(SensitivityType::Vega),
            "Curvature" => Some(SensitivityType::Curvature),
            _ => None,
        }
    }
}

/// Identifies the asset-class parameter set of a regime, e.g. `MS_IR`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct AssetClassKey {
    /// Capital regime.
    pub regime: Regime,
    /// Asset class.
    pub asset_class: AssetClass,
}

impl AssetClassKey {
    /// Creates a new key.
    pub const fn new(regime: Regime, asset_class: AssetClass) -> Self {
        Self {
            regime,
            asset_class,
        }
    }

    /// Code such as `MS_IR` or `CS_CC`.
    pub fn code(&self) -> String {
        format!("{}_{}", self.regime.code(), self.asset_class.code())
    }
}

impl fmt::Display for AssetClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.regime.code(), self.asset_class.code())
    }
}

impl TryFrom<String> for AssetClassKey {
    type Error = RiskClassParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetClassKey> for String {
    fn from(value: AssetClassKey) -> Self {
        value.code()
    }
}

impl FromStr for AssetClassKey {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (regime, asset) = s
            .split_once('_')
            .ok_or_else(|| RiskClassParseError::Malformed(s.to_string()))?;
        let regime = match regime {
            "MS" => Regime::MarketRisk,
            "CS" => Regime::Cva,
            other => return Err(RiskClassParseError::UnknownRegime(other.to_string())),
        };
        let asset_class = AssetClass::from_code(asset)
            .ok_or_else(|| RiskClassParseError::UnknownAssetClass(asset.to_string()))?;
        Ok(Self::new(regime, asset_class))
    }
}

/// A risk class: regime, asset class and sensitivity type.
///
/// Construction through [`RiskClass::new`] or parsing rejects combinations
/// the CVA framework does not define (CVA curvature, CVA counterparty vega).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct RiskClass {
    regime: Regime,
    asset_class: AssetClass,
    sensitivity: SensitivityType,
}

impl RiskClass {
    /// Creates a risk class, validating the combination.
    pub fn new(
        regime: Regime,
        asset_class: AssetClass,
        sensitivity: SensitivityType,
    ) -> Result<Self, RiskClassParseError> {
        let rc = Self {
            regime,
            asset_class,
            sensitivity,
        };
        if regime.is_cva() {
            let supported = match sensitivity {
                SensitivityType::Curvature => false,
                SensitivityType::Vega => !matches!(
                    asset_class,
                    AssetClass::CreditSecCtp | AssetClass::CreditSecNonCtp
                ),
                SensitivityType::Delta => asset_class != AssetClass::CreditSecNonCtp,
            };
            if !supported {
                return Err(RiskClassParseError::Unsupported(rc.code()));
            }
        }
        Ok(rc)
    }

    /// Shorthand for a market-risk class.
    pub fn market(asset_class: AssetClass, sensitivity: SensitivityType) -> Self {
        Self {
            regime: Regime::MarketRisk,
            asset_class,
            sensitivity,
        }
    }

    /// Capital regime.
    #[inline]
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Asset class.
    #[inline]
    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    /// Sensitivity type.
    #[inline]
    pub fn sensitivity(&self) -> SensitivityType {
        self.sensitivity
    }

    /// Key of the parameter set this risk class draws on.
    #[inline]
    pub fn asset_class_key(&self) -> AssetClassKey {
        AssetClassKey::new(self.regime, self.asset_class)
    }

    /// Returns true for curvature risk classes.
    #[inline]
    pub fn is_curvature(&self) -> bool {
        self.sensitivity == SensitivityType::Curvature
    }

    /// Returns true for CVA risk classes.
    #[inline]
    pub fn is_cva(&self) -> bool {
        self.regime.is_cva()
    }

    /// Textual code, e.g. `MS_CRVega`.
    pub fn code(&self) -> String {
        format!(
            "{}_{}{}",
            self.regime.code(),
            self.asset_class.code(),
            self.sensitivity.name()
        )
    }

    /// Every valid risk class, market risk first.
    pub fn all() -> Vec<RiskClass> {
        let mut out = Vec::new();
        for regime in [Regime::MarketRisk, Regime::Cva] {
            for asset_class in AssetClass::ALL {
                for sensitivity in [
                    SensitivityType::Delta,
                    SensitivityType::Vega,
                    SensitivityType::Curvature,
                ] {
                    if let Ok(rc) = RiskClass::new(regime, asset_class, sensitivity) {
                        out.push(rc);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for RiskClass {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 6 || s.as_bytes()[2] != b'_' || !s.is_char_boundary(5) {
            return Err(RiskClassParseError::Malformed(s.to_string()));
        }
        let key: AssetClassKey = s[..5].parse()?;
        let sensitivity = SensitivityType::from_name(&s[5..])
            .ok_or_else(|| RiskClassParseError::UnknownSensitivity(s[5..].to_string()))?;
        RiskClass::new(key.regime, key.asset_class, sensitivity)
    }
}

impl TryFrom<String> for RiskClass {
    type Error = RiskClassParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RiskClass> for String {
    fn from(value: RiskClass) -> Self {
        value.code()
    }
}
