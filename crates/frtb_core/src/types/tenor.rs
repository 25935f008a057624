//! Tenor labels for risk-factor vertices and option maturities.
//!
//! Regulatory tenor grids are whole numbers of months (0.25y, 0.5y, 1y, ...),
//! so [`Tenor`] stores months and compares exactly.
//!
//! # Examples
//!
//! ```
//! use frtb_core::types::Tenor;
//!
//! let t: Tenor = "0.25".parse().unwrap();
//! assert_eq!(t.months(), 3);
//! assert_eq!(t.to_string(), "0.25");
//!
//! let t: Tenor = "6M".parse().unwrap();
//! assert_eq!(t.years(), 0.5);
//! assert_eq!("10Y".parse::<Tenor>().unwrap().to_string(), "10");
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::RiskClassParseError;

/// A positive whole number of months.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Tenor {
    months: u32,
}

impl Tenor {
    /// Tenor of `months` months.
    ///
    /// Returns `None` for zero.
    pub const fn from_months(months: u32) -> Option<Self> {
        if months == 0 {
            None
        } else {
            Some(Self { months })
        }
    }

    /// Tenor from a year fraction that is a whole number of months.
    pub fn from_years(years: f64) -> Option<Self> {
        let months = years * 12.0;
        if !months.is_finite() || months < 0.5 {
            return None;
        }
        let rounded = months.round();
        if (months - rounded).abs() > 1e-6 || rounded > u32::MAX as f64 {
            return None;
        }
        Self::from_months(rounded as u32)
    }

    /// Number of months.
    #[inline]
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Length in years.
    #[inline]
    pub fn years(&self) -> f64 {
        self.months as f64 / 12.0
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.years())
    }
}

impl FromStr for Tenor {
    type Err = RiskClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RiskClassParseError::InvalidTenor(s.to_string());
        let trimmed = s.trim();
        let (number, unit) = match trimmed.char_indices().last() {
            Some((idx, 'M' | 'm')) => (&trimmed[..idx], 'M'),
            Some((idx, 'Y' | 'y')) => (&trimmed[..idx], 'Y'),
            Some(_) => (trimmed, 'Y'),
            None => return Err(invalid()),
        };
        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        let years = if unit == 'M' { value / 12.0 } else { value };
        Tenor::from_years(years).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Tenor {
    type Error = RiskClassParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(value: Tenor) -> Self {
        value.to_string()
    }
}
