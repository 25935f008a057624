//! Regulatory regimes a parameter set can implement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Regulator whose rules a parameter set follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Regulator {
    /// Basel Committee on Banking Supervision.
    #[default]
    #[serde(rename = "BCBS")]
    Bcbs,
    /// UK Prudential Regulation Authority.
    #[serde(rename = "UK-PRA")]
    UkPra,
    /// European Banking Authority.
    #[serde(rename = "EU-EBA")]
    EuEba,
    /// Monetary Authority of Singapore.
    #[serde(rename = "SG-MAS")]
    SgMas,
}

impl Regulator {
    /// Code used in parameter files.
    pub fn code(&self) -> &'static str {
        match self {
            Regulator::Bcbs => "BCBS",
            Regulator::UkPra => "UK-PRA",
            Regulator::EuEba => "EU-EBA",
            Regulator::SgMas => "SG-MAS",
        }
    }
}

impl fmt::Display for Regulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Regulator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', "-").as_str() {
            "BCBS" => Ok(Regulator::Bcbs),
            "UK-PRA" | "PRA" => Ok(Regulator::UkPra),
            "EU-EBA" | "EBA" => Ok(Regulator::EuEba),
            "SG-MAS" | "MAS" => Ok(Regulator::SgMas),
            _ => Err(ConfigError::InvalidRegulator(s.to_string())),
        }
    }
}
