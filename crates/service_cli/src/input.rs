//! Sensitivities CSV input.
//!
//! One record per sensitivity. Columns that a risk class does not use may be
//! left empty. Records are mapped to typed [`SensitivityRow`]s by the
//! attribute family the risk class expects.

use std::path::Path;
use std::str::FromStr;

use frtb_core::sensitivity::{FactorAttributes, SensitivityRow};
use frtb_core::types::RiskClass;
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, FieldError, Result};

/// A raw sensitivities record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensitivityRecord {
    #[serde(rename = "RiskClass")]
    pub risk_class: String,
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "SubBucket", default)]
    pub sub_bucket: Option<String>,
    #[serde(rename = "CurveType", default)]
    pub curve_type: Option<String>,
    #[serde(rename = "Curve", default)]
    pub curve: Option<String>,
    #[serde(rename = "Tenor", default)]
    pub tenor: Option<String>,
    #[serde(rename = "OptionMaturity", default)]
    pub option_maturity: Option<String>,
    #[serde(rename = "UnderlyingResidualMaturity", default)]
    pub underlying_maturity: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Parent", default)]
    pub parent: Option<String>,
    #[serde(rename = "Rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "CreditQuality", default)]
    pub credit_quality: Option<String>,
    #[serde(rename = "SpotRepo", default)]
    pub spot_repo: Option<String>,
    #[serde(rename = "DeliveryLocation", default)]
    pub delivery_location: Option<String>,
    #[serde(rename = "Sensitivity", default)]
    pub sensitivity: Option<f64>,
    #[serde(rename = "HedgeSensitivity", default)]
    pub hedge_sensitivity: Option<f64>,
    #[serde(rename = "CVR+", default)]
    pub cvr_up: Option<f64>,
    #[serde(rename = "CVR-", default)]
    pub cvr_down: Option<f64>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(value: &'a Option<String>, column: &'static str) -> std::result::Result<&'a str, FieldError> {
    present(value).ok_or_else(|| FieldError::missing(column))
}

fn number(value: Option<f64>, column: &'static str) -> std::result::Result<f64, FieldError> {
    value.ok_or_else(|| FieldError::missing(column))
}

fn parse<T>(value: &str, column: &'static str) -> std::result::Result<T, FieldError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| FieldError::invalid(column, e))
}

fn parse_required<T>(value: &Option<String>, column: &'static str) -> std::result::Result<T, FieldError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse(required(value, column)?, column)
}

fn parse_optional<T>(value: &Option<String>, column: &'static str) -> std::result::Result<Option<T>, FieldError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    present(value).map(|v| parse(v, column)).transpose()
}

impl SensitivityRecord {
    /// Maps the record to a typed row.
    ///
    /// # Errors
    ///
    /// [`FieldError`] naming the first missing or malformed column.
    pub fn to_row(&self) -> std::result::Result<SensitivityRow, FieldError> {
        let risk_class: RiskClass = parse(self.risk_class.trim(), "RiskClass")?;
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            return Err(FieldError::missing("Bucket"));
        }
        let attributes = self.attributes(risk_class)?;

        let row = if risk_class.is_curvature() {
            SensitivityRow::curvature(
                risk_class,
                bucket,
                attributes,
                number(self.cvr_up, "CVR+")?,
                number(self.cvr_down, "CVR-")?,
            )
        } else {
            SensitivityRow::linear(risk_class, bucket, attributes, number(self.sensitivity, "Sensitivity")?)
                .with_hedge(self.hedge_sensitivity.unwrap_or(0.0))
        };

        Ok(match present(&self.sub_bucket) {
            Some(sub) => row.with_sub_bucket(sub),
            None => row,
        })
    }

    fn attributes(&self, risk_class: RiskClass) -> std::result::Result<FactorAttributes, FieldError> {
        let name = || required(&self.name, "Name").map(str::to_string);
        let curve_type = || required(&self.curve_type, "CurveType").map(str::to_string);

        Ok(match FactorAttributes::expected_kind(risk_class) {
            "IrDelta" => FactorAttributes::IrDelta {
                curve_type: parse_required(&self.curve_type, "CurveType")?,
                curve: present(&self.curve).unwrap_or_default().to_string(),
                tenor: parse_optional(&self.tenor, "Tenor")?,
            },
            "IrVega" => FactorAttributes::IrVega {
                curve_type: parse_required(&self.curve_type, "CurveType")?,
                option_maturity: parse_required(&self.option_maturity, "OptionMaturity")?,
                underlying_maturity: parse_optional(&self.underlying_maturity, "UnderlyingResidualMaturity")?,
            },
            "CreditDelta" => FactorAttributes::CreditDelta {
                name: name()?,
                curve_type: curve_type()?,
                tenor: parse_required(&self.tenor, "Tenor")?,
                rating: present(&self.rating).map(str::to_string),
            },
            "SecuritisationDelta" => FactorAttributes::SecuritisationDelta {
                tranche: name()?,
                curve_type: curve_type()?,
                tenor: parse_required(&self.tenor, "Tenor")?,
            },
            "NamedVega" => FactorAttributes::NamedVega {
                name: name()?,
                option_maturity: parse_required(&self.option_maturity, "OptionMaturity")?,
            },
            "NamedCurvature" => FactorAttributes::NamedCurvature { name: name()? },
            "EquityDelta" => FactorAttributes::EquityDelta {
                name: name()?,
                spot_repo: parse_required(&self.spot_repo, "SpotRepo")?,
            },
            "CommodityDelta" => FactorAttributes::CommodityDelta {
                name: name()?,
                delivery_location: required(&self.delivery_location, "DeliveryLocation")?.to_string(),
                tenor: parse_required(&self.tenor, "Tenor")?,
            },
            "FxVega" => FactorAttributes::FxVega {
                option_maturity: parse_required(&self.option_maturity, "OptionMaturity")?,
            },
            "CvaIrDelta" => FactorAttributes::CvaIrDelta {
                curve_type: parse_required(&self.curve_type, "CurveType")?,
                tenor: parse_optional(&self.tenor, "Tenor")?,
            },
            "CvaIrVega" => FactorAttributes::CvaIrVega {
                curve_type: parse_required(&self.curve_type, "CurveType")?,
            },
            "CounterpartyDelta" => FactorAttributes::CounterpartyDelta {
                name: name()?,
                parent: required(&self.parent, "Parent")?.to_string(),
                credit_quality: parse_required(&self.credit_quality, "CreditQuality")?,
                tenor: parse_required(&self.tenor, "Tenor")?,
            },
            _ => FactorAttributes::Unkeyed,
        })
    }
}

/// Reads every record of a sensitivities file.
pub fn read_sensitivities(path: &Path) -> Result<Vec<SensitivityRow>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let rows = parse_records(reader)?;
    debug!(path = %path.display(), rows = rows.len(), "read sensitivities");
    Ok(rows)
}

/// Maps records from any reader. Errors carry the record's line number.
pub fn parse_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<SensitivityRow>> {
    let mut rows = Vec::new();
    for result in reader.deserialize::<SensitivityRecord>() {
        let record = result?;
        let row = record.to_row().map_err(|e| e.at_line(rows.len() as u64 + 2))?;
        rows.push(row);
    }
    Ok(rows)
}
