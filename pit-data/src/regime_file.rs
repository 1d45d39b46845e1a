use rust_decimal::Decimal;
use serde::Deserialize;

use crate::RegimeLoadError;

/// Deductions and insurance rates for one regime, as declared in TOML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegimeEntry {
    pub id: String,
    pub name: String,
    pub personal_deduction: Decimal,
    pub dependent_deduction: Decimal,
    pub employee_insurance_rate: Decimal,
    pub employer_insurance_rate: Decimal,
}

/// A TOML document of `[[regime]]` tables.
///
/// ```toml
/// [[regime]]
/// id = "from2026"
/// name = "From 2026"
/// personal_deduction = 15500000
/// dependent_deduction = 6200000
/// employee_insurance_rate = "10.5"
/// employer_insurance_rate = "21.5"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegimeFile {
    #[serde(rename = "regime", default)]
    pub regimes: Vec<RegimeEntry>,
}

impl RegimeFile {
    pub fn parse(source: &str) -> Result<Self, RegimeLoadError> {
        Ok(toml::from_str(source)?)
    }
}
