use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxBracket;

/// The law-derived constants of one tax regime.
///
/// Rates are percentages (`10.5` means 10.5%). Bracket contiguity is checked
/// when the set is turned into a
/// [`ProgressiveTaxCalculator`](crate::calculations::ProgressiveTaxCalculator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeConstants {
    /// Stable identifier, e.g. `before2026`.
    pub id: String,
    /// Human readable label.
    pub name: String,
    pub personal_deduction: Decimal,
    pub dependent_deduction: Decimal,
    pub employee_insurance_rate: Decimal,
    pub employer_insurance_rate: Decimal,
    pub brackets: Vec<TaxBracket>,
}
