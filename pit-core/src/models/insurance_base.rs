use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::regimes::BASIC_INSURANCE_BASE;

/// How the social-insurance contribution base is chosen.
///
/// Serialized as `{ "type": "basic" | "specific" | "percentage", "value": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InsuranceBase {
    /// A fixed statutory base amount.
    Basic(Decimal),
    /// A fixed amount chosen by the employer.
    Specific(Decimal),
    /// A percentage (0-100) of the gross salary.
    Percentage(Decimal),
}

impl InsuranceBase {
    /// The statutory basic base, [`BASIC_INSURANCE_BASE`].
    pub fn basic() -> Self {
        Self::Basic(BASIC_INSURANCE_BASE)
    }

    /// Short code used on the command line and in serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::Specific(_) => "specific",
            Self::Percentage(_) => "percentage",
        }
    }

    /// The raw value carried by the selection, interpreted per variant.
    pub fn value(&self) -> Decimal {
        match *self {
            Self::Basic(value) | Self::Specific(value) | Self::Percentage(value) => value,
        }
    }
}

impl Default for InsuranceBase {
    fn default() -> Self {
        Self::basic()
    }
}
