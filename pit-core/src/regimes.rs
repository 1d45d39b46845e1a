//! Built-in tax regimes.
//!
//! | Regime       | Personal   | Per dependent | Employee / employer insurance |
//! |--------------|------------|---------------|-------------------------------|
//! | before 2026  | 11,000,000 | 4,400,000     | 10.5% / 21.5%                 |
//! | from 2026    | 15,500,000 | 6,200,000     | 10.5% / 21.5%                 |
//!
//! Both sets are created once per process and never mutated.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RegimeConstants, TaxBracket};

/// Statutory basic social-insurance base.
pub const BASIC_INSURANCE_BASE: Decimal = dec!(5310000);

const EMPLOYEE_INSURANCE_RATE: Decimal = dec!(10.5);
const EMPLOYER_INSURANCE_RATE: Decimal = dec!(21.5);

const BEFORE_2026_BRACKETS: [TaxBracket; 7] = [
    TaxBracket::new_unchecked(dec!(0), Some(dec!(5000000)), dec!(5)),
    TaxBracket::new_unchecked(dec!(5000000), Some(dec!(10000000)), dec!(10)),
    TaxBracket::new_unchecked(dec!(10000000), Some(dec!(18000000)), dec!(15)),
    TaxBracket::new_unchecked(dec!(18000000), Some(dec!(32000000)), dec!(20)),
    TaxBracket::new_unchecked(dec!(32000000), Some(dec!(52000000)), dec!(25)),
    TaxBracket::new_unchecked(dec!(52000000), Some(dec!(80000000)), dec!(30)),
    TaxBracket::new_unchecked(dec!(80000000), None, dec!(35)),
];

const FROM_2026_BRACKETS: [TaxBracket; 5] = [
    TaxBracket::new_unchecked(dec!(0), Some(dec!(10000000)), dec!(5)),
    TaxBracket::new_unchecked(dec!(10000000), Some(dec!(30000000)), dec!(10)),
    TaxBracket::new_unchecked(dec!(30000000), Some(dec!(60000000)), dec!(20)),
    TaxBracket::new_unchecked(dec!(60000000), Some(dec!(100000000)), dec!(30)),
    TaxBracket::new_unchecked(dec!(100000000), None, dec!(35)),
];

static BEFORE_2026: OnceLock<RegimeConstants> = OnceLock::new();
static FROM_2026: OnceLock<RegimeConstants> = OnceLock::new();

/// The two built-in regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeId {
    #[serde(rename = "before2026")]
    Before2026,
    #[serde(rename = "from2026")]
    From2026,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown regime '{0}' (expected 'before2026' or 'from2026')")]
pub struct ParseRegimeIdError(String);

impl RegimeId {
    pub fn all() -> &'static [RegimeId] {
        &[RegimeId::Before2026, RegimeId::From2026]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before2026 => "before2026",
            Self::From2026 => "from2026",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "before2026" => Some(Self::Before2026),
            "from2026" => Some(Self::From2026),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Before2026 => "Before 2026",
            Self::From2026 => "From 2026",
        }
    }

    /// The process-wide constants for this regime.
    pub fn constants(&self) -> &'static RegimeConstants {
        match self {
            Self::Before2026 => BEFORE_2026.get_or_init(|| {
                self.build(dec!(11000000), dec!(4400000), &BEFORE_2026_BRACKETS)
            }),
            Self::From2026 => FROM_2026.get_or_init(|| {
                self.build(dec!(15500000), dec!(6200000), &FROM_2026_BRACKETS)
            }),
        }
    }

    fn build(
        &self,
        personal_deduction: Decimal,
        dependent_deduction: Decimal,
        brackets: &[TaxBracket],
    ) -> RegimeConstants {
        RegimeConstants {
            id: self.as_str().to_string(),
            name: self.label().to_string(),
            personal_deduction,
            dependent_deduction,
            employee_insurance_rate: EMPLOYEE_INSURANCE_RATE,
            employer_insurance_rate: EMPLOYER_INSURANCE_RATE,
            brackets: brackets.to_vec(),
        }
    }
}

impl FromStr for RegimeId {
    type Err = ParseRegimeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseRegimeIdError(s.to_string()))
    }
}

impl fmt::Display for RegimeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constants in force before 2026.
pub fn before_2026() -> &'static RegimeConstants {
    RegimeId::Before2026.constants()
}

/// Constants in force from 2026.
pub fn from_2026() -> &'static RegimeConstants {
    RegimeId::From2026.constants()
}
