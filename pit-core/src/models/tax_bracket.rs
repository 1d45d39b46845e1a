use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{is_valid_percentage, max, percent_of};

/// Reasons a bracket definition is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketError {
    /// The lower bound must be non-negative.
    #[error("bracket lower bound must be non-negative, got {0}")]
    NegativeLowerBound(Decimal),

    /// A bounded bracket must end strictly after it starts.
    #[error("bracket upper bound {to} must be greater than lower bound {from}")]
    EmptyRange { from: Decimal, to: Decimal },

    /// The rate is a percentage and must lie in [0, 100].
    #[error("tax rate must be between 0 and 100, got {0}")]
    InvalidRate(Decimal),
}

/// One interval `[from, to)` of a progressive tax table and its rate.
///
/// `to` of `None` means the bracket is unbounded above. Brackets are validated
/// on construction and immutable afterwards; deserialization goes through the
/// same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxBracket")]
pub struct TaxBracket {
    from: Decimal,
    to: Option<Decimal>,
    rate: Decimal,
}

#[derive(Deserialize)]
struct RawTaxBracket {
    from: Decimal,
    #[serde(default)]
    to: Option<Decimal>,
    rate: Decimal,
}

impl TryFrom<RawTaxBracket> for TaxBracket {
    type Error = BracketError;

    fn try_from(raw: RawTaxBracket) -> Result<Self, Self::Error> {
        Self::new(raw.from, raw.to, raw.rate)
    }
}

impl TaxBracket {
    /// Creates a validated bracket.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError`] if `from` is negative, if a bounded `to` is not
    /// greater than `from`, or if `rate` is outside [0, 100].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use pit_core::{BracketError, TaxBracket};
    ///
    /// assert!(TaxBracket::new(dec!(0), Some(dec!(5000000)), dec!(5)).is_ok());
    /// assert_eq!(
    ///     TaxBracket::new(dec!(0), Some(dec!(0)), dec!(5)),
    ///     Err(BracketError::EmptyRange { from: dec!(0), to: dec!(0) }),
    /// );
    /// ```
    pub fn new(
        from: Decimal,
        to: Option<Decimal>,
        rate: Decimal,
    ) -> Result<Self, BracketError> {
        if from < Decimal::ZERO {
            return Err(BracketError::NegativeLowerBound(from));
        }
        if let Some(to) = to
            && to <= from
        {
            return Err(BracketError::EmptyRange { from, to });
        }
        if !is_valid_percentage(rate) {
            return Err(BracketError::InvalidRate(rate));
        }
        Ok(Self { from, to, rate })
    }

    /// Builds a bracket without validation, for tables known to be valid at
    /// compile time.
    pub(crate) const fn new_unchecked(
        from: Decimal,
        to: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { from, to, rate }
    }

    pub fn from(&self) -> Decimal {
        self.from
    }

    pub fn to(&self) -> Option<Decimal> {
        self.to
    }

    /// Rate as a percentage, e.g. `10` for 10%.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn is_unbounded(&self) -> bool {
        self.to.is_none()
    }

    /// Width of the bracket, or `None` when it is unbounded.
    pub fn size(&self) -> Option<Decimal> {
        self.to.map(|to| to - self.from)
    }

    /// Returns `true` if `income` falls inside `[from, to)`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.from && self.to.is_none_or(|to| income < to)
    }

    /// Portion of `income` that lies inside this bracket.
    ///
    /// Zero when `income` does not reach past `from`, capped at the bracket
    /// size otherwise.
    pub fn taxable_amount_for(
        &self,
        income: Decimal,
    ) -> Decimal {
        // Only a very negative income can overflow, and it has no share here.
        let Some(above_floor) = income.checked_sub(self.from) else {
            return Decimal::ZERO;
        };
        let in_bracket = match self.size() {
            Some(size) => above_floor.min(size),
            None => above_floor,
        };
        max(in_bracket, Decimal::ZERO)
    }

    /// Tax owed on an amount already allocated to this bracket, rounded to a
    /// whole unit. `None` if the tax does not fit in a [`Decimal`].
    pub fn tax_for(
        &self,
        taxable_amount: Decimal,
    ) -> Option<Decimal> {
        percent_of(taxable_amount, self.rate)
    }

    /// Tax this bracket contributes for a total taxable `income`.
    pub fn tax_for_income(
        &self,
        income: Decimal,
    ) -> Option<Decimal> {
        self.tax_for(self.taxable_amount_for(income))
    }

    /// Rate formatted as a percentage string, e.g. `"10.5%"`.
    pub fn formatted_rate(&self) -> String {
        format!("{}%", self.rate.normalize())
    }
}

impl fmt::Display for TaxBracket {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "[{}, {})", self.from, to)?,
            None => write!(f, "[{}, ∞)", self.from)?,
        }
        write!(f, " @ {}", self.formatted_rate())
    }
}
