//! Social-insurance contributions.
//!
//! A contribution base is chosen from an [`InsuranceBase`] selection, then the
//! employee and employer rates are applied to it independently:
//!
//! | Selection    | Base                                  |
//! |--------------|---------------------------------------|
//! | `basic`      | the carried amount                    |
//! | `specific`   | the carried amount                    |
//! | `percentage` | `round(gross × value / 100)`          |
//!
//! Each contribution is `round(base × rate / 100)`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use pit_core::InsuranceBase;
//! use pit_core::calculations::InsuranceCalculator;
//!
//! let calculator = InsuranceCalculator::new(dec!(10.5), dec!(21.5)).unwrap();
//! let result = calculator.calculate(&InsuranceBase::basic(), dec!(20000000)).unwrap();
//!
//! assert_eq!(result.base_amount, dec!(5310000));
//! assert_eq!(result.employee_contribution, dec!(557550));
//! assert_eq!(result.employer_contribution, dec!(1141650));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::InsuranceBase;
use crate::calculations::common::{is_valid_percentage, percent_of};

/// Errors raised when building an [`InsuranceCalculator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InsuranceCalculatorError {
    #[error("employee insurance rate must be between 0 and 100, got {0}")]
    InvalidEmployeeRate(Decimal),

    #[error("employer insurance rate must be between 0 and 100, got {0}")]
    InvalidEmployerRate(Decimal),

    /// A base or contribution does not fit in a [`Decimal`].
    #[error("insurance amount overflowed for {0}")]
    AmountOverflow(Decimal),
}

/// Contribution amounts for one gross salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceBreakdown {
    /// Amount the rates were applied to.
    pub base_amount: Decimal,
    /// Withheld from the employee's gross salary.
    pub employee_contribution: Decimal,
    /// Paid by the employer on top of gross salary.
    pub employer_contribution: Decimal,
    /// Employee plus employer contribution.
    pub total_contribution: Decimal,
}

/// Employee/employer contribution rates, as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsuranceRates {
    pub employee: Decimal,
    pub employer: Decimal,
}

/// Applies fixed employee and employer rates to a contribution base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceCalculator {
    employee_rate: Decimal,
    employer_rate: Decimal,
}

impl InsuranceCalculator {
    /// Creates a calculator with rates given as percentages.
    ///
    /// # Errors
    ///
    /// Returns [`InsuranceCalculatorError`] if either rate is outside [0, 100].
    pub fn new(
        employee_rate: Decimal,
        employer_rate: Decimal,
    ) -> Result<Self, InsuranceCalculatorError> {
        if !is_valid_percentage(employee_rate) {
            return Err(InsuranceCalculatorError::InvalidEmployeeRate(employee_rate));
        }
        if !is_valid_percentage(employer_rate) {
            return Err(InsuranceCalculatorError::InvalidEmployerRate(employer_rate));
        }
        Ok(Self {
            employee_rate,
            employer_rate,
        })
    }

    pub fn employee_rate(&self) -> Decimal {
        self.employee_rate
    }

    pub fn employer_rate(&self) -> Decimal {
        self.employer_rate
    }

    pub fn rates(&self) -> InsuranceRates {
        InsuranceRates {
            employee: self.employee_rate,
            employer: self.employer_rate,
        }
    }

    /// Resolves the contribution base for a selection and gross salary.
    ///
    /// # Errors
    ///
    /// Returns [`InsuranceCalculatorError::AmountOverflow`] if a percentage
    /// base does not fit in a [`Decimal`].
    pub fn compute_base(
        &self,
        selection: &InsuranceBase,
        gross_salary: Decimal,
    ) -> Result<Decimal, InsuranceCalculatorError> {
        match *selection {
            InsuranceBase::Basic(value) | InsuranceBase::Specific(value) => Ok(value),
            InsuranceBase::Percentage(value) => percent_of(gross_salary, value)
                .ok_or(InsuranceCalculatorError::AmountOverflow(gross_salary)),
        }
    }

    /// Contribution at `rate` percent of `base`, rounded to a whole unit.
    pub fn compute_contribution(
        &self,
        base: Decimal,
        rate: Decimal,
    ) -> Result<Decimal, InsuranceCalculatorError> {
        percent_of(base, rate).ok_or(InsuranceCalculatorError::AmountOverflow(base))
    }

    pub fn employee_contribution(
        &self,
        base: Decimal,
    ) -> Result<Decimal, InsuranceCalculatorError> {
        self.compute_contribution(base, self.employee_rate)
    }

    pub fn employer_contribution(
        &self,
        base: Decimal,
    ) -> Result<Decimal, InsuranceCalculatorError> {
        self.compute_contribution(base, self.employer_rate)
    }

    /// Computes the base and both contributions for a gross salary.
    ///
    /// # Errors
    ///
    /// Returns [`InsuranceCalculatorError::AmountOverflow`] if any amount
    /// does not fit in a [`Decimal`].
    pub fn calculate(
        &self,
        selection: &InsuranceBase,
        gross_salary: Decimal,
    ) -> Result<InsuranceBreakdown, InsuranceCalculatorError> {
        let base_amount = self.compute_base(selection, gross_salary)?;
        let employee_contribution = self.employee_contribution(base_amount)?;
        let employer_contribution = self.employer_contribution(base_amount)?;
        let total_contribution = employee_contribution
            .checked_add(employer_contribution)
            .ok_or(InsuranceCalculatorError::AmountOverflow(base_amount))?;

        Ok(InsuranceBreakdown {
            base_amount,
            employee_contribution,
            employer_contribution,
            total_contribution,
        })
    }
}
