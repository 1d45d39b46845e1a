//! Gross/net salary reconciliation for a single taxpayer.
//!
//! A [`Taxpayer`] combines an [`InsuranceCalculator`] and a
//! [`ProgressiveTaxCalculator`] with a dependent count and an insurance base
//! selection:
//!
//! ```text
//! insurance       = contributions on the selected base
//! taxable income  = max(0, gross − personal − dependents × per-dependent − employee insurance)
//! net salary      = gross − employee insurance − tax
//! employer cost   = gross + employer insurance
//! ```
//!
//! Going from a target net salary back to gross has no closed form because of
//! rounding and bracket edges, so [`Taxpayer::calculate_from_net`] bisects over
//! gross salary in `[target, 2 × target]`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use pit_core::InsuranceBase;
//! use pit_core::calculations::Taxpayer;
//! use pit_core::regimes::before_2026;
//!
//! let taxpayer = Taxpayer::for_regime(before_2026(), 0, InsuranceBase::basic()).unwrap();
//!
//! let result = taxpayer.calculate_from_gross(dec!(20000000)).unwrap();
//! assert_eq!(result.net_salary, dec!(18848205));
//!
//! let inverse = taxpayer.calculate_from_net(dec!(18848205)).unwrap();
//! assert_eq!(inverse.gross_salary, dec!(20000000));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::round_half_up;
use crate::calculations::insurance::{
    InsuranceBreakdown, InsuranceCalculator, InsuranceCalculatorError, InsuranceRates,
};
use crate::calculations::progressive::{
    BracketBreakdown, Deductions, GrossTaxResult, ProgressiveTaxCalculator, ProgressiveTaxError,
};
use crate::{InsuranceBase, RegimeConstants, SalaryType, TaxBracket};

/// Iteration cap for the net-to-gross search.
pub const MAX_SOLVER_ITERATIONS: u32 = 100;

/// A computed net salary closer than this to the target ends the search.
pub const SOLVER_TOLERANCE: Decimal = Decimal::ONE;

/// Errors that can occur while building a [`Taxpayer`] or calculating with it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxpayerError {
    #[error("gross salary must be non-negative, got {0}")]
    NegativeGrossSalary(Decimal),

    #[error("net salary must be non-negative, got {0}")]
    NegativeNetSalary(Decimal),

    /// The salary is too large for the result to fit in a [`Decimal`].
    #[error("salary {0} is too large to calculate with")]
    AmountOverflow(Decimal),

    #[error(transparent)]
    Insurance(#[from] InsuranceCalculatorError),

    #[error(transparent)]
    Tax(#[from] ProgressiveTaxError),
}

/// Full outcome of one salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult<'a> {
    /// Which salary the caller supplied.
    pub salary_type: SalaryType,
    pub dependents: u32,

    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub taxable_income: Decimal,
    pub total_tax: Decimal,

    pub insurance: InsuranceBreakdown,

    /// Per-bracket allocation, ascending, referencing the regime's brackets.
    pub tax_breakdown: Vec<BracketBreakdown<'a>>,

    /// Gross salary plus the employer's insurance contribution.
    pub total_employer_cost: Decimal,
}

/// One taxpayer's fixed parameters under a given regime.
///
/// Immutable after construction; every calculation is a pure function of its
/// argument and this configuration.
#[derive(Debug, Clone)]
pub struct Taxpayer<'a> {
    insurance_calculator: InsuranceCalculator,
    tax_calculator: ProgressiveTaxCalculator<'a>,
    dependents: u32,
    insurance_base: InsuranceBase,
}

impl<'a> Taxpayer<'a> {
    pub fn new(
        insurance_calculator: InsuranceCalculator,
        tax_calculator: ProgressiveTaxCalculator<'a>,
        dependents: u32,
        insurance_base: InsuranceBase,
    ) -> Self {
        Self {
            insurance_calculator,
            tax_calculator,
            dependents,
            insurance_base,
        }
    }

    /// Builds both calculators from a regime's constants.
    ///
    /// # Errors
    ///
    /// Returns [`TaxpayerError`] if the regime's rates, deductions or bracket
    /// table are invalid.
    pub fn for_regime(
        constants: &'a RegimeConstants,
        dependents: u32,
        insurance_base: InsuranceBase,
    ) -> Result<Self, TaxpayerError> {
        let insurance_calculator = InsuranceCalculator::new(
            constants.employee_insurance_rate,
            constants.employer_insurance_rate,
        )?;
        let tax_calculator = ProgressiveTaxCalculator::new(
            constants.personal_deduction,
            constants.dependent_deduction,
            &constants.brackets,
        )?;

        Ok(Self::new(
            insurance_calculator,
            tax_calculator,
            dependents,
            insurance_base,
        ))
    }

    pub fn dependents(&self) -> u32 {
        self.dependents
    }

    pub fn insurance_base(&self) -> &InsuranceBase {
        &self.insurance_base
    }

    pub fn brackets(&self) -> &[&'a TaxBracket] {
        self.tax_calculator.brackets()
    }

    pub fn insurance_rates(&self) -> InsuranceRates {
        self.insurance_calculator.rates()
    }

    pub fn deductions(&self) -> Result<Deductions, TaxpayerError> {
        Ok(self.tax_calculator.deductions(self.dependents)?)
    }

    /// Calculates insurance, tax and net salary for a gross salary.
    ///
    /// # Errors
    ///
    /// Returns [`TaxpayerError::NegativeGrossSalary`] for a negative input,
    /// [`TaxpayerError::Tax`] if the selected insurance base yields a negative
    /// contribution, or an `AmountOverflow` error when an amount does not fit
    /// in a [`Decimal`].
    pub fn calculate_from_gross(
        &self,
        gross_salary: Decimal,
    ) -> Result<CalculationResult<'a>, TaxpayerError> {
        if gross_salary < Decimal::ZERO {
            return Err(TaxpayerError::NegativeGrossSalary(gross_salary));
        }

        let insurance = self
            .insurance_calculator
            .calculate(&self.insurance_base, gross_salary)?;

        let GrossTaxResult {
            taxable_income,
            total_tax,
            breakdown,
        } = self.tax_calculator.calculate_from_gross(
            gross_salary,
            self.dependents,
            insurance.employee_contribution,
        )?;

        let overflow = || TaxpayerError::AmountOverflow(gross_salary);
        let net_salary = gross_salary
            .checked_sub(insurance.employee_contribution)
            .and_then(|net| net.checked_sub(total_tax))
            .ok_or_else(overflow)?;
        let total_employer_cost = gross_salary
            .checked_add(insurance.employer_contribution)
            .ok_or_else(overflow)?;

        Ok(CalculationResult {
            salary_type: SalaryType::Gross,
            dependents: self.dependents,
            gross_salary,
            net_salary,
            taxable_income,
            total_tax,
            insurance,
            tax_breakdown: breakdown,
            total_employer_cost,
        })
    }

    /// Finds the gross salary whose net salary matches `target_net_salary`.
    ///
    /// Bisects over `[target, 2 × target]`, evaluating the rounded midpoint
    /// each step. Stops once the computed net salary is within
    /// [`SOLVER_TOLERANCE`] of the target or after [`MAX_SOLVER_ITERATIONS`]
    /// steps. When the search does not converge the result for the final
    /// midpoint is returned as a best effort.
    ///
    /// The search relies on net salary never decreasing as gross salary grows.
    ///
    /// # Errors
    ///
    /// Returns [`TaxpayerError::NegativeNetSalary`] for a negative target,
    /// [`TaxpayerError::AmountOverflow`] if `2 × target` does not fit in a
    /// [`Decimal`], or any error from [`Self::calculate_from_gross`].
    pub fn calculate_from_net(
        &self,
        target_net_salary: Decimal,
    ) -> Result<CalculationResult<'a>, TaxpayerError> {
        if target_net_salary < Decimal::ZERO {
            return Err(TaxpayerError::NegativeNetSalary(target_net_salary));
        }

        let mut low = target_net_salary;
        let mut high = target_net_salary
            .checked_mul(Decimal::TWO)
            .ok_or(TaxpayerError::AmountOverflow(target_net_salary))?;

        for iteration in 0..MAX_SOLVER_ITERATIONS {
            let mid = midpoint(low, high);
            let result = self.calculate_from_gross(mid)?;

            if (result.net_salary - target_net_salary).abs() < SOLVER_TOLERANCE {
                debug!(
                    target = %target_net_salary,
                    gross = %mid,
                    iterations = iteration + 1,
                    "net salary search converged"
                );
                return Ok(CalculationResult {
                    salary_type: SalaryType::Net,
                    ..result
                });
            }

            if result.net_salary < target_net_salary {
                low = mid;
            } else {
                high = mid;
            }
        }

        let gross = midpoint(low, high);
        warn!(
            target = %target_net_salary,
            gross = %gross,
            iterations = MAX_SOLVER_ITERATIONS,
            "net salary search did not converge; returning closest estimate"
        );
        let result = self.calculate_from_gross(gross)?;
        Ok(CalculationResult {
            salary_type: SalaryType::Net,
            ..result
        })
    }

    /// Dispatches on whether `salary` is gross or net.
    ///
    /// # Errors
    ///
    /// See [`Self::calculate_from_gross`] and [`Self::calculate_from_net`].
    pub fn calculate(
        &self,
        salary: Decimal,
        salary_type: SalaryType,
    ) -> Result<CalculationResult<'a>, TaxpayerError> {
        match salary_type {
            SalaryType::Gross => self.calculate_from_gross(salary),
            SalaryType::Net => self.calculate_from_net(salary),
        }
    }
}

fn midpoint(
    low: Decimal,
    high: Decimal,
) -> Decimal {
    // Same value as (low + high) / 2 without the overflowing sum.
    round_half_up(low + (high - low) / Decimal::TWO)
}
