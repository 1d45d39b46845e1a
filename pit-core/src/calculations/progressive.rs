//! Progressive personal-income-tax calculation.
//!
//! Taxable income is what remains of gross salary after the personal
//! deduction, one deduction per dependent and the employee's insurance
//! contribution, floored at zero. It is then allocated to the brackets in
//! ascending order, each bracket taking at most its own width, and each
//! bracket's share is taxed and rounded on its own before summing.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use pit_core::calculations::ProgressiveTaxCalculator;
//! use pit_core::regimes::RegimeId;
//!
//! let regime = RegimeId::Before2026.constants();
//! let calculator = ProgressiveTaxCalculator::new(
//!     regime.personal_deduction,
//!     regime.dependent_deduction,
//!     &regime.brackets,
//! )
//! .unwrap();
//!
//! let result = calculator.calculate_from_gross(dec!(20000000), 0, dec!(557550)).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(8442450));
//! assert_eq!(result.total_tax, dec!(594245));
//! assert_eq!(result.breakdown.len(), 2);
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::calculations::common::max;
use crate::{BracketError, TaxBracket};

/// Errors that can occur building or running a [`ProgressiveTaxCalculator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressiveTaxError {
    #[error("personal deduction must be non-negative, got {0}")]
    NegativePersonalDeduction(Decimal),

    #[error("dependent deduction must be non-negative, got {0}")]
    NegativeDependentDeduction(Decimal),

    #[error("invalid tax bracket: {0}")]
    InvalidBracket(#[from] BracketError),

    #[error("no tax brackets provided")]
    NoTaxBrackets,

    /// Adjacent brackets leave a gap or overlap.
    #[error("tax brackets must be contiguous: bracket ending at {to:?} is followed by one starting at {next_from}")]
    NonContiguous {
        to: Option<Decimal>,
        next_from: Decimal,
    },

    /// The highest bracket must be unbounded so every income is covered.
    #[error("the highest tax bracket must be unbounded, but it ends at {0}")]
    BoundedTopBracket(Decimal),

    #[error("insurance contribution must be non-negative, got {0}")]
    NegativeInsuranceContribution(Decimal),

    #[error("gross salary must be non-negative, got {0}")]
    NegativeGrossSalary(Decimal),

    #[error("taxable income must be non-negative, got {0}")]
    NegativeTaxableIncome(Decimal),

    /// An intermediate amount does not fit in a [`Decimal`].
    #[error("tax amount overflowed for {0}")]
    AmountOverflow(Decimal),
}

/// Portion of taxable income that fell into one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketBreakdown<'a> {
    pub bracket: &'a TaxBracket,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
}

/// Total tax and per-bracket allocation for one taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressiveTaxResult<'a> {
    pub total_tax: Decimal,
    /// One entry per visited bracket, in ascending order.
    pub breakdown: Vec<BracketBreakdown<'a>>,
}

/// [`ProgressiveTaxResult`] together with the taxable income it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrossTaxResult<'a> {
    pub taxable_income: Decimal,
    pub total_tax: Decimal,
    pub breakdown: Vec<BracketBreakdown<'a>>,
}

/// Deduction amounts that apply to one taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deductions {
    pub personal: Decimal,
    pub per_dependent: Decimal,
    /// `per_dependent` times the taxpayer's dependent count.
    pub total_dependents: Decimal,
}

/// Calculator for progressive tax over a validated bracket table.
///
/// The brackets are borrowed from the regime that defines them; results
/// reference the same bracket instances.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxCalculator<'a> {
    personal_deduction: Decimal,
    dependent_deduction: Decimal,
    brackets: Vec<&'a TaxBracket>,
}

impl<'a> ProgressiveTaxCalculator<'a> {
    /// Creates a calculator, sorting the brackets by lower bound.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressiveTaxError`] if:
    /// - either deduction is negative
    /// - no brackets were provided
    /// - any two neighbouring brackets are not contiguous
    /// - the highest bracket is bounded
    pub fn new(
        personal_deduction: Decimal,
        dependent_deduction: Decimal,
        brackets: &'a [TaxBracket],
    ) -> Result<Self, ProgressiveTaxError> {
        if personal_deduction < Decimal::ZERO {
            return Err(ProgressiveTaxError::NegativePersonalDeduction(
                personal_deduction,
            ));
        }
        if dependent_deduction < Decimal::ZERO {
            return Err(ProgressiveTaxError::NegativeDependentDeduction(
                dependent_deduction,
            ));
        }

        let mut sorted: Vec<&'a TaxBracket> = brackets.iter().collect();
        sorted.sort_by_key(|bracket| bracket.from());
        validate_table(&sorted)?;

        Ok(Self {
            personal_deduction,
            dependent_deduction,
            brackets: sorted,
        })
    }

    pub fn personal_deduction(&self) -> Decimal {
        self.personal_deduction
    }

    pub fn dependent_deduction(&self) -> Decimal {
        self.dependent_deduction
    }

    /// Brackets in ascending order of lower bound.
    pub fn brackets(&self) -> &[&'a TaxBracket] {
        &self.brackets
    }

    /// The bracket that contains `income`, if any.
    pub fn bracket_for_income(
        &self,
        income: Decimal,
    ) -> Option<&'a TaxBracket> {
        self.brackets
            .iter()
            .copied()
            .find(|bracket| bracket.contains(income))
    }

    /// Deduction amounts for a taxpayer with `dependents` dependents.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressiveTaxError::AmountOverflow`] if the dependent total
    /// does not fit in a [`Decimal`].
    pub fn deductions(
        &self,
        dependents: u32,
    ) -> Result<Deductions, ProgressiveTaxError> {
        let total_dependents = Decimal::from(dependents)
            .checked_mul(self.dependent_deduction)
            .ok_or(ProgressiveTaxError::AmountOverflow(self.dependent_deduction))?;

        Ok(Deductions {
            personal: self.personal_deduction,
            per_dependent: self.dependent_deduction,
            total_dependents,
        })
    }

    /// Personal deduction plus dependent deductions plus the insurance
    /// contribution.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressiveTaxError::NegativeInsuranceContribution`] if the
    /// contribution is negative, or [`ProgressiveTaxError::AmountOverflow`]
    /// if the sum does not fit in a [`Decimal`].
    pub fn total_deductions(
        &self,
        dependents: u32,
        insurance_contribution: Decimal,
    ) -> Result<Decimal, ProgressiveTaxError> {
        if insurance_contribution < Decimal::ZERO {
            return Err(ProgressiveTaxError::NegativeInsuranceContribution(
                insurance_contribution,
            ));
        }
        let deductions = self.deductions(dependents)?;
        deductions
            .personal
            .checked_add(deductions.total_dependents)
            .and_then(|total| total.checked_add(insurance_contribution))
            .ok_or(ProgressiveTaxError::AmountOverflow(insurance_contribution))
    }

    /// Gross salary minus all deductions, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressiveTaxError`] if `gross_salary` or
    /// `insurance_contribution` is negative.
    pub fn taxable_income(
        &self,
        gross_salary: Decimal,
        dependents: u32,
        insurance_contribution: Decimal,
    ) -> Result<Decimal, ProgressiveTaxError> {
        if gross_salary < Decimal::ZERO {
            return Err(ProgressiveTaxError::NegativeGrossSalary(gross_salary));
        }
        let total_deductions = self.total_deductions(dependents, insurance_contribution)?;
        Ok(max(gross_salary - total_deductions, Decimal::ZERO))
    }

    /// Allocates `taxable_income` across the brackets and sums the tax.
    ///
    /// Brackets are visited in ascending order and the walk stops as soon as
    /// the whole income has been allocated. Each bracket's tax is rounded
    /// before it is added to the total.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressiveTaxError::NegativeTaxableIncome`] if the input is
    /// negative.
    pub fn progressive_tax(
        &self,
        taxable_income: Decimal,
    ) -> Result<ProgressiveTaxResult<'a>, ProgressiveTaxError> {
        if taxable_income < Decimal::ZERO {
            return Err(ProgressiveTaxError::NegativeTaxableIncome(taxable_income));
        }

        let mut remaining = taxable_income;
        let mut total_tax = Decimal::ZERO;
        let mut breakdown = Vec::new();

        for &bracket in &self.brackets {
            if remaining <= Decimal::ZERO {
                break;
            }

            let taxable_amount = match bracket.size() {
                Some(size) => remaining.min(size),
                None => remaining,
            };
            let tax_amount = bracket
                .tax_for(taxable_amount)
                .ok_or(ProgressiveTaxError::AmountOverflow(taxable_amount))?;

            breakdown.push(BracketBreakdown {
                bracket,
                taxable_amount,
                tax_amount,
            });

            total_tax = total_tax
                .checked_add(tax_amount)
                .ok_or(ProgressiveTaxError::AmountOverflow(taxable_income))?;
            remaining -= taxable_amount;
        }

        Ok(ProgressiveTaxResult {
            total_tax,
            breakdown,
        })
    }

    /// Computes taxable income for a gross salary and the tax owed on it.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of [`Self::taxable_income`].
    pub fn calculate_from_gross(
        &self,
        gross_salary: Decimal,
        dependents: u32,
        insurance_contribution: Decimal,
    ) -> Result<GrossTaxResult<'a>, ProgressiveTaxError> {
        let taxable_income =
            self.taxable_income(gross_salary, dependents, insurance_contribution)?;
        let ProgressiveTaxResult {
            total_tax,
            breakdown,
        } = self.progressive_tax(taxable_income)?;

        Ok(GrossTaxResult {
            taxable_income,
            total_tax,
            breakdown,
        })
    }
}

/// Checks that sorted brackets tile `[first.from, ∞)` without gaps.
fn validate_table(sorted: &[&TaxBracket]) -> Result<(), ProgressiveTaxError> {
    let Some(last) = sorted.last() else {
        return Err(ProgressiveTaxError::NoTaxBrackets);
    };

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.to() != Some(next.from()) {
            return Err(ProgressiveTaxError::NonContiguous {
                to: current.to(),
                next_from: next.from(),
            });
        }
    }

    match last.to() {
        Some(to) => Err(ProgressiveTaxError::BoundedTopBracket(to)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        from: Decimal,
        to: Option<Decimal>,
        rate: Decimal,
    ) -> TaxBracket {
        TaxBracket::new(from, to, rate).unwrap()
    }

    fn test_brackets() -> Vec<TaxBracket> {
        vec![
            bracket(dec!(0), Some(dec!(5000000)), dec!(5)),
            bracket(dec!(5000000), Some(dec!(10000000)), dec!(10)),
            bracket(dec!(10000000), Some(dec!(18000000)), dec!(15)),
            bracket(dec!(18000000), None, dec!(20)),
        ]
    }

    fn calculator(brackets: &[TaxBracket]) -> ProgressiveTaxCalculator<'_> {
        ProgressiveTaxCalculator::new(dec!(11000000), dec!(4400000), brackets).unwrap()
    }

    // =========================================================================
    // construction tests
    // =========================================================================

    #[test]
    fn new_rejects_negative_personal_deduction() {
        let brackets = test_brackets();

        let result = ProgressiveTaxCalculator::new(dec!(-1), dec!(0), &brackets);

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::NegativePersonalDeduction(dec!(-1))
        );
    }

    #[test]
    fn new_rejects_negative_dependent_deduction() {
        let brackets = test_brackets();

        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(-1), &brackets);

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::NegativeDependentDeduction(dec!(-1))
        );
    }

    #[test]
    fn new_rejects_empty_table() {
        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &[]);

        assert_eq!(result.unwrap_err(), ProgressiveTaxError::NoTaxBrackets);
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let brackets = vec![
            bracket(dec!(0), Some(dec!(5000000)), dec!(5)),
            bracket(dec!(6000000), None, dec!(10)),
        ];

        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets);

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::NonContiguous {
                to: Some(dec!(5000000)),
                next_from: dec!(6000000),
            }
        );
    }

    #[test]
    fn new_rejects_overlapping_brackets() {
        let brackets = vec![
            bracket(dec!(0), Some(dec!(5000000)), dec!(5)),
            bracket(dec!(4000000), None, dec!(10)),
        ];

        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets);

        assert!(matches!(
            result.unwrap_err(),
            ProgressiveTaxError::NonContiguous { .. }
        ));
    }

    #[test]
    fn new_rejects_unbounded_bracket_before_the_last() {
        let brackets = vec![
            bracket(dec!(0), None, dec!(5)),
            bracket(dec!(5000000), None, dec!(10)),
        ];

        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets);

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::NonContiguous {
                to: None,
                next_from: dec!(5000000),
            }
        );
    }

    #[test]
    fn new_rejects_bounded_top_bracket() {
        let brackets = vec![bracket(dec!(0), Some(dec!(5000000)), dec!(5))];

        let result = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets);

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::BoundedTopBracket(dec!(5000000))
        );
    }

    #[test]
    fn new_sorts_unordered_brackets() {
        let mut brackets = test_brackets();
        brackets.reverse();

        let calculator = calculator(&brackets);

        let lower_bounds: Vec<_> = calculator.brackets().iter().map(|b| b.from()).collect();
        assert_eq!(
            lower_bounds,
            vec![dec!(0), dec!(5000000), dec!(10000000), dec!(18000000)]
        );
    }

    // =========================================================================
    // deductions tests
    // =========================================================================

    #[test]
    fn total_deductions_adds_all_parts() {
        let brackets = test_brackets();

        let result = calculator(&brackets).total_deductions(2, dec!(557550));

        // 11000000 + 2 * 4400000 + 557550
        assert_eq!(result, Ok(dec!(20357550)));
    }

    #[test]
    fn total_deductions_rejects_negative_contribution() {
        let brackets = test_brackets();

        let result = calculator(&brackets).total_deductions(0, dec!(-1));

        assert_eq!(
            result,
            Err(ProgressiveTaxError::NegativeInsuranceContribution(dec!(-1)))
        );
    }

    #[test]
    fn deductions_summarises_dependents() {
        let brackets = test_brackets();

        let deductions = calculator(&brackets).deductions(3).unwrap();

        assert_eq!(deductions.personal, dec!(11000000));
        assert_eq!(deductions.per_dependent, dec!(4400000));
        assert_eq!(deductions.total_dependents, dec!(13200000));
    }

    #[test]
    fn deductions_overflow_is_an_error() {
        let brackets = test_brackets();
        let calculator =
            ProgressiveTaxCalculator::new(dec!(11000000), Decimal::MAX, &brackets).unwrap();

        assert_eq!(
            calculator.deductions(2),
            Err(ProgressiveTaxError::AmountOverflow(Decimal::MAX))
        );
    }

    #[test]
    fn total_deductions_overflow_is_an_error() {
        let brackets = test_brackets();
        let calculator =
            ProgressiveTaxCalculator::new(Decimal::MAX, dec!(4400000), &brackets).unwrap();

        assert_eq!(
            calculator.total_deductions(0, dec!(557550)),
            Err(ProgressiveTaxError::AmountOverflow(dec!(557550)))
        );
    }

    // =========================================================================
    // taxable_income tests
    // =========================================================================

    #[test]
    fn taxable_income_subtracts_deductions() {
        let brackets = test_brackets();

        let result = calculator(&brackets).taxable_income(dec!(20000000), 0, dec!(557550));

        assert_eq!(result, Ok(dec!(8442450)));
    }

    #[test]
    fn taxable_income_is_floored_at_zero() {
        let brackets = test_brackets();

        let result = calculator(&brackets).taxable_income(dec!(10000000), 1, dec!(557550));

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn taxable_income_rejects_negative_gross() {
        let brackets = test_brackets();

        let result = calculator(&brackets).taxable_income(dec!(-5), 0, dec!(0));

        assert_eq!(result, Err(ProgressiveTaxError::NegativeGrossSalary(dec!(-5))));
    }

    // =========================================================================
    // progressive_tax tests
    // =========================================================================

    #[test]
    fn progressive_tax_zero_income_has_empty_breakdown() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(dec!(0)).unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn progressive_tax_rejects_negative_income() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(dec!(-1));

        assert_eq!(
            result.unwrap_err(),
            ProgressiveTaxError::NegativeTaxableIncome(dec!(-1))
        );
    }

    #[test]
    fn progressive_tax_within_first_bracket() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(dec!(3000000)).unwrap();

        assert_eq!(result.total_tax, dec!(150000));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].bracket, &brackets[0]);
        assert_eq!(result.breakdown[0].taxable_amount, dec!(3000000));
    }

    #[test]
    fn progressive_tax_stops_at_exact_boundary() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(dec!(5000000)).unwrap();

        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.total_tax, dec!(250000));
    }

    #[test]
    fn progressive_tax_spans_brackets() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(dec!(8442450)).unwrap();

        assert_eq!(result.total_tax, dec!(594245));
        assert_eq!(
            result.breakdown,
            vec![
                BracketBreakdown {
                    bracket: &brackets[0],
                    taxable_amount: dec!(5000000),
                    tax_amount: dec!(250000),
                },
                BracketBreakdown {
                    bracket: &brackets[1],
                    taxable_amount: dec!(3442450),
                    tax_amount: dec!(344245),
                },
            ]
        );
    }

    #[test]
    fn progressive_tax_rounds_each_bracket() {
        let brackets = vec![
            bracket(dec!(0), Some(dec!(3)), dec!(50)),
            bracket(dec!(3), None, dec!(50)),
        ];
        let calculator = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets).unwrap();

        let result = calculator.progressive_tax(dec!(6)).unwrap();

        // round(1.5) + round(1.5) = 4, whereas round(3.0) would be 3
        assert_eq!(result.total_tax, dec!(4));
    }

    #[test]
    fn progressive_tax_fills_unbounded_top_bracket() {
        let brackets = test_brackets();

        let result = calculator(&brackets)
            .progressive_tax(dec!(1000000000000))
            .unwrap();

        assert_eq!(result.breakdown.len(), 4);
        let last = result.breakdown.last().unwrap();
        assert!(last.bracket.is_unbounded());
        assert_eq!(last.taxable_amount, dec!(999982000000));
    }

    #[test]
    fn progressive_tax_of_largest_income_fits() {
        let brackets = test_brackets();

        let result = calculator(&brackets).progressive_tax(Decimal::MAX).unwrap();

        assert!(result.total_tax > Decimal::ZERO);
        assert!(result.total_tax < Decimal::MAX);
    }

    // =========================================================================
    // lookup tests
    // =========================================================================

    #[test]
    fn bracket_for_income_finds_containing_bracket() {
        let brackets = test_brackets();
        let calculator = calculator(&brackets);

        assert_eq!(calculator.bracket_for_income(dec!(0)), Some(&brackets[0]));
        assert_eq!(
            calculator.bracket_for_income(dec!(10000000)),
            Some(&brackets[2])
        );
        assert_eq!(
            calculator.bracket_for_income(dec!(99000000)),
            Some(&brackets[3])
        );
    }

    #[test]
    fn bracket_for_income_below_table_is_none() {
        let brackets = vec![bracket(dec!(100), None, dec!(5))];
        let calculator = ProgressiveTaxCalculator::new(dec!(0), dec!(0), &brackets).unwrap();

        assert_eq!(calculator.bracket_for_income(dec!(50)), None);
    }

    // =========================================================================
    // calculate_from_gross tests
    // =========================================================================

    #[test]
    fn calculate_from_gross_reports_taxable_income() {
        let brackets = test_brackets();

        let result = calculator(&brackets)
            .calculate_from_gross(dec!(20000000), 0, dec!(557550))
            .unwrap();

        assert_eq!(result.taxable_income, dec!(8442450));
        assert_eq!(result.total_tax, dec!(594245));
        assert_eq!(result.breakdown.len(), 2);
    }
}
