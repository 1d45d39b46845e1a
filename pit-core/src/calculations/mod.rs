//! Salary and personal-income-tax calculations.
//!
//! Leaf-first: [`insurance`] and [`progressive`] are independent calculators,
//! [`taxpayer`] composes them for one person, and [`comparison`] runs a
//! request under two regimes.

pub mod common;
pub mod comparison;
pub mod insurance;
pub mod progressive;
pub mod taxpayer;

pub use comparison::{RegimeComparison, RegimeOutcome, ResultDifference, compare, compare_built_in};
pub use insurance::{InsuranceBreakdown, InsuranceCalculator, InsuranceCalculatorError, InsuranceRates};
pub use progressive::{
    BracketBreakdown, Deductions, GrossTaxResult, ProgressiveTaxCalculator, ProgressiveTaxError,
    ProgressiveTaxResult,
};
pub use taxpayer::{
    CalculationResult, MAX_SOLVER_ITERATIONS, SOLVER_TOLERANCE, Taxpayer, TaxpayerError,
};
