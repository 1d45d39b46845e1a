//! Side-by-side calculation under two regimes.
//!
//! The same request is run through a baseline and a candidate regime and the
//! headline figures are differenced as `candidate − baseline`.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::calculations::taxpayer::{CalculationResult, Taxpayer, TaxpayerError};
use crate::regimes::RegimeId;
use crate::{CalculationRequest, RegimeConstants};

/// A calculation result labelled with the regime that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeOutcome<'a> {
    pub regime_id: &'a str,
    pub regime_name: &'a str,
    pub result: CalculationResult<'a>,
}

/// Candidate minus baseline for the headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultDifference {
    pub net_salary: Decimal,
    pub total_tax: Decimal,
    pub taxable_income: Decimal,
}

impl ResultDifference {
    /// `None` if a difference does not fit in a [`Decimal`].
    pub fn between(
        baseline: &CalculationResult<'_>,
        candidate: &CalculationResult<'_>,
    ) -> Option<Self> {
        Some(Self {
            net_salary: candidate.net_salary.checked_sub(baseline.net_salary)?,
            total_tax: candidate.total_tax.checked_sub(baseline.total_tax)?,
            taxable_income: candidate
                .taxable_income
                .checked_sub(baseline.taxable_income)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeComparison<'a> {
    pub request: CalculationRequest,
    pub baseline: RegimeOutcome<'a>,
    pub candidate: RegimeOutcome<'a>,
    pub difference: ResultDifference,
}

/// Runs `request` under both regimes and differences the results.
///
/// # Errors
///
/// Returns [`TaxpayerError`] if either regime is invalid, the request
/// carries a negative salary, or an amount overflows.
pub fn compare<'a>(
    request: &CalculationRequest,
    baseline: &'a RegimeConstants,
    candidate: &'a RegimeConstants,
) -> Result<RegimeComparison<'a>, TaxpayerError> {
    let baseline = run(request, baseline)?;
    let candidate = run(request, candidate)?;
    let difference = ResultDifference::between(&baseline.result, &candidate.result)
        .ok_or(TaxpayerError::AmountOverflow(request.salary))?;

    debug!(
        baseline = baseline.regime_id,
        candidate = candidate.regime_id,
        net_delta = %difference.net_salary,
        tax_delta = %difference.total_tax,
        "regimes compared"
    );

    Ok(RegimeComparison {
        request: request.clone(),
        baseline,
        candidate,
        difference,
    })
}

/// Compares the built-in "before 2026" regime against "from 2026".
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::CalculationRequest;
/// use pit_core::calculations::compare_built_in;
///
/// let comparison = compare_built_in(&CalculationRequest::gross(dec!(20000000))).unwrap();
///
/// assert_eq!(comparison.baseline.result.net_salary, dec!(18848205));
/// assert_eq!(comparison.candidate.result.net_salary, dec!(19245327));
/// assert_eq!(comparison.difference.net_salary, dec!(397122));
/// ```
pub fn compare_built_in(
    request: &CalculationRequest
) -> Result<RegimeComparison<'static>, TaxpayerError> {
    compare(
        request,
        RegimeId::Before2026.constants(),
        RegimeId::From2026.constants(),
    )
}

fn run<'a>(
    request: &CalculationRequest,
    constants: &'a RegimeConstants,
) -> Result<RegimeOutcome<'a>, TaxpayerError> {
    let taxpayer = Taxpayer::for_regime(constants, request.dependents, request.insurance_base)?;
    let result = taxpayer.calculate(request.salary, request.salary_type)?;

    Ok(RegimeOutcome {
        regime_id: &constants.id,
        regime_name: &constants.name,
        result,
    })
}
