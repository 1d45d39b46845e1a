//! Rendering of a regime comparison for the terminal.

use std::fmt::{self, Write};

use anyhow::Result;
use pit_core::calculations::{RegimeComparison, RegimeOutcome, ResultDifference};
use rust_decimal::Decimal;

use crate::cli::OutputFormat;

const LABEL_WIDTH: usize = 24;
const AMOUNT_WIDTH: usize = 14;

/// Renders `comparison` in the requested format. JSON output is pretty-printed.
pub fn render(
    comparison: &RegimeComparison<'_>,
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(comparison)?,
        OutputFormat::Json => render_json(comparison)?,
    })
}

pub fn render_json(comparison: &RegimeComparison<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(comparison)
}

pub fn render_text(comparison: &RegimeComparison<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_comparison(&mut out, comparison)?;
    Ok(out)
}

fn write_comparison(
    out: &mut String,
    comparison: &RegimeComparison<'_>,
) -> fmt::Result {
    let request = &comparison.request;
    writeln!(
        out,
        "Salary {} ({}), {} dependent(s), insurance base: {} {}",
        format_amount(request.salary),
        request.salary_type,
        request.dependents,
        request.insurance_base.kind(),
        format_amount(request.insurance_base.value()),
    )?;
    writeln!(out)?;

    write_outcome(out, &comparison.baseline)?;
    writeln!(out)?;
    write_outcome(out, &comparison.candidate)?;
    writeln!(out)?;

    writeln!(
        out,
        "Difference ({} vs {})",
        comparison.candidate.regime_name, comparison.baseline.regime_name
    )?;
    write_difference(out, &comparison.difference)
}

fn write_outcome(
    out: &mut String,
    outcome: &RegimeOutcome<'_>,
) -> fmt::Result {
    let result = &outcome.result;
    writeln!(out, "{} ({})", outcome.regime_name, outcome.regime_id)?;
    line(out, "Gross salary", result.gross_salary)?;
    line(out, "Insurance base", result.insurance.base_amount)?;
    line(out, "Employee insurance", result.insurance.employee_contribution)?;
    line(out, "Employer insurance", result.insurance.employer_contribution)?;
    line(out, "Taxable income", result.taxable_income)?;

    if !result.tax_breakdown.is_empty() {
        writeln!(out, "  Tax by bracket")?;
        for entry in &result.tax_breakdown {
            writeln!(
                out,
                "    {:<32}{:>width$}{:>width$}",
                entry.bracket.to_string(),
                format_amount(entry.taxable_amount),
                format_amount(entry.tax_amount),
                width = AMOUNT_WIDTH,
            )?;
        }
    }

    line(out, "Personal income tax", result.total_tax)?;
    line(out, "Net salary", result.net_salary)?;
    line(out, "Employer cost", result.total_employer_cost)
}

fn write_difference(
    out: &mut String,
    difference: &ResultDifference,
) -> fmt::Result {
    signed_line(out, "Net salary", difference.net_salary)?;
    signed_line(out, "Personal income tax", difference.total_tax)?;
    signed_line(out, "Taxable income", difference.taxable_income)
}

fn line(
    out: &mut String,
    label: &str,
    amount: Decimal,
) -> fmt::Result {
    writeln!(
        out,
        "  {label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}",
        format_amount(amount)
    )
}

fn signed_line(
    out: &mut String,
    label: &str,
    amount: Decimal,
) -> fmt::Result {
    writeln!(
        out,
        "  {label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}",
        format_signed(amount)
    )
}

/// Formats an amount with `,` thousands separators, e.g. `18,848,205`.
///
/// Fractional digits, if any, are kept as they are.
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.normalize().abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 1);
    if amount.is_sign_negative() && !amount.is_zero() {
        grouped.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Like [`format_amount`], with an explicit `+` on positive amounts.
pub fn format_signed(amount: Decimal) -> String {
    if amount > Decimal::ZERO {
        format!("+{}", format_amount(amount))
    } else {
        format_amount(amount)
    }
}

#[cfg(test)]
mod tests {
    use pit_core::CalculationRequest;
    use pit_core::calculations::compare_built_in;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // format_amount tests
    // =========================================================================

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(18848205)), "18,848,205");
        assert_eq!(format_amount(dec!(100000000)), "100,000,000");
    }

    #[test]
    fn keeps_sign_and_fraction() {
        assert_eq!(format_amount(dec!(-4500000)), "-4,500,000");
        assert_eq!(format_amount(dec!(1234.50)), "1,234.5");
    }

    #[test]
    fn signed_marks_positive_amounts() {
        assert_eq!(format_signed(dec!(397122)), "+397,122");
        assert_eq!(format_signed(dec!(-397122)), "-397,122");
        assert_eq!(format_signed(dec!(0)), "0");
    }

    // =========================================================================
    // render tests
    // =========================================================================

    #[test]
    fn render_text_lists_both_regimes_and_difference() {
        let comparison = compare_built_in(&CalculationRequest::gross(dec!(20000000))).unwrap();

        let text = render_text(&comparison).unwrap();

        let headings: Vec<_> = text
            .lines()
            .filter(|line| !line.starts_with(' ') && !line.is_empty())
            .skip(1)
            .collect();
        assert_eq!(
            headings,
            vec![
                "Before 2026 (before2026)",
                "From 2026 (from2026)",
                "Difference (From 2026 vs Before 2026)",
            ]
        );
        assert!(text.contains("  Net salary                    +397,122"));
    }

    #[test]
    fn render_matches_format() {
        let comparison = compare_built_in(&CalculationRequest::gross(dec!(20000000))).unwrap();

        let text = render(&comparison, OutputFormat::Text).unwrap();
        let json = render(&comparison, OutputFormat::Json).unwrap();

        assert_eq!(text, render_text(&comparison).unwrap());
        assert!(json.trim_start().starts_with('{'));
    }
}
