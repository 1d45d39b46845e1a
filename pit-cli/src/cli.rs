use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use pit_core::regimes::{BASIC_INSURANCE_BASE, RegimeId};
use pit_core::{CalculationRequest, InsuranceBase, RegimeConstants, SalaryType};
use rust_decimal::Decimal;

use crate::logging::LogConfig;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Vietnamese personal income tax calculator.
///
/// Computes insurance, taxable income, tax and net salary for one monthly
/// salary under two tax regimes and prints both results with their
/// difference.
#[derive(Debug, Parser)]
#[command(name = "pit", version, about)]
pub struct Cli {
    /// Monthly salary amount in VND.
    #[arg(long)]
    pub salary: Decimal,

    /// Whether `--salary` is the gross or the net amount.
    #[arg(long, default_value = "gross")]
    pub salary_type: SalaryType,

    /// Number of registered dependents.
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// How the social-insurance base is chosen.
    #[arg(long, value_enum, default_value_t = InsuranceKind::Basic)]
    pub insurance: InsuranceKind,

    /// Base amount for `basic`/`specific`, or percentage of gross for
    /// `percentage`. Defaults to the statutory base for `basic`.
    #[arg(long)]
    pub insurance_value: Option<Decimal>,

    /// TOML file of regime deductions and rates. Requires `--brackets`.
    #[arg(long, requires = "brackets")]
    pub regimes: Option<PathBuf>,

    /// CSV file of bracket rows keyed by regime. Requires `--regimes`.
    #[arg(long, requires = "regimes")]
    pub brackets: Option<PathBuf>,

    /// Regime the difference is measured from.
    #[arg(long, default_value = "before2026")]
    pub baseline: String,

    /// Regime compared against the baseline.
    #[arg(long, default_value = "from2026")]
    pub candidate: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write log records to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InsuranceKind {
    Basic,
    Specific,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            verbosity: self.verbose,
            file: self.log_file.clone(),
        }
    }

    /// The insurance base selected by `--insurance` and `--insurance-value`.
    pub fn insurance_base(&self) -> Result<InsuranceBase> {
        let value = match (self.insurance, self.insurance_value) {
            (InsuranceKind::Basic, None) => BASIC_INSURANCE_BASE,
            (_, Some(value)) => value,
            (kind, None) => bail!(
                "--insurance-value is required for --insurance {}",
                kind.to_possible_value()
                    .map(|v| v.get_name().to_string())
                    .unwrap_or_default()
            ),
        };

        if value < Decimal::ZERO {
            bail!("--insurance-value must be non-negative, got {value}");
        }

        Ok(match self.insurance {
            InsuranceKind::Basic => InsuranceBase::Basic(value),
            InsuranceKind::Specific => InsuranceBase::Specific(value),
            InsuranceKind::Percentage => {
                if value > Decimal::ONE_HUNDRED {
                    bail!("--insurance-value must be at most 100 for a percentage, got {value}");
                }
                InsuranceBase::Percentage(value)
            }
        })
    }

    /// Builds the calculation request from the salary arguments.
    pub fn request(&self) -> Result<CalculationRequest> {
        Ok(CalculationRequest {
            salary_type: self.salary_type,
            salary: self.salary,
            dependents: self.dependents,
            insurance_base: self.insurance_base()?,
        })
    }

    /// The constants sets available for comparison: the files given with
    /// `--regimes`/`--brackets`, or the built-in regimes.
    pub fn regime_constants(&self) -> Result<Vec<RegimeConstants>> {
        let (Some(regimes), Some(brackets)) = (&self.regimes, &self.brackets) else {
            return Ok(RegimeId::all()
                .iter()
                .map(|id| id.constants().clone())
                .collect());
        };

        let regime_toml = fs::read_to_string(regimes)
            .with_context(|| format!("Failed to read: {}", regimes.display()))?;
        let bracket_csv = fs::read_to_string(brackets)
            .with_context(|| format!("Failed to read: {}", brackets.display()))?;

        pit_data::load_regimes(&regime_toml, &bracket_csv).with_context(|| {
            format!(
                "Failed to load regimes from {} and {}",
                regimes.display(),
                brackets.display()
            )
        })
    }
}

/// Looks up a constants set by its regime code.
pub fn select<'a>(
    regimes: &'a [RegimeConstants],
    id: &str,
) -> Result<&'a RegimeConstants> {
    match regimes.iter().find(|regime| regime.id == id) {
        Some(regime) => Ok(regime),
        None => {
            let known: Vec<_> = regimes.iter().map(|regime| regime.id.as_str()).collect();
            bail!("unknown regime '{id}' (available: {})", known.join(", "))
        }
    }
}
