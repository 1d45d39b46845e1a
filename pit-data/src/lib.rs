//! File-backed regime constants.
//!
//! Deductions and insurance rates live in a TOML file, bracket tables in a CSV
//! file keyed by regime code. [`load_regimes`] joins and validates the two.

mod error;
mod loader;
mod regime_file;

use std::collections::HashSet;

use pit_core::{InsuranceBase, RegimeConstants, Taxpayer};
use tracing::debug;

pub use error::RegimeLoadError;
pub use loader::{BracketRecord, BracketTableLoader};
pub use regime_file::{RegimeEntry, RegimeFile};

/// Regime definitions shipped with the crate, matching the built-in constants.
pub const SHIPPED_REGIMES_TOML: &str = include_str!("../data/regimes.toml");
pub const SHIPPED_BRACKETS_CSV: &str = include_str!("../data/brackets.csv");

/// Builds validated constants sets from a regime TOML document and a bracket
/// CSV document.
///
/// Regimes are returned in the order the TOML file declares them.
///
/// # Errors
///
/// Fails if either document is malformed, a regime is declared twice, a
/// regime has no brackets, brackets name an undeclared regime, or a joined
/// set does not form a valid tax table.
pub fn load_regimes(
    regime_toml: &str,
    bracket_csv: &str,
) -> Result<Vec<RegimeConstants>, RegimeLoadError> {
    let file = RegimeFile::parse(regime_toml)?;
    let records = BracketTableLoader::parse(bracket_csv.as_bytes())?;
    let mut groups = BracketTableLoader::group(&records)?;

    let mut seen = HashSet::new();
    let mut regimes = Vec::with_capacity(file.regimes.len());

    for entry in file.regimes {
        if !seen.insert(entry.id.clone()) {
            return Err(RegimeLoadError::DuplicateRegime(entry.id));
        }
        let Some(brackets) = groups.remove(&entry.id) else {
            return Err(RegimeLoadError::MissingBrackets(entry.id));
        };

        let constants = RegimeConstants {
            id: entry.id,
            name: entry.name,
            personal_deduction: entry.personal_deduction,
            dependent_deduction: entry.dependent_deduction,
            employee_insurance_rate: entry.employee_insurance_rate,
            employer_insurance_rate: entry.employer_insurance_rate,
            brackets,
        };
        validate(&constants)?;

        debug!(
            regime = %constants.id,
            brackets = constants.brackets.len(),
            "regime loaded"
        );
        regimes.push(constants);
    }

    if let Some(unknown) = groups.into_keys().next() {
        return Err(RegimeLoadError::UnknownRegime(unknown));
    }

    Ok(regimes)
}

/// Loads the regime files shipped in `data/`.
pub fn load_shipped_regimes() -> Result<Vec<RegimeConstants>, RegimeLoadError> {
    load_regimes(SHIPPED_REGIMES_TOML, SHIPPED_BRACKETS_CSV)
}

fn validate(constants: &RegimeConstants) -> Result<(), RegimeLoadError> {
    Taxpayer::for_regime(constants, 0, InsuranceBase::basic())
        .map(|_| ())
        .map_err(|source| RegimeLoadError::InvalidRegime {
            regime: constants.id.clone(),
            source,
        })
}
