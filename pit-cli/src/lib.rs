pub mod cli;
pub mod logging;
pub mod report;

use anyhow::{Context, Result};
use pit_core::calculations::compare;
use tracing::{debug, info};

use crate::cli::{Cli, select};

/// Runs one comparison for the parsed command line and returns the rendered
/// report.
pub fn run(cli: &Cli) -> Result<String> {
    let request = cli.request()?;
    let regimes = cli.regime_constants()?;
    let baseline = select(&regimes, &cli.baseline)?;
    let candidate = select(&regimes, &cli.candidate)?;

    debug!(
        baseline = %baseline.id,
        candidate = %candidate.id,
        salary = %request.salary,
        salary_type = %request.salary_type,
        dependents = request.dependents,
        "comparing regimes"
    );

    let comparison = compare(&request, baseline, candidate).context("Calculation failed")?;
    info!(
        net_delta = %comparison.difference.net_salary,
        tax_delta = %comparison.difference.total_tax,
        "comparison complete"
    );

    report::render(&comparison, cli.format).context("Failed to render report")
}
