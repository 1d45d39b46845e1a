use clap::Parser;

use pit_cli::cli::Cli;
use pit_cli::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config())?;

    let report = pit_cli::run(&cli)?;
    print!("{report}");
    if !report.ends_with('\n') {
        println!();
    }

    Ok(())
}
