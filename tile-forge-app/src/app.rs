// tile-forge-app/src/app.rs

use crate::config::AppConfig;
use crate::logging;
use crate::setup::execution::{load_rules, run_batch, run_single};
use anyhow::Result;
use clap::Parser;

/// Parses the command line and runs the application.
pub fn main() -> Result<()> {
    run(AppConfig::parse())
}

/// Runs the application with an already parsed command line.
pub fn run(config: AppConfig) -> Result<()> {
    logging::init_logger(&config);

    log::info!("Tile Forge App Starting");
    log::debug!("Command line: {:?}", config);

    let settings = config.resolve()?;
    log::debug!("Resolved settings: {:?}", settings);

    let rules = load_rules(&settings)?;

    if settings.batch > 1 {
        run_batch(&settings, &rules)?;
    } else {
        run_single(&settings, &rules, config.report_progress_interval)?;
    }

    log::info!("Tile Forge App Finished.");
    Ok(())
}
