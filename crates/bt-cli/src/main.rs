use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{LoadedLog, blockers, events, periods, steps, summary};
use bt_cli::{Cli, Commands, Config, LogArgs};

/// Load config, then read and parse the log named in `args`.
fn load(config_path: Option<&Path>, args: &LogArgs) -> Result<LoadedLog> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    LoadedLog::load(args, &config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Diagnostics go to stderr so JSON output stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Summary { log }) => {
            summary::run(&mut stdout, &load(config_path, log)?)?;
        }
        Some(Commands::Events { log, json }) => {
            events::run(&mut stdout, &load(config_path, log)?, *json)?;
        }
        Some(Commands::Periods { log, json }) => {
            periods::run(&mut stdout, &load(config_path, log)?, *json)?;
        }
        Some(Commands::Blockers { log }) => {
            blockers::run(&mut stdout, &load(config_path, log)?)?;
        }
        Some(Commands::Steps { log }) => {
            steps::run(&mut stdout, &load(config_path, log)?)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
