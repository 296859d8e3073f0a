//! Maestro CLI entry point.

use anyhow::Context;
use clap::Parser;

use maestro::cli::{commands, Cli, Commands};
use maestro::infrastructure::logging::{LogConfig, LoggerImpl};
use maestro::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration");
    let config = match config {
        Ok(config) => config,
        Err(err) => maestro::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => maestro::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Capabilities(args) => commands::capabilities::execute(args, &config, cli.json).await,
        Commands::Prompt(args) => commands::prompt::execute(args, &config, cli.json).await,
        Commands::Spawn(args) => commands::spawn::execute(args, &config, cli.json).await,
        Commands::Workflow(args) => commands::workflow::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        maestro::cli::handle_error(err, cli.json);
    }
}
