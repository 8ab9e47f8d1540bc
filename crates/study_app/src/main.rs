mod cli;
mod commands;
mod config;
mod effects;
mod session;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use study_logging::LogDestination;

use crate::cli::Cli;
use crate::config::ClientConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let workdir = std::env::current_dir().context("cannot determine working directory")?;

    let mut config = ClientConfig::load(&workdir)?.with_env(|key| std::env::var(key).ok());
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let destination = if config.log_to_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    study_logging::initialize(destination, level);

    commands::run(cli.command, &config, &workdir)
}
