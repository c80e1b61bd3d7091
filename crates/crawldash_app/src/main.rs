mod app;
mod cli;
mod config;
mod persistence;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = AppConfig::load(cli.config.as_deref(), &cwd, cli.overrides())?;

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    crawldash_logging::initialize(config.log, level);

    app::run(&config, &cwd, cli.command).await
}
