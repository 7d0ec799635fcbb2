//! qsql command-line front end.

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("qsql={default_level},qsql_cli={default_level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => commands::render(&args, settings),
        Commands::Check { template } => commands::check(&template, settings),
    }
}
