//! Spendwise CLI - Personal finance analytics
//!
//! Usage:
//!   spendwise anomalies --file batch.json    Flag unusual transactions
//!   spendwise forecast --file batch.csv      Project next month's spending
//!   spendwise insights --file batch.csv      Summarize the current month
//!   spendwise categorize "Zomato order"      Classify descriptions
//!   spendwise serve --port 8000              Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // `config path` works even when the config file itself is broken
    if let Commands::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        return commands::cmd_config_path();
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Anomalies { file, classify } => {
            commands::cmd_anomalies(&config, &file, classify, cli.json)
        }
        Commands::Forecast {
            file,
            classify,
            as_of,
        } => {
            let today = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_forecast(&config, &file, classify, today, cli.json)
        }
        Commands::Insights { file, as_of } => {
            let today = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_insights(&config, &file, today, cli.json)
        }
        Commands::Categorize {
            statement,
            income,
            descriptions,
        } => commands::cmd_categorize(&descriptions, statement, income, cli.json),
        Commands::Serve {
            port,
            host,
            allowed_origins,
        } => commands::cmd_serve(config, &host, port, allowed_origins).await,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::cmd_config_path(),
            ConfigAction::Show => commands::cmd_config_show(&config),
        },
    }
}
