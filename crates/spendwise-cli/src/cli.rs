//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendwise - Spot unusual spending and see where the month is heading
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Personal finance anomaly detection and spend forecasting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analytics config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print raw JSON instead of a formatted summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flag statistically unusual transactions
    Anomalies {
        /// Transaction batch (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Fill in missing categories from descriptions before analyzing
        #[arg(long)]
        classify: bool,
    },

    /// Project next month's spending
    Forecast {
        /// Transaction batch (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Fill in missing categories from descriptions before analyzing
        #[arg(long)]
        classify: bool,

        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Summarize the current month
    Insights {
        /// Transaction batch (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Assign categories to free-text descriptions
    Categorize {
        /// Use the bank-statement classifier (UPI handles, merchant names)
        #[arg(long)]
        statement: bool,

        /// Classify as incoming money (statement mode only)
        #[arg(long, requires = "statement")]
        income: bool,

        /// Descriptions to classify
        #[arg(required = true)]
        descriptions: Vec<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allowed-origin")]
        allowed_origins: Vec<String>,
    },

    /// Inspect the analytics configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show where the override config file is read from
    Path,
    /// Print the effective configuration
    Show,
}
