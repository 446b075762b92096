//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Anomaly, forecast and insights commands over a batch file
//! - `categorize` - Description classification
//! - `config` - Config path/show commands and config loading
//! - `serve` - Web server command

pub mod analyze;
pub mod categorize;
pub mod config;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use categorize::*;
pub use config::*;
pub use serve::*;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse an --as-of date, defaulting to today
pub fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --as-of date format (use YYYY-MM-DD)"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Pretty-print any report as JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
