//! Config commands and loading

use std::path::Path;

use anyhow::{Context, Result};

use spendwise_core::config::default_config_path;
use spendwise_core::AnalyticsConfig;

/// Load the analytics config from --config, the override file, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    AnalyticsConfig::load(path).context("Failed to load analytics config")
}

pub fn cmd_config_path() -> Result<()> {
    match default_config_path() {
        Some(path) => {
            let state = if path.exists() { "present" } else { "not present" };
            println!("{} ({})", path.display(), state);
        }
        None => println!("No data directory available on this platform"),
    }
    Ok(())
}

pub fn cmd_config_show(config: &AnalyticsConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
