//! Analytics configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/spendwise/config/analytics.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Every key is optional; anything missing keeps its built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Thresholds for the anomaly detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyConfig {
    pub min_transactions: usize,
    pub z_threshold: f64,
    pub min_category_size: usize,
    pub max_results: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_transactions: 5,
            z_threshold: 2.0,
            min_category_size: 3,
            max_results: 10,
        }
    }
}

/// Windows and multipliers for the spend forecaster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastConfig {
    pub min_transactions: usize,
    pub trend_window_days: usize,
    pub trend_min_points: usize,
    pub trend_threshold_percent: f64,
    pub chart_months: usize,
    pub days_per_week: u32,
    pub days_per_month: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_transactions: 7,
            trend_window_days: 15,
            trend_min_points: 30,
            trend_threshold_percent: 10.0,
            chart_months: 6,
            days_per_week: 7,
            days_per_month: 30,
        }
    }
}

/// Presentation settings for human-readable messages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Complete analytics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsConfig {
    pub anomaly: AnomalyConfig,
    pub forecast: ForecastConfig,
    pub display: DisplayConfig,
}

impl AnalyticsConfig {
    /// Load from an explicit path, the data-dir override, or embedded defaults
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                // An explicit path must exist; a missing default override is fine
                fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// Parse TOML content layered over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(anomaly) = raw.anomaly {
            let a = &mut config.anomaly;
            a.min_transactions = anomaly.min_transactions.unwrap_or(a.min_transactions);
            a.z_threshold = anomaly.z_threshold.unwrap_or(a.z_threshold);
            a.min_category_size = anomaly.min_category_size.unwrap_or(a.min_category_size);
            a.max_results = anomaly.max_results.unwrap_or(a.max_results);
        }

        if let Some(forecast) = raw.forecast {
            let f = &mut config.forecast;
            f.min_transactions = forecast.min_transactions.unwrap_or(f.min_transactions);
            f.trend_window_days = forecast.trend_window_days.unwrap_or(f.trend_window_days);
            f.trend_min_points = forecast.trend_min_points.unwrap_or(f.trend_min_points);
            f.trend_threshold_percent = forecast
                .trend_threshold_percent
                .unwrap_or(f.trend_threshold_percent);
            f.chart_months = forecast.chart_months.unwrap_or(f.chart_months);
            f.days_per_week = forecast.days_per_week.unwrap_or(f.days_per_week);
            f.days_per_month = forecast.days_per_month.unwrap_or(f.days_per_month);
        }

        if let Some(display) = raw.display {
            if let Some(symbol) = display.currency_symbol {
                config.display.currency_symbol = symbol;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the analyzers cannot work with
    pub fn validate(&self) -> Result<()> {
        let a = &self.anomaly;
        if !(a.z_threshold.is_finite() && a.z_threshold > 0.0) {
            return Err(Error::Config(format!(
                "anomaly.z_threshold must be a positive number, got {}",
                a.z_threshold
            )));
        }
        if a.min_transactions == 0 || a.min_category_size == 0 || a.max_results == 0 {
            return Err(Error::Config(
                "anomaly.min_transactions, min_category_size and max_results must be at least 1"
                    .into(),
            ));
        }

        let f = &self.forecast;
        if f.min_transactions == 0 || f.trend_window_days == 0 || f.chart_months == 0 {
            return Err(Error::Config(
                "forecast.min_transactions, trend_window_days and chart_months must be at least 1"
                    .into(),
            ));
        }
        if f.trend_min_points < 2 * f.trend_window_days {
            return Err(Error::Config(format!(
                "forecast.trend_min_points ({}) must cover two trend windows of {} days",
                f.trend_min_points, f.trend_window_days
            )));
        }
        if !(f.trend_threshold_percent.is_finite() && f.trend_threshold_percent >= 0.0) {
            return Err(Error::Config(format!(
                "forecast.trend_threshold_percent must be non-negative, got {}",
                f.trend_threshold_percent
            )));
        }
        if f.days_per_week == 0 || f.days_per_month == 0 {
            return Err(Error::Config(
                "forecast.days_per_week and days_per_month must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config").join("analytics.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    anomaly: Option<RawAnomaly>,
    forecast: Option<RawForecast>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    min_transactions: Option<usize>,
    z_threshold: Option<f64>,
    min_category_size: Option<usize>,
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    min_transactions: Option<usize>,
    trend_window_days: Option<usize>,
    trend_min_points: Option<usize>,
    trend_threshold_percent: Option<f64>,
    chart_months: Option<usize>,
    days_per_week: Option<u32>,
    days_per_month: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency_symbol: Option<String>,
}
