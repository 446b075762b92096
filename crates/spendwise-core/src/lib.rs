//! Spendwise Core Library
//!
//! Shared functionality for the Spendwise spending analytics service:
//! - Statistical anomaly detection over transaction batches
//! - Next-month spend forecasting with trend and category split
//! - Month-to-date insights (savings rate, top category, overspending)
//! - Rule-based category classification (keyword and bank-statement aware)
//! - JSON/CSV batch import
//! - Layered TOML configuration

pub mod anomaly;
pub mod categorize;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod insights;
pub mod models;
pub mod stats;

pub use anomaly::{AnomalyDetector, AnomalyOutcome, AnomalyReport, AnomalyResult};
pub use categorize::{KeywordClassifier, StatementClassifier, StatementLine, UpiDirection};
pub use config::{AnalyticsConfig, AnomalyConfig, DisplayConfig, ForecastConfig};
pub use error::{Error, Result};
pub use forecast::{ChartPoint, ForecastOutcome, ForecastReport, PointKind, SpendForecaster, Trend};
pub use import::{load_transactions, ImportFormat};
pub use insights::{monthly_insights, Insight, InsightLevel, InsightsReport};
pub use models::{Transaction, TransactionKind, DEFAULT_CATEGORY};
