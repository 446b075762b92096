//! Spend forecasting
//!
//! Closed-form projection of next month's spending:
//! - daily totals averaged over the days that have transactions
//! - flat weekly/monthly extrapolation of that average
//! - trend from the latest window of daily totals vs the window before it
//! - category split of the monthly estimate by historical share
//! - monthly chart series with one forecast point for next calendar month

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::{DisplayConfig, ForecastConfig};
use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::stats::{mean, round_to};

/// Direction of recent spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Batch too small to forecast at all
    InsufficientData,
    Increasing,
    Decreasing,
    Stable,
    /// Forecast failed
    Error,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::InsufficientData => "insufficient_data",
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::Error => "error",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a chart point is observed or projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Actual,
    Forecast,
}

/// One month in the chart series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Year-month label, e.g. "2024-03"
    #[serde(rename = "month")]
    pub period: String,
    #[serde(rename = "actual")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: PointKind,
}

/// Forecast statistics for a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub next_month_estimate: f64,
    pub daily_average: f64,
    pub weekly_average: f64,
    pub trend: Trend,
    pub trend_percentage: f64,
    pub message: String,
    /// Monthly estimate split by historical category share
    pub category_forecasts: BTreeMap<String, f64>,
    /// Actual months in chronological order, then one forecast point
    pub chart_data: Vec<ChartPoint>,
}

impl ForecastReport {
    fn insufficient(required: usize) -> Self {
        Self {
            next_month_estimate: 0.0,
            daily_average: 0.0,
            weekly_average: 0.0,
            trend: Trend::InsufficientData,
            trend_percentage: 0.0,
            message: format!(
                "Need at least {} transactions for forecasting",
                required
            ),
            category_forecasts: BTreeMap::new(),
            chart_data: Vec::new(),
        }
    }
}

/// Everything `SpendForecaster::forecast` can return
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Complete(ForecastReport),
    /// Zeroed report with `Trend::InsufficientData`
    InsufficientData(ForecastReport),
    Failed { error: String },
}

impl ForecastOutcome {
    pub fn report(&self) -> Option<&ForecastReport> {
        match self {
            Self::Complete(report) | Self::InsufficientData(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn trend(&self) -> Trend {
        match self {
            Self::Complete(report) | Self::InsufficientData(report) => report.trend,
            Self::Failed { .. } => Trend::Error,
        }
    }

    pub fn next_month_estimate(&self) -> f64 {
        self.report().map_or(0.0, |r| r.next_month_estimate)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl Serialize for ForecastOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Complete(report) | Self::InsufficientData(report) => {
                report.serialize(serializer)
            }
            Self::Failed { error } => {
                let mut s = serializer.serialize_struct("ForecastOutcome", 3)?;
                s.serialize_field("error", error)?;
                s.serialize_field("nextMonthEstimate", &0)?;
                s.serialize_field("trend", &Trend::Error)?;
                s.end()
            }
        }
    }
}

/// Historical-average spend forecaster
#[derive(Debug, Clone)]
pub struct SpendForecaster {
    config: ForecastConfig,
    currency_symbol: String,
}

impl Default for SpendForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SpendForecaster {
    pub fn new() -> Self {
        Self::with_config(ForecastConfig::default(), &DisplayConfig::default())
    }

    pub fn with_config(config: ForecastConfig, display: &DisplayConfig) -> Self {
        Self {
            config,
            currency_symbol: display.currency_symbol.clone(),
        }
    }

    /// Forecast relative to today's local date
    ///
    /// The chart's forecast point is labeled with the month after the wall
    /// clock date, not the month after the newest transaction.
    pub fn forecast(&self, transactions: &[Transaction]) -> ForecastOutcome {
        self.forecast_as_of(transactions, Local::now().date_naive())
    }

    /// Forecast with an explicit "today"
    pub fn forecast_as_of(&self, transactions: &[Transaction], today: NaiveDate) -> ForecastOutcome {
        if transactions.len() < self.config.min_transactions {
            debug!(
                count = transactions.len(),
                required = self.config.min_transactions,
                "Too few transactions for forecasting"
            );
            return ForecastOutcome::InsufficientData(ForecastReport::insufficient(
                self.config.min_transactions,
            ));
        }

        match self.project(transactions, today) {
            Ok(report) => {
                debug!(
                    estimate = report.next_month_estimate,
                    trend = report.trend.as_str(),
                    "Forecast complete"
                );
                ForecastOutcome::Complete(report)
            }
            Err(e) => {
                warn!(error = %e, "Forecast failed");
                ForecastOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn project(&self, transactions: &[Transaction], today: NaiveDate) -> Result<ForecastReport> {
        if let Some(bad) = transactions.iter().find(|t| !t.amount.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Transaction {} has a non-finite amount ({})",
                bad.id, bad.amount
            )));
        }

        // Days without transactions are absent, not zero
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for tx in transactions {
            *daily.entry(tx.date).or_insert(0.0) += tx.amount;
        }
        let daily_totals: Vec<f64> = daily.into_values().collect();

        let daily_average = mean(&daily_totals)
            .ok_or_else(|| Error::Computation("No daily totals to average".into()))?;
        let weekly_average = daily_average * f64::from(self.config.days_per_week);
        let monthly_estimate = daily_average * f64::from(self.config.days_per_month);
        if !monthly_estimate.is_finite() {
            return Err(Error::Computation(
                "Monthly estimate overflowed".into(),
            ));
        }

        let (trend, trend_percentage) = self.classify_trend(&daily_totals);
        let category_forecasts = category_forecasts(transactions, monthly_estimate);
        let chart_data = self.chart_series(transactions, monthly_estimate, today)?;

        Ok(ForecastReport {
            next_month_estimate: round_to(monthly_estimate, 2),
            daily_average: round_to(daily_average, 2),
            weekly_average: round_to(weekly_average, 2),
            trend,
            trend_percentage: round_to(trend_percentage, 1),
            message: format!(
                "Based on your spending patterns, you may spend {}{} next month.",
                self.currency_symbol,
                format_thousands(monthly_estimate)
            ),
            category_forecasts,
            chart_data,
        })
    }

    /// Compare the latest window of daily totals to the one before it
    fn classify_trend(&self, daily_totals: &[f64]) -> (Trend, f64) {
        let window = self.config.trend_window_days;
        let n = daily_totals.len();
        if n < self.config.trend_min_points || n < 2 * window {
            return (Trend::Stable, 0.0);
        }

        let recent = mean(&daily_totals[n - window..]).unwrap_or(0.0);
        let previous = mean(&daily_totals[n - 2 * window..n - window]).unwrap_or(0.0);

        let percent = if previous > 0.0 {
            (recent - previous) / previous * 100.0
        } else {
            0.0
        };

        let threshold = self.config.trend_threshold_percent;
        let trend = if percent > threshold {
            Trend::Increasing
        } else if percent < -threshold {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        (trend, percent)
    }

    /// Recent monthly totals followed by the projected month
    fn chart_series(
        &self,
        transactions: &[Transaction],
        monthly_estimate: f64,
        today: NaiveDate,
    ) -> Result<Vec<ChartPoint>> {
        let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for tx in transactions {
            *monthly
                .entry((tx.date.year(), tx.date.month()))
                .or_insert(0.0) += tx.amount;
        }

        let skip = monthly.len().saturating_sub(self.config.chart_months);
        let mut points: Vec<ChartPoint> = monthly
            .into_iter()
            .skip(skip)
            .map(|((year, month), amount)| ChartPoint {
                period: format!("{:04}-{:02}", year, month),
                amount: round_to(amount, 2),
                kind: PointKind::Actual,
            })
            .collect();

        let next = next_month_start(today).ok_or_else(|| {
            Error::Computation(format!("No calendar month follows {}", today))
        })?;
        points.push(ChartPoint {
            period: next.format("%Y-%m").to_string(),
            amount: round_to(monthly_estimate, 2),
            kind: PointKind::Forecast,
        });

        Ok(points)
    }
}

/// Split the monthly estimate by each category's share of total spend
fn category_forecasts(transactions: &[Transaction], monthly_estimate: f64) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
    }
    let grand_total: f64 = totals.values().sum();

    totals
        .into_iter()
        .map(|(category, total)| {
            let forecast = if grand_total != 0.0 {
                let percent = round_to(total / grand_total * 100.0, 1);
                round_to(monthly_estimate * percent / 100.0, 2)
            } else {
                0.0
            };
            (category.to_string(), forecast)
        })
        .collect()
}

/// First day of the calendar month after `date`
fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year().checked_add(1)?, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

/// Whole-unit amount with thousands separators, e.g. 12345.6 -> "12,346"
fn format_thousands(value: f64) -> String {
    let rounded = value.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
