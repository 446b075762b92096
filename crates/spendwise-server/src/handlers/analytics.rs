//! Analytics handlers
//!
//! Valid requests always get 200; soft failures (too little data, a failed
//! computation) are reported inside the body. The scoring itself runs on the
//! blocking pool, and a worker that dies surfaces as a sanitized 500.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::{AppError, AppState};
use spendwise_core::insights::monthly_insights_with_display;
use spendwise_core::{AnomalyOutcome, ForecastOutcome, InsightsReport, Transaction};

/// Request body shared by the analytics endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsRequest {
    pub transactions: Vec<Transaction>,
    /// Reference date for month boundaries (defaults to today)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl TransactionsRequest {
    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Run an analysis off the async workers
pub(crate) async fn run_analysis<T, F>(state: Arc<AppState>, analyze: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> T + Send + 'static,
{
    let output = tokio::task::spawn_blocking(move || analyze(&state)).await?;
    Ok(output)
}

/// POST /api/anomalies - Flag unusual transactions
pub async fn detect_anomalies(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionsRequest>,
) -> Result<Json<AnomalyOutcome>, AppError> {
    debug!(count = req.transactions.len(), "Anomaly request");
    let outcome = run_analysis(state, move |s| s.detector.detect(&req.transactions)).await?;
    Ok(Json(outcome))
}

/// POST /api/forecast - Project next month's spending
pub async fn forecast_spending(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionsRequest>,
) -> Result<Json<ForecastOutcome>, AppError> {
    debug!(count = req.transactions.len(), "Forecast request");
    let today = req.today();
    let outcome = run_analysis(state, move |s| {
        s.forecaster.forecast_as_of(&req.transactions, today)
    })
    .await?;
    Ok(Json(outcome))
}

/// POST /api/insights - Month-to-date summary cards
pub async fn monthly_insights(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionsRequest>,
) -> Result<Json<InsightsReport>, AppError> {
    debug!(count = req.transactions.len(), "Insights request");
    let today = req.today();
    let report = run_analysis(state, move |s| {
        monthly_insights_with_display(&req.transactions, today, &s.config.analytics.display)
    })
    .await?;
    Ok(Json(report))
}
