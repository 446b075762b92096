//! Batch analysis commands (anomalies, forecast, insights)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use spendwise_core::insights::monthly_insights_with_display;
use spendwise_core::{
    load_transactions, AnalyticsConfig, AnomalyDetector, AnomalyOutcome, ForecastOutcome,
    InsightsReport, KeywordClassifier, PointKind, SpendForecaster, Transaction,
};

use super::{print_json, truncate};

/// Load a batch file, optionally filling in categories from descriptions
pub fn load_batch(file: &Path, classify: bool) -> Result<Vec<Transaction>> {
    let mut transactions = load_transactions(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))?;

    if classify {
        let changed = KeywordClassifier::new().classify_uncategorized(&mut transactions);
        info!(classified = changed, "Filled in missing categories");
    }

    Ok(transactions)
}

pub fn run_anomalies(config: &AnalyticsConfig, file: &Path, classify: bool) -> Result<AnomalyOutcome> {
    let transactions = load_batch(file, classify)?;
    let detector = AnomalyDetector::with_config(config.anomaly.clone(), &config.display);
    Ok(detector.detect(&transactions))
}

pub fn cmd_anomalies(config: &AnalyticsConfig, file: &Path, classify: bool, json: bool) -> Result<()> {
    let outcome = run_anomalies(config, file, classify)?;
    if json {
        return print_json(&outcome);
    }

    println!();
    println!("🔍 Anomaly Detection");
    println!("   ─────────────────────────────────────────────────────────────");

    let report = match &outcome {
        AnomalyOutcome::Complete(report) => report,
        AnomalyOutcome::InsufficientData { message } => {
            println!("   {}", message);
            return Ok(());
        }
        AnomalyOutcome::Failed { error } => {
            println!("   ⚠️  Detection failed: {}", error);
            return Ok(());
        }
    };

    let symbol = &config.display.currency_symbol;
    println!(
        "   Checked {} transactions (average {}{:.2})",
        report.total_checked, symbol, report.average_amount
    );
    println!("   {}", report.message);

    if report.anomalies.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "   {:10} │ {:28} │ {:>12} │ {:>6}",
        "Date", "Description", "Amount", "Score"
    );
    println!("   ───────────┼──────────────────────────────┼──────────────┼───────");
    for anomaly in &report.anomalies {
        println!(
            "   {:10} │ {:28} │ {:>12.2} │ {:>6.2}",
            anomaly.date.format("%Y-%m-%d"),
            truncate(&anomaly.description, 28),
            anomaly.amount,
            anomaly.score
        );
        for reason in &anomaly.reasons {
            println!("   {:10}   • {}", "", reason);
        }
    }

    if report.anomaly_count > report.anomalies.len() {
        println!();
        println!(
            "   Showing top {} of {} flagged transactions",
            report.anomalies.len(),
            report.anomaly_count
        );
    }

    Ok(())
}

pub fn run_forecast(
    config: &AnalyticsConfig,
    file: &Path,
    classify: bool,
    today: NaiveDate,
) -> Result<ForecastOutcome> {
    let transactions = load_batch(file, classify)?;
    let forecaster = SpendForecaster::with_config(config.forecast.clone(), &config.display);
    Ok(forecaster.forecast_as_of(&transactions, today))
}

pub fn cmd_forecast(
    config: &AnalyticsConfig,
    file: &Path,
    classify: bool,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let outcome = run_forecast(config, file, classify, today)?;
    if json {
        return print_json(&outcome);
    }

    println!();
    println!("📈 Spending Forecast");
    println!("   ─────────────────────────────────────────────────────────────");

    let report = match &outcome {
        ForecastOutcome::Complete(report) => report,
        ForecastOutcome::InsufficientData(report) => {
            println!("   {}", report.message);
            return Ok(());
        }
        ForecastOutcome::Failed { error } => {
            println!("   ⚠️  Forecast failed: {}", error);
            return Ok(());
        }
    };

    let symbol = &config.display.currency_symbol;
    println!("   Next month:  {}{:.2}", symbol, report.next_month_estimate);
    println!("   Daily avg:   {}{:.2}", symbol, report.daily_average);
    println!("   Weekly avg:  {}{:.2}", symbol, report.weekly_average);
    println!(
        "   Trend:       {} ({:+.1}%)",
        report.trend, report.trend_percentage
    );

    if !report.category_forecasts.is_empty() {
        println!();
        println!("   {:25} │ {:>12}", "Category", "Forecast");
        println!("   ──────────────────────────┼─────────────");
        for (category, amount) in &report.category_forecasts {
            println!("   {:25} │ {:>12.2}", truncate(category, 25), amount);
        }
    }

    println!();
    println!("   {:8} │ {:>12} │", "Month", "Amount");
    println!("   ─────────┼──────────────┼───────────");
    for point in &report.chart_data {
        let marker = match point.kind {
            PointKind::Actual => "",
            PointKind::Forecast => "forecast",
        };
        println!("   {:8} │ {:>12.2} │ {}", point.period, point.amount, marker);
    }

    println!();
    println!("   {}", report.message);

    Ok(())
}

pub fn run_insights(config: &AnalyticsConfig, file: &Path, today: NaiveDate) -> Result<InsightsReport> {
    let transactions = load_batch(file, false)?;
    Ok(monthly_insights_with_display(
        &transactions,
        today,
        &config.display,
    ))
}

pub fn cmd_insights(config: &AnalyticsConfig, file: &Path, today: NaiveDate, json: bool) -> Result<()> {
    let report = run_insights(config, file, today)?;
    if json {
        return print_json(&report);
    }

    let symbol = &config.display.currency_symbol;
    println!();
    println!("💡 Insights for {}", today.format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income:   {}{:.2}", symbol, report.total_income);
    println!("   Expenses: {}{:.2}", symbol, report.total_expense);
    println!();
    for insight in &report.insights {
        println!("   {} {}: {}", insight.icon, insight.title, insight.message);
    }

    Ok(())
}
