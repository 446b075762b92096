//! Statistical anomaly detection
//!
//! Scores every transaction twice:
//! - against the distribution of all amounts in the batch (global pass)
//! - against the distribution of its own category (category pass)
//!
//! Each pass contributes its z-score to the transaction's score when the
//! z-score exceeds the configured threshold. Only transactions with at least
//! one triggered reason are reported, highest score first.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::{AnomalyConfig, DisplayConfig};
use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::stats::{round_to, Distribution};

/// A flagged transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    /// Sum of the triggered z-scores, rounded to 2 decimals
    pub score: f64,
    /// Global reason first, then category reason
    pub reasons: Vec<String>,
}

/// Result of a completed anomaly scan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// Top anomalies, highest score first
    pub anomalies: Vec<AnomalyResult>,
    pub total_checked: usize,
    /// Number flagged before truncation
    pub anomaly_count: usize,
    /// Mean of all amounts, rounded to 2 decimals
    pub average_amount: f64,
    pub message: String,
}

/// Everything `AnomalyDetector::detect` can return
///
/// Too little data and computation failures are ordinary outcomes rather
/// than errors, so the caller always has something to send back.
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyOutcome {
    Complete(AnomalyReport),
    InsufficientData { message: String },
    Failed { error: String },
}

impl AnomalyOutcome {
    /// Reported anomalies (empty unless complete)
    pub fn anomalies(&self) -> &[AnomalyResult] {
        match self {
            Self::Complete(report) => &report.anomalies,
            _ => &[],
        }
    }

    pub fn report(&self) -> Option<&AnomalyReport> {
        match self {
            Self::Complete(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

impl Serialize for AnomalyOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let empty: &[AnomalyResult] = &[];
        match self {
            Self::Complete(report) => report.serialize(serializer),
            Self::InsufficientData { message } => {
                let mut s = serializer.serialize_struct("AnomalyOutcome", 2)?;
                s.serialize_field("anomalies", empty)?;
                s.serialize_field("message", message)?;
                s.end()
            }
            Self::Failed { error } => {
                let mut s = serializer.serialize_struct("AnomalyOutcome", 2)?;
                s.serialize_field("anomalies", empty)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Z-score based anomaly detector
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    currency_symbol: String,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::with_config(AnomalyConfig::default(), &DisplayConfig::default())
    }

    pub fn with_config(config: AnomalyConfig, display: &DisplayConfig) -> Self {
        Self {
            config,
            currency_symbol: display.currency_symbol.clone(),
        }
    }

    /// Score a batch and return the ranked anomalies
    pub fn detect(&self, transactions: &[Transaction]) -> AnomalyOutcome {
        if transactions.len() < self.config.min_transactions {
            debug!(
                count = transactions.len(),
                required = self.config.min_transactions,
                "Too few transactions for anomaly detection"
            );
            return AnomalyOutcome::InsufficientData {
                message: "Not enough data for anomaly detection".to_string(),
            };
        }

        match self.scan(transactions) {
            Ok(report) => {
                debug!(
                    checked = report.total_checked,
                    flagged = report.anomaly_count,
                    "Anomaly detection complete"
                );
                AnomalyOutcome::Complete(report)
            }
            Err(e) => {
                warn!(error = %e, "Anomaly detection failed");
                AnomalyOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn scan(&self, transactions: &[Transaction]) -> Result<AnomalyReport> {
        if let Some(bad) = transactions.iter().find(|t| !t.amount.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Transaction {} has a non-finite amount ({})",
                bad.id, bad.amount
            )));
        }

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        let global = Distribution::of(&amounts)
            .ok_or_else(|| Error::Computation("Cannot score an empty batch".into()))?;
        if !(global.mean.is_finite() && global.std_dev.is_finite()) {
            return Err(Error::Computation(
                "Amounts overflow the global distribution".into(),
            ));
        }

        let categories = self.category_distributions(transactions);
        let threshold = self.config.z_threshold;

        let mut flagged: Vec<AnomalyResult> = Vec::new();
        for tx in transactions {
            let mut score = 0.0;
            let mut reasons = Vec::new();

            if let Some(z) = global.z_score(tx.amount).filter(|z| *z > threshold) {
                // z is absolute, so unusually small amounts read "above" too
                reasons.push(format!(
                    "Amount is {:.1}x standard deviations above average",
                    z
                ));
                score += z;
            }

            if let Some(dist) = categories.get(tx.category.as_str()) {
                if let Some(z) = dist.z_score(tx.amount).filter(|z| *z > threshold) {
                    reasons.push(format!(
                        "Unusual for {} category (avg: {}{:.0})",
                        tx.category, self.currency_symbol, dist.mean
                    ));
                    score += z;
                }
            }

            if !reasons.is_empty() {
                flagged.push(AnomalyResult {
                    id: tx.id.clone(),
                    description: tx.description.clone(),
                    amount: tx.amount,
                    category: tx.category.clone(),
                    date: tx.date,
                    score,
                    reasons,
                });
            }
        }

        // Stable sort keeps input order among equal scores
        flagged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let anomaly_count = flagged.len();
        flagged.truncate(self.config.max_results);
        for anomaly in &mut flagged {
            anomaly.score = round_to(anomaly.score, 2);
        }

        Ok(AnomalyReport {
            anomalies: flagged,
            total_checked: transactions.len(),
            anomaly_count,
            average_amount: round_to(global.mean, 2),
            message: format!("Found {} unusual transactions", anomaly_count),
        })
    }

    /// Distributions for categories large enough to judge
    fn category_distributions<'a>(
        &self,
        transactions: &'a [Transaction],
    ) -> HashMap<&'a str, Distribution> {
        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
        for tx in transactions {
            groups
                .entry(tx.category.as_str())
                .or_default()
                .push(tx.amount);
        }

        groups
            .into_iter()
            .filter(|(_, amounts)| amounts.len() >= self.config.min_category_size)
            .filter_map(|(category, amounts)| {
                Distribution::of(&amounts).map(|dist| (category, dist))
            })
            .collect()
    }
}
