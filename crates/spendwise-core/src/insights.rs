//! Month-to-date spending insights
//!
//! Summarizes the current calendar month: income vs expense totals, savings
//! rate, the biggest expense category and an overspending check.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::DisplayConfig;
use crate::models::{Transaction, TransactionKind};
use crate::stats::round_away;

/// Severity of an insight card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Info,
    Warning,
    Danger,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub level: InsightLevel,
    pub icon: &'static str,
    pub title: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub insights: Vec<Insight>,
    /// Percent of income kept, one decimal; 0 without income
    pub savings_rate: f64,
    pub total_expense: f64,
    pub total_income: f64,
}

/// Insights for the month containing `today`, with the default currency
pub fn monthly_insights(transactions: &[Transaction], today: NaiveDate) -> InsightsReport {
    monthly_insights_with_display(transactions, today, &DisplayConfig::default())
}

pub fn monthly_insights_with_display(
    transactions: &[Transaction],
    today: NaiveDate,
    display: &DisplayConfig,
) -> InsightsReport {
    let this_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.date.year() == today.year() && t.date.month() == today.month())
        .collect();

    let total_income: f64 = this_month
        .iter()
        .filter(|t| t.kind == Some(TransactionKind::Income))
        .map(|t| t.amount)
        .sum();

    // Category totals in first-seen order, so ties go to the earliest category
    let mut by_category: Vec<(&str, f64)> = Vec::new();
    let mut total_expense = 0.0;
    for tx in this_month.iter().filter(|t| t.is_expense()) {
        total_expense += tx.amount;
        match by_category.iter_mut().find(|(c, _)| *c == tx.category) {
            Some((_, total)) => *total += tx.amount,
            None => by_category.push((tx.category.as_str(), tx.amount)),
        }
    }

    let top = by_category
        .iter()
        .fold(None::<(&str, f64)>, |best, &(category, total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((category, total)),
        });

    let savings_rate = if total_income > 0.0 {
        round_away((total_income - total_expense) / total_income * 100.0, 1)
    } else {
        0.0
    };

    debug!(
        transactions = this_month.len(),
        total_income, total_expense, savings_rate, "Computed monthly insights"
    );

    let rate_text = if total_income > 0.0 {
        format!("{:.1}", savings_rate)
    } else {
        "0".to_string()
    };

    let mut insights = vec![Insight {
        level: InsightLevel::Info,
        icon: "💰",
        title: "Savings Rate",
        message: format!("You saved {}% of your income this month.", rate_text),
    }];

    if let Some((category, total)) = top {
        insights.push(Insight {
            level: InsightLevel::Warning,
            icon: "📊",
            title: "Top Spending",
            message: format!(
                "Your highest expense category is {} at {}{:.0}.",
                category,
                display.currency_symbol,
                round_away(total, 0)
            ),
        });
    }

    insights.push(if total_expense > total_income {
        Insight {
            level: InsightLevel::Danger,
            icon: "⚠️",
            title: "Overspending Alert",
            message: "Your expenses exceeded your income this month!".to_string(),
        }
    } else {
        Insight {
            level: InsightLevel::Success,
            icon: "✅",
            title: "On Track",
            message: "You are spending within your income this month.".to_string(),
        }
    });

    InsightsReport {
        insights,
        savings_rate,
        total_expense,
        total_income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(
        id: &str,
        amount: f64,
        category: &str,
        date: NaiveDate,
        kind: Option<TransactionKind>,
    ) -> Transaction {
        let t = Transaction::new(id, "test", amount, Some(category), date);
        match kind {
            Some(k) => t.with_kind(k),
            None => t,
        }
    }

    fn titles(report: &InsightsReport) -> Vec<&str> {
        report.insights.iter().map(|i| i.title).collect()
    }

    #[test]
    fn test_month_on_track() {
        let today = day(2024, 3, 20);
        let txs = vec![
            tx("1", 50_000.0, "Salary", day(2024, 3, 1), Some(TransactionKind::Income)),
            tx("2", 12_000.0, "Food", day(2024, 3, 5), Some(TransactionKind::Expense)),
            tx("3", 18_000.0, "Rent", day(2024, 3, 3), Some(TransactionKind::Expense)),
            // No kind counts as an expense
            tx("4", 3_000.0, "Food", day(2024, 3, 9), None),
            // Last month is ignored
            tx("5", 99_999.0, "Travel", day(2024, 2, 28), Some(TransactionKind::Expense)),
        ];

        let report = monthly_insights(&txs, today);

        assert_eq!(report.total_income, 50_000.0);
        assert_eq!(report.total_expense, 33_000.0);
        assert_eq!(report.savings_rate, 34.0);
        assert_eq!(titles(&report), vec!["Savings Rate", "Top Spending", "On Track"]);
        assert_eq!(
            report.insights[0].message,
            "You saved 34.0% of your income this month."
        );
        assert_eq!(
            report.insights[1].message,
            "Your highest expense category is Rent at ₹18000."
        );
        assert_eq!(report.insights[2].level, InsightLevel::Success);
    }

    #[test]
    fn test_overspending() {
        let today = day(2024, 5, 31);
        let txs = vec![
            tx("1", 1_000.0, "Salary", day(2024, 5, 1), Some(TransactionKind::Income)),
            tx("2", 1_500.0, "Shopping", day(2024, 5, 2), Some(TransactionKind::Expense)),
        ];

        let report = monthly_insights(&txs, today);
        assert_eq!(report.savings_rate, -50.0);
        let last = report.insights.last().unwrap();
        assert_eq!(last.level, InsightLevel::Danger);
        assert_eq!(last.title, "Overspending Alert");
    }

    #[test]
    fn test_no_income() {
        let today = day(2024, 5, 10);
        let txs = vec![tx("1", 250.0, "Food", day(2024, 5, 2), None)];

        let report = monthly_insights(&txs, today);
        assert_eq!(report.savings_rate, 0.0);
        assert_eq!(
            report.insights[0].message,
            "You saved 0% of your income this month."
        );
        assert_eq!(report.insights.last().unwrap().level, InsightLevel::Danger);
    }

    #[test]
    fn test_empty_month() {
        let report = monthly_insights(&[], day(2024, 5, 10));
        assert_eq!(report.total_expense, 0.0);
        assert_eq!(report.total_income, 0.0);
        assert_eq!(titles(&report), vec!["Savings Rate", "On Track"]);
    }

    #[test]
    fn test_top_category_tie_goes_to_first_seen() {
        let today = day(2024, 7, 15);
        let txs = vec![
            tx("1", 100.0, "Transport", day(2024, 7, 1), None),
            tx("2", 100.0, "Food", day(2024, 7, 2), None),
        ];

        let report = monthly_insights(&txs, today);
        assert!(report.insights[1].message.contains("Transport at ₹100"));
    }

    #[test]
    fn test_custom_currency_and_json_shape() {
        let today = day(2024, 7, 15);
        let txs = vec![tx("1", 42.4, "Food", day(2024, 7, 1), None)];
        let display = DisplayConfig {
            currency_symbol: "$".to_string(),
        };

        let report = monthly_insights_with_display(&txs, today, &display);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalExpense"], 42.4);
        assert_eq!(json["totalIncome"], 0.0);
        assert_eq!(json["savingsRate"], 0.0);
        assert_eq!(json["insights"][1]["type"], "warning");
        assert_eq!(json["insights"][1]["icon"], "📊");
        assert_eq!(
            json["insights"][1]["message"],
            "Your highest expense category is Food at $42."
        );
    }
}
