//! Data models for Spendwise

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Category assigned when a transaction carries none
pub const DEFAULT_CATEGORY: &str = "Other";

/// Direction of money flow, when the caller knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" | "cr" => Ok(Self::Income),
            "expense" | "debit" | "dr" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single transaction in an analysis batch
///
/// The sign of `amount` is caller-defined (positive = outflow by convention)
/// and is never altered by the analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque identifier; numbers in JSON are accepted and kept as text
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(
        default = "default_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    /// Income or expense, used only by monthly insights
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category: Option<&str>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            category: normalize_category(category),
            date,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Missing kind counts as an expense
    pub fn is_expense(&self) -> bool {
        self.kind != Some(TransactionKind::Income)
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Blank or absent categories collapse to "Other"
pub fn normalize_category(category: Option<&str>) -> String {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_category)
}

fn deserialize_category<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_category(raw.as_deref()))
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Int(n)) => n.to_string(),
        Some(RawId::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Parse a calendar date, discarding any time-of-day component
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("01/15/2024").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T23:59:00Z").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15T08:30:00.000").unwrap(), expected);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_deserialize_defaults_category() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id": "a1", "description": "coffee", "amount": 4.5, "date": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(tx.category, "Other");
        assert_eq!(tx.kind, None);

        let tx: Transaction = serde_json::from_str(
            r#"{"id": "a2", "description": "x", "amount": 1, "category": null, "date": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(tx.category, "Other");
    }

    #[test]
    fn test_deserialize_numeric_id_and_kind() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id": 42, "amount": -10.0, "category": "Salary", "date": "2024-03-01T10:00:00Z", "type": "income"}"#,
        )
        .unwrap();
        assert_eq!(tx.id, "42");
        assert_eq!(tx.description, "");
        assert_eq!(tx.amount, -10.0);
        assert_eq!(tx.kind, Some(TransactionKind::Income));
        assert!(!tx.is_expense());
    }

    #[test]
    fn test_serialize_date_as_iso() {
        let tx = Transaction::new(
            "1",
            "rent",
            900.0,
            Some("Rent"),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["date"], "2024-02-01");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("debit".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
