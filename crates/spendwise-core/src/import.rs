//! Transaction batch import from JSON and CSV files

use std::fs;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{normalize_category, parse_date, Transaction, TransactionKind};

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Format implied by the file extension, if any
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Guess from content: JSON starts with `[` or `{`
    pub fn sniff(content: &str) -> Self {
        match content.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('[') | Some('{') => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Load a transaction batch from disk
///
/// Transactions without an id get their 1-based position in the file.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Import(format!("Failed to read {}: {}", path.display(), e)))?;

    let format = ImportFormat::from_path(path).unwrap_or_else(|| ImportFormat::sniff(&content));
    debug!(path = %path.display(), ?format, "Loading transactions");

    parse_transactions(&content, format)
}

pub fn parse_transactions(content: &str, format: ImportFormat) -> Result<Vec<Transaction>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut transactions = match format {
        ImportFormat::Json => parse_json(content)?,
        ImportFormat::Csv => parse_csv(content.as_bytes())?,
    };
    assign_missing_ids(&mut transactions);
    Ok(transactions)
}

/// Parse either a bare array or `{"transactions": [...]}`
pub fn parse_json(content: &str) -> Result<Vec<Transaction>> {
    let value: Value = serde_json::from_str(content)?;

    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove("transactions").ok_or_else(|| {
            Error::Import("JSON object has no \"transactions\" field".into())
        })?,
        _ => {
            return Err(Error::Import(
                "Expected a JSON array of transactions or an object with \"transactions\"".into(),
            ))
        }
    };

    Ok(serde_json::from_value(list)?)
}

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    id: Option<usize>,
    category: Option<usize>,
    kind: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                Error::Import(format!("CSV is missing required column '{}'", name))
            })
        };

        Ok(Self {
            date: require("date")?,
            description: require("description")?,
            amount: require("amount")?,
            id: find("id"),
            category: find("category"),
            kind: find("type"),
        })
    }
}

/// Parse CSV with a header row
///
/// Required columns: date, description, amount. Optional: id, category, type.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let row = index + 1;

        let field = |i: usize| record.get(i).unwrap_or("");
        let optional = |i: Option<usize>| i.map(field).filter(|s| !s.is_empty());

        let date = parse_date(field(columns.date))
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        let amount = parse_amount(field(columns.amount))
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        let kind = optional(columns.kind)
            .map(|s| s.parse::<TransactionKind>())
            .transpose()
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;

        transactions.push(Transaction {
            id: optional(columns.id).unwrap_or_default().to_string(),
            description: field(columns.description).to_string(),
            amount,
            category: normalize_category(optional(columns.category)),
            date,
            kind,
        });
    }

    debug!(count = transactions.len(), "Parsed CSV transactions");
    Ok(transactions)
}

fn assign_missing_ids(transactions: &mut [Transaction]) {
    for (i, tx) in transactions.iter_mut().enumerate() {
        if tx.id.is_empty() {
            tx.id = (i + 1).to_string();
        }
    }
}

/// Parse an amount string, handling currency symbols, commas and accounting negatives
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₹', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
