//! Categorize command implementation

use anyhow::Result;

use spendwise_core::{KeywordClassifier, StatementClassifier, TransactionKind};

use super::{print_json, truncate};

pub fn categorize_descriptions(
    descriptions: &[String],
    statement: bool,
    income: bool,
) -> Result<Vec<&'static str>> {
    if statement {
        let kind = income.then_some(TransactionKind::Income);
        Ok(StatementClassifier::new()?.classify_all(descriptions, kind))
    } else {
        Ok(KeywordClassifier::new().classify_all(descriptions))
    }
}

pub fn cmd_categorize(descriptions: &[String], statement: bool, income: bool, json: bool) -> Result<()> {
    let categories = categorize_descriptions(descriptions, statement, income)?;

    if json {
        return print_json(&serde_json::json!({
            "categories": categories,
            "count": categories.len(),
        }));
    }

    for (description, category) in descriptions.iter().zip(&categories) {
        println!("{:40} → {}", truncate(description, 40), category);
    }

    Ok(())
}
