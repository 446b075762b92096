//! Category classification handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use spendwise_core::TransactionKind;

/// Maximum descriptions per request
pub const MAX_DESCRIPTIONS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub descriptions: Vec<String>,
    /// Use the bank-statement classifier (UPI handles, merchant names)
    #[serde(default)]
    pub statement: bool,
    /// Direction for statement classification; income lines use income rules
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub categories: Vec<&'static str>,
    pub count: usize,
}

/// POST /api/categorize - Assign a category to each description
pub async fn categorize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategorizeRequest>,
) -> Result<Json<CategorizeResponse>, AppError> {
    if req.descriptions.len() > MAX_DESCRIPTIONS {
        return Err(AppError::bad_request(&format!(
            "At most {} descriptions per request",
            MAX_DESCRIPTIONS
        )));
    }

    let categories = if req.statement {
        state.statements.classify_all(&req.descriptions, req.kind)
    } else {
        state.keywords.classify_all(&req.descriptions)
    };

    Ok(Json(CategorizeResponse {
        count: categories.len(),
        categories,
    }))
}
