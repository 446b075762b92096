//! Liveness handlers

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET / - Service banner
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Spendwise analytics service running",
        status: "OK",
    })
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
