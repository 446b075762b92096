//! Spendwise Web Server
//!
//! Axum-based JSON API over the Spendwise analytics engine.
//!
//! Security features:
//! - Restrictive CORS policy (explicit origins only)
//! - Request body size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use spendwise_core::{
    AnalyticsConfig, AnomalyDetector, KeywordClassifier, SpendForecaster, StatementClassifier,
};

mod handlers;

/// Maximum request body size (2 MB)
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Thresholds and display settings for the analyzers
    pub analytics: AnalyticsConfig,
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub detector: AnomalyDetector,
    pub forecaster: SpendForecaster,
    pub keywords: KeywordClassifier,
    pub statements: StatementClassifier,
}

impl AppState {
    pub fn new(config: ServerConfig) -> spendwise_core::Result<Self> {
        let analytics = &config.analytics;
        let detector = AnomalyDetector::with_config(analytics.anomaly.clone(), &analytics.display);
        let forecaster =
            SpendForecaster::with_config(analytics.forecast.clone(), &analytics.display);

        Ok(Self {
            detector,
            forecaster,
            keywords: KeywordClassifier::new(),
            statements: StatementClassifier::new()?,
            config,
        })
    }
}

/// Create the application router
pub fn create_router(config: ServerConfig) -> anyhow::Result<Router> {
    let cors = build_cors(&config.allowed_origins);
    let state = Arc::new(AppState::new(config)?);

    let api_routes = Router::new()
        .route("/anomalies", post(handlers::detect_anomalies))
        .route("/forecast", post(handlers::forecast_spending))
        .route("/insights", post(handlers::monthly_insights))
        .route("/categorize", post(handlers::categorize));

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Ok(app)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    }
}

/// Start the server
pub async fn serve(host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    if !config.allowed_origins.is_empty() {
        info!(origins = ?config.allowed_origins, "CORS enabled for origins");
    }

    let app = create_router(config)?;
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
