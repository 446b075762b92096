//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(ServerConfig::default()).unwrap()
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Batch with one large outlier among ordinary grocery spending
fn outlier_batch() -> Value {
    json!({
        "transactions": [
            {"id": "1", "description": "Groceries", "amount": 100, "category": "Food", "date": "2024-03-01"},
            {"id": "2", "description": "Groceries", "amount": 102, "category": "Food", "date": "2024-03-02"},
            {"id": "3", "description": "Groceries", "amount": 98, "category": "Food", "date": "2024-03-03"},
            {"id": "4", "description": "Groceries", "amount": 101, "category": "Food", "date": "2024-03-04"},
            {"id": "5", "description": "Groceries", "amount": 99, "category": "Food", "date": "2024-03-05"},
            {"id": "6", "description": "Television", "amount": 5000, "category": "Food", "date": "2024-03-06"}
        ]
    })
}

/// Week of spend across two categories, one transaction per day
fn week_batch() -> Value {
    let transactions: Vec<Value> = (1..=8)
        .map(|d| {
            json!({
                "id": d,
                "description": "spend",
                "amount": if d % 2 == 0 { 30 } else { 10 },
                "category": if d % 2 == 0 { "Food" } else { "Transport" },
                "date": format!("2024-06-{:02}", d),
            })
        })
        .collect();
    json!({ "transactions": transactions, "asOf": "2024-06-20" })
}

// ========== Status ==========

#[tokio::test]
async fn test_root() {
    let app = setup_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "OK");
    assert!(json["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    let json = get_body_json(response).await;
    assert_eq!(json, json!({"status": "healthy"}));
}

// ========== Anomalies ==========

#[tokio::test]
async fn test_anomalies_flags_outlier() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/anomalies", &outlier_batch()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    assert_eq!(json["totalChecked"], 6);
    assert_eq!(json["anomalyCount"], 1);
    assert_eq!(json["averageAmount"], 916.67);
    assert_eq!(json["message"], "Found 1 unusual transactions");

    let anomaly = &json["anomalies"][0];
    assert_eq!(anomaly["id"], "6");
    assert_eq!(anomaly["score"], 4.47);
    assert_eq!(anomaly["date"], "2024-03-06");
    assert_eq!(
        anomaly["reasons"][0],
        "Amount is 2.2x standard deviations above average"
    );
    assert_eq!(anomaly["reasons"][1], "Unusual for Food category (avg: ₹917)");
}

#[tokio::test]
async fn test_anomalies_insufficient_data() {
    let app = setup_test_app();
    let body = json!({
        "transactions": [
            {"id": "1", "amount": 10, "date": "2024-01-01"},
            {"id": "2", "amount": 12, "date": "2024-01-02"}
        ]
    });

    let response = app
        .oneshot(post_json("/api/anomalies", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["anomalies"], json!([]));
    assert_eq!(
        json["message"],
        "Not enough data for anomaly detection"
    );
}

#[tokio::test]
async fn test_anomalies_uses_configured_threshold() {
    let mut config = ServerConfig::default();
    config.analytics.anomaly.z_threshold = 5.0;
    let app = create_router(config).unwrap();

    let response = app
        .oneshot(post_json("/api/anomalies", &outlier_batch()))
        .await
        .unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json["anomalyCount"], 0);
    assert_eq!(json["message"], "Found 0 unusual transactions");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/anomalies")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Missing required field
    let response = app
        .oneshot(post_json("/api/forecast", &json!({"items": []})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_body_limit() {
    let app = setup_test_app();
    let oversized = format!(
        "{{\"descriptions\": [\"{}\"]}}",
        "x".repeat(MAX_BODY_SIZE + 1)
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/categorize")
                .header("content-type", "application/json")
                .body(Body::from(oversized))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ========== Forecast ==========

#[tokio::test]
async fn test_forecast() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/forecast", &week_batch()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    // 160 over 8 days -> 20/day
    assert_eq!(json["dailyAverage"], 20.0);
    assert_eq!(json["weeklyAverage"], 140.0);
    assert_eq!(json["nextMonthEstimate"], 600.0);
    assert_eq!(json["trend"], "stable");
    assert_eq!(json["categoryForecasts"], json!({"Food": 450.0, "Transport": 150.0}));
    assert_eq!(
        json["chartData"],
        json!([
            {"month": "2024-06", "actual": 160.0, "type": "actual"},
            {"month": "2024-07", "actual": 600.0, "type": "forecast"}
        ])
    );
    assert_eq!(
        json["message"],
        "Based on your spending patterns, you may spend ₹600 next month."
    );
}

#[tokio::test]
async fn test_forecast_insufficient_data() {
    let app = setup_test_app();
    let body = json!({"transactions": [{"amount": 5, "date": "2024-01-01"}]});

    let response = app
        .oneshot(post_json("/api/forecast", &body))
        .await
        .unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json["trend"], "insufficient_data");
    assert_eq!(json["nextMonthEstimate"], 0.0);
    assert_eq!(json["chartData"], json!([]));
}

// ========== Insights ==========

#[tokio::test]
async fn test_insights() {
    let app = setup_test_app();
    let body = json!({
        "asOf": "2024-03-20",
        "transactions": [
            {"amount": 40000, "category": "Salary", "type": "income", "date": "2024-03-01"},
            {"amount": 10000, "category": "Rent", "type": "expense", "date": "2024-03-02"},
            {"amount": 2000, "category": "Food", "date": "2024-03-05"},
            {"amount": 9999, "category": "Food", "date": "2024-02-05"}
        ]
    });

    let response = app
        .oneshot(post_json("/api/insights", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    assert_eq!(json["totalIncome"], 40000.0);
    assert_eq!(json["totalExpense"], 12000.0);
    assert_eq!(json["savingsRate"], 70.0);

    let types: Vec<&str> = json["insights"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["info", "warning", "success"]);
    assert_eq!(
        json["insights"][1]["message"],
        "Your highest expense category is Rent at ₹10000."
    );
}

// ========== Categorize ==========

#[tokio::test]
async fn test_categorize_keywords() {
    let app = setup_test_app();
    let body = json!({"descriptions": ["Zomato order", "Uber trip", "Mystery charge"]});

    let response = app
        .oneshot(post_json("/api/categorize", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["categories"], json!(["Food", "Transport", "Other"]));
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_categorize_empty() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/categorize", &json!({"descriptions": []})))
        .await
        .unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json, json!({"categories": [], "count": 0}));
}

#[tokio::test]
async fn test_categorize_statement_mode() {
    let app = setup_test_app();
    let body = json!({
        "statement": true,
        "descriptions": [
            "UPI/DR/123456789/ZOMATO LTD/YESB/zomato@ybl",
            "UPI/DR/4455/Sharma Kirana Store/SBIN/sharma123@okaxis"
        ]
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/categorize", &body))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["categories"], json!(["Food", "Shopping"]));

    let income = json!({
        "statement": true,
        "type": "income",
        "descriptions": ["NEFT_IN ACME CORP", "Refund from Amazon"]
    });
    let response = app
        .oneshot(post_json("/api/categorize", &income))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["categories"], json!(["Salary", "Other"]));
}

#[tokio::test]
async fn test_categorize_too_many_descriptions() {
    let app = setup_test_app();
    let descriptions = vec!["a"; handlers::MAX_DESCRIPTIONS + 1];

    let response = app
        .oneshot(post_json(
            "/api/categorize",
            &json!({ "descriptions": descriptions }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("At most"));
}

// ========== CORS ==========

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = ServerConfig {
        allowed_origins: vec!["http://localhost:3000".to_string()],
        ..Default::default()
    };
    let app = create_router(config).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/anomalies")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_cors_default_has_no_allowed_origin() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

// ========== Internal errors ==========

#[tokio::test]
async fn test_failed_analysis_returns_generic_500() {
    let state = Arc::new(AppState::new(ServerConfig::default()).unwrap());

    let result = handlers::analytics::run_analysis(state, |_s: &AppState| -> u32 {
        panic!("scoring blew up")
    })
    .await;
    let response = match result {
        Ok(_) => panic!("a panicked worker must not produce output"),
        Err(err) => err.into_response(),
    };

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
    assert!(!json.to_string().contains("scoring blew up"));
}

#[tokio::test]
async fn test_internal_error_details_are_not_leaked() {
    let err = AppError::from(std::io::Error::new(
        std::io::ErrorKind::Other,
        "/var/lib/spendwise/secret.toml unreadable",
    ));
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json, json!({"error": "An internal error occurred"}));
}

#[tokio::test]
async fn test_analysis_runs_off_the_async_workers() {
    let state = Arc::new(AppState::new(ServerConfig::default()).unwrap());
    let count = handlers::analytics::run_analysis(state, |s: &AppState| {
        s.keywords.classify_all(&["Zomato order", "Uber ride"]).len()
    })
    .await
    .unwrap();
    assert_eq!(count, 2);
}
