//! Server command implementation

use anyhow::Result;

use spendwise_core::AnalyticsConfig;
use spendwise_server::ServerConfig;

pub async fn cmd_serve(
    analytics: AnalyticsConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Spendwise server...");
    println!("   Listening: http://{}:{}", host, port);
    if allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }
    println!(
        "   Anomaly threshold: {}σ, forecast minimum: {} transactions",
        analytics.anomaly.z_threshold, analytics.forecast.min_transactions
    );

    let config = ServerConfig {
        allowed_origins,
        analytics,
    };

    spendwise_server::serve(host, port, config).await
}
