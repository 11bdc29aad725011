use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use timeseries_analytics::{
    config::ServiceConfig,
    services::{router, AnalyticsService},
    Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env()?;

    // RUST_LOG takes precedence over ANALYTICS_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind_addr = config.bind_addr;
    let service = Arc::new(AnalyticsService::new(config));
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Time series analytics service starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
