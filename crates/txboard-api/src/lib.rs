//! JSON HTTP API for the transaction dashboard
//!
//! Routes are organized into modules:
//! - routes::transactions: filtered list, detail, create, CSV export
//! - routes::reports: date-range report and its CSV export
//! - routes::cron_job: generator status and toggle

pub mod error;
pub mod export;
pub mod routes;

use axum::extract::State;
use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use txboard_core::{Dashboard, DashboardSummary};

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::cron_job::{api_cron_job_status, api_cron_job_toggle, api_cron_job_update};
    use routes::reports::{api_report, api_report_export};
    use routes::transactions::{
        api_transaction_create, api_transaction_detail, api_transactions, api_transactions_export,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/transactions", get(api_transactions).post(api_transaction_create))
        .route("/api/transactions/export", get(api_transactions_export))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/reports", get(api_report))
        .route("/api/reports/export", get(api_report_export))
        .route("/api/cron-job", get(api_cron_job_status).put(api_cron_job_update))
        .route("/api/cron-job/toggle", post(api_cron_job_toggle))
        // The dashboard is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn api_summary(state: State<AppState>) -> Json<DashboardSummary> {
    Json(state.dashboard.summary())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(dashboard: Arc<Dashboard>) -> std::io::Result<()> {
    let addr = dashboard.config().bind_address();
    let router = create_router(AppState { dashboard });

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting txboard server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/transactions (list, detail, create, export)");
    log::info!("  - /api/reports (date-range report, export)");
    log::info!("  - /api/cron-job (generator status, toggle)");
    log::info!("  - /api/summary, /api/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
