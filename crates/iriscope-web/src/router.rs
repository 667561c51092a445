//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    analysis::{upload_page, analyze_submit},
    api::{api_analysis, api_consult, api_model_info, api_report, api_status},
    dashboard::dashboard,
    reports::reports_page,
};
use crate::proxy::{proxy_get, proxy_post};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",          get(upload_page))
        .route("/analyze",   post(analyze_submit))
        .route("/dashboard", get(dashboard))
        .route("/reports",   get(reports_page))

        // API endpoints
        .route("/api/status",         get(api_status))
        .route("/api/analysis/{id}",  get(api_analysis))
        .route("/api/consult",        post(api_consult))
        .route("/api/report/{id}",    get(api_report))
        .route("/api/model-info",     get(api_model_info))

        // CORS proxy relay to the inference service
        .route("/api/proxy/{*path}",  get(proxy_get).post(proxy_post))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
