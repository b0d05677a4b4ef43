use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::api::handlers;
use crate::shared::config;

/// Room for multipart boundaries and option fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// All application routes
pub fn configure_routes() -> Router {
    let body_limit = config::get().dashboard.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS
        // ========================================
        // D400 Monthly Sales Dashboard
        .route(
            "/api/d400/settings",
            get(handlers::d400_monthly_sales::get_settings),
        )
        .route(
            "/api/d400/dashboard",
            get(handlers::d400_monthly_sales::get_sample_dashboard)
                .post(handlers::d400_monthly_sales::post_dashboard),
        )
        .route(
            "/api/d400/upload",
            post(handlers::d400_monthly_sales::upload_dashboard),
        )
        .route(
            "/api/d400/chart/:file",
            get(handlers::d400_monthly_sales::get_chart_svg),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}
