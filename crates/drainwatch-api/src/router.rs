use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Multipart bodies carry one attachment plus a small JSON payload
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Reports
        .route("/api/v1/reports", post(handlers::submit_report).get(handlers::list_reports))
        .route("/api/v1/reports/upload", post(handlers::submit_report_form))
        .route(
            "/api/v1/reports/{report_id}",
            get(handlers::get_report)
                .put(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .route("/api/v1/reports/{report_id}/upload", put(handlers::update_report_form))
        .route("/api/v1/reports/{report_id}/status", put(handlers::set_report_status))
        .route("/api/v1/reports/{report_id}/drainage", put(handlers::update_associations))

        // Remediation links
        .route("/api/v1/links/{link_id}/fix", post(handlers::fix_link))
        .route("/api/v1/links/{link_id}/fix/upload", post(handlers::fix_link_form))

        // Drainage segments
        .route("/api/v1/drainage", get(handlers::list_segments))
        .route("/api/v1/drainage/nearby", get(handlers::nearby_segments))
        .route("/api/v1/drainage/suggest", get(handlers::suggest_segments))
        .route("/api/v1/drainage/{segment_id}", delete(handlers::delete_segment))
        .route("/api/v1/drainage/{segment_id}/condition", put(handlers::set_segment_condition))

        // Areas
        .route("/api/v1/sub-districts/resolve", get(handlers::resolve_sub_district))
        .route("/api/v1/flood-zones", get(handlers::list_flood_zones))
        .route("/api/v1/flood-zones/at", get(handlers::flood_zones_at))

        // Dashboard
        .route("/api/v1/dashboard", get(handlers::dashboard_stats))

        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
