//! API routes for the analyzer

pub mod analyze;
pub mod jobs;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Uploads - with larger body limit for documents
        .route(
            "/upload",
            post(analyze::upload_preview).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/analyze",
            post(analyze::analyze_sync).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/analyze/async",
            post(analyze::analyze_async).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Job management
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job_status))
        .route("/jobs/:id/result", get(jobs::get_job_result))
        .route("/stats", get(jobs::get_stats))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let config = state.config();
    axum::Json(serde_json::json!({
        "name": "paper-analyzer",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Research paper analysis with deduplicated background jobs",
        "summarizer": {
            "provider": state.summarizer().name(),
            "model": state.summarizer().model(),
        },
        "retry": {
            "max_attempts": config.retry.max_attempts,
            "base_delay_ms": config.retry.base_delay_ms,
        },
        "endpoints": {
            "POST /api/upload": "Extract pages and detect sections (no summarization)",
            "POST /api/analyze": "Analyze a document synchronously",
            "POST /api/analyze/async": "Queue a document for background analysis",
            "GET /api/jobs": "List all jobs and queue stats",
            "GET /api/jobs/:id": "Get job status",
            "GET /api/jobs/:id/result": "Get the result of a finished job",
            "GET /api/stats": "Queue and cache statistics"
        },
        "supported_formats": [".pdf", ".txt", ".md"]
    }))
}
