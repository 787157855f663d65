//! Job status, result and statistics endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::processing::{JobStatusView, RegistryStats, SchedulerStats};
use crate::server::state::AppState;
use crate::types::AnalysisResult;

/// Job list with queue counts
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobStatusView>,
    pub stats: RegistryStats,
}

/// GET /api/jobs - List all jobs, newest first
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    let scheduler = state.scheduler();
    Json(JobListResponse {
        jobs: scheduler.list_jobs(),
        stats: scheduler.registry().stats(),
    })
}

/// GET /api/jobs/:id - Job status
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusView>> {
    Ok(Json(state.scheduler().get_status(job_id)?))
}

/// GET /api/jobs/:id/result - Result of a finished job
///
/// 202 while the job is queued or running, 404 for unknown ids.
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<AnalysisResult>> {
    Ok(Json(state.scheduler().get_result(job_id)?))
}

/// GET /api/stats - Queue and cache statistics
pub async fn get_stats(State(state): State<AppState>) -> Json<SchedulerStats> {
    Json(state.scheduler().stats())
}
