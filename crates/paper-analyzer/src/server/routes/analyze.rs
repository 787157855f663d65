//! Upload preview and analysis endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::processing::JobStatus;
use crate::server::state::AppState;
use crate::types::{AnalysisResult, ExtractionReport, FileType};

/// Response from async analysis
#[derive(Debug, Serialize)]
pub struct AsyncAnalyzeResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}

/// An uploaded document
struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// Read the first multipart field carrying a filename (normally `file`)
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        // Reject before reading the body
        if !FileType::from_filename(&filename).is_supported() {
            return Err(Error::UnsupportedFileType(format!(
                "'{}'. Supported: .pdf, .txt, .md",
                filename
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        return Ok(Upload {
            filename,
            data: data.to_vec(),
        });
    }

    Err(Error::InvalidRequest("No file provided".to_string()))
}

/// POST /api/upload - Extraction preview without summarization
pub async fn upload_preview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionReport>> {
    let upload = read_upload(multipart).await?;
    let report = state
        .scheduler()
        .inspect(&upload.data, &upload.filename)
        .await?;
    Ok(Json(report))
}

/// POST /api/analyze - Synchronous analysis
pub async fn analyze_sync(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>> {
    let upload = read_upload(multipart).await?;
    let result = state
        .scheduler()
        .analyze_synchronously(&upload.data, &upload.filename)
        .await?;
    Ok(Json(result))
}

/// POST /api/analyze/async - Queue analysis and return a job handle
pub async fn analyze_async(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AsyncAnalyzeResponse>> {
    let upload = read_upload(multipart).await?;
    let job_id = state
        .scheduler()
        .submit_job(upload.data, &upload.filename)?;

    Ok(Json(AsyncAnalyzeResponse {
        job_id,
        status: JobStatus::Queued,
        message: format!(
            "Analysis queued. Poll /api/jobs/{} for status and /api/jobs/{}/result for the result.",
            job_id, job_id
        ),
    }))
}
