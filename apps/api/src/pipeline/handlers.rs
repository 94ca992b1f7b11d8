//! Axum route handlers for the screening API.
//!
//! Two entry points: a JSON body for callers that already hold resume text,
//! and a multipart upload that stages the file on disk, screens it, and
//! removes it afterwards whatever the outcome.

use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::GenerationBackend;
use crate::pipeline::context::{ResumeSubmission, WorkflowContext};
use crate::pipeline::orchestrator::run_pipeline;
use crate::pipeline::report::save_report;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScreeningRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub screening_id: Uuid,
    pub result: WorkflowContext,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Runs the full screening pipeline on inline resume text and returns the
/// completed workflow context.
pub async fn handle_screening(
    State(state): State<AppState>,
    Json(request): Json<ScreeningRequest>,
) -> Result<Json<ScreeningResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let submission = ResumeSubmission {
        resume_text: request.resume_text,
        job_description: request.job_description,
        submitted_at: Utc::now(),
    };

    let result = run_pipeline(state.backend.as_ref(), submission).await?;
    persist_report(&state, &result).await;

    Ok(Json(ScreeningResponse {
        screening_id: Uuid::new_v4(),
        result,
    }))
}

/// POST /api/v1/screenings/upload
///
/// Multipart form: a `resume` file part plus a `job_description` text part.
/// The upload is staged under the configured uploads directory and removed on
/// every exit path, success or failure.
pub async fn handle_screening_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let mut resume_bytes: Option<(String, Vec<u8>)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        // Capture the name up front: bytes()/text() consume the field.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let filename = field
                    .file_name()
                    .map(sanitize_filename)
                    .unwrap_or_else(|| "resume.txt".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume: {e}")))?;
                resume_bytes = Some((filename, bytes.to_vec()));
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job_description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {} // unknown parts are ignored
        }
    }

    let (filename, bytes) =
        resume_bytes.ok_or_else(|| AppError::Validation("Missing 'resume' file part".to_string()))?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'job_description' part".to_string()))?;

    let file_path = save_upload(&state.config.upload_dir, &filename, &bytes).await?;

    screen_saved_upload(
        state.backend.as_ref(),
        &state.config.results_dir,
        &file_path,
        job_description,
    )
    .await
    .map(|result| {
        Json(ScreeningResponse {
            screening_id: Uuid::new_v4(),
            result,
        })
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Upload plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Stages an upload under `upload_dir` with a timestamped, collision-safe name.
async fn save_upload(upload_dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;

    let staged_name = format!("resume_{}_{}", Utc::now().format("%Y%m%d_%H%M%S%3f"), filename);
    let path = upload_dir.join(staged_name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to save upload: {e}")))?;

    info!("Staged upload at {}", path.display());
    Ok(path)
}

/// Screens a staged resume file. The file is removed before this returns, on
/// every path — the uploads directory holds nothing across requests.
pub(crate) async fn screen_saved_upload(
    backend: &dyn GenerationBackend,
    results_dir: &Path,
    file_path: &Path,
    job_description: String,
) -> Result<WorkflowContext, AppError> {
    let outcome = screen_file(backend, results_dir, file_path, job_description).await;

    if let Err(e) = tokio::fs::remove_file(file_path).await {
        warn!("Failed to remove staged upload {}: {e}", file_path.display());
    }

    outcome
}

async fn screen_file(
    backend: &dyn GenerationBackend,
    results_dir: &Path,
    file_path: &Path,
    job_description: String,
) -> Result<WorkflowContext, AppError> {
    let resume_text = tokio::fs::read_to_string(file_path).await.map_err(|e| {
        AppError::UnprocessableEntity(format!("Resume file must be UTF-8 text: {e}"))
    })?;

    if resume_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Resume file is empty".to_string(),
        ));
    }

    let submission = ResumeSubmission {
        resume_text,
        job_description,
        submitted_at: Utc::now(),
    };

    let result = run_pipeline(backend, submission).await?;

    let path = save_report_best_effort(results_dir, &result).await;
    if let Some(path) = path {
        info!("Results saved to {}", path.display());
    }

    Ok(result)
}

async fn persist_report(state: &AppState, result: &WorkflowContext) {
    save_report_best_effort(&state.config.results_dir, result).await;
}

/// Report persistence never fails a request the pipeline already completed.
async fn save_report_best_effort(results_dir: &Path, result: &WorkflowContext) -> Option<PathBuf> {
    match save_report(results_dir, result).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Failed to persist analysis report: {e:#}");
            None
        }
    }
}

/// Keeps alphanumerics, dots, dashes, and underscores; everything else
/// becomes an underscore. Prevents path traversal via uploaded names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
